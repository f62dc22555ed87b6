use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{ConversationSummary, Message, Role},
    services::{auth::Claims, messaging::MessagingService, push},
    AppState,
};

use super::super::middleware::ensure_client_access;

pub async fn list_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<ConversationSummary>>> {
    let service = MessagingService::new(state.db);
    let conversations = match claims.role {
        Role::Trainer => service.conversations_for_trainer().await?,
        Role::Client => {
            let client_id = claims.client_id.ok_or(AppError::InvalidToken)?;
            service.conversation_for_client(client_id).await?
        }
    };
    Ok(Json(conversations))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub limit: Option<i64>,
    pub before: Option<DateTime<Utc>>,
}

pub async fn history(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
    Query(query): Query<HistoryQuery>,
) -> AppResult<Json<Vec<Message>>> {
    ensure_client_access(&claims, client_id)?;

    let limit = query.limit.unwrap_or(50).clamp(1, 200);
    let messages = MessagingService::new(state.db)
        .history(client_id, limit, query.before)
        .await?;
    Ok(Json(messages))
}

#[derive(Debug, Deserialize)]
pub struct SendMessageRequest {
    pub content: String,
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
    Json(req): Json<SendMessageRequest>,
) -> AppResult<(StatusCode, Json<Message>)> {
    ensure_client_access(&claims, client_id)?;

    let content = req.content.trim().to_string();
    if content.is_empty() {
        return Err(AppError::BadRequest("content must not be empty".to_string()));
    }

    let service = MessagingService::new(state.db.clone());
    let message = service
        .send(client_id, claims.role, claims.client_id, &content)
        .await?;

    // Ping the other side of the thread without blocking the response.
    let push_service = state.push.clone();
    match claims.role {
        Role::Trainer => {
            push::spawn_notify(async move {
                push_service
                    .notify_client(
                        client_id,
                        "New Message",
                        "Your trainer sent you a message",
                        Some(json!({ "type": "message", "clientId": client_id })),
                    )
                    .await
            });
        }
        Role::Client => {
            let name = service.client_name(client_id).await?;
            let sender = name
                .map(|(first, last)| format!("{} {}", first, last))
                .unwrap_or_else(|| "A client".to_string());
            let preview: String = content.chars().take(50).collect();
            push::spawn_notify(async move {
                push_service
                    .notify_trainer(
                        "New Message",
                        &format!("{}: {}", sender, preview),
                        Some(json!({ "type": "message", "clientId": client_id })),
                    )
                    .await
            });
        }
    }

    Ok((StatusCode::CREATED, Json(message)))
}

pub async fn mark_read(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_client_access(&claims, client_id)?;

    MessagingService::new(state.db)
        .mark_read(client_id, claims.role)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub unread_count: i64,
}

pub async fn unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<UnreadCountResponse>> {
    let count = MessagingService::new(state.db)
        .unread_count(claims.role, claims.client_id)
        .await?;
    Ok(Json(UnreadCountResponse {
        unread_count: count,
    }))
}
