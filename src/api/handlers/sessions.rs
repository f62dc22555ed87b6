use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppResult,
    models::{Session, SessionStatus, SessionWithClient},
    services::{
        auth::Claims,
        push,
        sessions::{SessionFilter, SessionService},
    },
    AppState,
};

use super::super::middleware::ensure_trainer;

#[derive(Debug, Deserialize)]
pub struct SessionListQuery {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub client_id: Option<i64>,
}

pub async fn list_sessions(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<SessionListQuery>,
) -> AppResult<Json<Vec<SessionWithClient>>> {
    ensure_trainer(&claims)?;

    let sessions = SessionService::new(state.db)
        .list(SessionFilter {
            from: query.from,
            to: query.to,
            client_id: query.client_id,
        })
        .await?;
    Ok(Json(sessions))
}

#[derive(Debug, Deserialize)]
pub struct CreateSessionRequest {
    pub client_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: Option<i32>,
    pub notes: Option<String>,
}

pub async fn create_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateSessionRequest>,
) -> AppResult<(StatusCode, Json<Session>)> {
    ensure_trainer(&claims)?;

    let session = SessionService::new(state.db.clone())
        .create(req.client_id, req.scheduled_at, req.duration_min, req.notes)
        .await?;

    // Best-effort heads-up to the client; failure never surfaces here.
    let push_service = state.push.clone();
    let client_id = session.client_id;
    let session_id = session.id;
    let when = session.scheduled_at;
    push::spawn_notify(async move {
        push_service
            .notify_client(
                client_id,
                "Session Scheduled",
                &format!("New session on {}", when.format("%b %e at %H:%M")),
                Some(json!({ "type": "session_reminder", "sessionId": session_id })),
            )
            .await
    });

    Ok((StatusCode::CREATED, Json(session)))
}

pub async fn get_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<Json<SessionWithClient>> {
    ensure_trainer(&claims)?;

    let session = SessionService::new(state.db).get(id).await?;
    Ok(Json(session))
}

#[derive(Debug, Deserialize)]
pub struct UpdateSessionRequest {
    pub client_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub status: SessionStatus,
    pub notes: Option<String>,
}

pub async fn update_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateSessionRequest>,
) -> AppResult<Json<Session>> {
    ensure_trainer(&claims)?;

    let session = SessionService::new(state.db)
        .update(
            id,
            req.client_id,
            req.scheduled_at,
            req.duration_min,
            req.status,
            req.notes,
        )
        .await?;
    Ok(Json(session))
}

pub async fn delete_session(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    SessionService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
