use axum::{extract::State, http::StatusCode, Extension, Json};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::{NotificationPreference, PreferenceDefaults},
    services::{auth::Claims, push::PushMessage},
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct RegisterTokenRequest {
    pub token: String,
    pub device_name: Option<String>,
}

pub async fn register_token(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<RegisterTokenRequest>,
) -> AppResult<StatusCode> {
    if req.token.trim().is_empty() {
        return Err(AppError::BadRequest("token must not be empty".to_string()));
    }

    state
        .push
        .register_token(
            claims.role,
            claims.client_id,
            req.token.trim(),
            req.device_name.as_deref(),
        )
        .await?;
    Ok(StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
pub struct UnregisterTokenRequest {
    pub token: String,
}

pub async fn unregister_token(
    State(state): State<AppState>,
    Json(req): Json<UnregisterTokenRequest>,
) -> AppResult<StatusCode> {
    state.push.unregister_token(&req.token).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<serde_json::Value>> {
    let pref = state
        .push
        .get_preferences(claims.role, claims.client_id)
        .await?;

    let body = match pref {
        Some(pref) => serde_json::to_value(pref).map_err(anyhow::Error::from)?,
        None => serde_json::to_value(PreferenceDefaults::default()).map_err(anyhow::Error::from)?,
    };
    Ok(Json(body))
}

#[derive(Debug, Deserialize)]
pub struct UpdatePreferencesRequest {
    pub session_reminders: Option<bool>,
    pub workout_logged: Option<bool>,
    pub measurement_recorded: Option<bool>,
    pub reminder_minutes_before: Option<i32>,
}

pub async fn update_preferences(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePreferencesRequest>,
) -> AppResult<Json<NotificationPreference>> {
    let defaults = PreferenceDefaults::default();
    let pref = state
        .push
        .update_preferences(
            claims.role,
            claims.client_id,
            req.session_reminders.unwrap_or(defaults.session_reminders),
            req.workout_logged.unwrap_or(defaults.workout_logged),
            req.measurement_recorded
                .unwrap_or(defaults.measurement_recorded),
            req.reminder_minutes_before
                .unwrap_or(defaults.reminder_minutes_before),
        )
        .await?;
    Ok(Json(pref))
}

#[derive(Debug, Serialize)]
pub struct TestNotificationResponse {
    pub success: bool,
    pub sent_to: usize,
}

/// Push a test notification to the caller's own devices.
pub async fn send_test(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<TestNotificationResponse>> {
    let tokens = state
        .push
        .tokens_for_role(claims.role, claims.client_id)
        .await?;
    if tokens.is_empty() {
        return Err(AppError::BadRequest(
            "No push tokens registered".to_string(),
        ));
    }

    let sent_to = tokens.len();
    let messages = tokens
        .into_iter()
        .map(|to| PushMessage {
            to,
            title: "Test Notification".to_string(),
            body: "Push notifications are working".to_string(),
            data: Some(json!({ "type": "test" })),
        })
        .collect();
    state.push.send(messages).await;

    Ok(Json(TestNotificationResponse {
        success: true,
        sent_to,
    }))
}
