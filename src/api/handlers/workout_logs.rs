use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::{AppError, AppResult},
    models::WorkoutLog,
    services::{
        auth::Claims,
        push,
        sessions::{SessionService, WorkoutLogInput},
    },
    AppState,
};

use super::super::middleware::ensure_trainer;

#[derive(Debug, Deserialize)]
pub struct WorkoutLogRequest {
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub sort_order: Option<i32>,
}

impl From<WorkoutLogRequest> for WorkoutLogInput {
    fn from(req: WorkoutLogRequest) -> Self {
        WorkoutLogInput {
            exercise_name: req.exercise_name,
            sets: req.sets,
            reps: req.reps,
            weight: req.weight,
            sort_order: req.sort_order,
        }
    }
}

pub async fn list_logs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
) -> AppResult<Json<Vec<WorkoutLog>>> {
    ensure_trainer(&claims)?;

    let logs = SessionService::new(state.db).logs(session_id).await?;
    Ok(Json(logs))
}

pub async fn create_log(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(req): Json<WorkoutLogRequest>,
) -> AppResult<(StatusCode, Json<WorkoutLog>)> {
    ensure_trainer(&claims)?;

    let service = SessionService::new(state.db.clone());
    let log = service.create_log(session_id, req.into()).await?;

    notify_workout_logged(&state, session_id).await;

    Ok((StatusCode::CREATED, Json(log)))
}

#[derive(Debug, Deserialize)]
pub struct BatchLogsRequest {
    pub logs: Vec<WorkoutLogRequest>,
}

/// Insert a whole workout in one transaction.
pub async fn create_logs_batch(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(req): Json<BatchLogsRequest>,
) -> AppResult<(StatusCode, Json<Vec<WorkoutLog>>)> {
    ensure_trainer(&claims)?;

    if req.logs.is_empty() {
        return Err(AppError::BadRequest("logs must not be empty".to_string()));
    }

    let inputs = req.logs.into_iter().map(Into::into).collect();
    let logs = SessionService::new(state.db.clone())
        .create_logs_batch(session_id, inputs)
        .await?;

    notify_workout_logged(&state, session_id).await;

    Ok((StatusCode::CREATED, Json(logs)))
}

#[derive(Debug, Deserialize)]
pub struct ReorderEntry {
    pub id: i64,
    pub sort_order: i32,
}

#[derive(Debug, Deserialize)]
pub struct ReorderLogsRequest {
    pub order: Vec<ReorderEntry>,
}

/// Apply a full reordering atomically; any bad id rolls everything back.
pub async fn reorder_logs(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(session_id): Path<i64>,
    Json(req): Json<ReorderLogsRequest>,
) -> AppResult<Json<Vec<WorkoutLog>>> {
    ensure_trainer(&claims)?;

    let order = req.order.into_iter().map(|e| (e.id, e.sort_order)).collect();
    let logs = SessionService::new(state.db)
        .reorder_logs(session_id, order)
        .await?;
    Ok(Json(logs))
}

pub async fn update_log(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((session_id, log_id)): Path<(i64, i64)>,
    Json(req): Json<WorkoutLogRequest>,
) -> AppResult<Json<WorkoutLog>> {
    ensure_trainer(&claims)?;

    let log = SessionService::new(state.db)
        .update_log(session_id, log_id, req.into())
        .await?;
    Ok(Json(log))
}

pub async fn delete_log(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((session_id, log_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    SessionService::new(state.db)
        .delete_log(session_id, log_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Fire-and-log notification to the session's client.
async fn notify_workout_logged(state: &AppState, session_id: i64) {
    let session = match SessionService::new(state.db.clone()).get(session_id).await {
        Ok(session) => session,
        Err(err) => {
            tracing::warn!("Workout-logged lookup failed: {}", err);
            return;
        }
    };

    let push_service = state.push.clone();
    let client_id = session.session.client_id;
    push::spawn_notify(async move {
        push_service
            .notify_client(
                client_id,
                "Workout Logged",
                "Your trainer logged a workout for you",
                Some(json!({ "type": "workout_logged", "sessionId": session_id })),
            )
            .await
    });
}
