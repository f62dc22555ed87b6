use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::AppResult,
    models::WorkoutTemplate,
    services::{auth::Claims, exercises::ExerciseService},
    AppState,
};

use super::super::middleware::ensure_trainer;

#[derive(Debug, Deserialize)]
pub struct TemplateRequest {
    pub name: String,
    #[serde(default)]
    pub exercises: serde_json::Value,
}

fn exercises_or_empty(value: serde_json::Value) -> serde_json::Value {
    if value.is_null() {
        serde_json::Value::Array(Vec::new())
    } else {
        value
    }
}

pub async fn list_templates(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<WorkoutTemplate>>> {
    ensure_trainer(&claims)?;

    let templates = ExerciseService::new(state.db).templates().await?;
    Ok(Json(templates))
}

pub async fn create_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<TemplateRequest>,
) -> AppResult<(StatusCode, Json<WorkoutTemplate>)> {
    ensure_trainer(&claims)?;

    let template = ExerciseService::new(state.db)
        .create_template(&req.name, exercises_or_empty(req.exercises))
        .await?;
    Ok((StatusCode::CREATED, Json(template)))
}

pub async fn get_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<Json<WorkoutTemplate>> {
    ensure_trainer(&claims)?;

    let template = ExerciseService::new(state.db).get_template(id).await?;
    Ok(Json(template))
}

pub async fn update_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<TemplateRequest>,
) -> AppResult<Json<WorkoutTemplate>> {
    ensure_trainer(&claims)?;

    let template = ExerciseService::new(state.db)
        .update_template(id, &req.name, exercises_or_empty(req.exercises))
        .await?;
    Ok(Json(template))
}

pub async fn delete_template(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    ExerciseService::new(state.db).delete_template(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
