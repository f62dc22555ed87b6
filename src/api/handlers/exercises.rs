use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Exercise,
    services::{
        auth::Claims,
        exercises::{ExerciseInput, ExerciseService},
    },
    AppState,
};

use super::super::middleware::ensure_trainer;
use super::file_extension;

const ALLOWED_VIDEO_TYPES: &[&str] = &[
    "video/mp4",
    "video/quicktime",
    "video/x-msvideo",
    "video/webm",
];

#[derive(Debug, Deserialize)]
pub struct ExerciseRequest {
    pub exercise_name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

impl From<ExerciseRequest> for ExerciseInput {
    fn from(req: ExerciseRequest) -> Self {
        ExerciseInput {
            exercise_name: req.exercise_name,
            description: req.description,
            video_url: req.video_url,
            thumbnail_url: req.thumbnail_url,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub q: String,
}

pub async fn search_exercises(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> AppResult<Json<Vec<Exercise>>> {
    let q = query.q.trim();
    if q.is_empty() {
        return Ok(Json(Vec::new()));
    }

    let exercises = ExerciseService::new(state.db).search(q).await?;
    Ok(Json(exercises))
}

pub async fn list_exercises(State(state): State<AppState>) -> AppResult<Json<Vec<Exercise>>> {
    let exercises = ExerciseService::new(state.db).list().await?;
    Ok(Json(exercises))
}

pub async fn get_exercise(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Exercise>> {
    let exercise = ExerciseService::new(state.db).get(id).await?;
    Ok(Json(exercise))
}

pub async fn create_exercise(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ExerciseRequest>,
) -> AppResult<(StatusCode, Json<Exercise>)> {
    ensure_trainer(&claims)?;

    let exercise = ExerciseService::new(state.db).create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(exercise)))
}

pub async fn update_exercise(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ExerciseRequest>,
) -> AppResult<Json<Exercise>> {
    ensure_trainer(&claims)?;

    let exercise = ExerciseService::new(state.db).update(id, req.into()).await?;
    Ok(Json(exercise))
}

pub async fn delete_exercise(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    ExerciseService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Exercise>> {
    ensure_trainer(&claims)?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("video") {
            continue;
        }

        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_string();
        if !ALLOWED_VIDEO_TYPES.contains(&content_type.as_str()) {
            return Err(AppError::BadRequest(
                "Only mp4, mov, avi, and webm video files are allowed".to_string(),
            ));
        }

        let ext = file_extension(field.file_name().unwrap_or_default());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        stored = Some(state.uploads.store("videos", &ext, data, &content_type).await?);
    }

    let video_path =
        stored.ok_or_else(|| AppError::BadRequest("No video file uploaded".to_string()))?;

    let exercise = ExerciseService::new(state.db)
        .set_video_path(id, &video_path)
        .await?;
    Ok(Json(exercise))
}
