use axum::{
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::{PhotoCategory, ProgressPhoto},
    services::{auth::Claims, clients::ClientService},
    AppState,
};

use super::super::middleware::{ensure_client_access, ensure_trainer};
use super::file_extension;

#[derive(Debug, Deserialize)]
pub struct PhotoListQuery {
    pub category: Option<PhotoCategory>,
}

pub async fn list_photos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
    Query(query): Query<PhotoListQuery>,
) -> AppResult<Json<Vec<ProgressPhoto>>> {
    ensure_client_access(&claims, client_id)?;

    let photos = ClientService::new(state.db)
        .progress_photos(client_id, query.category)
        .await?;
    Ok(Json(photos))
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<ProgressPhoto>)> {
    ensure_trainer(&claims)?;

    let mut stored = None;
    let mut category = PhotoCategory::default();
    let mut notes = None;
    let mut taken_at: Option<DateTime<Utc>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        match field.name() {
            Some("photo") => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                if !content_type.starts_with("image/") {
                    return Err(AppError::BadRequest(
                        "Only image files are allowed".to_string(),
                    ));
                }

                let ext = file_extension(field.file_name().unwrap_or_default());
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                stored =
                    Some(state.uploads.store("progress", &ext, data, &content_type).await?);
            }
            Some("category") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                category = match value.as_str() {
                    "front" => PhotoCategory::Front,
                    "side" => PhotoCategory::Side,
                    "back" => PhotoCategory::Back,
                    "other" => PhotoCategory::Other,
                    _ => {
                        return Err(AppError::BadRequest("Invalid photo category".to_string()))
                    }
                };
            }
            Some("notes") => {
                notes = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(e.to_string()))?,
                );
            }
            Some("taken_at") => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                taken_at = Some(
                    value
                        .parse()
                        .map_err(|_| AppError::BadRequest("Invalid taken_at".to_string()))?,
                );
            }
            _ => {}
        }
    }

    let photo_url = stored.ok_or_else(|| AppError::BadRequest("No photo uploaded".to_string()))?;

    let photo = ClientService::new(state.db)
        .add_progress_photo(client_id, &photo_url, category, notes, taken_at)
        .await?;
    Ok((StatusCode::CREATED, Json(photo)))
}

pub async fn delete_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((client_id, photo_id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    ClientService::new(state.db)
        .delete_progress_photo(client_id, photo_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
