use axum::{
    extract::{Multipart, Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::Client,
    services::{auth::Claims, clients::{ClientInput, ClientService}},
    AppState,
};

use super::super::middleware::{ensure_client_access, ensure_trainer};
use super::file_extension;

#[derive(Debug, Deserialize)]
pub struct ClientRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,
    pub is_active: Option<bool>,
}

impl From<ClientRequest> for ClientInput {
    fn from(req: ClientRequest) -> Self {
        ClientInput {
            first_name: req.first_name,
            last_name: req.last_name,
            email: req.email,
            phone: req.phone,
            goals: req.goals,
            notes: req.notes,
        }
    }
}

pub async fn list_clients(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Vec<Client>>> {
    ensure_trainer(&claims)?;

    let clients = ClientService::new(state.db).list().await?;
    Ok(Json(clients))
}

pub async fn create_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<ClientRequest>,
) -> AppResult<(StatusCode, Json<Client>)> {
    ensure_trainer(&claims)?;

    let client = ClientService::new(state.db).create(req.into()).await?;
    Ok((StatusCode::CREATED, Json(client)))
}

pub async fn get_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    ensure_client_access(&claims, id)?;

    let client = ClientService::new(state.db).get(id).await?;
    Ok(Json(client))
}

pub async fn update_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    Json(req): Json<ClientRequest>,
) -> AppResult<Json<Client>> {
    ensure_trainer(&claims)?;

    let is_active = req.is_active.unwrap_or(true);
    let client = ClientService::new(state.db)
        .update(id, req.into(), is_active)
        .await?;
    Ok(Json(client))
}

pub async fn delete_client(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    ClientService::new(state.db).delete(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
    mut multipart: Multipart,
) -> AppResult<Json<Client>> {
    ensure_trainer(&claims)?;

    let mut stored = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("photo") {
            continue;
        }

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
        stored = Some(state.uploads.store("clients", &ext, data, &content_type).await?);
    }

    let photo_url = stored.ok_or_else(|| AppError::BadRequest("No file uploaded".to_string()))?;

    let client = ClientService::new(state.db).set_photo(id, &photo_url).await?;
    Ok(Json(client))
}

pub async fn regenerate_code(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(id): Path<i64>,
) -> AppResult<Json<Client>> {
    ensure_trainer(&claims)?;

    let client = ClientService::new(state.db).regenerate_access_code(id).await?;
    Ok(Json(client))
}
