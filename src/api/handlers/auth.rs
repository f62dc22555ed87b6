use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::{
    error::AppResult,
    models::Role,
    services::auth::AuthService,
    AppState,
};

#[derive(Debug, Deserialize)]
pub struct TrainerLoginRequest {
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TrainerUser {
    pub role: Role,
}

#[derive(Debug, Serialize)]
pub struct TrainerLoginResponse {
    pub token: String,
    pub user: TrainerUser,
}

pub async fn trainer_login(
    State(state): State<AppState>,
    Json(req): Json<TrainerLoginRequest>,
) -> AppResult<Json<TrainerLoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), state.config.auth.clone());
    let token = auth_service.trainer_login(&req.password).await?;

    Ok(Json(TrainerLoginResponse {
        token,
        user: TrainerUser {
            role: Role::Trainer,
        },
    }))
}

#[derive(Debug, Deserialize)]
pub struct ClientLoginRequest {
    pub access_code: String,
}

#[derive(Debug, Serialize)]
pub struct ClientUser {
    pub role: Role,
    pub client_id: i64,
    pub first_name: String,
    pub last_name: String,
}

#[derive(Debug, Serialize)]
pub struct ClientLoginResponse {
    pub token: String,
    pub user: ClientUser,
}

pub async fn client_login(
    State(state): State<AppState>,
    Json(req): Json<ClientLoginRequest>,
) -> AppResult<Json<ClientLoginResponse>> {
    let auth_service = AuthService::new(state.db.clone(), state.config.auth.clone());
    let (client, token) = auth_service.client_login(&req.access_code).await?;

    Ok(Json(ClientLoginResponse {
        token,
        user: ClientUser {
            role: Role::Client,
            client_id: client.id,
            first_name: client.first_name,
            last_name: client.last_name,
        },
    }))
}
