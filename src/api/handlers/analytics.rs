use axum::{extract::State, Extension, Json};

use crate::{
    error::AppResult,
    services::{
        analytics::{AnalyticsService, Dashboard},
        auth::Claims,
    },
    AppState,
};

use super::super::middleware::ensure_trainer;

pub async fn dashboard(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> AppResult<Json<Dashboard>> {
    ensure_trainer(&claims)?;

    let dashboard = AnalyticsService::new(state.db).dashboard().await?;
    Ok(Json(dashboard))
}
