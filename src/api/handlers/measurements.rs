use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::json;

use crate::{
    error::AppResult,
    models::Measurement,
    services::{
        auth::Claims,
        clients::{ClientService, MeasurementInput},
        push,
    },
    AppState,
};

use super::super::middleware::{ensure_client_access, ensure_trainer};

#[derive(Debug, Deserialize)]
pub struct MeasurementRequest {
    pub recorded_at: Option<DateTime<Utc>>,
    pub weight_lbs: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub arm_in: Option<f64>,
    pub thigh_in: Option<f64>,
}

impl From<MeasurementRequest> for MeasurementInput {
    fn from(req: MeasurementRequest) -> Self {
        MeasurementInput {
            recorded_at: req.recorded_at,
            weight_lbs: req.weight_lbs,
            body_fat_pct: req.body_fat_pct,
            chest_in: req.chest_in,
            waist_in: req.waist_in,
            hips_in: req.hips_in,
            arm_in: req.arm_in,
            thigh_in: req.thigh_in,
        }
    }
}

pub async fn list_measurements(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
) -> AppResult<Json<Vec<Measurement>>> {
    ensure_client_access(&claims, client_id)?;

    let measurements = ClientService::new(state.db).measurements(client_id).await?;
    Ok(Json(measurements))
}

pub async fn create_measurement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path(client_id): Path<i64>,
    Json(req): Json<MeasurementRequest>,
) -> AppResult<(StatusCode, Json<Measurement>)> {
    ensure_trainer(&claims)?;

    let measurement = ClientService::new(state.db.clone())
        .create_measurement(client_id, req.into())
        .await?;

    // Best-effort side effect; the write above never waits on it.
    let push_service = state.push.clone();
    push::spawn_notify(async move {
        push_service
            .notify_client(
                client_id,
                "New Measurement",
                "Your trainer recorded new measurements for you",
                Some(json!({ "type": "measurement_recorded" })),
            )
            .await
    });

    Ok((StatusCode::CREATED, Json(measurement)))
}

pub async fn update_measurement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((client_id, id)): Path<(i64, i64)>,
    Json(req): Json<MeasurementRequest>,
) -> AppResult<Json<Measurement>> {
    ensure_trainer(&claims)?;

    let measurement = ClientService::new(state.db)
        .update_measurement(client_id, id, req.into())
        .await?;
    Ok(Json(measurement))
}

pub async fn delete_measurement(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Path((client_id, id)): Path<(i64, i64)>,
) -> AppResult<StatusCode> {
    ensure_trainer(&claims)?;

    ClientService::new(state.db)
        .delete_measurement(client_id, id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
