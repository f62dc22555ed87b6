use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Measurement {
    pub id: i64,
    pub client_id: i64,
    pub recorded_at: DateTime<Utc>,
    pub weight_lbs: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub arm_in: Option<f64>,
    pub thigh_in: Option<f64>,
    pub created_at: DateTime<Utc>,
}
