use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProgressPhoto {
    pub id: i64,
    pub client_id: i64,
    pub photo_url: String,
    pub category: PhotoCategory,
    pub notes: Option<String>,
    pub taken_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "photo_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum PhotoCategory {
    Front,
    Side,
    Back,
    Other,
}

impl Default for PhotoCategory {
    fn default() -> Self {
        Self::Front
    }
}
