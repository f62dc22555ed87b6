use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    pub id: i64,
    pub client_id: i64,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub status: SessionStatus,
    pub notes: Option<String>,
    pub reminder_sent: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fixed enumeration; no other values accepted at the API boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "session_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    Scheduled,
    Completed,
    Cancelled,
    NoShow,
}

impl Default for SessionStatus {
    fn default() -> Self {
        Self::Scheduled
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SessionWithClient {
    #[serde(flatten)]
    #[sqlx(flatten)]
    pub session: Session,
    pub first_name: String,
    pub last_name: String,
}
