use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Owning side of a token, preference row or message: the single trainer
/// or one of their clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "actor_role", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Trainer,
    Client,
}

impl Role {
    pub fn other(self) -> Self {
        match self {
            Role::Trainer => Role::Client,
            Role::Client => Role::Trainer,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Message {
    pub id: i64,
    pub client_id: i64,
    pub sender_role: Role,
    pub sender_id: Option<i64>,
    pub content: String,
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// One row per thread in the trainer's conversation list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationSummary {
    pub client_id: i64,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub photo_url: Option<String>,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub sender_role: Option<Role>,
    pub unread_count: i32,
}
