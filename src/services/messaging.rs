use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::AppResult,
    models::{ConversationSummary, Message, Role},
};

pub struct MessagingService {
    db: PgPool,
}

impl MessagingService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Trainer view: one row per active client with the latest message and
    /// the count of unread client messages.
    pub async fn conversations_for_trainer(&self) -> AppResult<Vec<ConversationSummary>> {
        let rows: Vec<ConversationSummary> = sqlx::query_as(
            r#"
            SELECT c.id AS client_id, c.first_name, c.last_name, c.photo_url,
                   m.content AS last_message, m.created_at AS last_message_at, m.sender_role,
                   (SELECT COUNT(*)::int FROM messages
                    WHERE client_id = c.id AND read_at IS NULL AND sender_role = 'client') AS unread_count
            FROM clients c
            LEFT JOIN LATERAL (
                SELECT content, created_at, sender_role FROM messages
                WHERE client_id = c.id ORDER BY created_at DESC LIMIT 1
            ) m ON true
            WHERE c.is_active = true
            ORDER BY m.created_at DESC NULLS LAST
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Client view: a summary of their own thread. Empty until the first
    /// message exists.
    pub async fn conversation_for_client(&self, client_id: i64) -> AppResult<Vec<ConversationSummary>> {
        let rows: Vec<ConversationSummary> = sqlx::query_as(
            r#"
            SELECT $1::bigint AS client_id,
                   NULL::text AS first_name, NULL::text AS last_name, NULL::text AS photo_url,
                   m.content AS last_message, m.created_at AS last_message_at, m.sender_role,
                   (SELECT COUNT(*)::int FROM messages
                    WHERE client_id = $1 AND read_at IS NULL AND sender_role = 'trainer') AS unread_count
            FROM (
                SELECT content, created_at, sender_role FROM messages
                WHERE client_id = $1 ORDER BY created_at DESC LIMIT 1
            ) m
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows)
    }

    /// Message history, oldest first. `before` pages backwards.
    pub async fn history(
        &self,
        client_id: i64,
        limit: i64,
        before: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<Message>> {
        let mut messages: Vec<Message> = sqlx::query_as(
            r#"
            SELECT * FROM messages
            WHERE client_id = $1 AND ($2::timestamptz IS NULL OR created_at < $2)
            ORDER BY created_at DESC
            LIMIT $3
            "#,
        )
        .bind(client_id)
        .bind(before)
        .bind(limit)
        .fetch_all(&self.db)
        .await?;

        messages.reverse();
        Ok(messages)
    }

    pub async fn send(
        &self,
        client_id: i64,
        sender_role: Role,
        sender_id: Option<i64>,
        content: &str,
    ) -> AppResult<Message> {
        let message: Message = sqlx::query_as(
            r#"
            INSERT INTO messages (client_id, sender_role, sender_id, content)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(sender_role)
        .bind(sender_id)
        .bind(content)
        .fetch_one(&self.db)
        .await?;

        Ok(message)
    }

    /// Mark everything the other side sent in this thread as read.
    pub async fn mark_read(&self, client_id: i64, reader_role: Role) -> AppResult<()> {
        sqlx::query(
            "UPDATE messages SET read_at = NOW()
             WHERE client_id = $1 AND sender_role = $2 AND read_at IS NULL",
        )
        .bind(client_id)
        .bind(reader_role.other())
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn unread_count(&self, role: Role, client_id: Option<i64>) -> AppResult<i64> {
        let count: (i64,) = match role {
            Role::Trainer => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM messages WHERE sender_role = 'client' AND read_at IS NULL",
                )
                .fetch_one(&self.db)
                .await?
            }
            Role::Client => {
                sqlx::query_as(
                    "SELECT COUNT(*) FROM messages
                     WHERE client_id = $1 AND sender_role = 'trainer' AND read_at IS NULL",
                )
                .bind(client_id)
                .fetch_one(&self.db)
                .await?
            }
        };

        Ok(count.0)
    }

    pub async fn client_name(&self, client_id: i64) -> AppResult<Option<(String, String)>> {
        let name: Option<(String, String)> =
            sqlx::query_as("SELECT first_name, last_name FROM clients WHERE id = $1")
                .bind(client_id)
                .fetch_optional(&self.db)
                .await?;
        Ok(name)
    }
}
