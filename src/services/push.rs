use std::future::Future;

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    config::PushConfig,
    error::AppResult,
    models::{NotificationPreference, Role},
};

/// Provider-imposed maximum messages per request.
pub const PUSH_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Serialize)]
pub struct PushMessage {
    pub to: String,
    pub title: String,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct PushResponse {
    #[serde(default)]
    data: Vec<PushTicket>,
}

#[derive(Debug, Deserialize)]
struct PushTicket {
    status: String,
    details: Option<PushTicketDetails>,
}

#[derive(Debug, Deserialize)]
struct PushTicketDetails {
    error: Option<String>,
}

#[derive(Clone)]
pub struct PushService {
    db: PgPool,
    http: reqwest::Client,
    endpoint: String,
}

impl PushService {
    pub fn new(db: PgPool, config: &PushConfig) -> Self {
        Self {
            db,
            http: reqwest::Client::new(),
            endpoint: config.endpoint.clone(),
        }
    }

    /// Deliver payloads to the push provider in batches. Best-effort: every
    /// failure is logged here and nothing propagates to the caller.
    pub async fn send(&self, messages: Vec<PushMessage>) {
        if messages.is_empty() {
            return;
        }

        for chunk in messages.chunks(PUSH_BATCH_SIZE) {
            match self.send_chunk(chunk).await {
                Ok(response) => self.deactivate_invalid_tokens(chunk, &response).await,
                Err(err) => {
                    tracing::warn!("Push provider call failed: {}", err);
                }
            }
        }
    }

    async fn send_chunk(&self, chunk: &[PushMessage]) -> Result<PushResponse, reqwest::Error> {
        self.http
            .post(&self.endpoint)
            .json(chunk)
            .send()
            .await?
            .json::<PushResponse>()
            .await
    }

    /// Flip tokens the provider reports as permanently undeliverable. A
    /// compensating action: the dispatch itself already happened.
    async fn deactivate_invalid_tokens(&self, chunk: &[PushMessage], response: &PushResponse) {
        for (message, ticket) in chunk.iter().zip(&response.data) {
            if !ticket_undeliverable(ticket) {
                continue;
            }
            let result =
                sqlx::query("UPDATE push_tokens SET is_active = false WHERE expo_push_token = $1")
                    .bind(&message.to)
                    .execute(&self.db)
                    .await;
            match result {
                Ok(_) => tracing::info!("Deactivated unregistered push token"),
                Err(err) => tracing::warn!("Failed to deactivate push token: {}", err),
            }
        }
    }

    /// Active token values for a recipient identity.
    pub async fn tokens_for_role(
        &self,
        role: Role,
        client_id: Option<i64>,
    ) -> AppResult<Vec<String>> {
        let tokens: Vec<(String,)> = match client_id {
            Some(client_id) => {
                sqlx::query_as(
                    "SELECT expo_push_token FROM push_tokens
                     WHERE role = $1 AND is_active = true AND client_id = $2",
                )
                .bind(role)
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT expo_push_token FROM push_tokens
                     WHERE role = $1 AND is_active = true",
                )
                .bind(role)
                .fetch_all(&self.db)
                .await?
            }
        };

        Ok(tokens.into_iter().map(|(t,)| t).collect())
    }

    pub async fn notify_trainer(
        &self,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> AppResult<()> {
        let tokens = self.tokens_for_role(Role::Trainer, None).await?;
        if tokens.is_empty() {
            return Ok(());
        }

        self.send(build_messages(tokens, title, body, data)).await;
        Ok(())
    }

    /// Upsert a device token for the caller. Re-registering a token someone
    /// unregistered (or the provider invalidated) restores it to active with
    /// the latest device name and owner.
    pub async fn register_token(
        &self,
        role: Role,
        client_id: Option<i64>,
        token: &str,
        device_name: Option<&str>,
    ) -> AppResult<()> {
        sqlx::query(
            r#"
            INSERT INTO push_tokens (role, client_id, expo_push_token, device_name, is_active)
            VALUES ($1, $2, $3, $4, true)
            ON CONFLICT (expo_push_token)
            DO UPDATE SET is_active = true, device_name = $4, role = $1, client_id = $2,
                          updated_at = NOW()
            "#,
        )
        .bind(role)
        .bind(client_id)
        .bind(token)
        .bind(device_name)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn unregister_token(&self, token: &str) -> AppResult<()> {
        sqlx::query("UPDATE push_tokens SET is_active = false WHERE expo_push_token = $1")
            .bind(token)
            .execute(&self.db)
            .await?;
        Ok(())
    }

    pub async fn get_preferences(
        &self,
        role: Role,
        client_id: Option<i64>,
    ) -> AppResult<Option<NotificationPreference>> {
        let pref: Option<NotificationPreference> = sqlx::query_as(
            "SELECT * FROM notification_preferences
             WHERE role = $1 AND client_id IS NOT DISTINCT FROM $2",
        )
        .bind(role)
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?;
        Ok(pref)
    }

    pub async fn update_preferences(
        &self,
        role: Role,
        client_id: Option<i64>,
        session_reminders: bool,
        workout_logged: bool,
        measurement_recorded: bool,
        reminder_minutes_before: i32,
    ) -> AppResult<NotificationPreference> {
        let pref: NotificationPreference = sqlx::query_as(
            r#"
            INSERT INTO notification_preferences
                (role, client_id, session_reminders, workout_logged, measurement_recorded, reminder_minutes_before)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (role, client_id)
            DO UPDATE SET session_reminders = $3, workout_logged = $4,
                          measurement_recorded = $5, reminder_minutes_before = $6,
                          updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(role)
        .bind(client_id)
        .bind(session_reminders)
        .bind(workout_logged)
        .bind(measurement_recorded)
        .bind(reminder_minutes_before)
        .fetch_one(&self.db)
        .await?;

        Ok(pref)
    }

    /// Notify one client's devices, suppressed when the client has disabled
    /// the event category carried in `data.type`.
    pub async fn notify_client(
        &self,
        client_id: i64,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> AppResult<()> {
        let pref: Option<NotificationPreference> = sqlx::query_as(
            "SELECT * FROM notification_preferences WHERE role = 'client' AND client_id = $1",
        )
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?;

        if let Some(pref) = pref {
            if !category_enabled(&pref, data.as_ref()) {
                return Ok(());
            }
        }

        let tokens = self.tokens_for_role(Role::Client, Some(client_id)).await?;
        if tokens.is_empty() {
            return Ok(());
        }

        self.send(build_messages(tokens, title, body, data)).await;
        Ok(())
    }
}

fn build_messages(
    tokens: Vec<String>,
    title: &str,
    body: &str,
    data: Option<serde_json::Value>,
) -> Vec<PushMessage> {
    tokens
        .into_iter()
        .map(|to| PushMessage {
            to,
            title: title.to_string(),
            body: body.to_string(),
            data: data.clone(),
        })
        .collect()
}

fn ticket_undeliverable(ticket: &PushTicket) -> bool {
    ticket.status == "error"
        && ticket
            .details
            .as_ref()
            .and_then(|d| d.error.as_deref())
            .is_some_and(|e| e == "DeviceNotRegistered")
}

/// Preference gate: absent row means enabled; unknown categories pass.
fn category_enabled(pref: &NotificationPreference, data: Option<&serde_json::Value>) -> bool {
    match data.and_then(|d| d.get("type")).and_then(|t| t.as_str()) {
        Some("session_reminder") => pref.session_reminders,
        Some("workout_logged") => pref.workout_logged,
        Some("measurement_recorded") => pref.measurement_recorded,
        _ => true,
    }
}

/// Run a notification dispatch as a detached task, logging any failure.
/// Endpoints that notify as a side effect must never fail the primary write
/// because of the dispatcher.
pub fn spawn_notify<F>(fut: F)
where
    F: Future<Output = AppResult<()>> + Send + 'static,
{
    tokio::spawn(async move {
        if let Err(err) = fut.await {
            tracing::warn!("Notification dispatch failed: {}", err);
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn messages(n: usize) -> Vec<PushMessage> {
        (0..n)
            .map(|i| PushMessage {
                to: format!("ExponentPushToken[{}]", i),
                title: "t".to_string(),
                body: "b".to_string(),
                data: None,
            })
            .collect()
    }

    fn pref(
        session_reminders: bool,
        workout_logged: bool,
        measurement_recorded: bool,
    ) -> NotificationPreference {
        NotificationPreference {
            id: 1,
            role: Role::Client,
            client_id: Some(7),
            session_reminders,
            workout_logged,
            measurement_recorded,
            reminder_minutes_before: 60,
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn batches_of_at_most_100() {
        let msgs = messages(250);
        let sizes: Vec<usize> = msgs.chunks(PUSH_BATCH_SIZE).map(<[_]>::len).collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }

    #[test]
    fn exact_batch_is_a_single_call() {
        let msgs = messages(100);
        assert_eq!(msgs.chunks(PUSH_BATCH_SIZE).count(), 1);
    }

    #[test]
    fn disabled_category_is_suppressed() {
        let p = pref(true, false, true);
        let data = serde_json::json!({ "type": "workout_logged" });
        assert!(!category_enabled(&p, Some(&data)));
    }

    #[test]
    fn other_categories_unaffected() {
        let p = pref(false, true, true);
        let data = serde_json::json!({ "type": "measurement_recorded" });
        assert!(category_enabled(&p, Some(&data)));
    }

    #[test]
    fn untyped_payload_passes_gate() {
        let p = pref(false, false, false);
        assert!(category_enabled(&p, None));
        let data = serde_json::json!({ "type": "something_else" });
        assert!(category_enabled(&p, Some(&data)));
    }

    #[test]
    fn device_not_registered_is_undeliverable() {
        let ticket = PushTicket {
            status: "error".to_string(),
            details: Some(PushTicketDetails {
                error: Some("DeviceNotRegistered".to_string()),
            }),
        };
        assert!(ticket_undeliverable(&ticket));
    }

    #[test]
    fn transient_errors_keep_token_active() {
        let ok = PushTicket {
            status: "ok".to_string(),
            details: None,
        };
        assert!(!ticket_undeliverable(&ok));

        let throttled = PushTicket {
            status: "error".to_string(),
            details: Some(PushTicketDetails {
                error: Some("MessageRateExceeded".to_string()),
            }),
        };
        assert!(!ticket_undeliverable(&throttled));
    }

    #[test]
    fn data_payload_omitted_when_absent() {
        let msg = PushMessage {
            to: "ExponentPushToken[x]".to_string(),
            title: "Session Reminder".to_string(),
            body: "Your session is in 50 minutes".to_string(),
            data: None,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert!(json.get("data").is_none());
    }
}
