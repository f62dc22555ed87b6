use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{FromRow, PgPool};
use tokio::{sync::watch, task::JoinHandle, time};

use crate::{
    error::AppResult,
    models::Role,
    services::push::{PushMessage, PushService},
};

/// Sessions eligible for a reminder: scheduled, not yet reminded, starting
/// in the future and inside the client's configured lead window.
//
// TODO: the window honors reminder_minutes_before but never checks the
// session_reminders toggle that notify_client applies on the other
// notification paths.
const DUE_SESSIONS_SQL: &str = r#"
    SELECT s.id, s.client_id, s.scheduled_at,
           c.first_name, c.last_name,
           COALESCE(np.reminder_minutes_before, 60) AS reminder_minutes
    FROM sessions s
    JOIN clients c ON s.client_id = c.id
    LEFT JOIN notification_preferences np
           ON np.role = 'client' AND np.client_id = s.client_id
    WHERE s.status = 'scheduled'
      AND s.reminder_sent = false
      AND s.scheduled_at > NOW()
      AND s.scheduled_at <= NOW() + make_interval(mins => COALESCE(np.reminder_minutes_before, 60))
"#;

#[derive(Debug, FromRow)]
struct DueSession {
    id: i64,
    client_id: i64,
    scheduled_at: DateTime<Utc>,
    first_name: String,
    last_name: String,
    reminder_minutes: i32,
}

/// Owned handle to the running scheduler task. Dropping it leaves the task
/// running; call `stop` to shut it down and wait for the in-flight tick.
pub struct SchedulerHandle {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl SchedulerHandle {
    pub async fn stop(self) {
        let _ = self.shutdown.send(true);
        let _ = self.task.await;
    }
}

/// Spawn the reminder loop: one immediate tick, then one per interval. A
/// single task with sequential awaits, so ticks never overlap.
pub fn start(db: PgPool, push: PushService, tick_interval: Duration) -> SchedulerHandle {
    let (shutdown, mut rx) = watch::channel(false);

    let task = tokio::spawn(async move {
        tracing::info!(
            "Starting session reminder scheduler ({}s interval)",
            tick_interval.as_secs()
        );

        let mut ticker = time::interval(tick_interval);
        ticker.set_missed_tick_behavior(time::MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    if let Err(err) = send_due_reminders(&db, &push).await {
                        tracing::error!("Reminder tick failed: {}", err);
                    }
                }
                _ = rx.changed() => {
                    if *rx.borrow() {
                        break;
                    }
                }
            }
        }

        tracing::info!("Session reminder scheduler stopped");
    });

    SchedulerHandle { shutdown, task }
}

async fn send_due_reminders(db: &PgPool, push: &PushService) -> AppResult<()> {
    let sessions: Vec<DueSession> = sqlx::query_as(DUE_SESSIONS_SQL).fetch_all(db).await?;

    for session in sessions {
        // One session's failure must not starve the rest of the tick.
        if let Err(err) = remind_session(db, push, &session).await {
            tracing::error!("Reminder for session {} failed: {}", session.id, err);
        }
    }

    Ok(())
}

async fn remind_session(db: &PgPool, push: &PushService, session: &DueSession) -> AppResult<()> {
    let now = Utc::now();
    // The window may have closed between the scan and this point.
    if !is_due(now, session.scheduled_at, i64::from(session.reminder_minutes)) {
        return Ok(());
    }

    let minutes = minutes_until(now, session.scheduled_at);
    let data = json!({ "type": "session_reminder", "sessionId": session.id });

    let client_tokens = push
        .tokens_for_role(Role::Client, Some(session.client_id))
        .await?;
    if !client_tokens.is_empty() {
        let messages = client_tokens
            .into_iter()
            .map(|to| PushMessage {
                to,
                title: "Session Reminder".to_string(),
                body: format!("Your session is in {} minutes", minutes),
                data: Some(data.clone()),
            })
            .collect();
        push.send(messages).await;
    }

    let trainer_tokens = push.tokens_for_role(Role::Trainer, None).await?;
    if !trainer_tokens.is_empty() {
        let messages = trainer_tokens
            .into_iter()
            .map(|to| PushMessage {
                to,
                title: "Upcoming Session".to_string(),
                body: format!(
                    "{} {} session coming up",
                    session.first_name, session.last_name
                ),
                data: Some(data.clone()),
            })
            .collect();
        push.send(messages).await;
    }

    // Commit point for at-most-once delivery. Conditional so a concurrent
    // manual edit cannot be overwritten into a second reminder.
    sqlx::query("UPDATE sessions SET reminder_sent = true WHERE id = $1 AND reminder_sent = false")
        .bind(session.id)
        .execute(db)
        .await?;

    Ok(())
}

/// Whole minutes from `now` until the session starts, rounded to nearest.
fn minutes_until(now: DateTime<Utc>, scheduled_at: DateTime<Utc>) -> i64 {
    let secs = (scheduled_at - now).num_seconds();
    (secs + 30).div_euclid(60)
}

/// A session is due when it starts in the future but within the lead window.
fn is_due(now: DateTime<Utc>, scheduled_at: DateTime<Utc>, lead_minutes: i64) -> bool {
    scheduled_at > now && scheduled_at <= now + chrono::Duration::minutes(lead_minutes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 2, hour, min, 0).unwrap()
    }

    #[test]
    fn session_inside_lead_window_is_due() {
        // Session at 14:00, 60 minute lead, now 13:10.
        assert!(is_due(at(13, 10), at(14, 0), 60));
    }

    #[test]
    fn session_beyond_lead_window_is_not_due() {
        // Now 12:50 — more than an hour out.
        assert!(!is_due(at(12, 50), at(14, 0), 60));
    }

    #[test]
    fn session_already_started_is_not_due() {
        // Now 14:05 — start time has passed, even though unsent.
        assert!(!is_due(at(14, 5), at(14, 0), 60));
    }

    #[test]
    fn window_edge_is_inclusive() {
        assert!(is_due(at(13, 0), at(14, 0), 60));
    }

    #[test]
    fn custom_lead_time_respected() {
        assert!(is_due(at(13, 45), at(14, 0), 15));
        assert!(!is_due(at(13, 30), at(14, 0), 15));
    }

    #[test]
    fn minutes_until_rounds_to_nearest() {
        assert_eq!(minutes_until(at(13, 10), at(14, 0)), 50);

        let now = Utc.with_ymd_and_hms(2025, 6, 2, 13, 10, 40).unwrap();
        assert_eq!(minutes_until(now, at(14, 0)), 49);
    }
}
