use chrono::{DateTime, Datelike, Duration, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};

use crate::{
    error::AppResult,
    models::SessionStatus,
};

#[derive(Debug, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub today_sessions: Vec<TodaySession>,
    pub weekly_trend: Vec<TrendPoint>,
    pub recent_activity: Vec<ActivityItem>,
}

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub active_clients: i32,
    pub today_sessions: i64,
    pub week_sessions: i32,
    pub completion_rate: i32,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TodaySession {
    pub id: i64,
    pub client_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub scheduled_at: DateTime<Utc>,
    pub duration_min: i32,
    pub status: SessionStatus,
}

#[derive(Debug, Serialize, FromRow)]
pub struct TrendPoint {
    pub day: String,
    pub count: i32,
}

#[derive(Debug, Serialize, FromRow)]
pub struct ActivityItem {
    #[serde(rename = "type")]
    #[sqlx(rename = "type")]
    pub activity_type: String,
    pub description: String,
    pub timestamp: DateTime<Utc>,
}

pub struct AnalyticsService {
    db: PgPool,
}

impl AnalyticsService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn dashboard(&self) -> AppResult<Dashboard> {
        let now = Utc::now();
        let today_start = now
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .unwrap_or_default()
            .and_utc();
        let today_end = today_start + Duration::days(1);

        // Monday of the current week.
        let week_start = today_start
            - Duration::days(i64::from(now.date_naive().weekday().num_days_from_monday()));
        let week_end = week_start + Duration::days(7);

        let active_clients: (i32,) =
            sqlx::query_as("SELECT COUNT(*)::int FROM clients WHERE is_active = true")
                .fetch_one(&self.db)
                .await?;

        let today_sessions: Vec<TodaySession> = sqlx::query_as(
            r#"
            SELECT s.id, s.client_id, c.first_name, c.last_name,
                   s.scheduled_at, s.duration_min, s.status
            FROM sessions s JOIN clients c ON s.client_id = c.id
            WHERE s.scheduled_at >= $1 AND s.scheduled_at < $2
            ORDER BY s.scheduled_at
            "#,
        )
        .bind(today_start)
        .bind(today_end)
        .fetch_all(&self.db)
        .await?;

        let week_sessions: (i32,) = sqlx::query_as(
            "SELECT COUNT(*)::int FROM sessions WHERE scheduled_at >= $1 AND scheduled_at < $2",
        )
        .bind(week_start)
        .bind(week_end)
        .fetch_one(&self.db)
        .await?;

        // Share of resolved sessions in the last 30 days that completed.
        let completion_rate: (i32,) = sqlx::query_as(
            r#"
            SELECT
              CASE WHEN COUNT(*) FILTER (WHERE status IN ('completed','cancelled','no_show')) = 0 THEN 0
              ELSE ROUND(
                COUNT(*) FILTER (WHERE status = 'completed') * 100.0 /
                COUNT(*) FILTER (WHERE status IN ('completed','cancelled','no_show'))
              )::int END
            FROM sessions
            WHERE scheduled_at >= NOW() - INTERVAL '30 days'
            "#,
        )
        .fetch_one(&self.db)
        .await?;

        let weekly_trend: Vec<TrendPoint> = sqlx::query_as(
            r#"
            SELECT d.day::date::text AS day,
                   COALESCE(COUNT(s.id), 0)::int AS count
            FROM generate_series($1::date, ($2::date - INTERVAL '1 day')::date, '1 day') AS d(day)
            LEFT JOIN sessions s ON s.scheduled_at::date = d.day::date
            GROUP BY d.day ORDER BY d.day
            "#,
        )
        .bind(week_start)
        .bind(week_end)
        .fetch_all(&self.db)
        .await?;

        let recent_activity: Vec<ActivityItem> = sqlx::query_as(
            r#"
            (SELECT 'session_completed' AS type,
                    'Completed session with ' || c.first_name || ' ' || c.last_name AS description,
                    s.updated_at AS timestamp
             FROM sessions s JOIN clients c ON s.client_id = c.id
             WHERE s.status = 'completed'
             ORDER BY s.updated_at DESC LIMIT 10)
            UNION ALL
            (SELECT 'new_client' AS type,
                    'New client: ' || first_name || ' ' || last_name AS description,
                    created_at AS timestamp
             FROM clients ORDER BY created_at DESC LIMIT 10)
            UNION ALL
            (SELECT 'measurement_recorded' AS type,
                    'Measurement recorded for ' || c.first_name || ' ' || c.last_name AS description,
                    m.created_at AS timestamp
             FROM measurements m JOIN clients c ON m.client_id = c.id
             ORDER BY m.created_at DESC LIMIT 10)
            ORDER BY timestamp DESC LIMIT 10
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(Dashboard {
            stats: DashboardStats {
                active_clients: active_clients.0,
                today_sessions: today_sessions.len() as i64,
                week_sessions: week_sessions.0,
                completion_rate: completion_rate.0,
            },
            today_sessions,
            weekly_trend,
            recent_activity,
        })
    }
}
