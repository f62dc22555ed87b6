use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Session, SessionStatus, SessionWithClient, WorkoutLog},
};

#[derive(Debug, Clone, Default)]
pub struct SessionFilter {
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
    pub client_id: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct WorkoutLogInput {
    pub exercise_name: String,
    pub sets: Option<i32>,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub sort_order: Option<i32>,
}

pub struct SessionService {
    db: PgPool,
}

impl SessionService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self, filter: SessionFilter) -> AppResult<Vec<SessionWithClient>> {
        // Filters are optional; NULL comparisons fall through.
        let sessions: Vec<SessionWithClient> = sqlx::query_as(
            r#"
            SELECT s.*, c.first_name, c.last_name
            FROM sessions s JOIN clients c ON s.client_id = c.id
            WHERE ($1::timestamptz IS NULL OR s.scheduled_at >= $1)
              AND ($2::timestamptz IS NULL OR s.scheduled_at <= $2)
              AND ($3::bigint IS NULL OR s.client_id = $3)
            ORDER BY s.scheduled_at
            "#,
        )
        .bind(filter.from)
        .bind(filter.to)
        .bind(filter.client_id)
        .fetch_all(&self.db)
        .await?;

        Ok(sessions)
    }

    pub async fn create(
        &self,
        client_id: i64,
        scheduled_at: DateTime<Utc>,
        duration_min: Option<i32>,
        notes: Option<String>,
    ) -> AppResult<Session> {
        let session: Session = sqlx::query_as(
            r#"
            INSERT INTO sessions (client_id, scheduled_at, duration_min, notes)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(scheduled_at)
        .bind(duration_min.unwrap_or(60))
        .bind(notes)
        .fetch_one(&self.db)
        .await?;

        Ok(session)
    }

    pub async fn get(&self, id: i64) -> AppResult<SessionWithClient> {
        let session: Option<SessionWithClient> = sqlx::query_as(
            r#"
            SELECT s.*, c.first_name, c.last_name
            FROM sessions s JOIN clients c ON s.client_id = c.id
            WHERE s.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        session.ok_or(AppError::SessionNotFound)
    }

    pub async fn update(
        &self,
        id: i64,
        client_id: i64,
        scheduled_at: DateTime<Utc>,
        duration_min: i32,
        status: SessionStatus,
        notes: Option<String>,
    ) -> AppResult<Session> {
        let session: Option<Session> = sqlx::query_as(
            r#"
            UPDATE sessions SET client_id = $1, scheduled_at = $2, duration_min = $3,
                   status = $4, notes = $5, updated_at = NOW()
            WHERE id = $6
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(scheduled_at)
        .bind(duration_min)
        .bind(status)
        .bind(notes)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        session.ok_or(AppError::SessionNotFound)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::SessionNotFound);
        }
        Ok(())
    }

    // Workout logs

    pub async fn logs(&self, session_id: i64) -> AppResult<Vec<WorkoutLog>> {
        let logs: Vec<WorkoutLog> = sqlx::query_as(
            "SELECT * FROM workout_logs WHERE session_id = $1 ORDER BY sort_order",
        )
        .bind(session_id)
        .fetch_all(&self.db)
        .await?;
        Ok(logs)
    }

    pub async fn create_log(
        &self,
        session_id: i64,
        input: WorkoutLogInput,
    ) -> AppResult<WorkoutLog> {
        let log: WorkoutLog = sqlx::query_as(
            r#"
            INSERT INTO workout_logs (session_id, exercise_name, sets, reps, weight, sort_order)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(session_id)
        .bind(&input.exercise_name)
        .bind(input.sets)
        .bind(input.reps)
        .bind(input.weight)
        .bind(input.sort_order.unwrap_or(0))
        .fetch_one(&self.db)
        .await?;

        Ok(log)
    }

    /// Insert a whole workout at once. All rows commit or none do.
    pub async fn create_logs_batch(
        &self,
        session_id: i64,
        inputs: Vec<WorkoutLogInput>,
    ) -> AppResult<Vec<WorkoutLog>> {
        let mut tx = self.db.begin().await?;

        let mut logs = Vec::with_capacity(inputs.len());
        for (i, input) in inputs.into_iter().enumerate() {
            let log: WorkoutLog = sqlx::query_as(
                r#"
                INSERT INTO workout_logs (session_id, exercise_name, sets, reps, weight, sort_order)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING *
                "#,
            )
            .bind(session_id)
            .bind(&input.exercise_name)
            .bind(input.sets)
            .bind(input.reps)
            .bind(input.weight)
            .bind(input.sort_order.unwrap_or(i as i32))
            .fetch_one(&mut *tx)
            .await?;
            logs.push(log);
        }

        tx.commit().await?;
        Ok(logs)
    }

    /// Apply a full set of sort-order updates atomically.
    pub async fn reorder_logs(
        &self,
        session_id: i64,
        order: Vec<(i64, i32)>,
    ) -> AppResult<Vec<WorkoutLog>> {
        let mut tx = self.db.begin().await?;

        for (log_id, sort_order) in order {
            let result = sqlx::query(
                "UPDATE workout_logs SET sort_order = $1 WHERE id = $2 AND session_id = $3",
            )
            .bind(sort_order)
            .bind(log_id)
            .bind(session_id)
            .execute(&mut *tx)
            .await?;

            // An unknown id rolls the whole reorder back.
            if result.rows_affected() == 0 {
                return Err(AppError::WorkoutLogNotFound);
            }
        }

        tx.commit().await?;
        self.logs(session_id).await
    }

    pub async fn update_log(
        &self,
        session_id: i64,
        log_id: i64,
        input: WorkoutLogInput,
    ) -> AppResult<WorkoutLog> {
        let log: Option<WorkoutLog> = sqlx::query_as(
            r#"
            UPDATE workout_logs SET exercise_name = $1, sets = $2, reps = $3,
                   weight = $4, sort_order = $5
            WHERE id = $6 AND session_id = $7
            RETURNING *
            "#,
        )
        .bind(&input.exercise_name)
        .bind(input.sets)
        .bind(input.reps)
        .bind(input.weight)
        .bind(input.sort_order.unwrap_or(0))
        .bind(log_id)
        .bind(session_id)
        .fetch_optional(&self.db)
        .await?;

        log.ok_or(AppError::WorkoutLogNotFound)
    }

    pub async fn delete_log(&self, session_id: i64, log_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_logs WHERE id = $1 AND session_id = $2")
            .bind(log_id)
            .bind(session_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::WorkoutLogNotFound);
        }
        Ok(())
    }
}
