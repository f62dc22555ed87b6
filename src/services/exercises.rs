use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Exercise, WorkoutTemplate},
};

#[derive(Debug, Clone, Default)]
pub struct ExerciseInput {
    pub exercise_name: String,
    pub description: Option<String>,
    pub video_url: Option<String>,
    pub thumbnail_url: Option<String>,
}

pub struct ExerciseService {
    db: PgPool,
}

impl ExerciseService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Exercise>> {
        let exercises: Vec<Exercise> =
            sqlx::query_as("SELECT * FROM exercises ORDER BY exercise_name")
                .fetch_all(&self.db)
                .await?;
        Ok(exercises)
    }

    /// Autocomplete lookup by name fragment.
    pub async fn search(&self, query: &str) -> AppResult<Vec<Exercise>> {
        let pattern = format!("%{}%", query);
        let exercises: Vec<Exercise> = sqlx::query_as(
            "SELECT * FROM exercises WHERE exercise_name ILIKE $1 ORDER BY exercise_name LIMIT 10",
        )
        .bind(pattern)
        .fetch_all(&self.db)
        .await?;
        Ok(exercises)
    }

    pub async fn get(&self, id: i64) -> AppResult<Exercise> {
        let exercise: Option<Exercise> = sqlx::query_as("SELECT * FROM exercises WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        exercise.ok_or(AppError::ExerciseNotFound)
    }

    pub async fn create(&self, input: ExerciseInput) -> AppResult<Exercise> {
        let exercise: Exercise = sqlx::query_as(
            r#"
            INSERT INTO exercises (exercise_name, description, video_url, thumbnail_url)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&input.exercise_name)
        .bind(&input.description)
        .bind(&input.video_url)
        .bind(&input.thumbnail_url)
        .fetch_one(&self.db)
        .await?;
        Ok(exercise)
    }

    pub async fn update(&self, id: i64, input: ExerciseInput) -> AppResult<Exercise> {
        let exercise: Option<Exercise> = sqlx::query_as(
            r#"
            UPDATE exercises SET exercise_name = $1, description = $2, video_url = $3,
                   thumbnail_url = $4, updated_at = NOW()
            WHERE id = $5
            RETURNING *
            "#,
        )
        .bind(&input.exercise_name)
        .bind(&input.description)
        .bind(&input.video_url)
        .bind(&input.thumbnail_url)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        exercise.ok_or(AppError::ExerciseNotFound)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM exercises WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ExerciseNotFound);
        }
        Ok(())
    }

    pub async fn set_video_path(&self, id: i64, video_path: &str) -> AppResult<Exercise> {
        let exercise: Option<Exercise> = sqlx::query_as(
            "UPDATE exercises SET video_path = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(video_path)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        exercise.ok_or(AppError::ExerciseNotFound)
    }

    // Workout templates

    pub async fn templates(&self) -> AppResult<Vec<WorkoutTemplate>> {
        let templates: Vec<WorkoutTemplate> =
            sqlx::query_as("SELECT * FROM workout_templates ORDER BY name")
                .fetch_all(&self.db)
                .await?;
        Ok(templates)
    }

    pub async fn get_template(&self, id: i64) -> AppResult<WorkoutTemplate> {
        let template: Option<WorkoutTemplate> =
            sqlx::query_as("SELECT * FROM workout_templates WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.db)
                .await?;
        template.ok_or(AppError::TemplateNotFound)
    }

    pub async fn create_template(
        &self,
        name: &str,
        exercises: serde_json::Value,
    ) -> AppResult<WorkoutTemplate> {
        let template: WorkoutTemplate = sqlx::query_as(
            "INSERT INTO workout_templates (name, exercises) VALUES ($1, $2) RETURNING *",
        )
        .bind(name)
        .bind(exercises)
        .fetch_one(&self.db)
        .await?;
        Ok(template)
    }

    pub async fn update_template(
        &self,
        id: i64,
        name: &str,
        exercises: serde_json::Value,
    ) -> AppResult<WorkoutTemplate> {
        let template: Option<WorkoutTemplate> = sqlx::query_as(
            r#"
            UPDATE workout_templates SET name = $1, exercises = $2, updated_at = NOW()
            WHERE id = $3
            RETURNING *
            "#,
        )
        .bind(name)
        .bind(exercises)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        template.ok_or(AppError::TemplateNotFound)
    }

    pub async fn delete_template(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM workout_templates WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::TemplateNotFound);
        }
        Ok(())
    }
}
