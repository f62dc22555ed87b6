use chrono::{DateTime, Utc};
use rand::Rng;
use sqlx::PgPool;

use crate::{
    error::{AppError, AppResult},
    models::{Client, Measurement, PhotoCategory, ProgressPhoto},
};

#[derive(Debug, Clone, Default)]
pub struct ClientInput {
    pub first_name: String,
    pub last_name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub goals: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct MeasurementInput {
    pub recorded_at: Option<DateTime<Utc>>,
    pub weight_lbs: Option<f64>,
    pub body_fat_pct: Option<f64>,
    pub chest_in: Option<f64>,
    pub waist_in: Option<f64>,
    pub hips_in: Option<f64>,
    pub arm_in: Option<f64>,
    pub thigh_in: Option<f64>,
}

pub struct ClientService {
    db: PgPool,
}

impl ClientService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    pub async fn list(&self) -> AppResult<Vec<Client>> {
        let clients: Vec<Client> =
            sqlx::query_as("SELECT * FROM clients ORDER BY last_name, first_name")
                .fetch_all(&self.db)
                .await?;
        Ok(clients)
    }

    pub async fn create(&self, input: ClientInput) -> AppResult<Client> {
        let access_code = generate_access_code();
        let client: Client = sqlx::query_as(
            r#"
            INSERT INTO clients (first_name, last_name, email, phone, goals, notes, access_code)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.goals)
        .bind(&input.notes)
        .bind(&access_code)
        .fetch_one(&self.db)
        .await?;

        Ok(client)
    }

    pub async fn get(&self, id: i64) -> AppResult<Client> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;
        client.ok_or(AppError::ClientNotFound)
    }

    pub async fn update(&self, id: i64, input: ClientInput, is_active: bool) -> AppResult<Client> {
        let client: Option<Client> = sqlx::query_as(
            r#"
            UPDATE clients SET first_name = $1, last_name = $2, email = $3, phone = $4,
                   goals = $5, notes = $6, is_active = $7, updated_at = NOW()
            WHERE id = $8
            RETURNING *
            "#,
        )
        .bind(&input.first_name)
        .bind(&input.last_name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.goals)
        .bind(&input.notes)
        .bind(is_active)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;

        client.ok_or(AppError::ClientNotFound)
    }

    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM clients WHERE id = $1")
            .bind(id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::ClientNotFound);
        }
        Ok(())
    }

    pub async fn set_photo(&self, id: i64, photo_url: &str) -> AppResult<Client> {
        let client: Option<Client> = sqlx::query_as(
            "UPDATE clients SET photo_url = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(photo_url)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        client.ok_or(AppError::ClientNotFound)
    }

    pub async fn regenerate_access_code(&self, id: i64) -> AppResult<Client> {
        let access_code = generate_access_code();
        let client: Option<Client> = sqlx::query_as(
            "UPDATE clients SET access_code = $1, updated_at = NOW() WHERE id = $2 RETURNING *",
        )
        .bind(&access_code)
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        client.ok_or(AppError::ClientNotFound)
    }

    // Measurements

    pub async fn measurements(&self, client_id: i64) -> AppResult<Vec<Measurement>> {
        let rows: Vec<Measurement> = sqlx::query_as(
            "SELECT * FROM measurements WHERE client_id = $1 ORDER BY recorded_at DESC",
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    pub async fn create_measurement(
        &self,
        client_id: i64,
        input: MeasurementInput,
    ) -> AppResult<Measurement> {
        let measurement: Measurement = sqlx::query_as(
            r#"
            INSERT INTO measurements
                (client_id, recorded_at, weight_lbs, body_fat_pct, chest_in, waist_in, hips_in, arm_in, thigh_in)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(input.recorded_at.unwrap_or_else(Utc::now))
        .bind(input.weight_lbs)
        .bind(input.body_fat_pct)
        .bind(input.chest_in)
        .bind(input.waist_in)
        .bind(input.hips_in)
        .bind(input.arm_in)
        .bind(input.thigh_in)
        .fetch_one(&self.db)
        .await?;

        Ok(measurement)
    }

    pub async fn update_measurement(
        &self,
        client_id: i64,
        id: i64,
        input: MeasurementInput,
    ) -> AppResult<Measurement> {
        let measurement: Option<Measurement> = sqlx::query_as(
            r#"
            UPDATE measurements SET recorded_at = $1, weight_lbs = $2, body_fat_pct = $3,
                   chest_in = $4, waist_in = $5, hips_in = $6, arm_in = $7, thigh_in = $8
            WHERE id = $9 AND client_id = $10
            RETURNING *
            "#,
        )
        .bind(input.recorded_at.unwrap_or_else(Utc::now))
        .bind(input.weight_lbs)
        .bind(input.body_fat_pct)
        .bind(input.chest_in)
        .bind(input.waist_in)
        .bind(input.hips_in)
        .bind(input.arm_in)
        .bind(input.thigh_in)
        .bind(id)
        .bind(client_id)
        .fetch_optional(&self.db)
        .await?;

        measurement.ok_or(AppError::MeasurementNotFound)
    }

    pub async fn delete_measurement(&self, client_id: i64, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM measurements WHERE id = $1 AND client_id = $2")
            .bind(id)
            .bind(client_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::MeasurementNotFound);
        }
        Ok(())
    }

    // Progress photos

    pub async fn progress_photos(
        &self,
        client_id: i64,
        category: Option<PhotoCategory>,
    ) -> AppResult<Vec<ProgressPhoto>> {
        let rows: Vec<ProgressPhoto> = match category {
            Some(category) => {
                sqlx::query_as(
                    "SELECT * FROM progress_photos
                     WHERE client_id = $1 AND category = $2 ORDER BY taken_at DESC",
                )
                .bind(client_id)
                .bind(category)
                .fetch_all(&self.db)
                .await?
            }
            None => {
                sqlx::query_as(
                    "SELECT * FROM progress_photos WHERE client_id = $1 ORDER BY taken_at DESC",
                )
                .bind(client_id)
                .fetch_all(&self.db)
                .await?
            }
        };
        Ok(rows)
    }

    pub async fn add_progress_photo(
        &self,
        client_id: i64,
        photo_url: &str,
        category: PhotoCategory,
        notes: Option<String>,
        taken_at: Option<DateTime<Utc>>,
    ) -> AppResult<ProgressPhoto> {
        let photo: ProgressPhoto = sqlx::query_as(
            r#"
            INSERT INTO progress_photos (client_id, photo_url, category, notes, taken_at)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(client_id)
        .bind(photo_url)
        .bind(category)
        .bind(notes)
        .bind(taken_at.unwrap_or_else(Utc::now))
        .fetch_one(&self.db)
        .await?;

        Ok(photo)
    }

    pub async fn delete_progress_photo(&self, client_id: i64, photo_id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM progress_photos WHERE id = $1 AND client_id = $2")
            .bind(photo_id)
            .bind(client_id)
            .execute(&self.db)
            .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::PhotoNotFound);
        }
        Ok(())
    }
}

/// 6-char uppercase hex code clients use to log in.
fn generate_access_code() -> String {
    let bytes: [u8; 3] = rand::thread_rng().gen();
    format!("{:02X}{:02X}{:02X}", bytes[0], bytes[1], bytes[2])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_code_is_six_uppercase_hex_chars() {
        for _ in 0..50 {
            let code = generate_access_code();
            assert_eq!(code.len(), 6);
            assert!(code.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        }
    }
}
