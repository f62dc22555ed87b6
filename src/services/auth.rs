use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    config::AuthConfig,
    error::{AppError, AppResult},
    models::{Client, Role},
};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<i64>,
    pub exp: i64,
    pub iat: i64,
}

pub struct AuthService {
    db: PgPool,
    config: AuthConfig,
}

impl AuthService {
    pub fn new(db: PgPool, config: AuthConfig) -> Self {
        Self { db, config }
    }

    /// Trainer login: single shared password from the environment.
    pub async fn trainer_login(&self, password: &str) -> AppResult<String> {
        let expected = self
            .config
            .trainer_password
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("TRAINER_PASSWORD not configured"))?;

        if password != expected {
            return Err(AppError::InvalidPassword);
        }

        self.issue_token(Role::Trainer, None, self.config.trainer_token_ttl)
    }

    /// Client login by access code.
    pub async fn client_login(&self, access_code: &str) -> AppResult<(Client, String)> {
        let client: Option<Client> = sqlx::query_as("SELECT * FROM clients WHERE access_code = $1")
            .bind(access_code)
            .fetch_optional(&self.db)
            .await?;

        let client = client.ok_or(AppError::InvalidAccessCode)?;
        if !client.is_active {
            return Err(AppError::AccountInactive);
        }

        let token = self.issue_token(
            Role::Client,
            Some(client.id),
            self.config.client_token_ttl,
        )?;

        Ok((client, token))
    }

    pub fn validate_token(&self, token: &str) -> AppResult<Claims> {
        let key = DecodingKey::from_secret(self.config.jwt_secret.as_bytes());
        let mut validation = Validation::default();
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &key, &validation)?;
        Ok(token_data.claims)
    }

    fn issue_token(
        &self,
        role: Role,
        client_id: Option<i64>,
        ttl: std::time::Duration,
    ) -> AppResult<String> {
        let now = Utc::now();
        let claims = Claims {
            role,
            client_id,
            exp: (now + Duration::seconds(ttl.as_secs() as i64)).timestamp(),
            iat: now.timestamp(),
        };

        let key = EncodingKey::from_secret(self.config.jwt_secret.as_bytes());
        Ok(encode(&Header::default(), &claims, &key)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    fn test_config() -> AuthConfig {
        AuthConfig {
            jwt_secret: "test-secret".to_string(),
            trainer_password: Some("hunter2".to_string()),
            trainer_token_ttl: std::time::Duration::from_secs(7 * 24 * 60 * 60),
            client_token_ttl: std::time::Duration::from_secs(30 * 24 * 60 * 60),
        }
    }

    fn test_service() -> AuthService {
        // Token issue/validate never touches the pool.
        let db = PgPoolOptions::new()
            .connect_lazy("postgresql://localhost:5432/pt_tracker_test")
            .unwrap();
        AuthService::new(db, test_config())
    }

    #[tokio::test]
    async fn trainer_token_round_trip() {
        let service = test_service();
        let token = service
            .issue_token(Role::Trainer, None, std::time::Duration::from_secs(3600))
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.role, Role::Trainer);
        assert!(claims.client_id.is_none());
    }

    #[tokio::test]
    async fn client_token_carries_client_id() {
        let service = test_service();
        let token = service
            .issue_token(Role::Client, Some(42), std::time::Duration::from_secs(3600))
            .unwrap();

        let claims = service.validate_token(&token).unwrap();
        assert_eq!(claims.role, Role::Client);
        assert_eq!(claims.client_id, Some(42));
    }

    #[tokio::test]
    async fn expired_token_rejected() {
        let service = test_service();
        let now = Utc::now();
        let claims = Claims {
            role: Role::Client,
            client_id: Some(1),
            exp: (now - Duration::seconds(600)).timestamp(),
            iat: (now - Duration::seconds(1200)).timestamp(),
        };
        let key = EncodingKey::from_secret("test-secret".as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        assert!(service.validate_token(&token).is_err());
    }

    #[tokio::test]
    async fn token_with_wrong_secret_rejected() {
        let service = test_service();
        let token = {
            let other = AuthService::new(
                PgPoolOptions::new()
                    .connect_lazy("postgresql://localhost:5432/pt_tracker_test")
                    .unwrap(),
                AuthConfig {
                    jwt_secret: "other-secret".to_string(),
                    ..test_config()
                },
            );
            other
                .issue_token(Role::Trainer, None, std::time::Duration::from_secs(3600))
                .unwrap()
        };

        assert!(service.validate_token(&token).is_err());
    }
}
