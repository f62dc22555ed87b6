use std::env;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub auth: AuthConfig,
    pub storage: StorageConfig,
    pub push: PushConfig,
    pub scheduler: SchedulerConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: String,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub jwt_secret: String,
    pub trainer_password: Option<String>,
    pub trainer_token_ttl: Duration,
    pub client_token_ttl: Duration,
}

/// S3-compatible storage when a bucket endpoint is configured, local
/// uploads directory otherwise.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub bucket_endpoint: Option<String>,
    pub bucket_name: String,
    pub bucket_region: String,
    pub access_key: String,
    pub secret_key: String,
    pub public_url: Option<String>,
    pub uploads_dir: String,
}

#[derive(Debug, Clone)]
pub struct PushConfig {
    pub endpoint: String,
}

#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    pub tick_interval: Duration,
}

impl Config {
    pub fn load() -> Self {
        dotenvy::dotenv().ok();

        Config {
            server: ServerConfig {
                host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env::var("PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(3000),
                environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL")
                    .unwrap_or_else(|_| "postgresql://localhost:5432/pt_tracker".to_string()),
                max_connections: env::var("DB_MAX_CONNS")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(25),
            },
            auth: AuthConfig {
                jwt_secret: env::var("JWT_SECRET")
                    .unwrap_or_else(|_| "dev-secret-change-me".to_string()),
                trainer_password: env::var("TRAINER_PASSWORD").ok(),
                trainer_token_ttl: Duration::from_secs(
                    env::var("TRAINER_TOKEN_TTL")
                        .ok()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(7 * 24 * 60 * 60), // 7 days
                ),
                client_token_ttl: Duration::from_secs(
                    env::var("CLIENT_TOKEN_TTL")
                        .ok()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(30 * 24 * 60 * 60), // 30 days
                ),
            },
            storage: StorageConfig {
                bucket_endpoint: env::var("BUCKET_ENDPOINT").ok(),
                bucket_name: env::var("BUCKET_NAME").unwrap_or_default(),
                bucket_region: env::var("BUCKET_REGION").unwrap_or_else(|_| "us-east-1".to_string()),
                access_key: env::var("BUCKET_ACCESS_KEY_ID").unwrap_or_default(),
                secret_key: env::var("BUCKET_SECRET_ACCESS_KEY").unwrap_or_default(),
                public_url: env::var("BUCKET_PUBLIC_URL").ok(),
                uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            },
            push: PushConfig {
                endpoint: env::var("PUSH_ENDPOINT")
                    .unwrap_or_else(|_| "https://exp.host/--/api/v2/push/send".to_string()),
            },
            scheduler: SchedulerConfig {
                tick_interval: Duration::from_secs(
                    env::var("REMINDER_TICK_SECS")
                        .ok()
                        .and_then(|p| p.parse().ok())
                        .unwrap_or(5 * 60), // 5 minutes
                ),
            },
        }
    }
}
