use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    // Auth errors
    #[error("Invalid password")]
    InvalidPassword,
    #[error("Invalid access code")]
    InvalidAccessCode,
    #[error("Account is inactive")]
    AccountInactive,
    #[error("Authentication required")]
    Unauthorized,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Trainer access required")]
    TrainerRequired,
    #[error("Access denied")]
    AccessDenied,

    // Entity errors
    #[error("Client not found")]
    ClientNotFound,
    #[error("Session not found")]
    SessionNotFound,
    #[error("Measurement not found")]
    MeasurementNotFound,
    #[error("Exercise not found")]
    ExerciseNotFound,
    #[error("Workout log not found")]
    WorkoutLogNotFound,
    #[error("Template not found")]
    TemplateNotFound,
    #[error("Photo not found")]
    PhotoNotFound,

    // Validation errors
    #[error("Bad request: {0}")]
    BadRequest(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    // JWT errors
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    // Internal errors
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            // 400 Bad Request
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),

            // 401 Unauthorized
            AppError::InvalidPassword => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidAccessCode => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::AccountInactive => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, self.to_string()),
            AppError::Jwt(_) => (
                StatusCode::UNAUTHORIZED,
                "Invalid or expired token".to_string(),
            ),

            // 403 Forbidden
            AppError::TrainerRequired => (StatusCode::FORBIDDEN, self.to_string()),
            AppError::AccessDenied => (StatusCode::FORBIDDEN, self.to_string()),

            // 404 Not Found
            AppError::ClientNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::SessionNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::MeasurementNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::ExerciseNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::WorkoutLogNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::TemplateNotFound => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::PhotoNotFound => (StatusCode::NOT_FOUND, self.to_string()),

            // 500 Internal Server Error
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_errors_map_to_401() {
        for err in [
            AppError::InvalidPassword,
            AppError::InvalidAccessCode,
            AppError::Unauthorized,
            AppError::InvalidToken,
        ] {
            assert_eq!(err.into_response().status(), StatusCode::UNAUTHORIZED);
        }
    }

    #[test]
    fn access_errors_map_to_403() {
        assert_eq!(
            AppError::TrainerRequired.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AppError::AccessDenied.into_response().status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn missing_entities_map_to_404() {
        assert_eq!(
            AppError::SessionNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::ClientNotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
