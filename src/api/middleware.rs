use axum::{
    extract::{Request, State},
    http::header::AUTHORIZATION,
    middleware::Next,
    response::Response,
};

use crate::{
    error::{AppError, AppResult},
    models::Role,
    services::auth::{AuthService, Claims},
    AppState,
};

/// Authentication middleware: validates the bearer token and stashes the
/// claims in request extensions.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(AppError::Unauthorized)?;

    let auth_service = AuthService::new(state.db.clone(), state.config.auth.clone());
    let claims = auth_service.validate_token(token)?;

    request.extensions_mut().insert(claims);

    Ok(next.run(request).await)
}

/// Trainer-only guard.
pub fn ensure_trainer(claims: &Claims) -> AppResult<()> {
    if claims.role != Role::Trainer {
        return Err(AppError::TrainerRequired);
    }
    Ok(())
}

/// Trainer may touch any client; a client only their own.
pub fn ensure_client_access(claims: &Claims, client_id: i64) -> AppResult<()> {
    match claims.role {
        Role::Trainer => Ok(()),
        Role::Client if claims.client_id == Some(client_id) => Ok(()),
        Role::Client => Err(AppError::AccessDenied),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role, client_id: Option<i64>) -> Claims {
        Claims {
            role,
            client_id,
            exp: 0,
            iat: 0,
        }
    }

    #[test]
    fn trainer_guard_rejects_clients() {
        assert!(ensure_trainer(&claims(Role::Trainer, None)).is_ok());
        assert!(ensure_trainer(&claims(Role::Client, Some(1))).is_err());
    }

    #[test]
    fn client_cannot_reach_another_clients_data() {
        let c = claims(Role::Client, Some(1));
        assert!(ensure_client_access(&c, 1).is_ok());
        assert!(matches!(
            ensure_client_access(&c, 2),
            Err(AppError::AccessDenied)
        ));
    }

    #[test]
    fn trainer_can_reach_any_client() {
        let t = claims(Role::Trainer, None);
        assert!(ensure_client_access(&t, 7).is_ok());
    }
}
