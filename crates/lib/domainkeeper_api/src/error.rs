//! Application error types with HTTP status mapping.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use domainkeeper_core::auth::AuthError;
use domainkeeper_core::records::RecordError;

use crate::models::ErrorResponse;

/// Convenience alias for handler return types.
pub type AppResult<T> = Result<T, AppError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error")]
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(m) => (StatusCode::BAD_REQUEST, m.as_str()),
            AppError::Unauthorized(m) => (StatusCode::UNAUTHORIZED, m.as_str()),
            AppError::Forbidden(m) => (StatusCode::FORBIDDEN, m.as_str()),
            AppError::NotFound(m) => (StatusCode::NOT_FOUND, m.as_str()),
            AppError::Conflict(m) => (StatusCode::CONFLICT, m.as_str()),
            AppError::Internal(m) => {
                // Detail stays in the log; clients get a generic body.
                tracing::error!(error = %m, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };
        let body = Json(ErrorResponse {
            message: message.to_string(),
        });
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(e: sqlx::Error) -> Self {
        match &e {
            sqlx::Error::RowNotFound => AppError::NotFound("Not found".into()),
            // The unique constraints on users are the authoritative guard
            // against duplicate registration; the advisory pre-check only
            // exists for the common case.
            sqlx::Error::Database(db) if db.is_unique_violation() => {
                AppError::Conflict("Username or email already exists".into())
            }
            _ => AppError::Internal(e.to_string()),
        }
    }
}

impl From<AuthError> for AppError {
    fn from(e: AuthError) -> Self {
        match e {
            AuthError::InvalidCredentials => AppError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenExpired => AppError::Unauthorized("Token has expired".into()),
            AuthError::TokenInvalid | AuthError::TokenMalformed => {
                AppError::Unauthorized("Invalid token".into())
            }
            AuthError::InvalidOrExpiredResetToken => {
                AppError::Validation("Password reset token is invalid or has expired".into())
            }
            AuthError::Validation(m) => AppError::Validation(m),
            AuthError::Forbidden => {
                AppError::Forbidden("Forbidden - insufficient permissions".into())
            }
            AuthError::Db(e) => AppError::from(e),
            AuthError::Internal(m) => AppError::Internal(m),
        }
    }
}

impl From<RecordError> for AppError {
    fn from(e: RecordError) -> Self {
        match e {
            RecordError::NotFound(what) => {
                AppError::NotFound(format!("{what} not found or access denied"))
            }
            RecordError::Validation(m) => AppError::Validation(m),
            RecordError::Db(e) => AppError::from(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn statuses_match_the_taxonomy() {
        assert_eq!(status_of(AppError::Validation("v".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(AppError::Unauthorized("u".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(status_of(AppError::Forbidden("f".into())), StatusCode::FORBIDDEN);
        assert_eq!(status_of(AppError::NotFound("n".into())), StatusCode::NOT_FOUND);
        assert_eq!(status_of(AppError::Conflict("c".into())), StatusCode::CONFLICT);
        assert_eq!(status_of(AppError::Internal("i".into())), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn expired_and_invalid_tokens_stay_distinguishable() {
        let expired = AppError::from(AuthError::TokenExpired);
        let invalid = AppError::from(AuthError::TokenInvalid);
        match (&expired, &invalid) {
            (AppError::Unauthorized(a), AppError::Unauthorized(b)) => assert_ne!(a, b),
            _ => panic!("both must map to 401"),
        }
    }

    #[test]
    fn record_not_found_carries_the_entity_name() {
        let err = AppError::from(RecordError::NotFound("Provider"));
        match err {
            AppError::NotFound(m) => assert_eq!(m, "Provider not found or access denied"),
            _ => panic!("must map to 404"),
        }
    }
}
