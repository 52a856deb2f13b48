//! Authentication and authorization logic.
//!
//! Password hashing, identity-token issue/verify, the password-reset
//! lifecycle and the user-table queries shared with `domainkeeper_api`.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod reset;

use thiserror::Error;

use crate::models::auth::{Role, TokenClaims};

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token has expired")]
    TokenExpired,

    #[error("Invalid token")]
    TokenInvalid,

    #[error("Token format is invalid")]
    TokenMalformed,

    #[error("Password reset token is invalid or has expired")]
    InvalidOrExpiredResetToken,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Insufficient permissions")]
    Forbidden,

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Pure role gate. An empty `allowed` set admits any authenticated identity.
pub fn authorize(claims: &TokenClaims, allowed: &[Role]) -> Result<(), AuthError> {
    if allowed.is_empty() || allowed.contains(&claims.role) {
        Ok(())
    } else {
        Err(AuthError::Forbidden)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(role: Role) -> TokenClaims {
        TokenClaims {
            sub: "00000000-0000-0000-0000-000000000001".into(),
            username: "alice".into(),
            role,
            iat: 0,
            exp: i64::MAX,
        }
    }

    #[test]
    fn empty_role_set_admits_any_identity() {
        assert!(authorize(&claims(Role::User), &[]).is_ok());
        assert!(authorize(&claims(Role::Admin), &[]).is_ok());
    }

    #[test]
    fn matching_role_is_allowed() {
        assert!(authorize(&claims(Role::Admin), &[Role::Admin]).is_ok());
        assert!(authorize(&claims(Role::User), &[Role::User, Role::Admin]).is_ok());
    }

    #[test]
    fn mismatching_role_is_denied() {
        let err = authorize(&claims(Role::User), &[Role::Admin]).unwrap_err();
        assert!(matches!(err, AuthError::Forbidden));
    }
}
