//! Identity token generation and verification.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use tracing::info;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{Role, TokenClaims};

/// Default identity token lifetime: 24 hours.
pub const DEFAULT_TOKEN_TTL_HOURS: i64 = 24;

/// Generate a signed identity token (HS256) valid for `ttl` from now.
pub fn generate_token(
    user_id: Uuid,
    username: &str,
    role: Role,
    ttl: Duration,
    secret: &[u8],
) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        role,
        iat: now.timestamp(),
        exp: (now + ttl).timestamp(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::Internal(format!("jwt encode: {e}")))
}

/// Verify an identity token, returning the claims on success.
///
/// The three failure modes stay distinguishable: an elapsed token is
/// `TokenExpired` (callers say "log in again"), a tampered one is
/// `TokenInvalid`, and anything structurally broken is `TokenMalformed`.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| match e.kind() {
            ErrorKind::ExpiredSignature => AuthError::TokenExpired,
            ErrorKind::InvalidSignature => AuthError::TokenInvalid,
            _ => AuthError::TokenMalformed,
        })
}

/// Resolve the signing secret: env var `JWT_SECRET` → persisted file.
///
/// Called once at startup by the config layer; rotating the secret
/// invalidates every outstanding token.
pub fn resolve_jwt_secret() -> String {
    if let Ok(secret) = std::env::var("JWT_SECRET")
        && !secret.is_empty()
    {
        return secret;
    }
    // Generate and persist
    let secret_path = jwt_secret_path();
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new JWT secret");
    secret
}

/// Path to the persisted signing secret file.
fn jwt_secret_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("domainkeeper")
        .join("jwt-secret")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-signing-secret";

    fn subject() -> Uuid {
        Uuid::parse_str("8a6f2c1e-4b3d-4f5a-9c7e-210987654321").unwrap()
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let token =
            generate_token(subject(), "alice", Role::Admin, Duration::hours(24), SECRET).unwrap();
        let claims = verify_token(&token, SECRET).unwrap();
        assert_eq!(claims.sub, subject().to_string());
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn elapsed_ttl_is_expired_not_invalid() {
        // Two minutes past expiry clears the default leeway.
        let token =
            generate_token(subject(), "alice", Role::User, Duration::minutes(-2), SECRET).unwrap();
        let err = verify_token(&token, SECRET).unwrap_err();
        assert!(matches!(err, AuthError::TokenExpired));
    }

    #[test]
    fn wrong_secret_is_invalid_signature() {
        let token =
            generate_token(subject(), "alice", Role::User, Duration::hours(1), SECRET).unwrap();
        let err = verify_token(&token, b"another-secret").unwrap_err();
        assert!(matches!(err, AuthError::TokenInvalid));
    }

    #[test]
    fn garbage_is_malformed() {
        let err = verify_token("not-a-token", SECRET).unwrap_err();
        assert!(matches!(err, AuthError::TokenMalformed));
    }
}
