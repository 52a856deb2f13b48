//! Authentication middleware — Bearer token extraction and verification.

use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use uuid::Uuid;

use domainkeeper_core::auth::jwt::verify_token;
use domainkeeper_core::models::auth::TokenClaims;
use domainkeeper_core::records::Scope;

use crate::AppState;
use crate::error::AppError;

/// Verified claims injected into request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub TokenClaims);

impl AuthenticatedUser {
    /// Subject id of the verified identity.
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        Uuid::parse_str(&self.0.sub).map_err(|_| AppError::Unauthorized("Invalid token".into()))
    }

    /// Record visibility for this identity.
    pub fn scope(&self) -> Result<Scope, AppError> {
        Ok(Scope::of(self.user_id()?, self.0.role))
    }
}

/// Axum middleware: extracts `Authorization: Bearer <token>`, verifies it,
/// and injects [`AuthenticatedUser`] into request extensions. Expired tokens
/// get their own message so clients can prompt for re-login.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Unauthorized("No authorization token provided".into()))?;

    let token = bearer_token(header)?;
    let claims = verify_token(token, state.config.jwt_secret.as_bytes()).map_err(AppError::from)?;

    request.extensions_mut().insert(AuthenticatedUser(claims));

    Ok(next.run(request).await)
}

/// Strict scheme check: exactly two space-separated parts, `Bearer` first.
fn bearer_token(header: &str) -> Result<&str, AppError> {
    let mut parts = header.split(' ');
    match (parts.next(), parts.next(), parts.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Ok(token),
        _ => Err(AppError::Unauthorized("Token format is invalid".into())),
    }
}

/// Best-effort claims for public endpoints that honor an optional identity
/// (registration). A missing or invalid token means anonymous, never an
/// error.
pub fn optional_claims(headers: &HeaderMap, secret: &[u8]) -> Option<TokenClaims> {
    let header = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = bearer_token(header).ok()?;
    verify_token(token, secret).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn well_formed_header_yields_the_token() {
        assert_eq!(bearer_token("Bearer abc.def.ghi").unwrap(), "abc.def.ghi");
    }

    #[test]
    fn wrong_scheme_is_rejected() {
        assert!(bearer_token("Basic abc").is_err());
        assert!(bearer_token("bearer abc").is_err());
    }

    #[test]
    fn wrong_part_count_is_rejected() {
        assert!(bearer_token("Bearer").is_err());
        assert!(bearer_token("Bearer a b").is_err());
        assert!(bearer_token("Bearer ").is_err());
    }
}
