//! Password-reset lifecycle: single-use, time-boxed, hashed secrets.
//!
//! The raw secret exists only in the emailed link. The database holds its
//! SHA-256 digest plus an expiry on the user row, and consuming a secret
//! clears both columns in the same statement that writes the new password.

use chrono::Utc;
use rand::RngCore;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use tracing::info;

use super::{AuthError, password, queries};
use crate::mailer::Mailer;

/// Reset secrets live for one hour from issuance.
pub const RESET_TOKEN_TTL_SECS: i64 = 60 * 60;

/// Random bytes per raw secret; hex-encoded on the wire.
const RESET_SECRET_BYTES: usize = 32;

/// Generate a raw reset secret: 32 random bytes, hex-encoded.
pub(crate) fn generate_secret() -> String {
    let mut bytes = [0u8; RESET_SECRET_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// SHA-256 digest of a raw secret, hex-encoded for storage. A fast hash is
/// enough here: the secret itself is high-entropy and single-use.
pub(crate) fn hash_secret(raw: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(raw.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Issue a reset secret for the account behind `email` and mail the link.
///
/// An unknown email is not an error: the caller returns the same generic
/// success either way, so the response never reveals whether the account
/// exists. A repeated request overwrites the pending secret (last writer
/// wins).
pub async fn request_reset(
    pool: &PgPool,
    mailer: &dyn Mailer,
    base_url: &str,
    email: &str,
) -> Result<(), AuthError> {
    let Some(user) = queries::find_by_email(pool, email).await? else {
        return Ok(());
    };

    let raw = generate_secret();
    let expiry = Utc::now() + chrono::Duration::seconds(RESET_TOKEN_TTL_SECS);
    queries::store_reset_token(pool, user.id, &hash_secret(&raw), expiry).await?;

    let reset_url = format!("{}/reset-password/{raw}", base_url.trim_end_matches('/'));
    let body = format!(
        "You requested a password reset for your Domainkeeper account.\n\n\
         Open the link below to choose a new password. The link is valid for 1 hour.\n\n\
         {reset_url}\n\n\
         If you did not request a password reset, you can ignore this email.\n"
    );
    mailer
        .send(&user.email, "Password Reset Request", &body)
        .await
        .map_err(|e| AuthError::Internal(format!("reset email: {e}")))?;

    info!(user_id = %user.id, "password reset issued");
    Ok(())
}

/// Consume a reset secret, replacing the account password.
///
/// The digest lookup and the password write are one statement; a secret that
/// matched once can never match again.
pub async fn consume_reset(
    pool: &PgPool,
    raw_secret: &str,
    new_password: &str,
    bcrypt_cost: u32,
) -> Result<(), AuthError> {
    let new_hash = password::hash_password(new_password, bcrypt_cost)?;
    let consumed = queries::consume_reset_token(pool, &hash_secret(raw_secret), &new_hash).await?;
    if !consumed {
        return Err(AuthError::InvalidOrExpiredResetToken);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_is_64_hex_chars() {
        let s = generate_secret();
        assert_eq!(s.len(), 64);
        assert!(s.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn secrets_are_unique() {
        assert_ne!(generate_secret(), generate_secret());
    }

    #[test]
    fn digest_is_deterministic_and_distinct() {
        let a = hash_secret("secret-a");
        assert_eq!(a, hash_secret("secret-a"));
        assert_ne!(a, hash_secret("secret-b"));
        assert_eq!(a.len(), 64);
    }
}
