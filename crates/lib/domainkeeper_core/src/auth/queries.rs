//! User-table queries.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::AuthError;
use crate::models::auth::{Role, User, UserProfile};

const USER_COLUMNS: &str = "id, username, email, password_hash, role, \
                            reset_token_hash, reset_token_expiry, created_at";

/// Fetch a full user row by email.
pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
    ))
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch a full user row by id.
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Fetch the public profile of a user.
pub async fn profile_by_id(pool: &PgPool, id: Uuid) -> Result<Option<UserProfile>, AuthError> {
    let row = sqlx::query_as::<_, UserProfile>(
        "SELECT id, username, email, role, created_at FROM users WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Advisory duplicate check for a friendly conflict message; the unique
/// constraints on `users` stay authoritative.
pub async fn username_or_email_taken(
    pool: &PgPool,
    username: &str,
    email: &str,
    exclude: Option<Uuid>,
) -> Result<bool, AuthError> {
    let taken = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users \
         WHERE (username = $1 OR email = $2) \
           AND ($3::uuid IS NULL OR id <> $3))",
    )
    .bind(username)
    .bind(email)
    .bind(exclude)
    .fetch_one(pool)
    .await?;
    Ok(taken)
}

/// Insert a new user, returning the stored profile.
pub async fn create_user(
    pool: &PgPool,
    username: &str,
    email: &str,
    password_hash: &str,
    role: Role,
) -> Result<UserProfile, AuthError> {
    let row = sqlx::query_as::<_, UserProfile>(
        "INSERT INTO users (username, email, password_hash, role) \
         VALUES ($1, $2, $3, $4) \
         RETURNING id, username, email, role, created_at",
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Update username and email, returning the refreshed profile.
pub async fn update_profile(
    pool: &PgPool,
    id: Uuid,
    username: &str,
    email: &str,
) -> Result<Option<UserProfile>, AuthError> {
    let row = sqlx::query_as::<_, UserProfile>(
        "UPDATE users SET username = $2, email = $3 WHERE id = $1 \
         RETURNING id, username, email, role, created_at",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Replace a user's password hash.
pub async fn update_password(
    pool: &PgPool,
    id: Uuid,
    password_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET password_hash = $2 WHERE id = $1")
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// All user profiles, oldest first.
pub async fn list_users(pool: &PgPool) -> Result<Vec<UserProfile>, AuthError> {
    let rows = sqlx::query_as::<_, UserProfile>(
        "SELECT id, username, email, role, created_at FROM users ORDER BY created_at",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Set a user's role. Returns false when the user does not exist.
pub async fn update_role(pool: &PgPool, id: Uuid, role: Role) -> Result<bool, AuthError> {
    let result = sqlx::query("UPDATE users SET role = $2 WHERE id = $1")
        .bind(id)
        .bind(role)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Store a reset-secret digest and its expiry, overwriting any pending reset.
pub async fn store_reset_token(
    pool: &PgPool,
    id: Uuid,
    token_hash: &str,
    expiry: DateTime<Utc>,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET reset_token_hash = $2, reset_token_expiry = $3 WHERE id = $1")
        .bind(id)
        .bind(token_hash)
        .bind(expiry)
        .execute(pool)
        .await?;
    Ok(())
}

/// Consume a live reset secret: one statement writes the new password hash
/// and clears both reset columns, so a matched secret can never be replayed.
/// Returns false when no row matched (unknown or expired secret).
pub async fn consume_reset_token(
    pool: &PgPool,
    token_hash: &str,
    new_password_hash: &str,
) -> Result<bool, AuthError> {
    let result = sqlx::query(
        "UPDATE users SET password_hash = $2, \
                          reset_token_hash = NULL, \
                          reset_token_expiry = NULL \
         WHERE reset_token_hash = $1 AND reset_token_expiry > now()",
    )
    .bind(token_hash)
    .bind(new_password_hash)
    .execute(pool)
    .await?;
    Ok(result.rows_affected() == 1)
}
