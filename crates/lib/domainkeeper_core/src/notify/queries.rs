//! Scan and audit queries for the notification engine.

use sqlx::PgPool;
use uuid::Uuid;

use super::NotifyError;
use crate::models::notify::{ExpiringDomain, ExpiringProvider, NotificationKind};
use crate::uuid::uuidv7;

/// All domains with an expiry date, across all owners. Privileged scan —
/// unlike API access, this is not owner-scoped.
pub async fn domains_with_expiry(pool: &PgPool) -> Result<Vec<ExpiringDomain>, NotifyError> {
    let rows = sqlx::query_as::<_, ExpiringDomain>(
        "SELECT d.id, d.user_id, d.domain_name, p.provider_name, d.expiry_date \
         FROM domains d \
         LEFT JOIN providers p ON p.id = d.provider_id \
         WHERE d.expiry_date IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// All provider accounts with an expiry date, across all owners.
pub async fn providers_with_expiry(pool: &PgPool) -> Result<Vec<ExpiringProvider>, NotifyError> {
    let rows = sqlx::query_as::<_, ExpiringProvider>(
        "SELECT id, user_id, provider_name, username, account_expiry_date \
         FROM providers \
         WHERE account_expiry_date IS NOT NULL",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Resolve the owner's (email, username) for dispatch.
pub async fn owner_contact(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<(String, String)>, NotifyError> {
    let row = sqlx::query_as::<_, (String, String)>(
        "SELECT email, username FROM users WHERE id = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Whether an audit entry already exists for this exact notification.
/// Makes a rerun of the same tick (restart, manual trigger) a no-op.
pub async fn already_notified(
    pool: &PgPool,
    user_id: Uuid,
    kind: NotificationKind,
    resource_id: Uuid,
    days_until_expiry: i64,
) -> Result<bool, NotifyError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM notifications \
         WHERE user_id = $1 AND resource_type = $2 \
           AND resource_id = $3 AND days_until_expiry = $4)",
    )
    .bind(user_id)
    .bind(kind)
    .bind(resource_id)
    .bind(days_until_expiry as i32)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Append one audit entry after a successful send.
pub async fn record_notification(
    pool: &PgPool,
    user_id: Uuid,
    kind: NotificationKind,
    resource_id: Uuid,
    days_until_expiry: i64,
) -> Result<(), NotifyError> {
    sqlx::query(
        "INSERT INTO notifications \
         (id, user_id, resource_type, resource_id, days_until_expiry) \
         VALUES ($1, $2, $3, $4, $5)",
    )
    .bind(uuidv7())
    .bind(user_id)
    .bind(kind)
    .bind(resource_id)
    .bind(days_until_expiry as i32)
    .execute(pool)
    .await?;
    Ok(())
}
