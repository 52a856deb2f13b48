//! Statistics summary queries.

use sqlx::PgPool;

use super::{RecordError, Scope};
use crate::models::records::{DomainExpiryStats, ProviderTypeCount, WebsiteStats};

/// Provider counts grouped by type.
pub async fn provider_type_counts(
    pool: &PgPool,
    scope: Scope,
) -> Result<Vec<ProviderTypeCount>, RecordError> {
    let rows = sqlx::query_as::<_, ProviderTypeCount>(
        "SELECT provider_type, COUNT(*) AS count FROM providers \
         WHERE ($1::uuid IS NULL OR user_id = $1) \
         GROUP BY provider_type \
         ORDER BY provider_type",
    )
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Domains expiring within 30 and 90 days, plus the total.
pub async fn domain_expiry_stats(
    pool: &PgPool,
    scope: Scope,
) -> Result<DomainExpiryStats, RecordError> {
    let row = sqlx::query_as::<_, DomainExpiryStats>(
        "SELECT COUNT(*) FILTER (WHERE expiry_date <= CURRENT_DATE + 30) AS expiring_30_days, \
                COUNT(*) FILTER (WHERE expiry_date <= CURRENT_DATE + 90) AS expiring_90_days, \
                COUNT(*) AS total \
         FROM domains \
         WHERE ($1::uuid IS NULL OR user_id = $1)",
    )
    .bind(scope.owner_param())
    .fetch_one(pool)
    .await?;
    Ok(row)
}

/// Website totals split by active flag.
pub async fn website_stats(pool: &PgPool, scope: Scope) -> Result<WebsiteStats, RecordError> {
    let row = sqlx::query_as::<_, WebsiteStats>(
        "SELECT COUNT(*) AS total, \
                COUNT(*) FILTER (WHERE is_active) AS active, \
                COUNT(*) FILTER (WHERE NOT is_active) AS inactive \
         FROM websites \
         WHERE ($1::uuid IS NULL OR user_id = $1)",
    )
    .bind(scope.owner_param())
    .fetch_one(pool)
    .await?;
    Ok(row)
}
