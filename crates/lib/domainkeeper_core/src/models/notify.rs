//! Notification audit models and expiry-scan rows.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Kind of resource a notification refers to, stored as the PG enum
/// `notification_kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Domain,
    Provider,
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationKind::Domain => f.write_str("domain"),
            NotificationKind::Provider => f.write_str("provider"),
        }
    }
}

/// Append-only audit entry written after each dispatched notification.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct NotificationRecord {
    pub id: Uuid,
    pub user_id: Uuid,
    pub resource_type: NotificationKind,
    pub resource_id: Uuid,
    pub days_until_expiry: i32,
    pub sent_at: DateTime<Utc>,
}

/// Domain row as seen by the owner-agnostic expiry scan.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExpiringDomain {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_name: String,
    pub provider_name: Option<String>,
    pub expiry_date: NaiveDate,
}

/// Provider-account row as seen by the owner-agnostic expiry scan.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExpiringProvider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_name: String,
    pub username: Option<String>,
    pub account_expiry_date: NaiveDate,
}
