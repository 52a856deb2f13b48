//! Record-keeping domain models: providers, domains and websites.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Hosting/registrar provider account.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Provider {
    pub id: Uuid,
    pub user_id: Uuid,
    pub provider_name: String,
    pub provider_type: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub account_expiry_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Registered domain with its provider name joined in and its ordered
/// nameservers attached after the row fetch.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Domain {
    pub id: Uuid,
    pub user_id: Uuid,
    pub domain_name: String,
    pub provider_id: Option<Uuid>,
    pub provider_name: Option<String>,
    pub registration_date: Option<NaiveDate>,
    pub expiry_date: NaiveDate,
    pub auto_renew: bool,
    pub created_at: DateTime<Utc>,
    #[sqlx(skip)]
    pub nameservers: Vec<Nameserver>,
}

/// One nameserver entry; `position` keeps the user-supplied order.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Nameserver {
    pub id: Uuid,
    pub domain_id: Uuid,
    pub value: String,
    pub position: i32,
}

/// Hosted website, with joined domain and provider names.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Website {
    pub id: Uuid,
    pub user_id: Uuid,
    pub website_name: String,
    pub domain_id: Option<Uuid>,
    pub domain_name: Option<String>,
    pub hosting_provider_id: Uuid,
    pub provider_name: Option<String>,
    pub hosting_package: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating or replacing a provider record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProviderInput {
    pub provider_name: String,
    pub provider_type: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub account_expiry_date: Option<NaiveDate>,
    pub website: Option<String>,
    pub notes: Option<String>,
}

/// Fields accepted when creating or replacing a domain record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DomainInput {
    pub domain_name: String,
    pub provider_id: Option<Uuid>,
    pub registration_date: Option<NaiveDate>,
    pub expiry_date: Option<NaiveDate>,
    pub auto_renew: bool,
    pub nameservers: Vec<String>,
}

/// Fields accepted when creating or replacing a website record.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct WebsiteInput {
    pub website_name: String,
    pub domain_id: Option<Uuid>,
    pub hosting_provider_id: Option<Uuid>,
    pub hosting_package: Option<String>,
    pub ip_address: Option<String>,
    pub is_active: Option<bool>,
}

/// Provider count per provider type.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct ProviderTypeCount {
    pub provider_type: String,
    pub count: i64,
}

/// Domain expiry buckets for the statistics summary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct DomainExpiryStats {
    pub expiring_30_days: i64,
    pub expiring_90_days: i64,
    pub total: i64,
}

/// Website totals for the statistics summary.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct WebsiteStats {
    pub total: i64,
    pub active: i64,
    pub inactive: i64,
}
