//! Scoped CRUD queries for providers, domains and websites.

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{RecordError, Scope};
use crate::models::records::{
    Domain, DomainInput, Nameserver, Provider, ProviderInput, Website, WebsiteInput,
};
use crate::uuid::uuidv7;

const PROVIDER_COLUMNS: &str = "id, user_id, provider_name, provider_type, username, password, \
                                account_expiry_date, website, notes, created_at";

const DOMAIN_COLUMNS: &str = "d.id, d.user_id, d.domain_name, d.provider_id, p.provider_name, \
                              d.registration_date, d.expiry_date, d.auto_renew, d.created_at";

const WEBSITE_COLUMNS: &str = "w.id, w.user_id, w.website_name, w.domain_id, d.domain_name, \
                               w.hosting_provider_id, p.provider_name, w.hosting_package, \
                               w.ip_address, w.is_active, w.created_at";

// ---------------------------------------------------------------------------
// Providers
// ---------------------------------------------------------------------------

pub async fn list_providers(pool: &PgPool, scope: Scope) -> Result<Vec<Provider>, RecordError> {
    let rows = sqlx::query_as::<_, Provider>(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers \
         WHERE ($1::uuid IS NULL OR user_id = $1) \
         ORDER BY provider_name"
    ))
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_provider(
    pool: &PgPool,
    scope: Scope,
    id: Uuid,
) -> Result<Provider, RecordError> {
    sqlx::query_as::<_, Provider>(&format!(
        "SELECT {PROVIDER_COLUMNS} FROM providers \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)"
    ))
    .bind(id)
    .bind(scope.owner_param())
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::NotFound("Provider"))
}

pub async fn insert_provider(
    pool: &PgPool,
    owner: Uuid,
    input: &ProviderInput,
) -> Result<Uuid, RecordError> {
    if input.provider_name.trim().is_empty() || input.provider_type.trim().is_empty() {
        return Err(RecordError::Validation(
            "Provider name and type are required".into(),
        ));
    }

    let id = uuidv7();
    sqlx::query(
        "INSERT INTO providers \
         (id, user_id, provider_name, provider_type, username, password, \
          account_expiry_date, website, notes) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(id)
    .bind(owner)
    .bind(input.provider_name.trim())
    .bind(input.provider_type.trim())
    .bind(&input.username)
    .bind(&input.password)
    .bind(input.account_expiry_date)
    .bind(&input.website)
    .bind(&input.notes)
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn update_provider(
    pool: &PgPool,
    scope: Scope,
    id: Uuid,
    input: &ProviderInput,
) -> Result<(), RecordError> {
    if input.provider_name.trim().is_empty() || input.provider_type.trim().is_empty() {
        return Err(RecordError::Validation(
            "Provider name and type are required".into(),
        ));
    }

    let result = sqlx::query(
        "UPDATE providers SET provider_name = $3, provider_type = $4, username = $5, \
                              password = $6, account_expiry_date = $7, website = $8, notes = $9 \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(id)
    .bind(scope.owner_param())
    .bind(input.provider_name.trim())
    .bind(input.provider_type.trim())
    .bind(&input.username)
    .bind(&input.password)
    .bind(input.account_expiry_date)
    .bind(&input.website)
    .bind(&input.notes)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Provider"));
    }
    Ok(())
}

pub async fn delete_provider(pool: &PgPool, scope: Scope, id: Uuid) -> Result<(), RecordError> {
    let result = sqlx::query(
        "DELETE FROM providers WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(id)
    .bind(scope.owner_param())
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Provider"));
    }
    Ok(())
}

/// EXISTS check used before attaching records to a provider.
async fn provider_in_scope<'e, E>(executor: E, scope: Scope, id: Uuid) -> Result<bool, RecordError>
where
    E: sqlx::Executor<'e, Database = Postgres>,
{
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM providers \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2))",
    )
    .bind(id)
    .bind(scope.owner_param())
    .fetch_one(executor)
    .await?;
    Ok(exists)
}

// ---------------------------------------------------------------------------
// Domains
// ---------------------------------------------------------------------------

pub async fn list_domains(pool: &PgPool, scope: Scope) -> Result<Vec<Domain>, RecordError> {
    let rows = sqlx::query_as::<_, Domain>(&format!(
        "SELECT {DOMAIN_COLUMNS} FROM domains d \
         LEFT JOIN providers p ON p.id = d.provider_id \
         WHERE ($1::uuid IS NULL OR d.user_id = $1) \
         ORDER BY d.expiry_date"
    ))
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    attach_nameservers(pool, rows).await
}

pub async fn get_domain(pool: &PgPool, scope: Scope, id: Uuid) -> Result<Domain, RecordError> {
    let row = sqlx::query_as::<_, Domain>(&format!(
        "SELECT {DOMAIN_COLUMNS} FROM domains d \
         LEFT JOIN providers p ON p.id = d.provider_id \
         WHERE d.id = $1 AND ($2::uuid IS NULL OR d.user_id = $2)"
    ))
    .bind(id)
    .bind(scope.owner_param())
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::NotFound("Domain"))?;

    let mut domains = attach_nameservers(pool, vec![row]).await?;
    Ok(domains.remove(0))
}

/// Domains attached to a provider. The provider itself must be in scope.
pub async fn domains_for_provider(
    pool: &PgPool,
    scope: Scope,
    provider_id: Uuid,
) -> Result<Vec<Domain>, RecordError> {
    if !provider_in_scope(pool, scope, provider_id).await? {
        return Err(RecordError::NotFound("Provider"));
    }

    let rows = sqlx::query_as::<_, Domain>(&format!(
        "SELECT {DOMAIN_COLUMNS} FROM domains d \
         LEFT JOIN providers p ON p.id = d.provider_id \
         WHERE d.provider_id = $1 AND ($2::uuid IS NULL OR d.user_id = $2) \
         ORDER BY d.expiry_date"
    ))
    .bind(provider_id)
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    attach_nameservers(pool, rows).await
}

/// Insert a domain and its nameservers in one transaction.
pub async fn insert_domain(
    pool: &PgPool,
    owner: Uuid,
    scope: Scope,
    input: &DomainInput,
) -> Result<Uuid, RecordError> {
    let expiry = require_domain_fields(input)?;

    let mut tx = pool.begin().await?;

    if let Some(pid) = input.provider_id {
        if !provider_in_scope(&mut *tx, scope, pid).await? {
            return Err(RecordError::NotFound("Provider"));
        }
    }

    let id = uuidv7();
    sqlx::query(
        "INSERT INTO domains \
         (id, user_id, domain_name, provider_id, registration_date, expiry_date, auto_renew) \
         VALUES ($1, $2, $3, $4, $5, $6, $7)",
    )
    .bind(id)
    .bind(owner)
    .bind(input.domain_name.trim())
    .bind(input.provider_id)
    .bind(input.registration_date)
    .bind(expiry)
    .bind(input.auto_renew)
    .execute(&mut *tx)
    .await?;

    insert_nameservers(&mut tx, id, &input.nameservers).await?;

    tx.commit().await?;
    Ok(id)
}

/// Replace a domain row and its nameservers in one transaction.
pub async fn update_domain(
    pool: &PgPool,
    scope: Scope,
    id: Uuid,
    input: &DomainInput,
) -> Result<(), RecordError> {
    let expiry = require_domain_fields(input)?;

    let mut tx = pool.begin().await?;

    if let Some(pid) = input.provider_id {
        if !provider_in_scope(&mut *tx, scope, pid).await? {
            return Err(RecordError::NotFound("Provider"));
        }
    }

    let result = sqlx::query(
        "UPDATE domains SET domain_name = $3, provider_id = $4, registration_date = $5, \
                            expiry_date = $6, auto_renew = $7 \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(id)
    .bind(scope.owner_param())
    .bind(input.domain_name.trim())
    .bind(input.provider_id)
    .bind(input.registration_date)
    .bind(expiry)
    .bind(input.auto_renew)
    .execute(&mut *tx)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Domain"));
    }

    sqlx::query("DELETE FROM nameservers WHERE domain_id = $1")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    insert_nameservers(&mut tx, id, &input.nameservers).await?;

    tx.commit().await?;
    Ok(())
}

pub async fn delete_domain(pool: &PgPool, scope: Scope, id: Uuid) -> Result<(), RecordError> {
    // Nameservers go with the domain via ON DELETE CASCADE.
    let result =
        sqlx::query("DELETE FROM domains WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)")
            .bind(id)
            .bind(scope.owner_param())
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Domain"));
    }
    Ok(())
}

fn require_domain_fields(input: &DomainInput) -> Result<chrono::NaiveDate, RecordError> {
    match input.expiry_date {
        Some(expiry) if !input.domain_name.trim().is_empty() => Ok(expiry),
        _ => Err(RecordError::Validation(
            "Domain name and expiry date are required".into(),
        )),
    }
}

async fn insert_nameservers(
    tx: &mut Transaction<'_, Postgres>,
    domain_id: Uuid,
    values: &[String],
) -> Result<(), RecordError> {
    for (i, value) in values
        .iter()
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .enumerate()
    {
        sqlx::query(
            "INSERT INTO nameservers (id, domain_id, value, position) VALUES ($1, $2, $3, $4)",
        )
        .bind(uuidv7())
        .bind(domain_id)
        .bind(value)
        .bind((i + 1) as i32)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn attach_nameservers(
    pool: &PgPool,
    mut domains: Vec<Domain>,
) -> Result<Vec<Domain>, RecordError> {
    for domain in &mut domains {
        domain.nameservers = sqlx::query_as::<_, Nameserver>(
            "SELECT id, domain_id, value, position FROM nameservers \
             WHERE domain_id = $1 ORDER BY position",
        )
        .bind(domain.id)
        .fetch_all(pool)
        .await?;
    }
    Ok(domains)
}

async fn domain_in_scope(pool: &PgPool, scope: Scope, id: Uuid) -> Result<bool, RecordError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM domains \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2))",
    )
    .bind(id)
    .bind(scope.owner_param())
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

// ---------------------------------------------------------------------------
// Websites
// ---------------------------------------------------------------------------

pub async fn list_websites(pool: &PgPool, scope: Scope) -> Result<Vec<Website>, RecordError> {
    let rows = sqlx::query_as::<_, Website>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites w \
         LEFT JOIN domains d ON d.id = w.domain_id \
         LEFT JOIN providers p ON p.id = w.hosting_provider_id \
         WHERE ($1::uuid IS NULL OR w.user_id = $1) \
         ORDER BY w.website_name"
    ))
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn get_website(pool: &PgPool, scope: Scope, id: Uuid) -> Result<Website, RecordError> {
    sqlx::query_as::<_, Website>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites w \
         LEFT JOIN domains d ON d.id = w.domain_id \
         LEFT JOIN providers p ON p.id = w.hosting_provider_id \
         WHERE w.id = $1 AND ($2::uuid IS NULL OR w.user_id = $2)"
    ))
    .bind(id)
    .bind(scope.owner_param())
    .fetch_optional(pool)
    .await?
    .ok_or(RecordError::NotFound("Website"))
}

/// Websites hosted on a provider. The provider itself must be in scope.
pub async fn websites_for_provider(
    pool: &PgPool,
    scope: Scope,
    provider_id: Uuid,
) -> Result<Vec<Website>, RecordError> {
    if !provider_in_scope(pool, scope, provider_id).await? {
        return Err(RecordError::NotFound("Provider"));
    }

    let rows = sqlx::query_as::<_, Website>(&format!(
        "SELECT {WEBSITE_COLUMNS} FROM websites w \
         LEFT JOIN domains d ON d.id = w.domain_id \
         LEFT JOIN providers p ON p.id = w.hosting_provider_id \
         WHERE w.hosting_provider_id = $1 AND ($2::uuid IS NULL OR w.user_id = $2) \
         ORDER BY w.website_name"
    ))
    .bind(provider_id)
    .bind(scope.owner_param())
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn insert_website(
    pool: &PgPool,
    owner: Uuid,
    scope: Scope,
    input: &WebsiteInput,
) -> Result<Uuid, RecordError> {
    let hosting_provider_id = require_website_fields(input)?;
    check_website_references(pool, scope, input.domain_id, hosting_provider_id).await?;

    let id = uuidv7();
    sqlx::query(
        "INSERT INTO websites \
         (id, user_id, website_name, domain_id, hosting_provider_id, hosting_package, \
          ip_address, is_active) \
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(id)
    .bind(owner)
    .bind(input.website_name.trim())
    .bind(input.domain_id)
    .bind(hosting_provider_id)
    .bind(&input.hosting_package)
    .bind(&input.ip_address)
    .bind(input.is_active.unwrap_or(true))
    .execute(pool)
    .await?;
    Ok(id)
}

pub async fn update_website(
    pool: &PgPool,
    scope: Scope,
    id: Uuid,
    input: &WebsiteInput,
) -> Result<(), RecordError> {
    let hosting_provider_id = require_website_fields(input)?;
    check_website_references(pool, scope, input.domain_id, hosting_provider_id).await?;

    let result = sqlx::query(
        "UPDATE websites SET website_name = $3, domain_id = $4, hosting_provider_id = $5, \
                             hosting_package = $6, ip_address = $7, is_active = $8 \
         WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)",
    )
    .bind(id)
    .bind(scope.owner_param())
    .bind(input.website_name.trim())
    .bind(input.domain_id)
    .bind(hosting_provider_id)
    .bind(&input.hosting_package)
    .bind(&input.ip_address)
    .bind(input.is_active.unwrap_or(true))
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Website"));
    }
    Ok(())
}

pub async fn delete_website(pool: &PgPool, scope: Scope, id: Uuid) -> Result<(), RecordError> {
    let result =
        sqlx::query("DELETE FROM websites WHERE id = $1 AND ($2::uuid IS NULL OR user_id = $2)")
            .bind(id)
            .bind(scope.owner_param())
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Err(RecordError::NotFound("Website"));
    }
    Ok(())
}

fn require_website_fields(input: &WebsiteInput) -> Result<Uuid, RecordError> {
    match input.hosting_provider_id {
        Some(pid) if !input.website_name.trim().is_empty() => Ok(pid),
        _ => Err(RecordError::Validation(
            "Website name and hosting provider are required".into(),
        )),
    }
}

/// Referenced domain and hosting provider must both be visible to the caller.
async fn check_website_references(
    pool: &PgPool,
    scope: Scope,
    domain_id: Option<Uuid>,
    hosting_provider_id: Uuid,
) -> Result<(), RecordError> {
    if let Some(did) = domain_id {
        if !domain_in_scope(pool, scope, did).await? {
            return Err(RecordError::NotFound("Domain"));
        }
    }
    if !provider_in_scope(pool, scope, hosting_provider_id).await? {
        return Err(RecordError::NotFound("Provider"));
    }
    Ok(())
}
