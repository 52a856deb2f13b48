//! Renders and sends expiry notifications, then records the audit trail.

use sqlx::PgPool;
use tracing::info;

use super::{NotifyError, queries};
use crate::mailer::Mailer;
use crate::models::notify::{ExpiringDomain, ExpiringProvider, NotificationKind};

/// Send a domain expiry alert to the domain's owner and append the audit row.
pub async fn dispatch_domain(
    pool: &PgPool,
    mailer: &dyn Mailer,
    domain: &ExpiringDomain,
    days: i64,
) -> Result<(), NotifyError> {
    let Some((email, username)) = queries::owner_contact(pool, domain.user_id).await? else {
        return Err(NotifyError::OwnerMissing(domain.user_id));
    };

    let subject = format!(
        "Domain Expiry Alert: {} expires in {days} days",
        domain.domain_name
    );
    let body = domain_body(&username, domain, days);
    let message_id = mailer.send(&email, &subject, &body).await?;
    info!(domain = %domain.domain_name, %email, %message_id, "domain expiry notification sent");

    queries::record_notification(pool, domain.user_id, NotificationKind::Domain, domain.id, days)
        .await?;
    Ok(())
}

/// Send a provider-account expiry alert and append the audit row.
pub async fn dispatch_provider(
    pool: &PgPool,
    mailer: &dyn Mailer,
    provider: &ExpiringProvider,
    days: i64,
) -> Result<(), NotifyError> {
    let Some((email, username)) = queries::owner_contact(pool, provider.user_id).await? else {
        return Err(NotifyError::OwnerMissing(provider.user_id));
    };

    let subject = format!(
        "Account Expiry Alert: {} account expires in {days} days",
        provider.provider_name
    );
    let body = provider_body(&username, provider, days);
    let message_id = mailer.send(&email, &subject, &body).await?;
    info!(provider = %provider.provider_name, %email, %message_id, "account expiry notification sent");

    queries::record_notification(
        pool,
        provider.user_id,
        NotificationKind::Provider,
        provider.id,
        days,
    )
    .await?;
    Ok(())
}

fn domain_body(username: &str, d: &ExpiringDomain, days: i64) -> String {
    format!(
        "Hello {username},\n\n\
         This is an automated reminder that your domain is approaching its \
         expiration date.\n\n\
         Domain: {}\n\
         Expiry Date: {}\n\
         Days Remaining: {days}\n\
         Registrar: {}\n\n\
         Please renew the domain to prevent any service disruption.\n",
        d.domain_name,
        d.expiry_date,
        d.provider_name.as_deref().unwrap_or("Not specified"),
    )
}

fn provider_body(username: &str, p: &ExpiringProvider, days: i64) -> String {
    format!(
        "Hello {username},\n\n\
         This is an automated reminder that your hosting/service account is \
         approaching its expiration date.\n\n\
         Provider: {}\n\
         Account: {}\n\
         Expiry Date: {}\n\
         Days Remaining: {days}\n\n\
         Please renew the account to prevent any service disruption.\n",
        p.provider_name,
        p.username.as_deref().unwrap_or("Not specified"),
        p.account_expiry_date,
    )
}
