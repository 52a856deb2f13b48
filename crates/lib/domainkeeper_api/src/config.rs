//! API server configuration.
//!
//! Environment is read once here; business logic receives values through
//! this struct, never from ambient env.

use std::sync::Arc;

use chrono::NaiveTime;

use domainkeeper_core::auth::jwt::{DEFAULT_TOKEN_TTL_HOURS, resolve_jwt_secret};
use domainkeeper_core::auth::password::DEFAULT_BCRYPT_COST;
use domainkeeper_core::mailer::{HttpRelayMailer, LogMailer, Mailer};
use domainkeeper_core::notify::scheduler::SchedulerConfig;

/// Configuration for the API server.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:3000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Identity-token signing secret.
    pub jwt_secret: String,
    /// Identity-token lifetime in hours.
    pub token_ttl_hours: i64,
    /// bcrypt cost factor for password hashing.
    pub bcrypt_cost: u32,
    /// Public base URL used in password-reset links.
    pub base_url: String,
    /// HTTP mail relay endpoint; unset falls back to log-only mail.
    pub mail_relay_url: Option<String>,
    /// From-address handed to the mail relay.
    pub mail_from: String,
    /// Time-of-day (UTC) for the daily domain expiry scan.
    pub domain_check_time: NaiveTime,
    /// Time-of-day (UTC) for the daily provider-account expiry scan.
    pub provider_check_time: NaiveTime,
    /// Run both expiry scans once at startup.
    pub notify_on_startup: bool,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable              | Default                                      |
    /// |-----------------------|----------------------------------------------|
    /// | `BIND_ADDR`           | `127.0.0.1:3000`                             |
    /// | `DATABASE_URL`        | `postgres://localhost:5432/domainkeeper`     |
    /// | `JWT_SECRET`          | generated & persisted to file                |
    /// | `TOKEN_TTL_HOURS`     | `24`                                         |
    /// | `BCRYPT_COST`         | `10`                                         |
    /// | `BASE_URL`            | `http://localhost:3000`                      |
    /// | `MAIL_RELAY_URL`      | unset (log-only mail)                        |
    /// | `MAIL_FROM`           | `Domainkeeper <noreply@domainkeeper.local>`  |
    /// | `DOMAIN_CHECK_TIME`   | `08:00`                                      |
    /// | `PROVIDER_CHECK_TIME` | `08:30`                                      |
    /// | `NOTIFY_ON_STARTUP`   | `false`                                      |
    pub fn from_env() -> Self {
        Self {
            bind_addr: env_or("BIND_ADDR", "127.0.0.1:3000"),
            database_url: env_or("DATABASE_URL", "postgres://localhost:5432/domainkeeper"),
            jwt_secret: resolve_jwt_secret(),
            token_ttl_hours: env_parsed("TOKEN_TTL_HOURS", DEFAULT_TOKEN_TTL_HOURS),
            bcrypt_cost: env_parsed("BCRYPT_COST", DEFAULT_BCRYPT_COST),
            base_url: env_or("BASE_URL", "http://localhost:3000"),
            mail_relay_url: std::env::var("MAIL_RELAY_URL")
                .ok()
                .filter(|s| !s.is_empty()),
            mail_from: env_or("MAIL_FROM", "Domainkeeper <noreply@domainkeeper.local>"),
            domain_check_time: env_time("DOMAIN_CHECK_TIME", NaiveTime::from_hms_opt(8, 0, 0).unwrap()),
            provider_check_time: env_time(
                "PROVIDER_CHECK_TIME",
                NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            ),
            notify_on_startup: env_parsed("NOTIFY_ON_STARTUP", false),
        }
    }

    /// Construct the configured mail collaborator.
    pub fn mailer(&self) -> Arc<dyn Mailer> {
        match &self.mail_relay_url {
            Some(url) => Arc::new(HttpRelayMailer::new(url.clone(), self.mail_from.clone())),
            None => Arc::new(LogMailer),
        }
    }

    /// Scheduler slice of the configuration.
    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig {
            domain_check_time: self.domain_check_time,
            provider_check_time: self.provider_check_time,
            run_on_startup: self.notify_on_startup,
        }
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.into())
}

fn env_parsed<T: std::str::FromStr>(name: &str, default: T) -> T {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_time(name: &str, default: NaiveTime) -> NaiveTime {
    std::env::var(name)
        .ok()
        .and_then(|v| NaiveTime::parse_from_str(&v, "%H:%M").ok())
        .unwrap_or(default)
}
