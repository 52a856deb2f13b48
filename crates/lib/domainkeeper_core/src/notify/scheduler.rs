//! Daily expiry-scan scheduler.
//!
//! Two independent triggers — domains and provider accounts — each an
//! explicit loop that sleeps until the next configured time-of-day (UTC) and
//! then runs one scan. Loops are driven by an injectable [`Clock`] and stop
//! when the cancellation token fires. A per-trigger mutex keeps a manual
//! admin run from overlapping a scheduled one.

use std::sync::Arc;

use chrono::{DateTime, NaiveTime, Utc};
use sqlx::PgPool;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::{NotifyError, dispatcher, expiry, queries};
use crate::clock::Clock;
use crate::mailer::Mailer;
use crate::models::notify::{ExpiringDomain, ExpiringProvider, NotificationKind};

/// Trigger times and startup behavior.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Time-of-day (UTC) for the daily domain scan.
    pub domain_check_time: NaiveTime,
    /// Time-of-day (UTC) for the daily provider-account scan.
    pub provider_check_time: NaiveTime,
    /// Run both scans once immediately after startup.
    pub run_on_startup: bool,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            domain_check_time: NaiveTime::from_hms_opt(8, 0, 0).unwrap(),
            provider_check_time: NaiveTime::from_hms_opt(8, 30, 0).unwrap(),
            run_on_startup: false,
        }
    }
}

/// Drives the two daily expiry scans.
pub struct NotificationScheduler {
    pool: PgPool,
    mailer: Arc<dyn Mailer>,
    clock: Arc<dyn Clock>,
    config: SchedulerConfig,
    domain_tick: Mutex<()>,
    provider_tick: Mutex<()>,
}

impl NotificationScheduler {
    pub fn new(
        pool: PgPool,
        mailer: Arc<dyn Mailer>,
        clock: Arc<dyn Clock>,
        config: SchedulerConfig,
    ) -> Arc<Self> {
        Arc::new(Self {
            pool,
            mailer,
            clock,
            config,
            domain_tick: Mutex::new(()),
            provider_tick: Mutex::new(()),
        })
    }

    /// Spawn both daily triggers. They stop when `ct` is cancelled.
    pub fn start(self: &Arc<Self>, ct: CancellationToken) {
        if self.config.run_on_startup {
            let s = self.clone();
            tokio::spawn(async move {
                s.run_domain_check().await;
                s.run_provider_check().await;
            });
        }

        {
            let s = self.clone();
            let ct = ct.clone();
            tokio::spawn(async move {
                loop {
                    let wait = duration_until(s.clock.now(), s.config.domain_check_time);
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {
                            s.run_domain_check().await;
                        }
                        _ = ct.cancelled() => {
                            info!("domain expiry trigger shutting down");
                            break;
                        }
                    }
                }
            });
        }

        {
            let s = self.clone();
            tokio::spawn(async move {
                loop {
                    let wait = duration_until(s.clock.now(), s.config.provider_check_time);
                    tokio::select! {
                        _ = tokio::time::sleep(wait) => {
                            s.run_provider_check().await;
                        }
                        _ = ct.cancelled() => {
                            info!("account expiry trigger shutting down");
                            break;
                        }
                    }
                }
            });
        }
    }

    /// One scan over all domains. Returns the number of notifications sent.
    /// Skips (returning 0) when a domain scan is already in flight.
    pub async fn run_domain_check(&self) -> usize {
        let Ok(_guard) = self.domain_tick.try_lock() else {
            warn!("domain expiry check already running, skipping");
            return 0;
        };

        let today = self.clock.now().date_naive();
        let domains = match queries::domains_with_expiry(&self.pool).await {
            Ok(d) => d,
            Err(e) => {
                error!(error = %e, "domain expiry scan could not read the store");
                return 0;
            }
        };

        let mut sent = 0;
        for domain in &domains {
            let days = expiry::days_until(domain.expiry_date, today);
            if !expiry::matches_threshold(days) {
                continue;
            }
            // One domain's failure never aborts the rest of the scan.
            match self.notify_domain(domain, days).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(domain = %domain.domain_name, error = %e,
                           "failed to send domain expiry notification");
                }
            }
        }

        info!(scanned = domains.len(), sent, "domain expiry notification check completed");
        sent
    }

    /// One scan over all provider accounts. Same contract as the domain scan.
    pub async fn run_provider_check(&self) -> usize {
        let Ok(_guard) = self.provider_tick.try_lock() else {
            warn!("account expiry check already running, skipping");
            return 0;
        };

        let today = self.clock.now().date_naive();
        let providers = match queries::providers_with_expiry(&self.pool).await {
            Ok(p) => p,
            Err(e) => {
                error!(error = %e, "account expiry scan could not read the store");
                return 0;
            }
        };

        let mut sent = 0;
        for provider in &providers {
            let days = expiry::days_until(provider.account_expiry_date, today);
            if !expiry::matches_threshold(days) {
                continue;
            }
            match self.notify_provider(provider, days).await {
                Ok(true) => sent += 1,
                Ok(false) => {}
                Err(e) => {
                    error!(provider = %provider.provider_name, error = %e,
                           "failed to send account expiry notification");
                }
            }
        }

        info!(scanned = providers.len(), sent, "account expiry notification check completed");
        sent
    }

    async fn notify_domain(
        &self,
        domain: &ExpiringDomain,
        days: i64,
    ) -> Result<bool, NotifyError> {
        if queries::already_notified(
            &self.pool,
            domain.user_id,
            NotificationKind::Domain,
            domain.id,
            days,
        )
        .await?
        {
            return Ok(false);
        }
        dispatcher::dispatch_domain(&self.pool, self.mailer.as_ref(), domain, days).await?;
        Ok(true)
    }

    async fn notify_provider(
        &self,
        provider: &ExpiringProvider,
        days: i64,
    ) -> Result<bool, NotifyError> {
        if queries::already_notified(
            &self.pool,
            provider.user_id,
            NotificationKind::Provider,
            provider.id,
            days,
        )
        .await?
        {
            return Ok(false);
        }
        dispatcher::dispatch_provider(&self.pool, self.mailer.as_ref(), provider, days).await?;
        Ok(true)
    }
}

/// Wall time to wait from `now` until the next occurrence of `at` (UTC).
/// Always strictly in the future: a fire time equal to `now` waits a day.
fn duration_until(now: DateTime<Utc>, at: NaiveTime) -> std::time::Duration {
    let today_fire = now.date_naive().and_time(at).and_utc();
    let next = if today_fire > now {
        today_fire
    } else {
        today_fire + chrono::Duration::days(1)
    };
    (next - now).to_std().unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn fire_later_today() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 6, 0, 0).unwrap();
        let wait = duration_until(now, time(8, 0));
        assert_eq!(wait.as_secs(), 2 * 60 * 60);
    }

    #[test]
    fn fire_time_already_past_waits_until_tomorrow() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 9, 0, 0).unwrap();
        let wait = duration_until(now, time(8, 0));
        assert_eq!(wait.as_secs(), 23 * 60 * 60);
    }

    #[test]
    fn fire_time_equal_to_now_waits_a_full_day() {
        let now = Utc.with_ymd_and_hms(2026, 8, 6, 8, 30, 0).unwrap();
        let wait = duration_until(now, time(8, 30));
        assert_eq!(wait.as_secs(), 24 * 60 * 60);
    }
}
