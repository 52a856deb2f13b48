//! Expiry notification engine: evaluator, scheduler, dispatcher.

pub mod dispatcher;
pub mod expiry;
pub mod queries;
pub mod scheduler;

use thiserror::Error;
use uuid::Uuid;

/// Notification engine errors. All of them are contained per-resource by the
/// scan loop; none aborts a tick.
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),

    #[error("Mail error: {0}")]
    Mail(#[from] crate::mailer::MailError),

    #[error("owner {0} not found")]
    OwnerMissing(Uuid),
}
