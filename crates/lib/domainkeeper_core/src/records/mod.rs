//! Record store: providers, domains (with nameservers) and websites.
//!
//! Every query is keyed by a [`Scope`]: admins see and mutate all rows,
//! regular users only their own. An ownership miss and a missing row are
//! deliberately indistinguishable to callers.

pub mod queries;
pub mod stats;

use thiserror::Error;
use uuid::Uuid;

use crate::models::auth::Role;

/// Row visibility for record queries.
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    /// Admins: every row.
    All,
    /// Regular users: rows owned by this user.
    Owner(Uuid),
}

impl Scope {
    pub fn of(user_id: Uuid, role: Role) -> Self {
        if role.is_admin() {
            Scope::All
        } else {
            Scope::Owner(user_id)
        }
    }

    /// Bind value for the `($n::uuid IS NULL OR user_id = $n)` filter.
    pub(crate) fn owner_param(self) -> Option<Uuid> {
        match self {
            Scope::All => None,
            Scope::Owner(id) => Some(id),
        }
    }
}

/// Record store errors.
#[derive(Debug, Error)]
pub enum RecordError {
    /// Missing row or ownership miss — callers cannot tell which.
    #[error("{0} not found or access denied")]
    NotFound(&'static str),

    #[error("{0}")]
    Validation(String),

    #[error("Database error: {0}")]
    Db(#[from] sqlx::Error),
}
