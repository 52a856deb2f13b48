//! Request handlers.

pub mod auth;
pub mod domains;
pub mod health;
pub mod notifications;
pub mod providers;
pub mod stats;
pub mod websites;
