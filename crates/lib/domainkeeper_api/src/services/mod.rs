//! Business-logic services between handlers and `domainkeeper_core`.

pub mod auth;
