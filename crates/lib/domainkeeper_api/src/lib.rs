//! # domainkeeper_api
//!
//! HTTP API library for Domainkeeper.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post, put};
use sqlx::PgPool;
use tower_http::cors::{Any, CorsLayer};

use domainkeeper_core::mailer::Mailer;
use domainkeeper_core::notify::scheduler::NotificationScheduler;

use crate::config::ApiConfig;

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
    /// Outbound mail collaborator.
    pub mailer: Arc<dyn Mailer>,
    /// Expiry-scan driver, shared with the manual-trigger endpoints.
    pub scheduler: Arc<NotificationScheduler>,
}

/// Run embedded database migrations.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    domainkeeper_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Public routes (no auth required). Register still honors an optional
    // bearer token for the admin-creates-admin path.
    let public = Router::new()
        .route("/api/healthcheck", get(handlers::health::healthcheck))
        .route("/api/auth/register", post(handlers::auth::register))
        .route("/api/auth/login", post(handlers::auth::login))
        .route(
            "/api/auth/forgot-password",
            post(handlers::auth::forgot_password),
        )
        .route(
            "/api/auth/reset-password/{secret}",
            post(handlers::auth::reset_password),
        );

    // Protected routes (require auth)
    let protected = Router::new()
        .route("/api/auth/me", get(handlers::auth::me))
        .route("/api/auth/update-profile", put(handlers::auth::update_profile))
        .route(
            "/api/auth/change-password",
            post(handlers::auth::change_password),
        )
        .route("/api/auth/users", get(handlers::auth::list_users))
        .route("/api/auth/users/role", put(handlers::auth::update_user_role))
        .route(
            "/api/providers",
            get(handlers::providers::list).post(handlers::providers::create),
        )
        .route(
            "/api/providers/{id}",
            get(handlers::providers::get_one)
                .put(handlers::providers::update)
                .delete(handlers::providers::remove),
        )
        .route(
            "/api/providers/{id}/domains",
            get(handlers::providers::domains),
        )
        .route(
            "/api/providers/{id}/websites",
            get(handlers::providers::websites),
        )
        .route(
            "/api/domains",
            get(handlers::domains::list).post(handlers::domains::create),
        )
        .route(
            "/api/domains/{id}",
            get(handlers::domains::get_one)
                .put(handlers::domains::update)
                .delete(handlers::domains::remove),
        )
        .route(
            "/api/websites",
            get(handlers::websites::list).post(handlers::websites::create),
        )
        .route(
            "/api/websites/{id}",
            get(handlers::websites::get_one)
                .put(handlers::websites::update)
                .delete(handlers::websites::remove),
        )
        .route("/api/stats", get(handlers::stats::summary))
        .route(
            "/api/notifications/check-domains",
            post(handlers::notifications::check_domains),
        )
        .route(
            "/api/notifications/check-providers",
            post(handlers::notifications::check_providers),
        )
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_auth,
        ));

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(cors)
        .with_state(state)
}
