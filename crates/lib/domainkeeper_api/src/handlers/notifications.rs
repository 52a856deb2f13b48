//! Admin manual triggers for the expiry scans.
//!
//! These share the scheduler's per-trigger guard, so a manual run that
//! coincides with the daily one is skipped rather than doubled.

use axum::extract::State;
use axum::{Extension, Json};

use domainkeeper_core::auth::authorize;
use domainkeeper_core::models::auth::Role;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthenticatedUser;
use crate::models::CheckResponse;

/// `POST /api/notifications/check-domains` — admin: run the domain scan now.
pub async fn check_domains(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CheckResponse>> {
    require_admin(&user)?;
    let dispatched = state.scheduler.run_domain_check().await;
    Ok(Json(CheckResponse {
        success: true,
        message: "Domain expiry check completed".into(),
        dispatched,
    }))
}

/// `POST /api/notifications/check-providers` — admin: run the account scan
/// now.
pub async fn check_providers(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<CheckResponse>> {
    require_admin(&user)?;
    let dispatched = state.scheduler.run_provider_check().await;
    Ok(Json(CheckResponse {
        success: true,
        message: "Account expiry check completed".into(),
        dispatched,
    }))
}

fn require_admin(user: &AuthenticatedUser) -> AppResult<()> {
    authorize(&user.0, &[Role::Admin])
        .map_err(|_| AppError::Forbidden("Access denied. Admin only.".into()))
}
