//! Statistics summary handler.

use axum::extract::State;
use axum::{Extension, Json};

use domainkeeper_core::records::stats;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::StatsResponse;

/// `GET /api/stats` — provider, domain-expiry and website summaries.
pub async fn summary(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<StatsResponse>> {
    let scope = user.scope()?;
    let providers = stats::provider_type_counts(&state.pool, scope).await?;
    let domains = stats::domain_expiry_stats(&state.pool, scope).await?;
    let websites = stats::website_stats(&state.pool, scope).await?;

    Ok(Json(StatsResponse {
        providers,
        domains,
        websites,
    }))
}
