//! Database healthcheck.

use axum::Json;
use axum::extract::State;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::HealthResponse;

/// `GET /api/healthcheck` — verifies the store is reachable.
pub async fn healthcheck(State(state): State<AppState>) -> AppResult<Json<HealthResponse>> {
    sqlx::query("SELECT 1")
        .execute(&state.pool)
        .await
        .map_err(|e| AppError::Internal(format!("database connection failed: {e}")))?;

    Ok(Json(HealthResponse {
        status: "Database connection successful".into(),
    }))
}
