//! Provider record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use domainkeeper_core::models::records::{Domain, Provider, ProviderInput, Website};
use domainkeeper_core::records::queries;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreatedResponse, MessageResponse};

/// `GET /api/providers` — all providers visible to the caller.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Provider>>> {
    let rows = queries::list_providers(&state.pool, user.scope()?).await?;
    Ok(Json(rows))
}

/// `GET /api/providers/{id}`.
pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Provider>> {
    let row = queries::get_provider(&state.pool, user.scope()?, id).await?;
    Ok(Json(row))
}

/// `POST /api/providers`.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<ProviderInput>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = queries::insert_provider(&state.pool, user.user_id()?, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Provider added successfully".into(),
        }),
    ))
}

/// `PUT /api/providers/{id}`.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<ProviderInput>,
) -> AppResult<Json<MessageResponse>> {
    queries::update_provider(&state.pool, user.scope()?, id, &body).await?;
    Ok(Json(MessageResponse {
        message: "Provider updated successfully".into(),
    }))
}

/// `DELETE /api/providers/{id}`.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    queries::delete_provider(&state.pool, user.scope()?, id).await?;
    Ok(Json(MessageResponse {
        message: "Provider deleted successfully".into(),
    }))
}

/// `GET /api/providers/{id}/domains` — domains registered with a provider.
pub async fn domains(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Domain>>> {
    let rows = queries::domains_for_provider(&state.pool, user.scope()?, id).await?;
    Ok(Json(rows))
}

/// `GET /api/providers/{id}/websites` — websites hosted on a provider.
pub async fn websites(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Vec<Website>>> {
    let rows = queries::websites_for_provider(&state.pool, user.scope()?, id).await?;
    Ok(Json(rows))
}
