//! Domain record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use domainkeeper_core::models::records::{Domain, DomainInput};
use domainkeeper_core::records::queries;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreatedResponse, MessageResponse};

/// `GET /api/domains` — all domains visible to the caller, soonest expiry
/// first, nameservers attached.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Domain>>> {
    let rows = queries::list_domains(&state.pool, user.scope()?).await?;
    Ok(Json(rows))
}

/// `GET /api/domains/{id}`.
pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Domain>> {
    let row = queries::get_domain(&state.pool, user.scope()?, id).await?;
    Ok(Json(row))
}

/// `POST /api/domains` — insert the domain and its nameservers atomically.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<DomainInput>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = queries::insert_domain(&state.pool, user.user_id()?, user.scope()?, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Domain added successfully".into(),
        }),
    ))
}

/// `PUT /api/domains/{id}` — replace the row and its nameservers atomically.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<DomainInput>,
) -> AppResult<Json<MessageResponse>> {
    queries::update_domain(&state.pool, user.scope()?, id, &body).await?;
    Ok(Json(MessageResponse {
        message: "Domain updated successfully".into(),
    }))
}

/// `DELETE /api/domains/{id}`.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    queries::delete_domain(&state.pool, user.scope()?, id).await?;
    Ok(Json(MessageResponse {
        message: "Domain deleted successfully".into(),
    }))
}
