//! Website record handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use uuid::Uuid;

use domainkeeper_core::models::records::{Website, WebsiteInput};
use domainkeeper_core::records::queries;

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::AuthenticatedUser;
use crate::models::{CreatedResponse, MessageResponse};

/// `GET /api/websites` — all websites visible to the caller.
pub async fn list(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<Vec<Website>>> {
    let rows = queries::list_websites(&state.pool, user.scope()?).await?;
    Ok(Json(rows))
}

/// `GET /api/websites/{id}`.
pub async fn get_one(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Website>> {
    let row = queries::get_website(&state.pool, user.scope()?, id).await?;
    Ok(Json(row))
}

/// `POST /api/websites`.
pub async fn create(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<WebsiteInput>,
) -> AppResult<(StatusCode, Json<CreatedResponse>)> {
    let id = queries::insert_website(&state.pool, user.user_id()?, user.scope()?, &body).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id,
            message: "Website added successfully".into(),
        }),
    ))
}

/// `PUT /api/websites/{id}`.
pub async fn update(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
    Json(body): Json<WebsiteInput>,
) -> AppResult<Json<MessageResponse>> {
    queries::update_website(&state.pool, user.scope()?, id, &body).await?;
    Ok(Json(MessageResponse {
        message: "Website updated successfully".into(),
    }))
}

/// `DELETE /api/websites/{id}`.
pub async fn remove(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Path(id): Path<Uuid>,
) -> AppResult<Json<MessageResponse>> {
    queries::delete_website(&state.pool, user.scope()?, id).await?;
    Ok(Json(MessageResponse {
        message: "Website deleted successfully".into(),
    }))
}
