//! Authentication request handlers.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::{Extension, Json};

use crate::AppState;
use crate::error::AppResult;
use crate::middleware::auth::{AuthenticatedUser, optional_claims};
use crate::models::{
    AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, LoginRequest, MessageResponse,
    ProfileResponse, RegisterRequest, ResetPasswordRequest, UpdateProfileRequest,
    UpdateRoleRequest, UserResponse, UsersResponse,
};
use crate::services::auth;

/// `POST /api/auth/register` — create a new account. A valid admin bearer
/// token on the request allows `role: "admin"`; anything else is stored as a
/// regular user.
pub async fn register(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(body): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    let acting = optional_claims(&headers, state.config.jwt_secret.as_bytes());
    let resp = auth::register(&state.pool, &state.config, acting.as_ref(), &body).await?;
    Ok((StatusCode::CREATED, Json(resp)))
}

/// `POST /api/auth/login` — authenticate with email + password.
pub async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let resp = auth::login(&state.pool, &state.config, &body.email, &body.password).await?;
    Ok(Json(resp))
}

/// `GET /api/auth/me` — current user's profile.
pub async fn me(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UserResponse>> {
    let resp = auth::me(&state.pool, user.user_id()?).await?;
    Ok(Json(resp))
}

/// `PUT /api/auth/update-profile` — change username/email.
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let resp = auth::update_profile(&state.pool, user.user_id()?, &body).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/change-password` — change password, re-verifying the
/// current one.
pub async fn change_password(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::change_password(&state.pool, &state.config, user.user_id()?, &body).await?;
    Ok(Json(resp))
}

/// `POST /api/auth/forgot-password` — request a reset link. Same response
/// whether or not the email exists.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(body): Json<ForgotPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::forgot_password(
        &state.pool,
        &state.config,
        state.mailer.as_ref(),
        &body.email,
    )
    .await?;
    Ok(Json(resp))
}

/// `POST /api/auth/reset-password/{secret}` — consume a reset link.
pub async fn reset_password(
    State(state): State<AppState>,
    Path(secret): Path<String>,
    Json(body): Json<ResetPasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::reset_password(&state.pool, &state.config, &secret, &body.password).await?;
    Ok(Json(resp))
}

/// `GET /api/auth/users` — admin: list all users.
pub async fn list_users(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
) -> AppResult<Json<UsersResponse>> {
    let resp = auth::list_users(&state.pool, &user.0).await?;
    Ok(Json(resp))
}

/// `PUT /api/auth/users/role` — admin: change another user's role.
pub async fn update_user_role(
    State(state): State<AppState>,
    Extension(user): Extension<AuthenticatedUser>,
    Json(body): Json<UpdateRoleRequest>,
) -> AppResult<Json<MessageResponse>> {
    let resp = auth::update_user_role(&state.pool, &user.0, &body).await?;
    Ok(Json(resp))
}
