//! Identity flows: registration, login, profile, password lifecycle, role
//! management.

use chrono::Duration;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use domainkeeper_core::auth::{authorize, jwt, password, queries, reset};
use domainkeeper_core::mailer::Mailer;
use domainkeeper_core::models::auth::{Role, TokenClaims, UserProfile};

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};
use crate::models::{
    AuthResponse, ChangePasswordRequest, MessageResponse, ProfileResponse, RegisterRequest,
    UpdateProfileRequest, UpdateRoleRequest, UserResponse, UsersResponse,
};

/// Register a new account.
///
/// `acting` is the optional verified identity on the request: only an acting
/// admin can mint another admin, anyone else is silently stored as a regular
/// user.
pub async fn register(
    pool: &PgPool,
    config: &ApiConfig,
    acting: Option<&TokenClaims>,
    body: &RegisterRequest,
) -> AppResult<AuthResponse> {
    validate_username(&body.username)?;
    validate_email(&body.email)?;
    validate_password(&body.password)?;

    // Advisory pre-check for a friendly message; the unique constraints on
    // users remain the source of truth under concurrent registration.
    if queries::username_or_email_taken(pool, &body.username, &body.email, None).await? {
        return Err(AppError::Conflict("Username or email already exists".into()));
    }

    let role = if body.role.as_deref() == Some("admin")
        && acting.is_some_and(|c| c.role.is_admin())
    {
        Role::Admin
    } else {
        Role::User
    };

    let hash = password::hash_password(&body.password, config.bcrypt_cost)?;
    let user = queries::create_user(pool, &body.username, &body.email, &hash, role).await?;
    let token = issue_token(config, &user)?;

    info!(user_id = %user.id, "user registered");
    Ok(AuthResponse {
        message: "User registered successfully".into(),
        token,
        user,
    })
}

/// Authenticate with email + password.
///
/// Unknown email and wrong password collapse into the same outcome so the
/// response never reveals which one failed.
pub async fn login(
    pool: &PgPool,
    config: &ApiConfig,
    email: &str,
    pw: &str,
) -> AppResult<AuthResponse> {
    let Some(user) = queries::find_by_email(pool, email).await? else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };

    if !password::verify_password(pw, &user.password_hash) {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let profile = UserProfile::from(user);
    let token = issue_token(config, &profile)?;

    Ok(AuthResponse {
        message: "Login successful".into(),
        token,
        user: profile,
    })
}

/// Current user's profile.
pub async fn me(pool: &PgPool, user_id: Uuid) -> AppResult<UserResponse> {
    let user = queries::profile_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(UserResponse { user })
}

/// Update the caller's username and email.
pub async fn update_profile(
    pool: &PgPool,
    user_id: Uuid,
    body: &UpdateProfileRequest,
) -> AppResult<ProfileResponse> {
    validate_username(&body.username)?;
    validate_email(&body.email)?;

    if queries::username_or_email_taken(pool, &body.username, &body.email, Some(user_id)).await? {
        return Err(AppError::Conflict(
            "Username or email already taken by another user".into(),
        ));
    }

    let user = queries::update_profile(pool, user_id, &body.username, &body.email)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    Ok(ProfileResponse {
        message: "Profile updated successfully".into(),
        user,
    })
}

/// Change the caller's password after re-verifying the current one.
pub async fn change_password(
    pool: &PgPool,
    config: &ApiConfig,
    user_id: Uuid,
    body: &ChangePasswordRequest,
) -> AppResult<MessageResponse> {
    let user = queries::find_by_id(pool, user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    if !password::verify_password(&body.current_password, &user.password_hash) {
        return Err(AppError::Unauthorized("Current password is incorrect".into()));
    }

    validate_password(&body.new_password)?;
    let hash = password::hash_password(&body.new_password, config.bcrypt_cost)?;
    queries::update_password(pool, user_id, &hash).await?;

    Ok(MessageResponse {
        message: "Password updated successfully".into(),
    })
}

/// Issue a reset secret and mail the link. The response body is identical
/// whether or not the email matched an account.
pub async fn forgot_password(
    pool: &PgPool,
    config: &ApiConfig,
    mailer: &dyn Mailer,
    email: &str,
) -> AppResult<MessageResponse> {
    reset::request_reset(pool, mailer, &config.base_url, email).await?;
    Ok(MessageResponse {
        message: "If an account with that email exists, a password reset link has been sent."
            .into(),
    })
}

/// Consume a reset secret from the emailed link.
pub async fn reset_password(
    pool: &PgPool,
    config: &ApiConfig,
    secret: &str,
    new_password: &str,
) -> AppResult<MessageResponse> {
    validate_password(new_password)?;
    reset::consume_reset(pool, secret, new_password, config.bcrypt_cost).await?;
    Ok(MessageResponse {
        message: "Password has been reset successfully".into(),
    })
}

/// Admin: list every user profile.
pub async fn list_users(pool: &PgPool, claims: &TokenClaims) -> AppResult<UsersResponse> {
    require_admin(claims)?;
    let users = queries::list_users(pool).await?;
    Ok(UsersResponse { users })
}

/// Admin: change another user's role. Self-role-change is rejected before
/// any mutation, even for admins, to avoid accidental lockout.
pub async fn update_user_role(
    pool: &PgPool,
    claims: &TokenClaims,
    body: &UpdateRoleRequest,
) -> AppResult<MessageResponse> {
    require_admin(claims)?;

    let role: Role = body
        .role
        .parse()
        .map_err(|_| AppError::Validation("Invalid role".into()))?;

    if claims.sub == body.user_id.to_string() {
        return Err(AppError::Validation("You cannot change your own role".into()));
    }

    if !queries::update_role(pool, body.user_id, role).await? {
        return Err(AppError::NotFound("User not found".into()));
    }

    Ok(MessageResponse {
        message: "User role updated successfully".into(),
    })
}

fn require_admin(claims: &TokenClaims) -> AppResult<()> {
    authorize(claims, &[Role::Admin])
        .map_err(|_| AppError::Forbidden("Access denied. Admin only.".into()))
}

fn issue_token(config: &ApiConfig, user: &UserProfile) -> AppResult<String> {
    Ok(jwt::generate_token(
        user.id,
        &user.username,
        user.role,
        Duration::hours(config.token_ttl_hours),
        config.jwt_secret.as_bytes(),
    )?)
}

// ---------------------------------------------------------------------------
// Boundary validation
// ---------------------------------------------------------------------------

fn validate_username(username: &str) -> AppResult<()> {
    let len = username.chars().count();
    if !(3..=50).contains(&len) {
        return Err(AppError::Validation(
            "Username must be between 3 and 50 characters".into(),
        ));
    }
    if !username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(AppError::Validation(
            "Username can only contain letters, numbers, and underscores".into(),
        ));
    }
    Ok(())
}

fn validate_email(email: &str) -> AppResult<()> {
    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.contains(char::is_whitespace)
        }
        None => false,
    };
    if !valid {
        return Err(AppError::Validation(
            "Please provide a valid email address".into(),
        ));
    }
    Ok(())
}

fn validate_password(password: &str) -> AppResult<()> {
    if password.chars().count() < 8 {
        return Err(AppError::Validation(
            "Password must be at least 8 characters long".into(),
        ));
    }
    let has_lower = password.chars().any(|c| c.is_ascii_lowercase());
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    if !(has_lower && has_upper && has_digit) {
        return Err(AppError::Validation(
            "Password must contain at least one uppercase letter, one lowercase letter, \
             and one number"
                .into(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn username_rules() {
        assert!(validate_username("bob").is_ok());
        assert!(validate_username("bob_the_2nd").is_ok());
        assert!(validate_username("ab").is_err());
        assert!(validate_username(&"x".repeat(51)).is_err());
        assert!(validate_username("bob smith").is_err());
        assert!(validate_username("bob!").is_err());
    }

    #[test]
    fn email_rules() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("user.name@sub.example.org").is_ok());
        assert!(validate_email("nope").is_err());
        assert!(validate_email("@b.com").is_err());
        assert!(validate_email("a@").is_err());
        assert!(validate_email("a@nodot").is_err());
        assert!(validate_email("a b@c.com").is_err());
    }

    #[test]
    fn password_rules() {
        assert!(validate_password("Abcdef12").is_ok());
        assert!(validate_password("Ab1").is_err());
        assert!(validate_password("abcdefg1").is_err());
        assert!(validate_password("ABCDEFG1").is_err());
        assert!(validate_password("Abcdefgh").is_err());
    }
}
