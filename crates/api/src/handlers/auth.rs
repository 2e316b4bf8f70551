//! Handlers for the `/auth` resource (register, login, profile, account).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use futurist_core::error::CoreError;
use futurist_core::lockout::{BlockStatus, FailureOutcome};
use futurist_core::roles::Role;
use futurist_core::validation::{
    normalize_email, require_field, validate_email, validate_name, validate_password_strength,
    validate_phone,
};
use futurist_db::models::user::{CreateUser, UpdateProfile, UserProfile, UserResponse};
use futurist_db::repositories::UserRepo;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::generate_token;
use crate::auth::password::{hash_password, verify_credentials, verify_password};
use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::client_ip::ClientIp;
use crate::response::DataResponse;
use crate::state::AppState;

/// Response message for bad credentials. Identical for unknown email and
/// wrong password so the endpoint does not reveal which accounts exist.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    /// `user` (default) or `business`.
    pub role: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Request body for `PUT /auth/change-password`.
#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

/// Request body for `PUT /auth/profile`.
#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub token: String,
    /// Token lifetime in seconds.
    pub expires_in: i64,
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/auth/register
///
/// Create an account and sign it in. Returns 201 with a token.
pub async fn register(
    State(state): State<AppState>,
    AppJson(input): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<AuthResponse>)> {
    require_field("email", input.email.as_deref())?;
    require_field("password", input.password.as_deref())?;
    require_field("first_name", input.first_name.as_deref())?;
    require_field("last_name", input.last_name.as_deref())?;

    let email = normalize_email(input.email.as_deref().unwrap_or_default());
    let password = input.password.unwrap_or_default();
    let first_name = input.first_name.unwrap_or_default().trim().to_string();
    let last_name = input.last_name.unwrap_or_default().trim().to_string();
    let phone = non_blank(input.phone);

    validate_email(&email)?;
    validate_password_strength(&password)?;
    validate_name("first_name", &first_name)?;
    validate_name("last_name", &last_name)?;
    if let Some(phone) = &phone {
        validate_phone(phone)?;
    }

    let role = match input.role.as_deref().map(str::trim).filter(|r| !r.is_empty()) {
        Some(raw) => raw.parse::<Role>()?,
        None => Role::User,
    };
    if !role.is_self_assignable() {
        return Err(AppError::validation(format!(
            "Role '{role}' cannot be chosen at registration"
        )));
    }

    if UserRepo::email_exists(&state.pool, &email, None).await? {
        return Err(CoreError::DuplicateEmail.into());
    }

    let password_hash = hash_password(&password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            first_name,
            last_name,
            email,
            password_hash,
            phone,
            role,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, role = %user.role, "User registered");

    let response = auth_response(&state, &UserProfile::from(user))?;
    Ok((StatusCode::CREATED, Json(response)))
}

/// POST /api/auth/login
///
/// Authenticate with email + password. Failed attempts count against the
/// caller's IP; once blocked, every login from that IP gets 429 until the
/// block elapses.
pub async fn login(
    State(state): State<AppState>,
    ClientIp(ip): ClientIp,
    AppJson(input): AppJson<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let email = normalize_email(input.email.as_deref().unwrap_or_default());

    // 1. Reject blocked IPs before touching credentials.
    if let BlockStatus::Blocked { remaining } = state.login_attempts.check(ip, &email).await {
        let retry_after_secs = remaining.num_seconds().max(1) as u64;
        tracing::warn!(%ip, retry_after_secs, "Login rejected: IP is blocked");
        return Err(AppError::TooManyRequests {
            message: format!(
                "Too many failed login attempts. Try again in {} minute(s)",
                retry_after_secs.div_ceil(60)
            ),
            retry_after_secs,
        });
    }

    require_field("email", Some(email.as_str()))?;
    require_field("password", input.password.as_deref())?;
    let password = input.password.unwrap_or_default();

    // 2. Look up the account and verify the password.
    let user = UserRepo::find_by_email(&state.pool, &email).await?;
    let password_valid =
        verify_credentials(&password, user.as_ref().map(|u| u.password_hash.as_str()))
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;

    let Some(user) = user.filter(|_| password_valid) else {
        // 3. On failure: count it against (ip, email).
        match state.login_attempts.record_failure(ip, &email).await {
            FailureOutcome::BlockTriggered { block_duration } => tracing::warn!(
                %ip,
                block_mins = block_duration.num_minutes(),
                "Login failed: IP blocked after too many attempts"
            ),
            FailureOutcome::Counted {
                failed_count,
                remaining_attempts,
            } => tracing::info!(%ip, failed_count, remaining_attempts, "Login failed"),
            FailureOutcome::Exempt => tracing::info!(%ip, "Login failed for exempt account"),
        }
        return Err(AppError::unauthorized(INVALID_CREDENTIALS));
    };

    // 4. Only reveal deactivation to someone who knows the password.
    if !user.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    // 5. On success: clear the counter and do login bookkeeping.
    state.login_attempts.record_success(ip, &email).await;
    let profile = UserRepo::record_successful_login(&state.pool, user.id)
        .await?
        .unwrap_or_else(|| UserProfile::from(user));

    tracing::info!(user_id = profile.id, %ip, "User logged in");

    Ok(Json(auth_response(&state, &profile)?))
}

/// GET /api/auth/profile
pub async fn get_profile(user: AuthUser) -> Json<DataResponse<UserResponse>> {
    Json(DataResponse {
        data: UserResponse::from(&user.profile),
    })
}

/// PUT /api/auth/profile
///
/// Patch names, phone and email. A changed email must still be unique;
/// an empty `phone` removes it.
pub async fn update_profile(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<UpdateProfileRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    user.ensure_persisted()?;
    let first_name = input.first_name.map(|s| s.trim().to_string());
    let last_name = input.last_name.map(|s| s.trim().to_string());
    let email = input.email.as_deref().map(normalize_email);
    // An explicit empty phone removes it.
    let phone = input.phone.map(|s| s.trim().to_string());

    if let Some(v) = &first_name {
        validate_name("first_name", v)?;
    }
    if let Some(v) = &last_name {
        validate_name("last_name", v)?;
    }
    if let Some(v) = phone.as_deref().filter(|p| !p.is_empty()) {
        validate_phone(v)?;
    }
    if let Some(v) = &email {
        validate_email(v)?;
        if UserRepo::email_exists(&state.pool, v, Some(user.user_id)).await? {
            return Err(CoreError::DuplicateEmail.into());
        }
    }

    let patch = UpdateProfile {
        first_name,
        last_name,
        email,
        phone,
    };
    let profile = UserRepo::update_profile(&state.pool, user.user_id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("User", user.user_id))?;

    tracing::info!(user_id = profile.id, "Profile updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(&profile),
    }))
}

/// PUT /api/auth/change-password
///
/// Requires the current password. Returns 204 No Content.
pub async fn change_password(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<ChangePasswordRequest>,
) -> AppResult<StatusCode> {
    user.ensure_persisted()?;
    require_field("current_password", input.current_password.as_deref())?;
    require_field("new_password", input.new_password.as_deref())?;
    let current = input.current_password.unwrap_or_default();
    let new = input.new_password.unwrap_or_default();

    let record = UserRepo::find_by_id(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user.user_id))?;

    let current_valid = verify_password(&current, &record.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !current_valid {
        return Err(AppError::unauthorized("Current password is incorrect"));
    }

    validate_password_strength(&new)?;
    if new == current {
        return Err(AppError::validation(
            "New password must differ from the current password",
        ));
    }

    let password_hash = hash_password(&new)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;
    UserRepo::update_password(&state.pool, record.id, &password_hash).await?;

    tracing::info!(user_id = record.id, "Password changed");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/auth/logout
///
/// Tokens are stateless; the client discards its copy. Returns 204 No Content.
pub async fn logout(user: AuthUser) -> StatusCode {
    tracing::info!(user_id = user.user_id, "User logged out");
    StatusCode::NO_CONTENT
}

/// DELETE /api/auth/account
///
/// Delete the caller's own account. Returns 204 No Content.
pub async fn delete_account(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<StatusCode> {
    user.ensure_persisted()?;
    let summary = UserRepo::delete_account(&state.pool, user.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("User", user.user_id))?;

    tracing::info!(
        user_id = user.user_id,
        cards_deactivated = summary.cards_deactivated,
        favorites_removed = summary.favorites_removed,
        likes_removed = summary.likes_removed,
        "Account deleted"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Issue a token for `profile` and build the response.
fn auth_response(state: &AppState, profile: &UserProfile) -> AppResult<AuthResponse> {
    let token = generate_token(profile.id, profile.role, &state.config.jwt)
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;

    Ok(AuthResponse {
        token,
        expires_in: state.config.jwt.expires_in_secs(),
        user: UserResponse::from(profile),
    })
}

/// Trim an optional string, treating blank as absent.
fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
