//! JWT-based authentication extractors for Axum handlers.
//!
//! The token's subject is resolved to a live user row on every request, so a
//! deleted or deactivated account loses access immediately even while its
//! token is still valid.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use futurist_core::roles::Role;
use futurist_core::types::DbId;
use futurist_db::models::user::UserProfile;
use futurist_db::repositories::UserRepo;

use crate::auth::jwt::{decode_unverified, verify_token, TokenError, UnverifiedClaims};
use crate::error::AppError;
use crate::state::AppState;

/// Id carried by the synthetic development user when the token names none.
pub const DEV_USER_ID: DbId = 0;

/// Email carried by the synthetic development user when the token names none.
pub const DEV_USER_EMAIL: &str = "dev@futurist.local";

/// Authenticated user extracted from a Bearer token in the `Authorization` header.
///
/// ```ignore
/// async fn my_handler(user: AuthUser) -> AppResult<Json<()>> {
///     tracing::info!(user_id = user.user_id, role = %user.role, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user_id: DbId,
    pub role: Role,
    /// The user record loaded for this request (no password hash).
    pub profile: UserProfile,
    /// Set for identities attached by the development fallback. These never
    /// exist in the database.
    pub synthetic: bool,
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await? {
            Some(user) => Ok(user),
            None if state.config.dev_fallback_active() => {
                tracing::debug!("Dev auth fallback: no token, attaching default user");
                Ok(synthetic_user(None))
            }
            None => Err(AppError::unauthorized("Not authorized, no token")),
        }
    }
}

/// Like [`AuthUser`], but a request without an `Authorization` header is
/// anonymous instead of rejected. A header that is present must still be valid.
#[derive(Debug, Clone)]
pub struct OptionalAuthUser(pub Option<AuthUser>);

impl OptionalAuthUser {
    /// `(id, role)` of the viewer, if any.
    pub fn viewer(&self) -> Option<(DbId, Role)> {
        self.0.as_ref().map(|u| (u.user_id, u.role))
    }
}

impl FromRequestParts<AppState> for OptionalAuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(OptionalAuthUser(authenticate(parts, state).await?))
    }
}

/// Resolve the `Authorization` header. `Ok(None)` means no header was sent.
async fn authenticate(parts: &Parts, state: &AppState) -> Result<Option<AuthUser>, AppError> {
    let Some(header) = parts.headers.get(AUTHORIZATION) else {
        return Ok(None);
    };
    let dev_fallback = state.config.dev_fallback_active();

    let token = header
        .to_str()
        .ok()
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    let Some(token) = token else {
        if dev_fallback {
            return Ok(Some(synthetic_user(None)));
        }
        return Err(AppError::unauthorized(
            "Not authorized, invalid Authorization format. Expected: Bearer <token>",
        ));
    };

    match verify_token(token, &state.config.jwt) {
        Ok(claims) => load_user(state, claims.sub).await.map(Some),
        Err(e) if dev_fallback => {
            tracing::debug!(error = %e, "Dev auth fallback: using unverified token payload");
            Ok(Some(synthetic_user(decode_unverified(token))))
        }
        Err(TokenError::Expired) => Err(AppError::unauthorized("Not authorized, token expired")),
        Err(TokenError::Invalid) => Err(AppError::unauthorized("Not authorized, token invalid")),
    }
}

/// Load the token's subject, rejecting deleted and deactivated accounts.
async fn load_user(state: &AppState, user_id: DbId) -> Result<AuthUser, AppError> {
    let profile = UserRepo::find_profile(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::unauthorized("Not authorized, user no longer exists"))?;

    if !profile.is_active {
        return Err(AppError::forbidden("Account is deactivated"));
    }

    Ok(AuthUser {
        user_id: profile.id,
        role: profile.role,
        profile,
        synthetic: false,
    })
}

/// Build the development identity, taking id, role and email from an
/// unverified payload where present. Defaults to a business account.
pub fn synthetic_user(claims: Option<UnverifiedClaims>) -> AuthUser {
    let claims = claims.unwrap_or_default();
    let user_id = claims.sub.unwrap_or(DEV_USER_ID);
    let role = claims.role.unwrap_or(Role::Business);
    let now = Utc::now();

    let profile = UserProfile {
        id: user_id,
        first_name: "Dev".into(),
        last_name: "User".into(),
        email: claims.email.unwrap_or_else(|| DEV_USER_EMAIL.into()),
        phone: None,
        role,
        is_active: true,
        last_login_at: None,
        login_count: 0,
        deleted_at: None,
        created_at: now,
        updated_at: now,
    };

    AuthUser {
        user_id,
        role,
        profile,
        synthetic: true,
    }
}
