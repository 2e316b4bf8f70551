//! Role-based access control (RBAC) guards.
//!
//! Each extractor wraps [`AuthUser`] and rejects requests whose role does not
//! grant the needed capability. Unauthenticated requests fail with 401 before
//! the role is looked at; insufficient roles fail with 403.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use futurist_core::cards::can_modify_card;
use futurist_core::roles::Role;
use futurist_core::types::DbId;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

impl AuthUser {
    /// Reject with 403 unless the user's role is one of `roles`.
    pub fn authorize(&self, roles: &[Role]) -> Result<(), AppError> {
        if roles.contains(&self.role) {
            Ok(())
        } else {
            let allowed: Vec<&str> = roles.iter().map(|r| r.as_str()).collect();
            Err(AppError::forbidden(format!(
                "Role '{}' is not allowed to access this resource (requires {})",
                self.role,
                allowed.join(" or ")
            )))
        }
    }

    /// Reject identities attached by the development fallback.
    ///
    /// They have no user row, so any operation that reads or writes data
    /// keyed by the caller's id is refused with 403.
    pub fn ensure_persisted(&self) -> Result<(), AppError> {
        if self.synthetic {
            return Err(AppError::forbidden(
                "Development user has no stored account; sign in with a real token",
            ));
        }
        Ok(())
    }

    /// Reject with 403 unless the user owns the resource or is an admin.
    pub fn ensure_owner_or_admin(&self, owner_id: DbId) -> Result<(), AppError> {
        if can_modify_card(owner_id, self.user_id, self.role) {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Not authorized to modify this resource",
            ))
        }
    }
}

/// Requires a business-capable account (business or admin).
///
/// ```ignore
/// async fn handler(RequireBusiness(user): RequireBusiness) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireBusiness(pub AuthUser);

impl FromRequestParts<AppState> for RequireBusiness {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_business() {
            return Err(AppError::forbidden("Business account required"));
        }
        user.ensure_persisted()?;
        Ok(RequireBusiness(user))
    }
}

/// Requires the `admin` role. Rejects with 403 Forbidden otherwise.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.role.is_admin() {
            return Err(AppError::forbidden("Admin role required"));
        }
        user.ensure_persisted()?;
        Ok(RequireAdmin(user))
    }
}
