//! User entity model and DTOs.

use futurist_core::roles::Role;
use futurist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row from the `users` table.
///
/// Contains the password hash -- NEVER serialize this to API responses directly.
/// Use [`UserResponse`] for external-facing output.
#[derive(Debug, Clone, FromRow)]
pub struct User {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub login_count: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// User row without the password hash.
///
/// This is what the auth extractor loads and attaches to each request.
#[derive(Debug, Clone, FromRow)]
pub struct UserProfile {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub login_count: i32,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            first_name: user.first_name,
            last_name: user.last_name,
            email: user.email,
            phone: user.phone,
            role: user.role,
            is_active: user.is_active,
            last_login_at: user.last_login_at,
            login_count: user.login_count,
            deleted_at: user.deleted_at,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Public user representation. Capability flags are derived from the role.
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: DbId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub is_business: bool,
    pub is_admin: bool,
    pub is_active: bool,
    pub last_login_at: Option<Timestamp>,
    pub login_count: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
}

impl From<&UserProfile> for UserResponse {
    fn from(p: &UserProfile) -> Self {
        let caps = p.role.capabilities();
        Self {
            id: p.id,
            first_name: p.first_name.clone(),
            last_name: p.last_name.clone(),
            email: p.email.clone(),
            phone: p.phone.clone(),
            role: p.role,
            is_business: caps.is_business,
            is_admin: caps.is_admin,
            is_active: p.is_active,
            last_login_at: p.last_login_at,
            login_count: p.login_count,
            deleted_at: p.deleted_at,
            created_at: p.created_at,
        }
    }
}

/// DTO for creating a new user. `email` must already be normalized.
#[derive(Debug)]
pub struct CreateUser {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
}

/// DTO for a user editing their own profile. `None` leaves a column
/// unchanged; `phone: Some("")` removes the phone number.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Query parameters for the admin user listing.
#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    pub role: Option<String>,
    pub search: Option<String>,
    #[serde(default)]
    pub include_deleted: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

/// Rows touched by an account deletion.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct AccountDeletion {
    pub cards_deactivated: u64,
    pub favorites_removed: u64,
    pub likes_removed: u64,
}
