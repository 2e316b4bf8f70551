//! Moderation handlers under `/admin`. Every route requires an admin.

use std::net::IpAddr;

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use futurist_core::cards::{CardListParams, ListScope};
use futurist_core::roles::Role;
use futurist_core::search::{
    clamp_limit, clamp_offset, escape_like, normalize_search_term, DEFAULT_PAGE_LIMIT,
    MAX_PAGE_LIMIT,
};
use futurist_core::types::{DbId, Timestamp};
use futurist_db::models::analytics::PlatformStats;
use futurist_db::models::card::Card;
use futurist_db::models::user::{UserListParams, UserResponse};
use futurist_db::repositories::{AnalyticsRepo, CardRepo, UserRepo};
use serde::{Deserialize, Serialize};

use super::cards::list_with_scope;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::rbac::RequireAdmin;
use crate::response::{DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

/// Request body for `PATCH /admin/users/{id}/role`.
#[derive(Debug, Deserialize)]
pub struct UpdateRoleRequest {
    pub role: String,
}

/// Request body for the user and card status endpoints.
#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub is_active: bool,
}

/// A blocked IP as shown to moderators.
#[derive(Debug, Serialize)]
pub struct BlockedIpResponse {
    pub ip: IpAddr,
    pub blocked_at: Timestamp,
    pub remaining_secs: i64,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<UserListParams>,
) -> AppResult<Json<PagedResponse<UserResponse>>> {
    let role = params
        .role
        .as_deref()
        .map(str::trim)
        .filter(|r| !r.is_empty())
        .map(str::parse::<Role>)
        .transpose()?;
    let search_pattern =
        normalize_search_term(params.search.as_deref()).map(|t| escape_like(&t));
    let limit = clamp_limit(params.limit, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT);
    let offset = clamp_offset(params.offset);

    let filter = UserListParams {
        role: role.map(|r| r.as_str().to_string()),
        ..params
    };

    let users =
        UserRepo::list(&state.pool, &filter, search_pattern.as_deref(), limit, offset).await?;
    let total = UserRepo::count(&state.pool, &filter, search_pattern.as_deref()).await?;

    Ok(Json(PagedResponse {
        data: users.iter().map(UserResponse::from).collect(),
        pagination: Pagination {
            total,
            limit,
            offset,
        },
    }))
}

/// GET /api/admin/users/{id}
///
/// Deleted accounts are still returned so moderators can inspect them.
pub async fn get_user(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let profile = UserRepo::find_profile_any(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;
    Ok(Json(DataResponse {
        data: UserResponse::from(&profile),
    }))
}

/// PATCH /api/admin/users/{id}/role
pub async fn update_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateRoleRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id {
        return Err(AppError::validation("You cannot change your own role"));
    }
    let role: Role = input.role.parse()?;

    let profile = UserRepo::set_role(&state.pool, id, role)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(admin_id = admin.user_id, user_id = id, role = %role, "User role changed");
    Ok(Json(DataResponse {
        data: UserResponse::from(&profile),
    }))
}

/// PATCH /api/admin/users/{id}/status
pub async fn update_user_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    if id == admin.user_id && !input.is_active {
        return Err(AppError::validation("You cannot deactivate your own account"));
    }

    let profile = UserRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        is_active = input.is_active,
        "User status changed"
    );
    Ok(Json(DataResponse {
        data: UserResponse::from(&profile),
    }))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::validation(
            "Use the account endpoint to delete your own account",
        ));
    }

    let summary = UserRepo::delete_account(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("User", id))?;

    tracing::info!(
        admin_id = admin.user_id,
        user_id = id,
        cards_deactivated = summary.cards_deactivated,
        "User deleted by admin"
    );
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Cards
// ---------------------------------------------------------------------------

/// GET /api/admin/cards
pub async fn list_cards(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
    AppQuery(params): AppQuery<CardListParams>,
) -> AppResult<Json<PagedResponse<Card>>> {
    list_with_scope(&state, &params, ListScope::Admin)
        .await
        .map(Json)
}

/// PATCH /api/admin/cards/{id}/status
pub async fn update_card_status(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<Card>>> {
    let card = CardRepo::set_active(&state.pool, id, input.is_active)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;

    tracing::info!(
        admin_id = admin.user_id,
        card_id = id,
        is_active = input.is_active,
        "Card status changed"
    );
    Ok(Json(DataResponse { data: card }))
}

/// POST /api/admin/cards/{id}/reset-views
pub async fn reset_views(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Card>>> {
    let card = CardRepo::reset_views(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;

    tracing::info!(admin_id = admin.user_id, card_id = id, "Card views reset");
    Ok(Json(DataResponse { data: card }))
}

// ---------------------------------------------------------------------------
// Platform
// ---------------------------------------------------------------------------

/// GET /api/admin/stats
pub async fn stats(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> AppResult<Json<DataResponse<PlatformStats>>> {
    let stats = AnalyticsRepo::platform_stats(&state.pool).await?;
    Ok(Json(DataResponse { data: stats }))
}

/// GET /api/admin/security/blocked
pub async fn blocked_ips(
    State(state): State<AppState>,
    RequireAdmin(_admin): RequireAdmin,
) -> Json<DataResponse<Vec<BlockedIpResponse>>> {
    let blocked = state
        .login_attempts
        .blocked_ips()
        .await
        .into_iter()
        .map(|b| BlockedIpResponse {
            ip: b.ip,
            blocked_at: b.blocked_at,
            remaining_secs: b.remaining.num_seconds(),
        })
        .collect();
    Json(DataResponse { data: blocked })
}

/// DELETE /api/admin/security/blocked/{ip}
pub async fn unblock_ip(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    AppPath(raw_ip): AppPath<String>,
) -> AppResult<StatusCode> {
    let ip: IpAddr = raw_ip
        .parse()
        .map_err(|_| AppError::validation(format!("'{raw_ip}' is not a valid IP address")))?;

    if !state.login_attempts.unblock(ip).await {
        return Err(AppError::NotFound(format!("IP {ip} is not blocked")));
    }

    tracing::info!(admin_id = admin.user_id, %ip, "IP unblocked");
    Ok(StatusCode::NO_CONTENT)
}
