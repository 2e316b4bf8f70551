//! Route definitions for the `/admin` resource.

use axum::routing::{delete, get, patch, post};
use axum::Router;

use crate::handlers::admin;
use crate::state::AppState;

/// Routes mounted at `/admin`.
///
/// All routes require the `admin` role (enforced by handler extractors).
///
/// ```text
/// GET    /users                    -> list_users
/// GET    /users/{id}               -> get_user
/// DELETE /users/{id}               -> delete_user
/// PATCH  /users/{id}/role          -> update_role
/// PATCH  /users/{id}/status        -> update_user_status
/// GET    /cards                    -> list_cards
/// PATCH  /cards/{id}/status        -> update_card_status
/// POST   /cards/{id}/reset-views   -> reset_views
/// GET    /stats                    -> stats
/// GET    /security/blocked         -> blocked_ips
/// DELETE /security/blocked/{ip}    -> unblock_ip
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(admin::list_users))
        .route(
            "/users/{id}",
            get(admin::get_user).delete(admin::delete_user),
        )
        .route("/users/{id}/role", patch(admin::update_role))
        .route("/users/{id}/status", patch(admin::update_user_status))
        .route("/cards", get(admin::list_cards))
        .route("/cards/{id}/status", patch(admin::update_card_status))
        .route("/cards/{id}/reset-views", post(admin::reset_views))
        .route("/stats", get(admin::stats))
        .route("/security/blocked", get(admin::blocked_ips))
        .route("/security/blocked/{ip}", delete(admin::unblock_ip))
}
