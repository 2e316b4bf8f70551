pub mod admin;
pub mod analytics;
pub mod auth;
pub mod cards;
pub mod favorites;
pub mod health;

use axum::Router;

use crate::config::ServerConfig;
use crate::middleware::rate_limit::{api_rate_limiter, auth_rate_limiter};
use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /health                                          service + database health
///
/// /auth/register                                   register (public)
/// /auth/login                                      login (public, lockout-tracked)
/// /auth/logout                                     logout (requires auth)
/// /auth/profile                                    get, update (requires auth)
/// /auth/change-password                            change password (requires auth)
/// /auth/account                                    delete own account (requires auth)
///
/// /cards                                           list (public), create (business)
/// /cards/my-cards                                  caller's own cards
/// /cards/{id}                                      get (public), update, delete
/// /cards/{id}/like                                 toggle like (POST)
///
/// /favorites                                       caller's favorite cards
/// /favorites/{card_id}                             toggle (POST), remove (DELETE)
/// /favorites/{card_id}/status                      favorite state
///
/// /analytics/my-cards                              owner statistics (business)
///
/// /admin/users                                     list (admin only)
/// /admin/users/{id}                                get, delete
/// /admin/users/{id}/role                           change role (PATCH)
/// /admin/users/{id}/status                         activate/deactivate (PATCH)
/// /admin/cards                                     list, any visibility
/// /admin/cards/{id}/status                         moderate (PATCH)
/// /admin/cards/{id}/reset-views                    reset view counter (POST)
/// /admin/stats                                     platform statistics
/// /admin/security/blocked                          blocked IPs
/// /admin/security/blocked/{ip}                     lift a block (DELETE)
/// ```
///
/// When rate limiting is enabled, `/auth` gets the strict limiter and the
/// whole tree the relaxed one.
pub fn api_routes(config: &ServerConfig) -> Router<AppState> {
    let limits = &config.rate_limit;
    let trust = config.trust_proxy_headers;

    let mut auth_routes = auth::router();
    if limits.enabled {
        auth_routes = auth_routes.layer(auth_rate_limiter(limits, trust));
    }

    let routes = Router::new()
        .merge(health::router())
        .nest("/auth", auth_routes)
        .nest("/cards", cards::router())
        .nest("/favorites", favorites::router())
        .nest("/analytics", analytics::router())
        .nest("/admin", admin::router());

    if limits.enabled {
        routes.layer(api_rate_limiter(limits, trust))
    } else {
        routes
    }
}
