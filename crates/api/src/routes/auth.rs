//! Route definitions for the `/auth` resource.

use axum::routing::{delete, get, post, put};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST   /register         -> register
/// POST   /login            -> login
/// POST   /logout           -> logout (requires auth)
/// GET    /profile          -> get_profile
/// PUT    /profile          -> update_profile
/// PUT    /change-password  -> change_password
/// DELETE /account          -> delete_account
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route(
            "/profile",
            get(auth::get_profile).put(auth::update_profile),
        )
        .route("/change-password", put(auth::change_password))
        .route("/account", delete(auth::delete_account))
}
