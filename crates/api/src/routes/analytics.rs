//! Route definitions for the `/analytics` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::analytics;
use crate::state::AppState;

/// Routes mounted at `/analytics`.
pub fn router() -> Router<AppState> {
    Router::new().route("/my-cards", get(analytics::my_cards))
}
