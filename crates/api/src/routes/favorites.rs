//! Route definitions for the `/favorites` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::favorites;
use crate::state::AppState;

/// Routes mounted at `/favorites`.
///
/// ```text
/// GET    /                    -> list
/// POST   /{card_id}           -> toggle
/// DELETE /{card_id}           -> remove
/// GET    /{card_id}/status    -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(favorites::list))
        .route(
            "/{card_id}",
            post(favorites::toggle).delete(favorites::remove),
        )
        .route("/{card_id}/status", get(favorites::status))
}
