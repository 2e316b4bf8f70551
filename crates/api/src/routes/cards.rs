//! Route definitions for the `/cards` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::cards;
use crate::state::AppState;

/// Routes mounted at `/cards`.
///
/// ```text
/// GET    /            -> list
/// POST   /            -> create
/// GET    /my-cards    -> my_cards
/// GET    /{id}        -> get
/// PUT    /{id}        -> update
/// DELETE /{id}        -> delete
/// POST   /{id}/like   -> toggle_like
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(cards::list).post(cards::create))
        .route("/my-cards", get(cards::my_cards))
        .route(
            "/{id}",
            get(cards::get).put(cards::update).delete(cards::delete),
        )
        .route("/{id}/like", post(cards::toggle_like))
}
