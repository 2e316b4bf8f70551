//! Favorite membership state.

use serde::Serialize;

/// Result of toggling a favorite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FavoriteState {
    pub is_favorite: bool,
    pub favorites_count: i64,
}
