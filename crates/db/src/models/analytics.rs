//! Aggregation results for the admin dashboard and owner analytics.

use futurist_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// Number of live users holding a role.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RoleCount {
    pub role: String,
    pub count: i64,
}

/// Number of active cards in a category.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

/// Scalar platform totals, fetched in one row.
#[derive(Debug, Clone, Default, FromRow, Serialize)]
pub struct PlatformTotals {
    pub total_users: i64,
    pub active_users: i64,
    pub new_users_30d: i64,
    pub total_cards: i64,
    pub public_cards: i64,
    pub active_cards: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_favorites: i64,
}

/// Platform-wide statistics for `GET /api/admin/stats`.
#[derive(Debug, Clone, Serialize)]
pub struct PlatformStats {
    #[serde(flatten)]
    pub totals: PlatformTotals,
    pub users_by_role: Vec<RoleCount>,
    pub top_categories: Vec<CategoryCount>,
}

/// Per-card row in an owner's analytics.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CardStats {
    pub card_id: DbId,
    pub title: String,
    pub is_public: bool,
    pub is_active: bool,
    pub views: i64,
    pub likes_count: i64,
    pub favorites_count: i64,
    pub created_at: Timestamp,
}

/// Aggregated analytics over one owner's cards.
#[derive(Debug, Clone, Serialize)]
pub struct OwnerStats {
    pub total_cards: i64,
    pub total_views: i64,
    pub total_likes: i64,
    pub total_favorites: i64,
    pub cards: Vec<CardStats>,
}

impl OwnerStats {
    /// Fold per-card rows into totals.
    pub fn from_cards(cards: Vec<CardStats>) -> Self {
        let total_views = cards.iter().map(|c| c.views).sum();
        let total_likes = cards.iter().map(|c| c.likes_count).sum();
        let total_favorites = cards.iter().map(|c| c.favorites_count).sum();
        Self {
            total_cards: cards.len() as i64,
            total_views,
            total_likes,
            total_favorites,
            cards,
        }
    }
}
