//! Aggregation queries for admin statistics and owner analytics.

use futurist_core::types::DbId;
use sqlx::PgPool;

use crate::models::analytics::{
    CardStats, CategoryCount, OwnerStats, PlatformStats, PlatformTotals, RoleCount,
};

/// Number of categories reported in platform stats.
const TOP_CATEGORIES: i64 = 10;

/// Read-only aggregation queries.
pub struct AnalyticsRepo;

impl AnalyticsRepo {
    /// Platform-wide totals, users per role and the most used categories.
    pub async fn platform_stats(pool: &PgPool) -> Result<PlatformStats, sqlx::Error> {
        let totals = sqlx::query_as::<_, PlatformTotals>(
            "SELECT
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL) AS total_users,
                (SELECT COUNT(*) FROM users WHERE deleted_at IS NULL AND is_active) AS active_users,
                (SELECT COUNT(*) FROM users
                  WHERE deleted_at IS NULL AND created_at >= NOW() - INTERVAL '30 days')
                  AS new_users_30d,
                (SELECT COUNT(*) FROM cards) AS total_cards,
                (SELECT COUNT(*) FROM cards WHERE is_public) AS public_cards,
                (SELECT COUNT(*) FROM cards WHERE is_active) AS active_cards,
                (SELECT COALESCE(SUM(views), 0)::BIGINT FROM cards) AS total_views,
                (SELECT COUNT(*) FROM card_likes) AS total_likes,
                (SELECT COUNT(*) FROM favorites) AS total_favorites",
        )
        .fetch_one(pool)
        .await?;

        let users_by_role = sqlx::query_as::<_, RoleCount>(
            "SELECT role, COUNT(*) AS count FROM users
             WHERE deleted_at IS NULL
             GROUP BY role
             ORDER BY role",
        )
        .fetch_all(pool)
        .await?;

        let top_categories = sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM cards
             WHERE category IS NOT NULL AND is_active
             GROUP BY category
             ORDER BY count DESC, category ASC
             LIMIT $1",
        )
        .bind(TOP_CATEGORIES)
        .fetch_all(pool)
        .await?;

        Ok(PlatformStats {
            totals,
            users_by_role,
            top_categories,
        })
    }

    /// Per-card statistics over one owner's cards, most viewed first.
    pub async fn owner_stats(pool: &PgPool, owner_id: DbId) -> Result<OwnerStats, sqlx::Error> {
        let cards = sqlx::query_as::<_, CardStats>(
            "SELECT c.id AS card_id, c.title, c.is_public, c.is_active, c.views,
                    (SELECT COUNT(*) FROM card_likes l WHERE l.card_id = c.id) AS likes_count,
                    (SELECT COUNT(*) FROM favorites f WHERE f.card_id = c.id) AS favorites_count,
                    c.created_at
             FROM cards c
             WHERE c.owner_id = $1
             ORDER BY c.views DESC, c.id ASC",
        )
        .bind(owner_id)
        .fetch_all(pool)
        .await?;

        Ok(OwnerStats::from_cards(cards))
    }
}
