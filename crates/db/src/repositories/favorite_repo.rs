//! Repository for the `favorites` table.

use futurist_core::types::DbId;
use sqlx::PgPool;

use crate::models::favorite::FavoriteState;

/// Provides favorite membership operations.
pub struct FavoriteRepo;

impl FavoriteRepo {
    /// Flip the user's favorite on a card and return the new state.
    pub async fn toggle(
        pool: &PgPool,
        user_id: DbId,
        card_id: DbId,
    ) -> Result<FavoriteState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND card_id = $2")
            .bind(user_id)
            .bind(card_id)
            .execute(&mut *tx)
            .await?;

        let is_favorite = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO favorites (user_id, card_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(user_id)
            .bind(card_id)
            .execute(&mut *tx)
            .await?;
            true
        };

        let favorites_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE card_id = $1")
                .bind(card_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(FavoriteState {
            is_favorite,
            favorites_count,
        })
    }

    /// Remove a favorite. Returns `true` if one existed.
    pub async fn remove(pool: &PgPool, user_id: DbId, card_id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM favorites WHERE user_id = $1 AND card_id = $2")
            .bind(user_id)
            .bind(card_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Whether the user has favorited the card.
    pub async fn exists(pool: &PgPool, user_id: DbId, card_id: DbId) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM favorites WHERE user_id = $1 AND card_id = $2)",
        )
        .bind(user_id)
        .bind(card_id)
        .fetch_one(pool)
        .await
    }

    /// Number of users who favorited the card.
    pub async fn count_for_card(pool: &PgPool, card_id: DbId) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM favorites WHERE card_id = $1")
            .bind(card_id)
            .fetch_one(pool)
            .await
    }
}
