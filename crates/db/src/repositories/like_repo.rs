//! Repository for the `card_likes` table.

use futurist_core::types::DbId;
use sqlx::PgPool;

use crate::models::card::LikeState;

/// Provides like membership operations.
pub struct LikeRepo;

impl LikeRepo {
    /// Flip the user's like on a card and return the new state.
    ///
    /// Removing first and inserting only when nothing was removed keeps each
    /// `(card, user)` pair unique under concurrent toggles.
    pub async fn toggle(
        pool: &PgPool,
        card_id: DbId,
        user_id: DbId,
    ) -> Result<LikeState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM card_likes WHERE card_id = $1 AND user_id = $2")
            .bind(card_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let liked = if removed.rows_affected() > 0 {
            false
        } else {
            sqlx::query(
                "INSERT INTO card_likes (card_id, user_id) VALUES ($1, $2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(card_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        };

        let likes_count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM card_likes WHERE card_id = $1")
                .bind(card_id)
                .fetch_one(&mut *tx)
                .await?;

        tx.commit().await?;
        Ok(LikeState { liked, likes_count })
    }
}
