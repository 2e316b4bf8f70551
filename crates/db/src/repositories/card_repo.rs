//! Repository for the `cards` table.

use futurist_core::cards::CardFilter;
use futurist_core::types::DbId;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::card::{Card, CreateCard, UpdateCard};

/// Column list shared across queries, with computed like/favorite counts.
///
/// Assumes the table is aliased `c`.
const COLUMNS: &str = "c.id, c.owner_id, c.title, c.subtitle, c.description, c.email, c.phone, \
                       c.website, c.address, c.image_url, c.image_alt, c.category, c.tags, \
                       c.theme, c.is_public, c.is_active, c.views, \
                       (SELECT COUNT(*) FROM card_likes l WHERE l.card_id = c.id) AS likes_count, \
                       (SELECT COUNT(*) FROM favorites f WHERE f.card_id = c.id) AS favorites_count, \
                       c.created_at, c.updated_at";

/// `WHERE` clause matching a [`CardFilter`], parameters `$1`..`$6`.
const FILTER_CLAUSE: &str = "($1::TEXT IS NULL OR c.category = $1)
   AND ($2::TEXT IS NULL
        OR c.title ILIKE '%' || $2 || '%'
        OR c.subtitle ILIKE '%' || $2 || '%'
        OR c.description ILIKE '%' || $2 || '%')
   AND ($3::TEXT IS NULL OR $3 = ANY(c.tags))
   AND ($4::BIGINT IS NULL OR c.owner_id = $4)
   AND ($5::BOOLEAN IS NULL OR c.is_public = $5)
   AND ($6::BOOLEAN IS NULL OR c.is_active = $6)";

/// Provides CRUD operations for cards.
pub struct CardRepo;

impl CardRepo {
    /// Insert a new card, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateCard) -> Result<Card, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                INSERT INTO cards (owner_id, title, subtitle, description, email, phone,
                                   website, address, image_url, image_alt, category, tags,
                                   theme, is_public)
                VALUES ($1, $2, NULLIF($3, ''), NULLIF($4, ''), NULLIF($5, ''),
                        NULLIF($6, ''), NULLIF($7, ''), $8, NULLIF($9, ''),
                        NULLIF($10, ''), NULLIF($11, ''), $12, $13, $14)
                RETURNING *
             )
             SELECT {COLUMNS} FROM c"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.description)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.website)
            .bind(Json(&input.address))
            .bind(&input.image_url)
            .bind(&input.image_alt)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(Json(&input.theme))
            .bind(input.is_public)
            .fetch_one(pool)
            .await
    }

    /// Find a card by ID regardless of visibility.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM cards c WHERE c.id = $1");
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List cards matching a filter, ordered by its sort key.
    pub async fn list(pool: &PgPool, filter: &CardFilter) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards c
             WHERE {FILTER_CLAUSE}
             ORDER BY {order}
             LIMIT $7 OFFSET $8",
            order = filter.sort.order_by(),
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(&filter.category)
            .bind(&filter.search_pattern)
            .bind(&filter.tag)
            .bind(filter.owner_id)
            .bind(filter.is_public)
            .bind(filter.is_active)
            .bind(filter.limit)
            .bind(filter.offset)
            .fetch_all(pool)
            .await
    }

    /// Count cards matching a filter, ignoring pagination.
    pub async fn count(pool: &PgPool, filter: &CardFilter) -> Result<i64, sqlx::Error> {
        let query = format!("SELECT COUNT(*) FROM cards c WHERE {FILTER_CLAUSE}");
        sqlx::query_scalar(&query)
            .bind(&filter.category)
            .bind(&filter.search_pattern)
            .bind(&filter.tag)
            .bind(filter.owner_id)
            .bind(filter.is_public)
            .bind(filter.is_active)
            .fetch_one(pool)
            .await
    }

    /// Cards a user has favorited, most recently favorited first.
    ///
    /// Cards that have since become private or inactive are left out.
    pub async fn list_favorites_of(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<Card>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM cards c
             JOIN favorites fav ON fav.card_id = c.id
             WHERE fav.user_id = $1 AND c.is_public = true AND c.is_active = true
             ORDER BY fav.created_at DESC"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// Update a card. Only non-`None` fields in `input` are applied; an empty
    /// string clears an optional text column.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateCard,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!(
            "WITH c AS (
                UPDATE cards SET
                    title = COALESCE($2, title),
                    subtitle = CASE WHEN $3::TEXT IS NULL THEN subtitle ELSE NULLIF($3, '') END,
                    description = CASE WHEN $4::TEXT IS NULL THEN description ELSE NULLIF($4, '') END,
                    email = CASE WHEN $5::TEXT IS NULL THEN email ELSE NULLIF($5, '') END,
                    phone = CASE WHEN $6::TEXT IS NULL THEN phone ELSE NULLIF($6, '') END,
                    website = CASE WHEN $7::TEXT IS NULL THEN website ELSE NULLIF($7, '') END,
                    address = COALESCE($8, address),
                    image_url = CASE WHEN $9::TEXT IS NULL THEN image_url ELSE NULLIF($9, '') END,
                    image_alt = CASE WHEN $10::TEXT IS NULL THEN image_alt ELSE NULLIF($10, '') END,
                    category = CASE WHEN $11::TEXT IS NULL THEN category ELSE NULLIF($11, '') END,
                    tags = COALESCE($12, tags),
                    theme = COALESCE($13, theme),
                    is_public = COALESCE($14, is_public)
                WHERE id = $1
                RETURNING *
             )
             SELECT {COLUMNS} FROM c"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.subtitle)
            .bind(&input.description)
            .bind(&input.email)
            .bind(&input.phone)
            .bind(&input.website)
            .bind(input.address.as_ref().map(Json))
            .bind(&input.image_url)
            .bind(&input.image_alt)
            .bind(&input.category)
            .bind(&input.tags)
            .bind(input.theme.as_ref().map(Json))
            .bind(input.is_public)
            .fetch_optional(pool)
            .await
    }

    /// Hard-delete a card. Likes and favorites cascade.
    ///
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM cards WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Atomically bump the view counter, returning the new value.
    pub async fn increment_views(pool: &PgPool, id: DbId) -> Result<Option<i64>, sqlx::Error> {
        sqlx::query_scalar("UPDATE cards SET views = views + 1 WHERE id = $1 RETURNING views")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Reset the view counter to zero. Admin moderation only.
    pub async fn reset_views(pool: &PgPool, id: DbId) -> Result<Option<Card>, sqlx::Error> {
        let query = format!(
            "WITH c AS (UPDATE cards SET views = 0 WHERE id = $1 RETURNING *)
             SELECT {COLUMNS} FROM c"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Activate or deactivate a card.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<Card>, sqlx::Error> {
        let query = format!(
            "WITH c AS (UPDATE cards SET is_active = $2 WHERE id = $1 RETURNING *)
             SELECT {COLUMNS} FROM c"
        );
        sqlx::query_as::<_, Card>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
