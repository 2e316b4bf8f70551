//! Repository for the `users` table.

use futurist_core::roles::Role;
use futurist_core::types::DbId;
use sqlx::PgPool;

use crate::models::user::{
    AccountDeletion, CreateUser, UpdateProfile, User, UserListParams, UserProfile,
};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, first_name, last_name, email, password_hash, phone, role, is_active, \
                       last_login_at, login_count, deleted_at, created_at, updated_at";

/// Same as [`COLUMNS`] minus the password hash.
const PROFILE_COLUMNS: &str = "id, first_name, last_name, email, phone, role, is_active, \
                               last_login_at, login_count, deleted_at, created_at, updated_at";

/// Provides CRUD operations for users.
pub struct UserRepo;

impl UserRepo {
    /// Insert a new user, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateUser) -> Result<User, sqlx::Error> {
        let query = format!(
            "INSERT INTO users (first_name, last_name, email, password_hash, phone, role)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, User>(&query)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.password_hash)
            .bind(&input.phone)
            .bind(input.role.as_str())
            .fetch_one(pool)
            .await
    }

    /// Find a live (not deleted) user by internal ID, including the password hash.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<User>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a live user by normalized email.
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<User>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM users WHERE email = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, User>(&query)
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Find a live user's profile (no password hash).
    pub async fn find_profile(pool: &PgPool, id: DbId) -> Result<Option<UserProfile>, sqlx::Error> {
        let query =
            format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1 AND deleted_at IS NULL");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find any user's profile, deleted accounts included. Admin use.
    pub async fn find_profile_any(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!("SELECT {PROFILE_COLUMNS} FROM users WHERE id = $1");
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether an email is taken by any account other than `exclude_id`.
    ///
    /// Deleted accounts keep their email reserved.
    pub async fn email_exists(
        pool: &PgPool,
        email: &str,
        exclude_id: Option<DbId>,
    ) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            "SELECT EXISTS(
                SELECT 1 FROM users WHERE email = $1 AND ($2::BIGINT IS NULL OR id <> $2)
             )",
        )
        .bind(email)
        .bind(exclude_id)
        .fetch_one(pool)
        .await?;
        Ok(exists)
    }

    /// List users for the admin console, newest first.
    pub async fn list(
        pool: &PgPool,
        params: &UserListParams,
        search_pattern: Option<&str>,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<UserProfile>, sqlx::Error> {
        let query = format!(
            "SELECT {PROFILE_COLUMNS} FROM users
             WHERE ($1::TEXT IS NULL OR role = $1)
               AND ($2::TEXT IS NULL
                    OR email ILIKE '%' || $2 || '%'
                    OR first_name ILIKE '%' || $2 || '%'
                    OR last_name ILIKE '%' || $2 || '%')
               AND ($3::BOOLEAN OR deleted_at IS NULL)
             ORDER BY created_at DESC, id DESC
             LIMIT $4 OFFSET $5"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(params.role.as_deref())
            .bind(search_pattern)
            .bind(params.include_deleted)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count users matching the same filters as [`UserRepo::list`].
    pub async fn count(
        pool: &PgPool,
        params: &UserListParams,
        search_pattern: Option<&str>,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM users
             WHERE ($1::TEXT IS NULL OR role = $1)
               AND ($2::TEXT IS NULL
                    OR email ILIKE '%' || $2 || '%'
                    OR first_name ILIKE '%' || $2 || '%'
                    OR last_name ILIKE '%' || $2 || '%')
               AND ($3::BOOLEAN OR deleted_at IS NULL)",
        )
        .bind(params.role.as_deref())
        .bind(search_pattern)
        .bind(params.include_deleted)
        .fetch_one(pool)
        .await
    }

    /// Apply a profile patch. Only non-`None` fields are written.
    ///
    /// Returns `None` if no live row with the given `id` exists.
    pub async fn update_profile(
        pool: &PgPool,
        id: DbId,
        input: &UpdateProfile,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                email = COALESCE($4, email),
                phone = CASE WHEN $5::TEXT IS NULL THEN phone ELSE NULLIF($5, '') END
             WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(&input.first_name)
            .bind(&input.last_name)
            .bind(&input.email)
            .bind(&input.phone)
            .fetch_optional(pool)
            .await
    }

    /// Update a user's password hash. Returns `true` if the row was updated.
    pub async fn update_password(
        pool: &PgPool,
        id: DbId,
        password_hash: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2 WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(password_hash)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Change a user's role.
    pub async fn set_role(
        pool: &PgPool,
        id: DbId,
        role: Role,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET role = $2 WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(role.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Activate or deactivate a user.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET is_active = $2 WHERE id = $1 AND deleted_at IS NULL
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }

    /// Record a successful login: set `last_login_at` to now and bump
    /// `login_count`.
    pub async fn record_successful_login(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<UserProfile>, sqlx::Error> {
        let query = format!(
            "UPDATE users SET
                last_login_at = NOW(),
                login_count = login_count + 1
             WHERE id = $1
             RETURNING {PROFILE_COLUMNS}"
        );
        sqlx::query_as::<_, UserProfile>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Delete an account.
    ///
    /// In a single transaction: deactivates the user's cards, removes their
    /// favorites and likes, then marks the user deleted and inactive. The row
    /// (and its email) is kept. Returns `None` if no live user matched.
    pub async fn delete_account(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<AccountDeletion>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let marked = sqlx::query(
            "UPDATE users SET is_active = false, deleted_at = NOW()
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;
        if marked.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(None);
        }

        let cards = sqlx::query(
            "UPDATE cards SET is_active = false WHERE owner_id = $1 AND is_active = true",
        )
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let favorites = sqlx::query("DELETE FROM favorites WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let likes = sqlx::query("DELETE FROM card_likes WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(Some(AccountDeletion {
            cards_deactivated: cards.rows_affected(),
            favorites_removed: favorites.rows_affected(),
            likes_removed: likes.rows_affected(),
        }))
    }
}
