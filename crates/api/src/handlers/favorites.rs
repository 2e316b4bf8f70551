//! Handlers for the `/favorites` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use futurist_core::types::DbId;
use futurist_db::models::card::Card;
use futurist_db::models::favorite::FavoriteState;
use futurist_db::repositories::{CardRepo, FavoriteRepo};

use crate::error::{AppError, AppResult};
use crate::extract::AppPath;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/favorites/{card_id}
///
/// Flip the caller's favorite on someone else's active public card.
pub async fn toggle(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(card_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<FavoriteState>>> {
    user.ensure_persisted()?;
    let card = CardRepo::find_by_id(&state.pool, card_id)
        .await?
        .ok_or_else(|| AppError::not_found("Card", card_id))?;

    if card.owner_id == user.user_id {
        return Err(AppError::validation("You cannot favorite your own card"));
    }
    if !(card.is_public && card.is_active) {
        return Err(AppError::forbidden("Cannot favorite a private card"));
    }

    let favorite = FavoriteRepo::toggle(&state.pool, user.user_id, card_id).await?;
    tracing::debug!(
        card_id,
        user_id = user.user_id,
        is_favorite = favorite.is_favorite,
        "Favorite toggled"
    );

    Ok(Json(DataResponse { data: favorite }))
}

/// DELETE /api/favorites/{card_id}
pub async fn remove(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(card_id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    user.ensure_persisted()?;
    if !FavoriteRepo::remove(&state.pool, user.user_id, card_id).await? {
        return Err(AppError::not_found("Favorite", card_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/favorites
///
/// The caller's favorite cards, most recently favorited first. Cards that
/// have since gone private or inactive are left out.
pub async fn list(
    State(state): State<AppState>,
    user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Card>>>> {
    user.ensure_persisted()?;
    let cards = CardRepo::list_favorites_of(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: cards }))
}

/// GET /api/favorites/{card_id}/status
pub async fn status(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(card_id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<FavoriteState>>> {
    user.ensure_persisted()?;
    let is_favorite = FavoriteRepo::exists(&state.pool, user.user_id, card_id).await?;
    let favorites_count = FavoriteRepo::count_for_card(&state.pool, card_id).await?;

    Ok(Json(DataResponse {
        data: FavoriteState {
            is_favorite,
            favorites_count,
        },
    }))
}
