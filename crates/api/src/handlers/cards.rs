//! Handlers for the `/cards` resource.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use futurist_core::cards::{can_view_card, counts_as_view, CardFilter, CardListParams, ListScope};
use futurist_core::error::CoreError;
use futurist_core::roles::Role;
use futurist_core::types::DbId;
use futurist_core::validation::{
    normalize_email, normalize_tags, validate_email, validate_hex_color, validate_length,
    validate_phone, validate_website, MAX_DESCRIPTION_LENGTH, MAX_TITLE_LENGTH,
};
use futurist_db::models::card::{Card, CardAddress, CardTheme, CreateCard, LikeState, UpdateCard};
use futurist_db::repositories::{CardRepo, LikeRepo};
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath, AppQuery};
use crate::middleware::auth::{AuthUser, OptionalAuthUser};
use crate::response::{DataResponse, PagedResponse, Pagination};
use crate::state::AppState;

/// Maximum length of short free-text fields (alt text, category, address parts).
const MAX_SHORT_FIELD_LENGTH: usize = 256;

/// Request body for `POST /cards` and `PUT /cards/{id}`.
///
/// On create `title` is required; on update every field is optional and only
/// the supplied ones change.
#[derive(Debug, Default, Deserialize)]
pub struct CardInput {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Option<CardAddress>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub theme: Option<CardTheme>,
    pub is_public: Option<bool>,
}

impl CardInput {
    /// Trim, normalize and validate every supplied field.
    ///
    /// An explicit empty string for an optional text field is kept as
    /// `Some("")`, which clears the column; an absent field leaves it alone.
    /// The title can be changed but never blanked.
    fn normalized(self) -> Result<UpdateCard, CoreError> {
        let title = match trimmed(self.title) {
            Some(t) if t.is_empty() => {
                return Err(CoreError::Validation("title cannot be empty".into()))
            }
            other => other,
        };
        let subtitle = trimmed(self.subtitle);
        let description = trimmed(self.description);
        let email = trimmed(self.email).map(|e| normalize_email(&e));
        let phone = trimmed(self.phone);
        let website = trimmed(self.website);
        let image_url = trimmed(self.image_url);
        let image_alt = trimmed(self.image_alt);
        let category = trimmed(self.category).map(|c| c.to_lowercase());

        if let Some(t) = &title {
            validate_length("title", t, MAX_TITLE_LENGTH)?;
        }
        if let Some(s) = non_empty(&subtitle) {
            validate_length("subtitle", s, MAX_TITLE_LENGTH)?;
        }
        if let Some(d) = non_empty(&description) {
            validate_length("description", d, MAX_DESCRIPTION_LENGTH)?;
        }
        if let Some(e) = non_empty(&email) {
            validate_email(e)?;
        }
        if let Some(p) = non_empty(&phone) {
            validate_phone(p)?;
        }
        if let Some(w) = non_empty(&website) {
            validate_website(w)?;
        }
        if let Some(u) = non_empty(&image_url) {
            validate_website(u)?;
        }
        if let Some(a) = non_empty(&image_alt) {
            validate_length("image_alt", a, MAX_SHORT_FIELD_LENGTH)?;
        }
        if let Some(c) = non_empty(&category) {
            validate_length("category", c, MAX_SHORT_FIELD_LENGTH)?;
        }
        if let Some(address) = &self.address {
            validate_address(address)?;
        }
        if let Some(theme) = &self.theme {
            validate_theme(theme)?;
        }
        let tags = self.tags.as_deref().map(normalize_tags).transpose()?;

        Ok(UpdateCard {
            title,
            subtitle,
            description,
            email,
            phone,
            website,
            address: self.address,
            image_url,
            image_alt,
            category,
            tags,
            theme: self.theme,
            is_public: self.is_public,
        })
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/cards
///
/// Public listing. Only admins see private or inactive cards.
pub async fn list(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    AppQuery(params): AppQuery<CardListParams>,
) -> AppResult<Json<PagedResponse<Card>>> {
    let scope = match viewer.viewer() {
        Some((_, role)) if role.is_admin() => ListScope::Admin,
        _ => ListScope::Public,
    };
    list_with_scope(&state, &params, scope).await.map(Json)
}

/// GET /api/cards/my-cards
///
/// The caller's own cards, any visibility.
pub async fn my_cards(
    State(state): State<AppState>,
    user: AuthUser,
    AppQuery(params): AppQuery<CardListParams>,
) -> AppResult<Json<PagedResponse<Card>>> {
    user.ensure_persisted()?;
    list_with_scope(&state, &params, ListScope::Owner(user.user_id))
        .await
        .map(Json)
}

/// GET /api/cards/{id}
///
/// Private and inactive cards are reported as missing to everyone except
/// their owner and admins. Reads by anyone but the owner count as a view.
pub async fn get(
    State(state): State<AppState>,
    viewer: OptionalAuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<Card>>> {
    let mut card = find_visible_card(&state, id, viewer.viewer()).await?;

    let viewer_id = viewer.viewer().map(|(id, _)| id);
    if counts_as_view(card.owner_id, viewer_id) {
        if let Some(views) = CardRepo::increment_views(&state.pool, id).await? {
            card.views = views;
        }
    }

    Ok(Json(DataResponse { data: card }))
}

/// POST /api/cards
///
/// Business and admin accounts only. The card is owned by the caller.
pub async fn create(
    State(state): State<AppState>,
    user: AuthUser,
    AppJson(input): AppJson<CardInput>,
) -> AppResult<(StatusCode, Json<DataResponse<Card>>)> {
    user.ensure_persisted()?;
    user.authorize(&[Role::Business, Role::Admin])?;

    let fields = input.normalized()?;
    let title = fields
        .title
        .ok_or_else(|| AppError::validation("title is required"))?;

    let card = CardRepo::create(
        &state.pool,
        &CreateCard {
            owner_id: user.user_id,
            title,
            subtitle: fields.subtitle,
            description: fields.description,
            email: fields.email,
            phone: fields.phone,
            website: fields.website,
            address: fields.address.unwrap_or_default(),
            image_url: fields.image_url,
            image_alt: fields.image_alt,
            category: fields.category,
            tags: fields.tags.unwrap_or_default(),
            theme: fields.theme.unwrap_or_default(),
            is_public: fields.is_public.unwrap_or(true),
        },
    )
    .await?;

    tracing::info!(card_id = card.id, owner_id = card.owner_id, "Card created");
    Ok((StatusCode::CREATED, Json(DataResponse { data: card })))
}

/// PUT /api/cards/{id}
///
/// Owner or admin. Partial update; the owner never changes.
pub async fn update(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
    AppJson(input): AppJson<CardInput>,
) -> AppResult<Json<DataResponse<Card>>> {
    user.ensure_persisted()?;
    let existing = CardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;
    user.ensure_owner_or_admin(existing.owner_id)?;

    let patch = input.normalized()?;
    let card = CardRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;

    tracing::info!(card_id = id, user_id = user.user_id, "Card updated");
    Ok(Json(DataResponse { data: card }))
}

/// DELETE /api/cards/{id}
///
/// Owner or admin. Returns 204 No Content.
pub async fn delete(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<StatusCode> {
    user.ensure_persisted()?;
    let existing = CardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;
    user.ensure_owner_or_admin(existing.owner_id)?;

    if !CardRepo::delete(&state.pool, id).await? {
        return Err(AppError::not_found("Card", id));
    }

    tracing::info!(card_id = id, user_id = user.user_id, "Card deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/cards/{id}/like
///
/// Flip the caller's like on a card they can see.
pub async fn toggle_like(
    State(state): State<AppState>,
    user: AuthUser,
    AppPath(id): AppPath<DbId>,
) -> AppResult<Json<DataResponse<LikeState>>> {
    user.ensure_persisted()?;
    find_visible_card(&state, id, Some((user.user_id, user.role))).await?;

    let like = LikeRepo::toggle(&state.pool, id, user.user_id).await?;
    tracing::debug!(card_id = id, user_id = user.user_id, liked = like.liked, "Like toggled");

    Ok(Json(DataResponse { data: like }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Run a filtered listing and wrap it with pagination info.
pub(crate) async fn list_with_scope(
    state: &AppState,
    params: &CardListParams,
    scope: ListScope,
) -> AppResult<PagedResponse<Card>> {
    let filter = CardFilter::build(params, scope)?;
    let cards = CardRepo::list(&state.pool, &filter).await?;
    let total = CardRepo::count(&state.pool, &filter).await?;

    Ok(PagedResponse {
        data: cards,
        pagination: Pagination {
            total,
            limit: filter.limit,
            offset: filter.offset,
        },
    })
}

/// Load a card the viewer is allowed to see, or 404.
pub(crate) async fn find_visible_card(
    state: &AppState,
    id: DbId,
    viewer: Option<(DbId, Role)>,
) -> AppResult<Card> {
    let card = CardRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::not_found("Card", id))?;

    if !can_view_card(card.is_public, card.is_active, card.owner_id, viewer) {
        return Err(AppError::not_found("Card", id));
    }
    Ok(card)
}

fn trimmed(value: Option<String>) -> Option<String> {
    value.map(|s| s.trim().to_string())
}

/// The value to validate; a clearing empty string has nothing to check.
fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.is_empty())
}

fn validate_address(address: &CardAddress) -> Result<(), CoreError> {
    let parts = [
        ("address.country", &address.country),
        ("address.state", &address.state),
        ("address.city", &address.city),
        ("address.street", &address.street),
        ("address.house_number", &address.house_number),
        ("address.zip", &address.zip),
    ];
    for (field, value) in parts {
        if let Some(v) = value {
            validate_length(field, v, MAX_SHORT_FIELD_LENGTH)?;
        }
    }
    Ok(())
}

fn validate_theme(theme: &CardTheme) -> Result<(), CoreError> {
    let colors = [
        ("theme.primary_color", &theme.primary_color),
        ("theme.secondary_color", &theme.secondary_color),
        ("theme.text_color", &theme.text_color),
    ];
    for (field, value) in colors {
        if let Some(v) = value {
            validate_hex_color(field, v)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn normalization_trims_and_lowercases() {
        let input = CardInput {
            title: Some("  Studio Nova ".into()),
            category: Some(" Design ".into()),
            email: Some(" Hello@Nova.IO ".into()),
            tags: Some(vec!["UX".into(), "ux".into()]),
            subtitle: Some("   ".into()),
            ..Default::default()
        };
        let patch = input.normalized().unwrap();
        assert_eq!(patch.title.as_deref(), Some("Studio Nova"));
        assert_eq!(patch.category.as_deref(), Some("design"));
        assert_eq!(patch.email.as_deref(), Some("hello@nova.io"));
        assert_eq!(patch.tags, Some(vec!["ux".to_string()]));
        assert_eq!(patch.subtitle.as_deref(), Some(""));
        assert_eq!(patch.website, None);
    }

    #[test]
    fn empty_optional_fields_clear_without_validation() {
        let input = CardInput {
            website: Some("".into()),
            email: Some("  ".into()),
            phone: Some("".into()),
            ..Default::default()
        };
        let patch = input.normalized().unwrap();
        assert_eq!(patch.website.as_deref(), Some(""));
        assert_eq!(patch.email.as_deref(), Some(""));
        assert_eq!(patch.phone.as_deref(), Some(""));
    }

    #[test]
    fn blank_title_is_rejected() {
        let input = CardInput {
            title: Some("   ".into()),
            ..Default::default()
        };
        assert_matches!(input.normalized(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn invalid_theme_color_is_rejected() {
        let input = CardInput {
            theme: Some(CardTheme {
                primary_color: Some("blue".into()),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert_matches!(input.normalized(), Err(CoreError::Validation(_)));
    }

    #[test]
    fn website_must_be_http() {
        let input = CardInput {
            website: Some("javascript:alert(1)".into()),
            ..Default::default()
        };
        assert!(input.normalized().is_err());
    }

    #[test]
    fn oversized_title_is_rejected() {
        let input = CardInput {
            title: Some("x".repeat(MAX_TITLE_LENGTH + 1)),
            ..Default::default()
        };
        assert!(input.normalized().is_err());
    }
}
