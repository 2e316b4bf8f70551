//! Card entity model and DTOs.

use futurist_core::types::{DbId, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;

/// Postal address sub-document stored in `cards.address`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardAddress {
    pub country: Option<String>,
    pub state: Option<String>,
    pub city: Option<String>,
    pub street: Option<String>,
    pub house_number: Option<String>,
    pub zip: Option<String>,
}

/// Theme colors stored in `cards.theme`, each a `#rgb` / `#rrggbb` string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardTheme {
    pub primary_color: Option<String>,
    pub secondary_color: Option<String>,
    pub text_color: Option<String>,
}

/// A row from `cards`, with like and favorite counts computed at query time.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Card {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: Json<CardAddress>,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub theme: Json<CardTheme>,
    pub is_public: bool,
    pub is_active: bool,
    pub views: i64,
    pub likes_count: i64,
    pub favorites_count: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting a card. Values are expected to be validated already.
#[derive(Debug, Clone, Default)]
pub struct CreateCard {
    pub owner_id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub address: CardAddress,
    pub image_url: Option<String>,
    pub image_alt: Option<String>,
    pub category: Option<String>,
    pub tags: Vec<String>,
    pub theme: CardTheme,
    pub is_public: bool,
}

/// DTO for updating a card. `None` leaves a column unchanged; for the
/// optional text columns `Some("")` sets it to NULL. The owner is not
/// updatable.
#[derive(Debug, Clone, Default)]
pub struct UpdateCard {
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

/// Result of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    pub liked: bool,
    pub likes_count: i64,
}
