//! Request handlers, one module per resource.

pub mod admin;
pub mod analytics;
pub mod auth;
pub mod cards;
pub mod favorites;

use crate::error::AppError;

/// Fallback for unmatched routes: JSON 404 instead of an empty body.
pub async fn not_found() -> AppError {
    AppError::NotFound("Route not found".into())
}
