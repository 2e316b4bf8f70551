//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - An update DTO (all `Option` fields) for patches

pub mod analytics;
pub mod card;
pub mod favorite;
pub mod user;
