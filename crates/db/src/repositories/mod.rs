//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod analytics_repo;
pub mod card_repo;
pub mod favorite_repo;
pub mod like_repo;
pub mod user_repo;

pub use analytics_repo::AnalyticsRepo;
pub use card_repo::CardRepo;
pub use favorite_repo::FavoriteRepo;
pub use like_repo::LikeRepo;
pub use user_repo::UserRepo;
