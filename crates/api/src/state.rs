use std::sync::Arc;

use crate::config::ServerConfig;
use crate::security::LoginAttemptStore;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: futurist_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Failed-login tracker consulted by the login handler.
    pub login_attempts: Arc<dyn LoginAttemptStore>,
}
