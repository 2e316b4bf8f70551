//! Liveness endpoint reporting database reachability.

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// Overall service condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    /// The process is up but the database did not answer.
    Degraded,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub environment: &'static str,
    pub db_healthy: bool,
}

/// GET /api/health
///
/// Always 200 so load balancers can tell "up but degraded" from "down".
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let db_healthy = match futurist_db::health_check(&state.pool).await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    Json(HealthResponse {
        status: if db_healthy {
            HealthStatus::Ok
        } else {
            HealthStatus::Degraded
        },
        version: env!("CARGO_PKG_VERSION"),
        environment: state.config.environment.as_str(),
        db_healthy,
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
