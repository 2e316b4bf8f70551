//! Owner analytics.

use axum::extract::State;
use axum::Json;
use futurist_db::models::analytics::OwnerStats;
use futurist_db::repositories::AnalyticsRepo;

use crate::error::AppResult;
use crate::middleware::rbac::RequireBusiness;
use crate::response::DataResponse;
use crate::state::AppState;

/// GET /api/analytics/my-cards
///
/// Totals across the caller's cards plus one row per card, most viewed first.
pub async fn my_cards(
    State(state): State<AppState>,
    RequireBusiness(user): RequireBusiness,
) -> AppResult<Json<DataResponse<OwnerStats>>> {
    let stats = AnalyticsRepo::owner_stats(&state.pool, user.user_id).await?;
    Ok(Json(DataResponse { data: stats }))
}
