//! Leaderboard and season handlers.

use axum::{extract::State, http::HeaderMap, Json};
use std::sync::Arc;

use session::{LeaderboardView, SeasonStatus};

use super::{bearer_token, service_error, ApiError};
use crate::AppState;

/// Top scores; with a bearer token the caller's row is flagged, and appended
/// when they rank below the top.
pub async fn leaderboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<LeaderboardView>, ApiError> {
    state
        .service
        .leaderboard(bearer_token(&headers))
        .await
        .map(Json)
        .map_err(service_error)
}

pub async fn season(State(state): State<Arc<AppState>>) -> Json<SeasonStatus> {
    Json(state.service.season_status())
}
