//! Game session handlers.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    Json,
};
use std::sync::Arc;
use tracing::debug;

use engine_core::Direction;
use session::{GameView, MoveStatus, MoveView, SavedGame, ServiceError, SubmitReceipt, UndoView};

use super::{bearer_token, service_error, ApiError};
use crate::metrics::{
    record_best_score, GAMES_CREATED, MOVES_IGNORED, MOVES_PLAYED, RANDOMNESS_FAILURES,
    REQUEST_LATENCY, SUBMISSIONS,
};
use crate::types::MoveRequest;
use crate::AppState;

/// Get current game state.
pub async fn get_game_state(State(state): State<Arc<AppState>>) -> Json<GameView> {
    let view = state.service.state().await;
    record_best_score(view.best_score);
    Json(view)
}

/// Start a new game. The bearer token, if any, binds the seed to the player.
pub async fn new_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<GameView>, ApiError> {
    let _timer = REQUEST_LATENCY
        .with_label_values(&["/game/new", "POST"])
        .start_timer();

    match state.service.new_game(bearer_token(&headers)).await {
        Ok(view) => {
            GAMES_CREATED.inc();
            Ok(Json(view))
        }
        Err(e) => {
            if matches!(
                e,
                ServiceError::Randomness(_) | ServiceError::RandomnessTimeout(_)
            ) {
                RANDOMNESS_FAILURES.inc();
            }
            Err(service_error(e))
        }
    }
}

/// Slide the board. Ignored moves still return 200 with the unchanged state.
pub async fn make_move(
    State(state): State<Arc<AppState>>,
    Json(req): Json<MoveRequest>,
) -> Result<Json<MoveView>, ApiError> {
    let _timer = REQUEST_LATENCY
        .with_label_values(&["/game/move", "POST"])
        .start_timer();

    let direction = Direction::try_from(req.direction)
        .map_err(|e| (StatusCode::BAD_REQUEST, format!("Invalid direction: {}", e)))?;

    let view = state.service.make_move(direction).await;
    match view.status {
        MoveStatus::Moved => MOVES_PLAYED.with_label_values(&[direction.as_str()]).inc(),
        MoveStatus::NoOp => MOVES_IGNORED.with_label_values(&["no_op"]).inc(),
        MoveStatus::Busy => MOVES_IGNORED.with_label_values(&["busy"]).inc(),
        MoveStatus::NotActive => MOVES_IGNORED.with_label_values(&["not_active"]).inc(),
    }
    record_best_score(view.state.best_score);
    debug!(%direction, status = ?view.status, score = view.state.score, "Move handled");
    Ok(Json(view))
}

/// Undo the last move.
pub async fn undo(State(state): State<Arc<AppState>>) -> Json<UndoView> {
    Json(state.service.undo().await)
}

/// Verify and record the finished game. Requires a bearer token.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<SubmitReceipt>, ApiError> {
    let _timer = REQUEST_LATENCY
        .with_label_values(&["/game/submit", "POST"])
        .start_timer();

    match state.service.submit(bearer_token(&headers)).await {
        Ok(receipt) => {
            SUBMISSIONS.with_label_values(&["accepted"]).inc();
            record_best_score(state.service.best_score());
            Ok(Json(receipt))
        }
        Err(e) => {
            let outcome = if matches!(e, ServiceError::Rejected(_)) {
                "rejected"
            } else {
                "error"
            };
            SUBMISSIONS.with_label_values(&[outcome]).inc();
            Err(service_error(e))
        }
    }
}

/// Snapshot the current game for later restore.
pub async fn save_game(State(state): State<Arc<AppState>>) -> Result<Json<SavedGame>, ApiError> {
    state.service.save().await.map(Json).map_err(service_error)
}

/// Continue a previously saved game.
pub async fn restore_game(
    State(state): State<Arc<AppState>>,
    Json(saved): Json<SavedGame>,
) -> Result<Json<GameView>, ApiError> {
    state
        .service
        .restore(saved)
        .await
        .map(Json)
        .map_err(service_error)
}
