//! HTTP request handlers.

mod game;
mod health;
mod leaderboard;
mod verify;

pub use game::*;
pub use health::*;
pub use leaderboard::*;
pub use verify::*;

use axum::http::{header, HeaderMap, StatusCode};
use session::{ServiceError, SessionError};

/// Handler error: status plus a plain-text message.
pub type ApiError = (StatusCode, String);

/// Token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Map a service failure to the status a client should see.
pub fn service_error(err: ServiceError) -> ApiError {
    let status = match &err {
        ServiceError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        ServiceError::SeasonEnded(_) => StatusCode::FORBIDDEN,
        ServiceError::NotFinished => StatusCode::CONFLICT,
        ServiceError::Rejected(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServiceError::Randomness(_) => StatusCode::SERVICE_UNAVAILABLE,
        ServiceError::RandomnessTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        ServiceError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        ServiceError::Session(
            SessionError::TranscriptMismatch { .. }
            | SessionError::EmptyBoard
            | SessionError::Decode(_),
        ) => StatusCode::BAD_REQUEST,
        ServiceError::Session(_) => StatusCode::CONFLICT,
    };
    (status, err.to_string())
}
