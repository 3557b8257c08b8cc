//! Stateless submission verification.

use axum::Json;
use tracing::info;

use session::{verify_submission, VerificationReport};

use super::{service_error, ApiError};
use crate::types::VerifyRequest;

/// Replay a submission and report what it proves. Nothing is stored.
pub async fn verify(Json(req): Json<VerifyRequest>) -> Result<Json<VerificationReport>, ApiError> {
    let report = verify_submission(&req.submission, req.player.as_deref()).map_err(service_error)?;
    info!(score = report.score, moves = report.moves, "Submission verified");
    Ok(Json(report))
}
