//! Error types for session state transitions and the service boundary.

use engine_core::{DecodeError, VerificationError};

use crate::game::Phase;

/// A state transition the session refused.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error("Generation {got} is stale (current {current})")]
    StaleGeneration { got: u64, current: u64 },
    #[error("Operation not allowed while the session is {0}")]
    WrongPhase(Phase),
    #[error("Game already submitted")]
    AlreadySubmitted,
    #[error("Saved move hash {claimed} is not the fold of its {moves} moves")]
    TranscriptMismatch { claimed: String, moves: usize },
    #[error("Saved game has no valid tiles")]
    EmptyBoard,
    #[error(transparent)]
    Decode(#[from] DecodeError),
}

/// Failure surfaced to callers of [`crate::GameService`].
///
/// Every variant leaves the session in its last consistent state, so callers
/// can offer a retry.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("Randomness source failed: {0}")]
    Randomness(String),
    #[error("Randomness source timed out after {0} ms")]
    RandomnessTimeout(u64),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Game is not finished")]
    NotFinished,
    #[error("Season '{0}' has ended")]
    SeasonEnded(String),
    #[error("Submission rejected: {0}")]
    Rejected(#[from] VerificationError),
    #[error("Storage failure: {0:#}")]
    Storage(anyhow::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ServiceError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ServiceError::Randomness(_)
                | ServiceError::RandomnessTimeout(_)
                | ServiceError::Storage(_)
        )
    }
}
