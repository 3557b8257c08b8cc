//! Error types for decoding untrusted engine data and verifying replays.

use crate::tile::Direction;

/// Error type for decoding hex strings, packed boards and tile data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("Invalid hex string: {0}")]
    InvalidHex(String),
    #[error("Invalid length: expected {expected} bytes but got {actual}")]
    InvalidLength { expected: usize, actual: usize },
    #[error("Packed board does not fit in {bits} bits")]
    Overflow { bits: u32 },
    #[error("Invalid direction code: {0}")]
    InvalidDirection(u8),
    #[error("Invalid tile: {0}")]
    InvalidTile(String),
}

/// Error type for a replay that does not reproduce the claimed result
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VerificationError {
    #[error("Move {index} ({direction}) does not change the board")]
    IllegalMove { index: usize, direction: Direction },
    #[error("Move {index} was played after the game was already over")]
    MoveAfterGameOver { index: usize },
    #[error("Score mismatch: claimed {claimed} but replay produced {replayed}")]
    ScoreMismatch { claimed: u64, replayed: u64 },
    #[error("Packed board mismatch: claimed {claimed} but replay produced {replayed}")]
    BoardMismatch { claimed: String, replayed: String },
    #[error("Move hash mismatch: claimed {claimed} but replay produced {replayed}")]
    MoveHashMismatch { claimed: String, replayed: String },
    #[error("Seed mismatch: claimed {claimed} but derivation produced {derived}")]
    SeedMismatch { claimed: String, derived: String },
    #[error("End time {end_time} precedes start time {start_time}")]
    InvalidTimeWindow { start_time: u64, end_time: u64 },
    #[error(transparent)]
    Decode(#[from] DecodeError),
}
