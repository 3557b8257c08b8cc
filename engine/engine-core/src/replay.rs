//! Deterministic replay and score verification.
//!
//! A verifier needs nothing but the submission: rebuild the generator from the
//! seed, play every recorded move followed by its spawn, and compare the
//! result with what was claimed.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{has_won, is_game_over};
use crate::error::VerificationError;
use crate::movement::apply_move;
use crate::pack::{pack_board, PackedBoard};
use crate::rng::{derive_seed, SeededRandom};
use crate::spawn::{add_random_tile, initial_tiles};
use crate::tile::{Direction, Tile};
use crate::transcript::MoveTranscript;

/// Strip the `0x` prefix used when seeds and randomness leave the engine.
pub fn strip_hex_prefix(s: &str) -> &str {
    s.strip_prefix("0x").unwrap_or(s)
}

/// Everything an external verifier needs to replay a finished session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub packed_board: PackedBoard,
    pub score: u64,
    /// Milliseconds since the epoch
    pub start_time: u64,
    pub end_time: u64,
    /// `0x`-prefixed session seed
    pub seed: String,
    /// `0x`-prefixed beacon randomness
    pub randomness: String,
    pub move_hash: MoveTranscript,
    pub moves: Vec<Direction>,
}

/// State reached by replaying a move list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayOutcome {
    pub tiles: Vec<Tile>,
    pub score: u64,
    pub packed_board: PackedBoard,
    pub move_hash: MoveTranscript,
    pub next_tile_id: u32,
    pub draws: u64,
    pub game_over: bool,
    pub won: bool,
}

/// Replay `moves` from `seed` (with or without `0x`).
///
/// Every recorded move must change the board, and no move may follow a
/// terminal position.
pub fn replay(seed: &str, moves: &[Direction]) -> Result<ReplayOutcome, VerificationError> {
    let mut rng = SeededRandom::new(strip_hex_prefix(seed));
    let (mut tiles, mut next_tile_id) = initial_tiles(&mut rng);
    let mut score = 0u64;
    let mut transcript = MoveTranscript::new();

    for (index, &direction) in moves.iter().enumerate() {
        if is_game_over(&tiles) {
            return Err(VerificationError::MoveAfterGameOver { index });
        }
        let outcome = apply_move(&tiles, direction);
        if !outcome.moved {
            return Err(VerificationError::IllegalMove { index, direction });
        }
        score += outcome.score_increase;
        transcript.fold(direction);
        let (spawned, next) = add_random_tile(&outcome.tiles, &mut rng, next_tile_id);
        tiles = spawned;
        next_tile_id = next;
    }

    debug!(moves = moves.len(), score, draws = rng.draws(), "Replay finished");

    Ok(ReplayOutcome {
        packed_board: pack_board(&tiles),
        game_over: is_game_over(&tiles),
        won: has_won(&tiles),
        tiles,
        score,
        move_hash: transcript,
        next_tile_id,
        draws: rng.draws(),
    })
}

/// Replay a submission and check its score, packed board and move hash.
pub fn verify(submission: &Submission) -> Result<ReplayOutcome, VerificationError> {
    if submission.end_time < submission.start_time {
        return Err(VerificationError::InvalidTimeWindow {
            start_time: submission.start_time,
            end_time: submission.end_time,
        });
    }

    let outcome = replay(&submission.seed, &submission.moves)?;

    if outcome.move_hash != submission.move_hash {
        return Err(VerificationError::MoveHashMismatch {
            claimed: submission.move_hash.to_hex(),
            replayed: outcome.move_hash.to_hex(),
        });
    }
    if outcome.score != submission.score {
        return Err(VerificationError::ScoreMismatch {
            claimed: submission.score,
            replayed: outcome.score,
        });
    }
    if outcome.packed_board != submission.packed_board {
        return Err(VerificationError::BoardMismatch {
            claimed: submission.packed_board.to_hex(),
            replayed: outcome.packed_board.to_hex(),
        });
    }
    Ok(outcome)
}

/// Check that the submission's seed was derived from its randomness, the given
/// player identifier and its start time.
pub fn verify_seed(submission: &Submission, player_identifier: &str) -> Result<(), VerificationError> {
    let derived = derive_seed(
        strip_hex_prefix(&submission.randomness),
        player_identifier,
        submission.start_time,
    );
    let claimed = strip_hex_prefix(&submission.seed);
    if !claimed.eq_ignore_ascii_case(&derived) {
        return Err(VerificationError::SeedMismatch {
            claimed: claimed.to_string(),
            derived,
        });
    }
    Ok(())
}
