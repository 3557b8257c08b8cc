//! Deterministic, replayable 2048 engine
//!
//! Everything here is pure and bit-for-bit reproducible:
//! - `rng`: string-seeded LCG and seed derivation
//! - `tile` / `board`: tiles, directions and the derived 4x4 grid
//! - `spawn` / `movement`: tile spawning and the slide-and-merge move engine
//! - `transcript`: SHA-256 chain over the accepted moves
//! - `pack`: 80-bit board encoding for external verifiers
//! - `replay`: re-run a session from its seed and check a submission

pub mod board;
pub mod error;
pub mod movement;
pub mod pack;
pub mod replay;
pub mod rng;
pub mod spawn;
pub mod tile;
pub mod transcript;

/// Width and height of the board.
pub const GRID_SIZE: usize = 4;

// Re-export main types for convenience
pub use board::{
    empty_cells, format_grid, has_won, is_game_over, max_tile, sanitize_tiles, tiles_to_grid,
    Grid, WIN_TILE,
};
pub use error::{DecodeError, VerificationError};
pub use movement::{apply_move, legal_moves, MoveOutcome};
pub use pack::{pack_board, PackedBoard};
pub use replay::{replay, strip_hex_prefix, verify, verify_seed, ReplayOutcome, Submission};
pub use rng::{derive_seed, draws_for_moves, SeededRandom};
pub use spawn::{add_random_tile, initial_tiles};
pub use tile::{Direction, RawTile, Tile};
pub use transcript::{MoveTranscript, INITIAL_MOVE_HASH};
