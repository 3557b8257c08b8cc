//! Session orchestration for the verifiable 2048 engine.
//!
//! - `game`: the synchronous [`GameSession`] state machine
//! - `service`: [`GameService`], the async wrapper that talks to the
//!   randomness source, identity verifier and score store
//! - `storage` / `leaderboard` / `season`: score persistence, the cached
//!   leaderboard and the season countdown

pub mod error;
pub mod game;
pub mod history;
pub mod leaderboard;
pub mod season;
pub mod service;
pub mod services;
pub mod storage;

pub use error::{ServiceError, SessionError};
pub use game::{GameSession, MoveResult, Phase, SavedGame, SpawnResult};
pub use history::{Snapshot, UndoHistory};
pub use leaderboard::{LeaderboardCache, LeaderboardView};
pub use season::{Season, SeasonStatus, TimeLeft};
pub use service::{
    verify_submission, GameService, GameView, MoveStatus, MoveView, SubmitReceipt, UndoView,
    VerificationReport,
};
pub use services::{
    now_ms, Beacon, IdentityVerifier, LocalBeacon, Player, RandomnessSource, StaticTokenVerifier,
};
pub use storage::{LeaderboardEntry, ScoreRecord, ScoreStore, SqliteScoreStore};
