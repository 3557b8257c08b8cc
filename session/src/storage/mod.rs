//! Score persistence for the leaderboard.
//!
//! Scores are kept per season and only ever increase: a submission lower than
//! (or equal to) the player's stored best is a no-op.
//!
//! # Usage
//!
//! ```rust,ignore
//! use session::storage::{ScoreRecord, ScoreStore, SqliteScoreStore};
//!
//! let store = SqliteScoreStore::new("./data/scores.db", "season-1")?;
//! let improved = store.submit(&record).await?;
//! let top = store.top(20).await?;
//! ```

mod sqlite;

pub use sqlite::SqliteScoreStore;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A score to persist for a player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRecord {
    pub player_id: u64,
    pub score: u64,
    pub display_name: Option<String>,
    pub address: Option<String>,
}

/// One ranked leaderboard row. Tied scores share a rank.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardEntry {
    pub rank: u64,
    pub player_id: u64,
    pub display_name: String,
    pub score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    /// Set per request on the caller's own row; stored rows are never marked
    #[serde(default)]
    pub is_current_user: bool,
}

/// Label shown for players without a display name.
pub fn fallback_name(player_id: u64) -> String {
    format!("fid:{}", player_id)
}

/// Abstract interface for score storage.
///
/// Implementations must be thread-safe; the service shares one store across
/// all requests.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Store the score if it beats the player's best. Returns whether it did.
    async fn submit(&self, record: &ScoreRecord) -> Result<bool>;

    /// Highest scores, best first
    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>>;

    /// The player's row with its rank, if they have a score
    async fn entry_for(&self, player_id: u64) -> Result<Option<LeaderboardEntry>>;

    /// Number of players with a score
    async fn count(&self) -> Result<usize>;
}
