//! SQLite backend for score storage.
//!
//! This is the default backend for a single-node deployment.

use anyhow::Result;
use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::Mutex;
use tracing::debug;

use super::{fallback_name, LeaderboardEntry, ScoreRecord, ScoreStore};

/// SQLite-based score store scoped to one season.
///
/// Uses a Mutex for thread-safety since rusqlite Connection is not Sync.
pub struct SqliteScoreStore {
    conn: Mutex<Connection>,
    season_id: String,
}

impl SqliteScoreStore {
    /// Open (or create) the database at `db_path`.
    pub fn new(db_path: &str, season_id: &str) -> Result<Self> {
        // Create parent directories if they don't exist
        if let Some(parent) = Path::new(db_path).parent() {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(db_path)?;
        Self::with_connection(conn, season_id)
    }

    pub fn open_in_memory(season_id: &str) -> Result<Self> {
        Self::with_connection(Connection::open_in_memory()?, season_id)
    }

    fn with_connection(conn: Connection, season_id: &str) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS scores (
                season_id TEXT NOT NULL,
                player_id INTEGER NOT NULL,
                score INTEGER NOT NULL,
                display_name TEXT,
                address TEXT,
                updated_at DATETIME DEFAULT CURRENT_TIMESTAMP,
                PRIMARY KEY (season_id, player_id)
            )",
            [],
        )?;

        // Ranking reads scan by score within a season
        conn.execute(
            "CREATE INDEX IF NOT EXISTS idx_scores_season_score ON scores(season_id, score DESC)",
            [],
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
            season_id: season_id.to_string(),
        })
    }

    pub fn season_id(&self) -> &str {
        &self.season_id
    }

    fn entry_from_row(row: &Row<'_>, rank: i64) -> rusqlite::Result<LeaderboardEntry> {
        let player_id: i64 = row.get("player_id")?;
        let display_name: Option<String> = row.get("display_name")?;
        let score: i64 = row.get("score")?;
        Ok(LeaderboardEntry {
            rank: rank as u64,
            player_id: player_id as u64,
            display_name: display_name.unwrap_or_else(|| fallback_name(player_id as u64)),
            score: score as u64,
            address: row.get("address")?,
            is_current_user: false,
        })
    }
}

#[async_trait]
impl ScoreStore for SqliteScoreStore {
    async fn submit(&self, record: &ScoreRecord) -> Result<bool> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        let changed = conn.execute(
            "INSERT INTO scores (season_id, player_id, score, display_name, address)
             VALUES (?1, ?2, ?3, ?4, ?5)
             ON CONFLICT(season_id, player_id) DO UPDATE SET
                score = excluded.score,
                display_name = COALESCE(excluded.display_name, scores.display_name),
                address = COALESCE(excluded.address, scores.address),
                updated_at = CURRENT_TIMESTAMP
             WHERE scores.score < excluded.score",
            params![
                self.season_id,
                record.player_id as i64,
                record.score as i64,
                record.display_name,
                record.address,
            ],
        )?;
        debug!(
            player_id = record.player_id,
            score = record.score,
            improved = changed > 0,
            "Score submitted"
        );
        Ok(changed > 0)
    }

    async fn top(&self, limit: usize) -> Result<Vec<LeaderboardEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        let mut stmt = conn.prepare_cached(
            "SELECT player_id, display_name, score, address,
                    RANK() OVER (ORDER BY score DESC) AS player_rank
             FROM scores
             WHERE season_id = ?1
             ORDER BY score DESC, player_id ASC
             LIMIT ?2",
        )?;
        let rows = stmt.query_map(params![self.season_id, limit as i64], |row| {
            let rank: i64 = row.get("player_rank")?;
            Self::entry_from_row(row, rank)
        })?;
        let entries = rows.collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(entries)
    }

    async fn entry_for(&self, player_id: u64) -> Result<Option<LeaderboardEntry>> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        let entry = conn
            .query_row(
                "SELECT s.player_id, s.display_name, s.score, s.address,
                        (SELECT COUNT(*) FROM scores h
                         WHERE h.season_id = s.season_id AND h.score > s.score) + 1 AS player_rank
                 FROM scores s
                 WHERE s.season_id = ?1 AND s.player_id = ?2",
                params![self.season_id, player_id as i64],
                |row| {
                    let rank: i64 = row.get("player_rank")?;
                    Self::entry_from_row(row, rank)
                },
            )
            .optional()?;
        Ok(entry)
    }

    async fn count(&self) -> Result<usize> {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("Lock poisoned: {}", e))?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM scores WHERE season_id = ?1",
            params![self.season_id],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}
