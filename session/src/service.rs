//! Async orchestration around a single [`GameSession`].
//!
//! The session lives behind a `tokio::sync::Mutex`; every operation locks it,
//! mutates synchronously and releases it. The lock is not held while waiting
//! on the randomness source, and deferred spawns run as detached tasks tagged
//! with the generation they were scheduled in.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use engine_config::CentralConfig;
use engine_core::{
    derive_seed, max_tile, strip_hex_prefix, verify, verify_seed, Direction, MoveTranscript,
    Submission, Tile,
};

use crate::error::ServiceError;
use crate::game::{GameSession, MoveResult, Phase, SavedGame, SpawnResult};
use crate::leaderboard::{LeaderboardCache, LeaderboardView};
use crate::season::{Season, SeasonStatus};
use crate::services::{now_ms, IdentityVerifier, Player, RandomnessSource};
use crate::storage::{ScoreRecord, ScoreStore};

/// Client-facing snapshot of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameView {
    pub phase: Phase,
    pub generation: u64,
    pub tiles: Vec<Tile>,
    pub merged_tiles: Vec<Tile>,
    pub score: u64,
    pub best_score: u64,
    pub moves: Vec<Direction>,
    pub move_hash: MoveTranscript,
    pub seed: String,
    pub randomness: String,
    pub start_time: u64,
    pub is_game_over: bool,
    pub is_won: bool,
    pub is_new_best: bool,
    pub can_undo: bool,
    pub has_submitted: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoveStatus {
    Moved,
    /// The board would not change in that direction
    NoOp,
    /// A spawn is still pending
    Busy,
    /// No game in progress
    NotActive,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveView {
    pub status: MoveStatus,
    pub score_increase: u64,
    pub state: GameView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoView {
    pub undone: bool,
    pub state: GameView,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitReceipt {
    pub submission: Submission,
    /// Whether the score beat the player's stored best
    pub new_high_score: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rank: Option<u64>,
}

/// Result of replaying a submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationReport {
    pub score: u64,
    pub moves: usize,
    pub max_tile: u32,
    pub game_over: bool,
    pub won: bool,
    /// Whether the seed derivation was checked against a player identifier
    pub seed_checked: bool,
    /// Final board of the replay
    #[serde(skip)]
    pub tiles: Vec<Tile>,
}

/// Replay `submission`, and check its seed derivation when the player
/// identifier is known.
pub fn verify_submission(
    submission: &Submission,
    player_identifier: Option<&str>,
) -> Result<VerificationReport, ServiceError> {
    let outcome = verify(submission)?;
    if let Some(identifier) = player_identifier {
        verify_seed(submission, identifier)?;
    }
    Ok(VerificationReport {
        score: outcome.score,
        moves: submission.moves.len(),
        max_tile: max_tile(&outcome.tiles),
        game_over: outcome.game_over,
        won: outcome.won,
        seed_checked: player_identifier.is_some(),
        tiles: outcome.tiles,
    })
}

#[derive(Clone)]
pub struct GameService {
    session: Arc<Mutex<GameSession>>,
    randomness: Arc<dyn RandomnessSource>,
    identity: Arc<dyn IdentityVerifier>,
    store: Arc<dyn ScoreStore>,
    leaderboard: Arc<LeaderboardCache>,
    season: Season,
    spawn_delay: Duration,
    randomness_timeout: Duration,
    best_score: Arc<AtomicU64>,
}

impl GameService {
    pub fn new(
        config: &CentralConfig,
        randomness: Arc<dyn RandomnessSource>,
        identity: Arc<dyn IdentityVerifier>,
        store: Arc<dyn ScoreStore>,
    ) -> Self {
        Self {
            session: Arc::new(Mutex::new(GameSession::new(config.game.undo_depth))),
            randomness,
            identity,
            store,
            leaderboard: Arc::new(LeaderboardCache::new(
                Duration::from_secs(config.storage.leaderboard_cache_secs),
                config.storage.leaderboard_size,
            )),
            season: Season::from_config(&config.season),
            spawn_delay: Duration::from_millis(config.game.spawn_delay_ms),
            randomness_timeout: Duration::from_millis(config.game.randomness_timeout_ms),
            best_score: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn season(&self) -> &Season {
        &self.season
    }

    pub fn best_score(&self) -> u64 {
        self.best_score.load(Ordering::SeqCst)
    }

    fn view(&self, session: &GameSession) -> GameView {
        GameView {
            phase: session.phase(),
            generation: session.generation(),
            tiles: session.tiles().to_vec(),
            merged_tiles: session.merged_tiles().to_vec(),
            score: session.score(),
            best_score: self.best_score(),
            moves: session.moves().to_vec(),
            move_hash: session.transcript(),
            seed: session.seed().to_string(),
            randomness: session.randomness().to_string(),
            start_time: session.start_time(),
            is_game_over: session.is_game_over(),
            is_won: session.is_won(),
            is_new_best: session.is_new_best(),
            can_undo: session.can_undo(),
            has_submitted: session.has_submitted(),
        }
    }

    /// Resolve a token, treating any failure as anonymous play.
    async fn player_or_anonymous(&self, token: Option<&str>) -> Option<Player> {
        let token = token?;
        match self.identity.verify(token).await {
            Ok(player) => Some(player),
            Err(e) => {
                warn!(error = %e, "Identity lookup failed, continuing anonymously");
                None
            }
        }
    }

    async fn require_player(&self, token: Option<&str>) -> Result<Player, ServiceError> {
        let token = token.ok_or_else(|| ServiceError::Unauthorized("missing bearer token".into()))?;
        self.identity
            .verify(token)
            .await
            .map_err(|e| ServiceError::Unauthorized(format!("{:#}", e)))
    }

    /// Start a new game seeded from fresh randomness.
    ///
    /// On failure the previous game, if any, is left as it was.
    pub async fn new_game(&self, token: Option<&str>) -> Result<GameView, ServiceError> {
        let identifier = self
            .player_or_anonymous(token)
            .await
            .map(|p| p.seed_identifier())
            .unwrap_or_default();

        let generation = self.session.lock().await.begin_initialization();

        let beacon = match tokio::time::timeout(self.randomness_timeout, self.randomness.fetch()).await {
            Ok(Ok(beacon)) => beacon,
            Ok(Err(e)) => {
                error!(error = %e, "Randomness source failed");
                self.session.lock().await.abort_initialization(generation);
                return Err(ServiceError::Randomness(format!("{:#}", e)));
            }
            Err(_) => {
                let ms = self.randomness_timeout.as_millis() as u64;
                error!(timeout_ms = ms, "Randomness source timed out");
                self.session.lock().await.abort_initialization(generation);
                return Err(ServiceError::RandomnessTimeout(ms));
            }
        };

        let seed = derive_seed(
            strip_hex_prefix(&beacon.randomness),
            &identifier,
            beacon.start_time,
        );
        let mut session = self.session.lock().await;
        session.start(generation, &seed, &beacon.randomness, beacon.start_time)?;
        Ok(self.view(&session))
    }

    pub async fn make_move(&self, direction: Direction) -> MoveView {
        let mut session = self.session.lock().await;
        let (status, score_increase) = match session.apply_move(direction) {
            MoveResult::Rejected(Phase::Busy) => (MoveStatus::Busy, 0),
            MoveResult::Rejected(phase) => {
                debug!(%direction, %phase, "Move rejected");
                (MoveStatus::NotActive, 0)
            }
            MoveResult::NoOp => (MoveStatus::NoOp, 0),
            MoveResult::Moved {
                generation,
                score_increase,
            } => {
                if self.spawn_delay.is_zero() {
                    settle_spawn(&mut session, generation, &self.best_score);
                } else {
                    self.schedule_spawn(generation);
                }
                (MoveStatus::Moved, score_increase)
            }
        };
        MoveView {
            status,
            score_increase,
            state: self.view(&session),
        }
    }

    fn schedule_spawn(&self, generation: u64) {
        let session = Arc::clone(&self.session);
        let best_score = Arc::clone(&self.best_score);
        let delay = self.spawn_delay;
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let mut session = session.lock().await;
            settle_spawn(&mut session, generation, &best_score);
        });
    }

    pub async fn undo(&self) -> UndoView {
        let mut session = self.session.lock().await;
        let undone = session.undo();
        UndoView {
            undone,
            state: self.view(&session),
        }
    }

    pub async fn state(&self) -> GameView {
        let session = self.session.lock().await;
        self.view(&session)
    }

    /// Verify the finished game and record its score for the token's player.
    pub async fn submit(&self, token: Option<&str>) -> Result<SubmitReceipt, ServiceError> {
        let player = self.require_player(token).await?;

        let now = now_ms();
        if self.season.has_ended(now) {
            return Err(ServiceError::SeasonEnded(self.season.id.clone()));
        }

        let mut session = self.session.lock().await;
        if session.phase() != Phase::GameOver {
            return Err(ServiceError::NotFinished);
        }
        let submission = session.submission(now.max(session.start_time()))?;

        if let Err(e) = verify_submission(&submission, Some(&player.seed_identifier())) {
            warn!(player_id = player.id, error = %e, "Submission rejected");
            return Err(e);
        }

        let record = ScoreRecord {
            player_id: player.id,
            score: submission.score,
            display_name: player.display_name.clone(),
            address: player.address.clone(),
        };
        let new_high_score = self
            .store
            .submit(&record)
            .await
            .map_err(ServiceError::Storage)?;
        session.mark_submitted();
        self.leaderboard.invalidate().await;

        let rank = match self.store.entry_for(player.id).await {
            Ok(entry) => entry.map(|e| e.rank),
            Err(e) => {
                warn!(error = %e, "Stored score but could not read rank");
                None
            }
        };

        info!(
            player_id = player.id,
            score = submission.score,
            new_high_score,
            ?rank,
            "Score submitted"
        );
        Ok(SubmitReceipt {
            submission,
            new_high_score,
            rank,
        })
    }

    pub async fn leaderboard(&self, token: Option<&str>) -> Result<LeaderboardView, ServiceError> {
        let player_id = self.player_or_anonymous(token).await.map(|p| p.id);
        self.leaderboard
            .view(self.store.as_ref(), player_id)
            .await
            .map_err(ServiceError::Storage)
    }

    pub fn season_status(&self) -> SeasonStatus {
        self.season.status(now_ms())
    }

    pub async fn save(&self) -> Result<SavedGame, ServiceError> {
        Ok(self.session.lock().await.save()?)
    }

    pub async fn restore(&self, saved: SavedGame) -> Result<GameView, ServiceError> {
        let mut session = self.session.lock().await;
        session.resume(saved)?;
        Ok(self.view(&session))
    }
}

/// Apply a pending spawn and record the best score when it ends the game.
fn settle_spawn(session: &mut GameSession, generation: u64, best_score: &AtomicU64) {
    if let SpawnResult::Applied { game_over: true } = session.complete_spawn(generation) {
        let score = session.score();
        let previous = best_score.fetch_max(score, Ordering::SeqCst);
        let new_best = score > previous;
        session.set_new_best(new_best);
        if new_best {
            info!(score, previous, "New best score");
        }
    }
}
