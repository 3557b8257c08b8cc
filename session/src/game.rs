//! Game session state machine
//!
//! Owns one playthrough: tiles, score, move list, move transcript and the
//! seeded generator. All mutation is synchronous; the async service wraps a
//! session in a mutex and drives the deferred spawn.
//!
//! ```text
//! Uninitialized -> Initializing -> Active <-> Busy -> GameOver
//!                       ^                               |
//!                       +------------ new game ---------+
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

use engine_core::{
    add_random_tile, apply_move, draws_for_moves, has_won, initial_tiles, is_game_over,
    pack_board, sanitize_tiles, strip_hex_prefix, Direction, MoveTranscript, RawTile,
    SeededRandom, Submission, Tile,
};

use crate::error::SessionError;
use crate::history::{Snapshot, UndoHistory};

/// Lifecycle phase of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Uninitialized,
    /// Waiting on the randomness source
    Initializing,
    Active,
    /// A move was applied and its spawn is pending
    Busy,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Uninitialized => "uninitialized",
            Phase::Initializing => "initializing",
            Phase::Active => "active",
            Phase::Busy => "busy",
            Phase::GameOver => "game over",
        };
        f.write_str(name)
    }
}

/// Outcome of [`GameSession::apply_move`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveResult {
    /// The session was not accepting moves
    Rejected(Phase),
    /// The board would not change; nothing was recorded
    NoOp,
    /// The move was recorded and a spawn is now pending for `generation`
    Moved { generation: u64, score_increase: u64 },
}

/// Outcome of [`GameSession::complete_spawn`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnResult {
    Applied { game_over: bool },
    /// The spawn belonged to an earlier game or was already applied
    Discarded,
}

/// Serializable snapshot used to resume a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedGame {
    pub tiles: Vec<RawTile>,
    pub score: u64,
    pub is_game_over: bool,
    pub is_won: bool,
    pub seed: String,
    pub start_time: u64,
    pub moves: Vec<Direction>,
    pub randomness: String,
    pub move_hash: String,
    #[serde(default)]
    pub has_submitted_score: bool,
}

pub struct GameSession {
    phase: Phase,
    /// Phase to return to if initialization is aborted
    resume_phase: Option<Phase>,
    generation: u64,
    seed: String,
    randomness: String,
    start_time: u64,
    tiles: Vec<Tile>,
    merged: Vec<Tile>,
    score: u64,
    moves: Vec<Direction>,
    transcript: MoveTranscript,
    rng: SeededRandom,
    next_tile_id: u32,
    history: UndoHistory<Snapshot>,
    won: bool,
    submitted: bool,
    new_best: bool,
}

impl GameSession {
    pub fn new(undo_depth: usize) -> Self {
        Self {
            phase: Phase::Uninitialized,
            resume_phase: None,
            generation: 0,
            seed: String::new(),
            randomness: String::new(),
            start_time: 0,
            tiles: Vec::new(),
            merged: Vec::new(),
            score: 0,
            moves: Vec::new(),
            transcript: MoveTranscript::new(),
            rng: SeededRandom::new(""),
            next_tile_id: 1,
            history: UndoHistory::new(undo_depth),
            won: false,
            submitted: false,
            new_best: false,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn tiles(&self) -> &[Tile] {
        &self.tiles
    }

    /// Merge losers from the last move, positioned on their winners
    pub fn merged_tiles(&self) -> &[Tile] {
        &self.merged
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn moves(&self) -> &[Direction] {
        &self.moves
    }

    pub fn transcript(&self) -> MoveTranscript {
        self.transcript
    }

    /// Session seed, without `0x`
    pub fn seed(&self) -> &str {
        &self.seed
    }

    /// Beacon randomness, without `0x`
    pub fn randomness(&self) -> &str {
        &self.randomness
    }

    pub fn start_time(&self) -> u64 {
        self.start_time
    }

    pub fn draws(&self) -> u64 {
        self.rng.draws()
    }

    pub fn next_tile_id(&self) -> u32 {
        self.next_tile_id
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn has_submitted(&self) -> bool {
        self.submitted
    }

    pub fn is_new_best(&self) -> bool {
        self.new_best
    }

    pub fn set_new_best(&mut self, new_best: bool) {
        self.new_best = new_best;
    }

    pub fn can_undo(&self) -> bool {
        matches!(self.phase, Phase::Active | Phase::GameOver) && !self.history.is_empty()
    }

    /// Enter `Initializing` and return the generation the new game will use.
    ///
    /// Bumping the generation invalidates any spawn still pending from the
    /// previous game.
    pub fn begin_initialization(&mut self) -> u64 {
        if self.phase != Phase::Initializing {
            self.resume_phase = Some(self.phase);
        }
        self.generation += 1;
        self.phase = Phase::Initializing;
        debug!(generation = self.generation, "Initializing session");
        self.generation
    }

    /// Leave `Initializing` without starting a game.
    ///
    /// The previous game continues where it was. If it had a spawn pending,
    /// the spawn is applied now because its timer was invalidated.
    pub fn abort_initialization(&mut self, generation: u64) {
        if generation != self.generation || self.phase != Phase::Initializing {
            return;
        }
        match self.resume_phase.take() {
            Some(Phase::Busy) => {
                self.spawn_and_settle();
            }
            Some(phase) => self.phase = phase,
            None => self.phase = Phase::Uninitialized,
        }
        debug!(generation, phase = %self.phase, "Initialization aborted");
    }

    /// Start a fresh game from `seed`, spawning the two initial tiles.
    pub fn start(
        &mut self,
        generation: u64,
        seed: &str,
        randomness: &str,
        start_time: u64,
    ) -> Result<(), SessionError> {
        if generation != self.generation {
            return Err(SessionError::StaleGeneration {
                got: generation,
                current: self.generation,
            });
        }
        if self.phase != Phase::Initializing {
            return Err(SessionError::WrongPhase(self.phase));
        }

        let seed = strip_hex_prefix(seed).to_string();
        let mut rng = SeededRandom::new(&seed);
        let (tiles, next_tile_id) = initial_tiles(&mut rng);

        self.seed = seed;
        self.randomness = strip_hex_prefix(randomness).to_string();
        self.start_time = start_time;
        self.tiles = tiles;
        self.merged.clear();
        self.score = 0;
        self.moves.clear();
        self.transcript = MoveTranscript::new();
        self.rng = rng;
        self.next_tile_id = next_tile_id;
        self.history.clear();
        self.won = false;
        self.submitted = false;
        self.new_best = false;
        self.resume_phase = None;
        self.phase = Phase::Active;

        info!(generation, seed = %self.seed, start_time, "New game started");
        Ok(())
    }

    /// Slide the board. Only an `Active` session whose board changes records
    /// the move; everything else leaves the session untouched.
    pub fn apply_move(&mut self, direction: Direction) -> MoveResult {
        if self.phase != Phase::Active {
            return MoveResult::Rejected(self.phase);
        }

        let outcome = apply_move(&self.tiles, direction);
        if !outcome.moved {
            return MoveResult::NoOp;
        }

        self.history.push(Snapshot {
            tiles: self.tiles.clone(),
            score: self.score,
            transcript: self.transcript,
            moves: self.moves.clone(),
        });

        self.tiles = outcome.tiles;
        self.merged = outcome.merged;
        self.score += outcome.score_increase;
        self.moves.push(direction);
        self.transcript.fold(direction);
        self.won |= has_won(&self.tiles);
        self.phase = Phase::Busy;

        debug!(
            %direction,
            score = self.score,
            moves = self.moves.len(),
            "Move applied, spawn pending"
        );
        MoveResult::Moved {
            generation: self.generation,
            score_increase: outcome.score_increase,
        }
    }

    /// Apply the spawn scheduled by a move of `generation`.
    pub fn complete_spawn(&mut self, generation: u64) -> SpawnResult {
        if generation != self.generation || self.phase != Phase::Busy {
            debug!(generation, current = self.generation, "Discarding stale spawn");
            return SpawnResult::Discarded;
        }
        let game_over = self.spawn_and_settle();
        SpawnResult::Applied { game_over }
    }

    fn spawn_and_settle(&mut self) -> bool {
        let (tiles, next_tile_id) = add_random_tile(&self.tiles, &mut self.rng, self.next_tile_id);
        self.tiles = tiles;
        self.next_tile_id = next_tile_id;
        let game_over = is_game_over(&self.tiles);
        self.phase = if game_over {
            info!(score = self.score, moves = self.moves.len(), "Game over");
            Phase::GameOver
        } else {
            Phase::Active
        };
        game_over
    }

    /// Restore the previous snapshot. The generator is not rolled back.
    pub fn undo(&mut self) -> bool {
        if !matches!(self.phase, Phase::Active | Phase::GameOver) {
            return false;
        }
        let Some(snapshot) = self.history.pop() else {
            return false;
        };
        self.tiles = snapshot.tiles;
        self.score = snapshot.score;
        self.transcript = snapshot.transcript;
        self.moves = snapshot.moves;
        self.merged.clear();
        self.won = has_won(&self.tiles);
        self.phase = if is_game_over(&self.tiles) {
            Phase::GameOver
        } else {
            Phase::Active
        };
        debug!(moves = self.moves.len(), score = self.score, "Move undone");
        true
    }

    /// Assemble the verifiable record of a finished game.
    pub fn submission(&self, end_time: u64) -> Result<Submission, SessionError> {
        if self.phase != Phase::GameOver {
            return Err(SessionError::WrongPhase(self.phase));
        }
        if self.submitted {
            return Err(SessionError::AlreadySubmitted);
        }
        Ok(Submission {
            packed_board: pack_board(&self.tiles),
            score: self.score,
            start_time: self.start_time,
            end_time,
            seed: format!("0x{}", self.seed),
            randomness: format!("0x{}", self.randomness),
            move_hash: self.transcript,
            moves: self.moves.clone(),
        })
    }

    pub fn mark_submitted(&mut self) {
        self.submitted = true;
    }

    pub fn save(&self) -> Result<SavedGame, SessionError> {
        if !matches!(self.phase, Phase::Active | Phase::GameOver) {
            return Err(SessionError::WrongPhase(self.phase));
        }
        Ok(SavedGame {
            tiles: self.tiles.iter().copied().map(RawTile::from).collect(),
            score: self.score,
            is_game_over: self.is_game_over(),
            is_won: self.won,
            seed: self.seed.clone(),
            start_time: self.start_time,
            moves: self.moves.clone(),
            randomness: self.randomness.clone(),
            move_hash: self.transcript.to_hex(),
            has_submitted_score: self.submitted,
        })
    }

    /// Continue a saved game.
    ///
    /// The move hash must be the fold of the saved moves. The generator is
    /// fast-forwarded by the draws those moves consumed, and new tile ids
    /// continue after the highest saved id.
    pub fn resume(&mut self, saved: SavedGame) -> Result<(), SessionError> {
        let claimed = MoveTranscript::from_hex(&saved.move_hash)?;
        if claimed != MoveTranscript::from_moves(&saved.moves) {
            return Err(SessionError::TranscriptMismatch {
                claimed: saved.move_hash,
                moves: saved.moves.len(),
            });
        }

        let tiles = sanitize_tiles(saved.tiles);
        if tiles.is_empty() {
            return Err(SessionError::EmptyBoard);
        }

        let seed = strip_hex_prefix(&saved.seed).to_string();
        let mut rng = SeededRandom::new(&seed);
        rng.skip(draws_for_moves(saved.moves.len()));

        self.generation += 1;
        self.resume_phase = None;
        self.next_tile_id = tiles.iter().map(|t| t.id).max().unwrap_or(0) + 1;
        self.won = has_won(&tiles);
        self.phase = if is_game_over(&tiles) {
            Phase::GameOver
        } else {
            Phase::Active
        };
        self.tiles = tiles;
        self.merged.clear();
        self.score = saved.score;
        self.moves = saved.moves;
        self.transcript = claimed;
        self.seed = seed;
        self.randomness = strip_hex_prefix(&saved.randomness).to_string();
        self.start_time = saved.start_time;
        self.rng = rng;
        self.history.clear();
        self.submitted = saved.has_submitted_score;
        self.new_best = false;

        info!(
            generation = self.generation,
            moves = self.moves.len(),
            score = self.score,
            "Session resumed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine_core::{replay, verify, DecodeError};
    use Direction::*;

    const ABC_HASH: &str = "0x36f01310347b5e1e60aebe76888b610a8404c32aec6f6a3ba4fb556e541f5dc3";

    fn started(seed: &str) -> GameSession {
        let mut session = GameSession::new(1);
        let generation = session.begin_initialization();
        session.start(generation, seed, "beef", 1_000).unwrap();
        session
    }

    fn play(session: &mut GameSession, direction: Direction) -> MoveResult {
        let result = session.apply_move(direction);
        if let MoveResult::Moved { generation, .. } = result {
            assert!(matches!(
                session.complete_spawn(generation),
                SpawnResult::Applied { .. }
            ));
        }
        result
    }

    fn values_to_raw(values: [[u32; 4]; 4]) -> Vec<RawTile> {
        let mut raw = Vec::new();
        let mut id = 1;
        for (r, row) in values.iter().enumerate() {
            for (c, &value) in row.iter().enumerate() {
                if value != 0 {
                    raw.push(RawTile::from(Tile::new(id, value, r as u8, c as u8)));
                    id += 1;
                }
            }
        }
        raw
    }

    fn saved_board(values: [[u32; 4]; 4]) -> SavedGame {
        SavedGame {
            tiles: values_to_raw(values),
            score: 0,
            is_game_over: false,
            is_won: false,
            seed: "abc".into(),
            start_time: 1_000,
            moves: vec![],
            randomness: "beef".into(),
            move_hash: MoveTranscript::new().to_hex(),
            has_submitted_score: false,
        }
    }

    #[test]
    fn test_uninitialized_rejects_moves() {
        let mut session = GameSession::new(1);
        assert_eq!(
            session.apply_move(Left),
            MoveResult::Rejected(Phase::Uninitialized)
        );
        assert!(session.save().is_err());
    }

    #[test]
    fn test_start_spawns_two_tiles_from_seed() {
        let session = started("abc");
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.tiles(), replay("abc", &[]).unwrap().tiles.as_slice());
        assert_eq!(session.draws(), 4);
        assert_eq!(session.next_tile_id(), 3);
        assert_eq!(session.transcript(), MoveTranscript::new());
    }

    #[test]
    fn test_stale_generation_cannot_start() {
        let mut session = GameSession::new(1);
        let first = session.begin_initialization();
        let second = session.begin_initialization();
        assert_eq!(
            session.start(first, "abc", "beef", 0),
            Err(SessionError::StaleGeneration {
                got: first,
                current: second
            })
        );
        assert!(session.start(second, "abc", "beef", 0).is_ok());
    }

    #[test]
    fn test_move_is_busy_until_spawn() {
        let mut session = started("abc");
        let MoveResult::Moved { generation, .. } = session.apply_move(Left) else {
            panic!("left should move");
        };
        assert_eq!(session.phase(), Phase::Busy);
        assert_eq!(session.apply_move(Up), MoveResult::Rejected(Phase::Busy));
        assert!(!session.undo());
        assert_eq!(session.draws(), 4);

        assert_eq!(
            session.complete_spawn(generation),
            SpawnResult::Applied { game_over: false }
        );
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.draws(), 6);
        assert_eq!(session.tiles().len(), 3);
        // A duplicate timer is ignored
        assert_eq!(session.complete_spawn(generation), SpawnResult::Discarded);
    }

    #[test]
    fn test_noop_move_changes_nothing() {
        let mut session = started("abc");
        play(&mut session, Up);
        let tiles = session.tiles().to_vec();
        let transcript = session.transcript();
        assert_eq!(session.apply_move(Up), MoveResult::NoOp);
        assert_eq!(session.tiles(), tiles.as_slice());
        assert_eq!(session.transcript(), transcript);
        assert_eq!(session.moves(), &[Up]);
        assert_eq!(session.draws(), 6);
        assert_eq!(session.phase(), Phase::Active);
    }

    #[test]
    fn test_three_moves_match_replay() {
        let mut session = started("abc");
        for d in [Left, Up, Right] {
            assert!(matches!(play(&mut session, d), MoveResult::Moved { .. }));
        }
        let replayed = replay("abc", &[Left, Up, Right]).unwrap();
        assert_eq!(session.tiles(), replayed.tiles.as_slice());
        assert_eq!(session.score(), 4);
        assert_eq!(session.transcript().to_hex(), ABC_HASH);
        assert_eq!(session.draws(), 10);
        assert_eq!(
            session.submission(2_000),
            Err(SessionError::WrongPhase(Phase::Active))
        );
    }

    #[test]
    fn test_new_game_discards_pending_spawn() {
        let mut session = started("abc");
        let MoveResult::Moved { generation, .. } = session.apply_move(Left) else {
            panic!("left should move");
        };
        let next = session.begin_initialization();
        session.start(next, "other", "beef", 5).unwrap();
        let fresh = session.tiles().to_vec();

        assert_eq!(session.complete_spawn(generation), SpawnResult::Discarded);
        assert_eq!(session.tiles(), fresh.as_slice());
        assert_eq!(session.draws(), 4);
    }

    #[test]
    fn test_abort_restores_previous_game() {
        let mut session = started("abc");
        let MoveResult::Moved { generation, .. } = session.apply_move(Left) else {
            panic!("left should move");
        };
        let next = session.begin_initialization();
        assert_eq!(session.apply_move(Up), MoveResult::Rejected(Phase::Initializing));

        session.abort_initialization(next);
        // The invalidated spawn is applied immediately
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.tiles().len(), 3);
        assert_eq!(session.draws(), 6);
        assert_eq!(session.complete_spawn(generation), SpawnResult::Discarded);
        assert_eq!(session.tiles(), replay("abc", &[Left]).unwrap().tiles.as_slice());

        let mut fresh = GameSession::new(1);
        let generation = fresh.begin_initialization();
        fresh.abort_initialization(generation);
        assert_eq!(fresh.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_undo_restores_snapshot_but_not_generator() {
        let mut session = started("abc");
        let initial = session.tiles().to_vec();
        play(&mut session, Left);
        assert!(session.can_undo());

        assert!(session.undo());
        assert_eq!(session.tiles(), initial.as_slice());
        assert_eq!(session.score(), 0);
        assert!(session.moves().is_empty());
        assert_eq!(session.transcript(), MoveTranscript::new());
        assert_eq!(session.draws(), 6);
        // Only one level is kept
        assert!(!session.can_undo());
        assert!(!session.undo());
    }

    #[test]
    fn test_deeper_history() {
        let mut session = GameSession::new(2);
        let generation = session.begin_initialization();
        session.start(generation, "abc", "beef", 0).unwrap();
        play(&mut session, Left);
        play(&mut session, Up);
        assert!(session.undo());
        assert!(session.undo());
        assert!(session.moves().is_empty());
        assert!(!session.undo());
    }

    #[test]
    fn test_save_and_resume_continue_identically() {
        let mut original = started("abc");
        for d in [Left, Up, Right] {
            play(&mut original, d);
        }
        let saved = original.save().unwrap();
        assert_eq!(saved.move_hash, ABC_HASH);

        let json = serde_json::to_string(&saved).unwrap();
        let mut resumed = GameSession::new(1);
        resumed.resume(serde_json::from_str(&json).unwrap()).unwrap();
        assert_eq!(resumed.tiles(), original.tiles());
        assert_eq!(resumed.draws(), 10);
        assert_eq!(resumed.next_tile_id(), 6);
        assert_eq!(resumed.score(), 4);

        let direction = engine_core::legal_moves(original.tiles())[0];
        play(&mut original, direction);
        play(&mut resumed, direction);
        assert_eq!(resumed.tiles(), original.tiles());
        assert_eq!(resumed.transcript(), original.transcript());
    }

    #[test]
    fn test_resume_rejects_forged_transcript() {
        let mut saved = saved_board([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 2]]);
        saved.moves = vec![Left];
        let mut session = GameSession::new(1);
        assert!(matches!(
            session.resume(saved.clone()),
            Err(SessionError::TranscriptMismatch { moves: 1, .. })
        ));

        saved.move_hash = "0x1234".into();
        assert!(matches!(
            session.resume(saved),
            Err(SessionError::Decode(DecodeError::InvalidLength { .. }))
        ));
        assert_eq!(session.phase(), Phase::Uninitialized);
    }

    #[test]
    fn test_resume_skips_malformed_tiles() {
        let mut saved = saved_board([[2, 0, 0, 0], [0; 4], [0; 4], [0, 0, 0, 0]]);
        saved.tiles.push(RawTile {
            id: Some(9),
            value: Some(3),
            row: Some(1),
            col: Some(1),
            ..Default::default()
        });
        let mut session = GameSession::new(1);
        session.resume(saved).unwrap();
        assert_eq!(session.tiles().len(), 1);
        assert_eq!(session.next_tile_id(), 2);

        let empty = SavedGame {
            tiles: vec![RawTile::default()],
            ..saved_board([[0; 4]; 4])
        };
        assert_eq!(session.resume(empty), Err(SessionError::EmptyBoard));
    }

    #[test]
    fn test_resume_drops_reused_tile_ids() {
        let mut saved = saved_board([[0; 4]; 4]);
        for col in [0, 1] {
            saved.tiles.push(RawTile {
                id: Some(1),
                value: Some(2),
                row: Some(0),
                col: Some(col),
                ..Default::default()
            });
        }
        let mut session = GameSession::new(1);
        session.resume(saved).unwrap();
        assert_eq!(session.tiles().len(), 1);
        assert_eq!(session.next_tile_id(), 2);

        assert!(matches!(session.apply_move(Left), MoveResult::NoOp));
        assert!(session
            .merged_tiles()
            .iter()
            .all(|t| t.winner_id != Some(t.id)));
    }

    #[test]
    fn test_terminal_board_is_game_over_and_submittable() {
        let mut session = GameSession::new(1);
        session
            .resume(saved_board([
                [2, 4, 2, 4],
                [4, 2, 4, 2],
                [2, 4, 2, 4],
                [4, 2, 4, 2],
            ]))
            .unwrap();
        assert_eq!(session.phase(), Phase::GameOver);
        assert_eq!(session.apply_move(Left), MoveResult::Rejected(Phase::GameOver));

        let submission = session.submission(2_000).unwrap();
        assert_eq!(submission.seed, "0xabc");
        assert_eq!(submission.randomness, "0xbeef");
        assert_eq!(submission.end_time, 2_000);
        assert_eq!(submission.packed_board, pack_board(session.tiles()));
        // The board was never played from the seed, so a verifier rejects it
        assert!(verify(&submission).is_err());

        session.mark_submitted();
        assert_eq!(session.submission(2_000), Err(SessionError::AlreadySubmitted));
    }

    #[test]
    fn test_reaching_2048_sets_won() {
        let mut session = GameSession::new(1);
        session
            .resume(saved_board([[1024, 1024, 0, 0], [0; 4], [0; 4], [0; 4]]))
            .unwrap();
        assert!(!session.is_won());
        assert!(matches!(play(&mut session, Left), MoveResult::Moved { score_increase: 2048, .. }));
        assert!(session.is_won());
        assert_eq!(session.phase(), Phase::Active);
        assert_eq!(session.merged_tiles().len(), 1);
    }
}
