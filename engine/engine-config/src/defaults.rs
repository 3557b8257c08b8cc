//! Default configuration values loaded from config.defaults.toml.
//!
//! The defaults file is embedded at compile time so every binary ships with
//! the same values the checked-in file documents.

use once_cell::sync::Lazy;
use serde::Deserialize;

/// The embedded defaults TOML file (loaded at compile time)
const DEFAULTS_TOML: &str = include_str!("../../../config.defaults.toml");

/// Parsed defaults structure (parsed once at first use)
static DEFAULTS: Lazy<DefaultsConfig> = Lazy::new(|| {
    toml::from_str(DEFAULTS_TOML).expect("config.defaults.toml should be valid TOML")
});

// ============================================================================
// Internal structs for parsing config.defaults.toml
// ============================================================================

#[derive(Debug, Deserialize)]
struct DefaultsConfig {
    common: CommonDefaults,
    game: GameDefaults,
    web: WebDefaults,
    storage: StorageDefaults,
    season: SeasonDefaults,
}

#[derive(Debug, Deserialize)]
struct CommonDefaults {
    log_level: String,
}

#[derive(Debug, Deserialize)]
struct GameDefaults {
    spawn_delay_ms: u64,
    randomness_timeout_ms: u64,
    undo_depth: usize,
}

#[derive(Debug, Deserialize)]
struct WebDefaults {
    host: String,
    port: u16,
    allowed_origins: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct StorageDefaults {
    sqlite_path: String,
    leaderboard_size: usize,
    leaderboard_cache_secs: u64,
}

#[derive(Debug, Deserialize)]
struct SeasonDefaults {
    id: String,
    name: String,
    #[serde(default)]
    end_time_ms: Option<u64>,
    daily_reset: bool,
}

// ============================================================================
// Public accessor functions
// ============================================================================

// Common
pub fn log_level() -> &'static str {
    &DEFAULTS.common.log_level
}

// Game
pub fn spawn_delay_ms() -> u64 {
    DEFAULTS.game.spawn_delay_ms
}
pub fn randomness_timeout_ms() -> u64 {
    DEFAULTS.game.randomness_timeout_ms
}
pub fn undo_depth() -> usize {
    DEFAULTS.game.undo_depth
}

// Web
pub fn host() -> &'static str {
    &DEFAULTS.web.host
}
pub fn port() -> u16 {
    DEFAULTS.web.port
}
pub fn allowed_origins() -> &'static [String] {
    &DEFAULTS.web.allowed_origins
}

// Storage
pub fn sqlite_path() -> &'static str {
    &DEFAULTS.storage.sqlite_path
}
pub fn leaderboard_size() -> usize {
    DEFAULTS.storage.leaderboard_size
}
pub fn leaderboard_cache_secs() -> u64 {
    DEFAULTS.storage.leaderboard_cache_secs
}

// Season
pub fn season_id() -> &'static str {
    &DEFAULTS.season.id
}
pub fn season_name() -> &'static str {
    &DEFAULTS.season.name
}
pub fn season_end_time_ms() -> Option<u64> {
    DEFAULTS.season.end_time_ms
}
pub fn daily_reset() -> bool {
    DEFAULTS.season.daily_reset
}
