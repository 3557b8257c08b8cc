//! Configuration struct definitions.
//!
//! All config structs with serde deserialization support and default values.

use crate::defaults;
use serde::Deserialize;

// ============================================================================
// Serde default functions (required for #[serde(default = "...")])
// These call the accessor functions from defaults module
// ============================================================================

fn d_log_level() -> String {
    defaults::log_level().into()
}
fn d_spawn_delay() -> u64 {
    defaults::spawn_delay_ms()
}
fn d_randomness_timeout() -> u64 {
    defaults::randomness_timeout_ms()
}
fn d_undo_depth() -> usize {
    defaults::undo_depth()
}
fn d_host() -> String {
    defaults::host().into()
}
fn d_port() -> u16 {
    defaults::port()
}
fn d_allowed_origins() -> Vec<String> {
    defaults::allowed_origins().to_vec()
}
fn d_sqlite_path() -> String {
    defaults::sqlite_path().into()
}
fn d_leaderboard_size() -> usize {
    defaults::leaderboard_size()
}
fn d_leaderboard_cache() -> u64 {
    defaults::leaderboard_cache_secs()
}
fn d_season_id() -> String {
    defaults::season_id().into()
}
fn d_season_name() -> String {
    defaults::season_name().into()
}
fn d_season_end() -> Option<u64> {
    defaults::season_end_time_ms()
}
fn d_daily_reset() -> bool {
    defaults::daily_reset()
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Root configuration structure matching config.toml
#[derive(Debug, Deserialize, Default, Clone)]
pub struct CentralConfig {
    #[serde(default)]
    pub common: CommonConfig,
    #[serde(default)]
    pub game: GameConfig,
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub season: SeasonConfig,
    #[serde(default)]
    pub identity: IdentityConfig,
}

/// Common configuration shared by all components
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct CommonConfig {
    #[serde(default = "d_log_level")]
    pub log_level: String,
}

impl Default for CommonConfig {
    fn default() -> Self {
        Self {
            log_level: defaults::log_level().into(),
        }
    }
}

/// Game session behaviour
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct GameConfig {
    /// Delay between an accepted move and its spawn; 0 spawns immediately
    #[serde(default = "d_spawn_delay")]
    pub spawn_delay_ms: u64,
    /// Upper bound on a randomness beacon request
    #[serde(default = "d_randomness_timeout")]
    pub randomness_timeout_ms: u64,
    /// Number of undo snapshots kept (0 disables undo)
    #[serde(default = "d_undo_depth")]
    pub undo_depth: usize,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            spawn_delay_ms: defaults::spawn_delay_ms(),
            randomness_timeout_ms: defaults::randomness_timeout_ms(),
            undo_depth: defaults::undo_depth(),
        }
    }
}

/// Web server configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct WebConfig {
    #[serde(default = "d_host")]
    pub host: String,
    #[serde(default = "d_port")]
    pub port: u16,
    /// CORS allowed origins. Empty = allow all origins (development mode with warning).
    #[serde(default = "d_allowed_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            host: defaults::host().into(),
            port: defaults::port(),
            allowed_origins: defaults::allowed_origins().to_vec(),
        }
    }
}

/// Score storage and leaderboard configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    #[serde(default = "d_sqlite_path")]
    pub sqlite_path: String,
    /// Number of entries in the public leaderboard
    #[serde(default = "d_leaderboard_size")]
    pub leaderboard_size: usize,
    /// How long a leaderboard read is served from memory
    #[serde(default = "d_leaderboard_cache")]
    pub leaderboard_cache_secs: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sqlite_path: defaults::sqlite_path().into(),
            leaderboard_size: defaults::leaderboard_size(),
            leaderboard_cache_secs: defaults::leaderboard_cache_secs(),
        }
    }
}

/// Competitive season configuration
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SeasonConfig {
    #[serde(default = "d_season_id")]
    pub id: String,
    #[serde(default = "d_season_name")]
    pub name: String,
    /// Season end in milliseconds since the epoch; None = open-ended
    #[serde(default = "d_season_end")]
    pub end_time_ms: Option<u64>,
    /// Open-ended seasons count down to the next UTC midnight
    #[serde(default = "d_daily_reset")]
    pub daily_reset: bool,
}

impl Default for SeasonConfig {
    fn default() -> Self {
        Self {
            id: defaults::season_id().into(),
            name: defaults::season_name().into(),
            end_time_ms: defaults::season_end_time_ms(),
            daily_reset: defaults::daily_reset(),
        }
    }
}

/// Static bearer-token table for the built-in identity verifier
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct IdentityConfig {
    pub players: Vec<PlayerEntry>,
}

/// One known player
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct PlayerEntry {
    pub token: String,
    pub id: u64,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}
