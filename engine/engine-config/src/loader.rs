//! Configuration loading logic.
//!
//! Handles loading config from files and applying environment variable overrides.

use crate::CentralConfig;
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Standard locations to search for config.toml
pub const CONFIG_SEARCH_PATHS: &[&str] = &[
    "config.toml",      // Current directory
    "../config.toml",   // Parent directory (when running from subdirectory)
    "/app/config.toml", // Docker container
];

/// Load the central configuration from config.toml.
///
/// Searches for config.toml in the following order:
/// 1. Path specified by PROOF2048_CONFIG environment variable
/// 2. Current directory (config.toml)
/// 3. Parent directory (../config.toml)
/// 4. Docker container path (/app/config.toml)
///
/// After loading, environment variable overrides are applied.
pub fn load_config() -> CentralConfig {
    if let Ok(path) = std::env::var("PROOF2048_CONFIG") {
        let path = PathBuf::from(&path);
        if path.exists() {
            info!("Loading config from PROOF2048_CONFIG: {}", path.display());
            return load_from_path(&path);
        }
        warn!(
            "PROOF2048_CONFIG={} not found, searching defaults",
            path.display()
        );
    }

    for path_str in CONFIG_SEARCH_PATHS {
        let path = PathBuf::from(path_str);
        if path.exists() {
            info!("Loading config from {}", path.display());
            return load_from_path(&path);
        }
    }

    debug!("No config.toml found, using built-in defaults");
    apply_env_overrides(CentralConfig::default())
}

/// Load configuration from a specific path.
pub fn load_from_path(path: &PathBuf) -> CentralConfig {
    match std::fs::read_to_string(path) {
        Ok(content) => match toml::from_str(&content) {
            Ok(config) => apply_env_overrides(config),
            Err(e) => {
                warn!("Failed to parse {}: {}, using defaults", path.display(), e);
                apply_env_overrides(CentralConfig::default())
            }
        },
        Err(e) => {
            warn!("Failed to read {}: {}, using defaults", path.display(), e);
            apply_env_overrides(CentralConfig::default())
        }
    }
}

/// Macro to reduce env override boilerplate
macro_rules! env_override {
    // String field
    ($config:expr, $section:ident . $field:ident, $key:expr) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v;
        }
    };
    // Parseable field (u16, u64, bool, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = v;
        }
    };
    // Optional parseable field (Option<u64>, etc.)
    ($config:expr, $section:ident . $field:ident, $key:expr, optional_parse) => {
        if let Ok(v) =
            std::env::var($key).and_then(|s| s.parse().map_err(|_| std::env::VarError::NotPresent))
        {
            $config.$section.$field = Some(v);
        }
    };
    // Comma-separated list of strings
    ($config:expr, $section:ident . $field:ident, $key:expr, list) => {
        if let Ok(v) = std::env::var($key) {
            $config.$section.$field = v
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect();
        }
    };
}

/// Apply environment variable overrides to a configuration.
///
/// Environment variables follow the pattern: PROOF2048_<SECTION>_<KEY>
pub fn apply_env_overrides(mut config: CentralConfig) -> CentralConfig {
    // Common
    env_override!(config, common.log_level, "PROOF2048_COMMON_LOG_LEVEL");

    // Game
    env_override!(
        config,
        game.spawn_delay_ms,
        "PROOF2048_GAME_SPAWN_DELAY_MS",
        parse
    );
    env_override!(
        config,
        game.randomness_timeout_ms,
        "PROOF2048_GAME_RANDOMNESS_TIMEOUT_MS",
        parse
    );
    env_override!(config, game.undo_depth, "PROOF2048_GAME_UNDO_DEPTH", parse);

    // Web
    env_override!(config, web.host, "PROOF2048_WEB_HOST");
    env_override!(config, web.port, "PROOF2048_WEB_PORT", parse);
    env_override!(
        config,
        web.allowed_origins,
        "PROOF2048_WEB_ALLOWED_ORIGINS",
        list
    );

    // Storage
    env_override!(config, storage.sqlite_path, "PROOF2048_STORAGE_SQLITE_PATH");
    env_override!(
        config,
        storage.leaderboard_size,
        "PROOF2048_STORAGE_LEADERBOARD_SIZE",
        parse
    );
    env_override!(
        config,
        storage.leaderboard_cache_secs,
        "PROOF2048_STORAGE_LEADERBOARD_CACHE_SECS",
        parse
    );

    // Season
    env_override!(config, season.id, "PROOF2048_SEASON_ID");
    env_override!(config, season.name, "PROOF2048_SEASON_NAME");
    env_override!(
        config,
        season.end_time_ms,
        "PROOF2048_SEASON_END_TIME_MS",
        optional_parse
    );
    env_override!(
        config,
        season.daily_reset,
        "PROOF2048_SEASON_DAILY_RESET",
        parse
    );

    config
}
