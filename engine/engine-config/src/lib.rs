//! Centralized configuration loading from config.toml.
//!
//! This crate provides configuration structs and loading logic shared
//! across all Rust components (session, web).
//!
//! # Configuration Priority
//!
//! Settings are loaded with the following priority (highest to lowest):
//! 1. Environment variables (`PROOF2048_<SECTION>_<KEY>`)
//! 2. config.toml file
//! 3. Built-in defaults
//!
//! # Environment Variable Override Pattern
//!
//! ```text
//! PROOF2048_<SECTION>_<KEY>=value
//!
//! Examples:
//!     PROOF2048_COMMON_LOG_LEVEL=debug
//!     PROOF2048_GAME_SPAWN_DELAY_MS=0
//!     PROOF2048_WEB_PORT=3000
//!     PROOF2048_WEB_ALLOWED_ORIGINS=https://a.example,https://b.example
//!     PROOF2048_SEASON_END_TIME_MS=1767225600000
//! ```

mod defaults;
mod loader;
mod structs;

pub use defaults::*;
pub use loader::{apply_env_overrides, load_config, load_from_path, CONFIG_SEARCH_PATHS};
pub use structs::*;

#[cfg(test)]
mod tests;
