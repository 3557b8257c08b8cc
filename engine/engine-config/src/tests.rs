//! Tests for the configuration module.

use super::*;

#[test]
fn test_default_config() {
    let config = CentralConfig::default();
    assert_eq!(config.common.log_level, "info");
    assert_eq!(config.web.host, "0.0.0.0");
    assert_eq!(config.web.port, 8080);
    assert!(config.web.allowed_origins.is_empty());
    assert!(config.identity.players.is_empty());
}

#[test]
fn test_game_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.game.spawn_delay_ms, 200);
    assert_eq!(config.game.randomness_timeout_ms, 3000);
    assert_eq!(config.game.undo_depth, 1);
}

#[test]
fn test_storage_and_season_defaults() {
    let config = CentralConfig::default();
    assert_eq!(config.storage.sqlite_path, "./data/scores.db");
    assert_eq!(config.storage.leaderboard_size, 20);
    assert_eq!(config.storage.leaderboard_cache_secs, 30);
    assert_eq!(config.season.id, "season-1");
    assert_eq!(config.season.name, "Season 1");
    assert!(config.season.end_time_ms.is_none());
    assert!(config.season.daily_reset);
}

#[test]
fn test_env_overrides() {
    std::env::set_var("PROOF2048_GAME_SPAWN_DELAY_MS", "0");
    std::env::set_var("PROOF2048_SEASON_END_TIME_MS", "1767225600000");
    std::env::set_var(
        "PROOF2048_WEB_ALLOWED_ORIGINS",
        "https://a.example, https://b.example,",
    );
    // Unparseable values are ignored
    std::env::set_var("PROOF2048_GAME_UNDO_DEPTH", "many");

    let config = load_config();
    assert_eq!(config.game.spawn_delay_ms, 0);
    assert_eq!(config.season.end_time_ms, Some(1_767_225_600_000));
    assert_eq!(
        config.web.allowed_origins,
        vec!["https://a.example".to_string(), "https://b.example".to_string()]
    );
    assert_eq!(config.game.undo_depth, 1);

    std::env::remove_var("PROOF2048_GAME_SPAWN_DELAY_MS");
    std::env::remove_var("PROOF2048_SEASON_END_TIME_MS");
    std::env::remove_var("PROOF2048_WEB_ALLOWED_ORIGINS");
    std::env::remove_var("PROOF2048_GAME_UNDO_DEPTH");
}

#[test]
fn test_parse_config_toml() {
    let toml_content = r#"
[common]
log_level = "debug"

[game]
spawn_delay_ms = 50
undo_depth = 3

[season]
id = "s2"
end_time_ms = 1700000000000
daily_reset = false

[[identity.players]]
token = "secret"
id = 42
display_name = "alice"

[[identity.players]]
token = "other"
id = 7
address = "0xabc"
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.common.log_level, "debug");
    assert_eq!(config.game.spawn_delay_ms, 50);
    assert_eq!(config.game.undo_depth, 3);
    assert_eq!(config.game.randomness_timeout_ms, 3000); // Default
    assert_eq!(config.season.id, "s2");
    assert_eq!(config.season.name, "Season 1"); // Default
    assert_eq!(config.season.end_time_ms, Some(1_700_000_000_000));
    assert!(!config.season.daily_reset);
    assert_eq!(config.identity.players.len(), 2);
    assert_eq!(
        config.identity.players[0],
        PlayerEntry {
            token: "secret".into(),
            id: 42,
            display_name: Some("alice".into()),
            address: None,
        }
    );
    assert_eq!(config.identity.players[1].address.as_deref(), Some("0xabc"));
}

#[test]
fn test_partial_config() {
    let toml_content = r#"
[web]
port = 3000
"#;
    let config: CentralConfig = toml::from_str(toml_content).unwrap();
    assert_eq!(config.web.port, 3000);
    assert_eq!(config.web.host, "0.0.0.0"); // Default
    assert_eq!(config.storage.leaderboard_size, 20); // Default
}

#[test]
fn test_load_from_path_falls_back_on_bad_toml() {
    let dir = std::env::temp_dir().join(format!("proof2048-config-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.toml");
    std::fs::write(&path, "[game\nspawn_delay_ms = ").unwrap();

    let config = load_from_path(&path);
    assert_eq!(config.storage.sqlite_path, "./data/scores.db");

    std::fs::write(&path, "[storage]\nleaderboard_size = 5\n").unwrap();
    let config = load_from_path(&path);
    assert_eq!(config.storage.leaderboard_size, 5);

    std::fs::remove_dir_all(&dir).unwrap();
}
