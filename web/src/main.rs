//! Proof2048 Web Server
//!
//! HTTP server exposing a single verifiable 2048 session.
//! Endpoints:
//! - GET  /health        - Health check
//! - GET  /metrics       - Prometheus metrics
//! - POST /game/new      - Start a new game (optional Bearer token binds the seed)
//! - GET  /game/state    - Get current game state
//! - POST /game/move     - Slide the board: {"direction": "left"} or {"direction": 3}
//! - POST /game/undo     - Undo the last move
//! - POST /game/submit   - Verify and record the finished game (Bearer required)
//! - GET  /game/save     - Snapshot the current game
//! - POST /game/restore  - Continue a saved game
//! - GET  /leaderboard   - Top scores for the current season
//! - GET  /season        - Season info and countdown
//! - POST /verify        - Replay a submission without storing it

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tracing::{info, warn};

mod handlers;
mod metrics;
mod types;

use engine_config::load_config;
use handlers::{
    get_game_state, health, leaderboard, make_move, metrics_handler, new_game, restore_game,
    save_game, season, submit, undo, verify,
};
use session::{GameService, LocalBeacon, SqliteScoreStore, StaticTokenVerifier};

/// Shared application state
pub struct AppState {
    /// The game service (session, beacon, identity, scores)
    pub service: GameService,
    /// Origins allowed by CORS; empty allows any
    pub allowed_origins: Vec<String>,
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origin = if allowed_origins.is_empty() {
        AllowOrigin::from(Any)
    } else {
        let origins = allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin '{}'", o);
                    None
                }
            })
            .collect::<Vec<_>>();
        AllowOrigin::list(origins)
    };
    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Create the application router with the given state.
/// This is separated out for testing purposes.
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.allowed_origins);

    Router::new()
        .route("/health", get(health))
        .route("/metrics", get(metrics_handler))
        .route("/game/new", post(new_game))
        .route("/game/state", get(get_game_state))
        .route("/game/move", post(make_move))
        .route("/game/undo", post(undo))
        .route("/game/submit", post(submit))
        .route("/game/save", get(save_game))
        .route("/game/restore", post(restore_game))
        .route("/leaderboard", get(leaderboard))
        .route("/season", get(season))
        .route("/verify", post(verify))
        .layer(cors)
        .with_state(state)
}

/// Creates a future that completes when a shutdown signal is received.
/// Handles Ctrl+C on all platforms.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received, stopping server...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from config.toml with env var overrides
    let config = load_config();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.common.log_level)),
        )
        .init();

    metrics::init_metrics();

    info!(
        "Configuration: sqlite_path={}, season={}, spawn_delay_ms={}",
        config.storage.sqlite_path, config.season.id, config.game.spawn_delay_ms
    );

    let store = SqliteScoreStore::new(&config.storage.sqlite_path, &config.season.id)?;
    let identity = StaticTokenVerifier::from_config(&config.identity);
    if identity.is_empty() {
        warn!("No players configured in [identity]; score submissions will be refused");
    }

    let service = GameService::new(
        &config,
        Arc::new(LocalBeacon),
        Arc::new(identity),
        Arc::new(store),
    );
    let state = Arc::new(AppState {
        service,
        allowed_origins: config.web.allowed_origins.clone(),
    });

    // Build router
    let app = create_app(state);

    let addr = format!("{}:{}", config.web.host, config.web.port);
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down gracefully");
    Ok(())
}

// ============================================================================
// Integration Tests
// ============================================================================
