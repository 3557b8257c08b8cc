//! Replay a submission JSON and check its claims.
//!
//! ```text
//! verify submission.json --player 0xabc
//! cat submission.json | verify -
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use once_cell::sync::Lazy;
use tracing::level_filters::LevelFilter;
use tracing::{info, warn};

use engine_config::{load_config, CentralConfig};
use engine_core::{format_grid, tiles_to_grid, Submission};
use session::{verify_submission, VerificationReport};

static CENTRAL_CONFIG: Lazy<CentralConfig> = Lazy::new(load_config);

fn default_log_level() -> String {
    CENTRAL_CONFIG.common.log_level.clone()
}

#[derive(Parser, Debug, Clone)]
#[command(name = "verify")]
#[command(about = "Replay a 2048 submission and verify its score, board and move hash")]
struct Args {
    /// Submission JSON file, or `-` for stdin
    input: PathBuf,

    /// Player identifier (address or numeric id) to check the seed derivation against
    #[arg(long)]
    player: Option<String>,

    #[arg(long, default_value_t = default_log_level())]
    log_level: String,
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    if level.parse::<LevelFilter>().is_err() {
        return Err(anyhow!(
            "invalid log level '{}', expected one of trace, debug, info, warn, error",
            level
        ));
    }
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn read_submission(input: &Path) -> Result<Submission> {
    let content = if input.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read stdin")?;
        buf
    } else {
        std::fs::read_to_string(input)
            .with_context(|| format!("Failed to read {}", input.display()))?
    };
    serde_json::from_str(&content).context("Malformed submission JSON")
}

struct Verified {
    report: VerificationReport,
    board: String,
}

fn run(args: &Args) -> Result<Verified> {
    let submission = read_submission(&args.input)?;
    info!(
        moves = submission.moves.len(),
        score = submission.score,
        "Replaying submission"
    );
    let report = verify_submission(&submission, args.player.as_deref()).map_err(|e| {
        warn!(error = %e, "Verification failed");
        anyhow!(e)
    })?;
    let board = format_grid(&tiles_to_grid(&report.tiles));
    Ok(Verified { report, board })
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(&args.log_level)?;

    let Verified { report, board } = run(&args)?;

    println!("VALID");
    println!("  score:     {}", report.score);
    println!("  moves:     {}", report.moves);
    println!("  max tile:  {}", report.max_tile);
    println!("  game over: {}", report.game_over);
    println!("  won:       {}", report.won);
    println!(
        "  seed:      {}",
        if report.seed_checked { "verified" } else { "not checked" }
    );
    println!("{}", board);
    Ok(())
}
