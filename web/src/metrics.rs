//! Prometheus metrics for the web server component.
//!
//! Game lifecycle counters, submission outcomes and request latency.

use lazy_static::lazy_static;
use prometheus::{
    core::Collector, Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge,
    Opts, Registry, TextEncoder,
};
use std::sync::Once;
use tracing::warn;

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // ========== Game Session Metrics ==========

    /// Total games started
    pub static ref GAMES_CREATED: IntCounter = IntCounter::with_opts(
        Opts::new("web_games_created_total", "Total games started")
    ).unwrap();

    /// Accepted moves by direction
    pub static ref MOVES_PLAYED: IntCounterVec = IntCounterVec::new(
        Opts::new("web_moves_played_total", "Accepted moves by direction"),
        &["direction"]
    ).unwrap();

    /// Moves that did not change the board or arrived while busy
    pub static ref MOVES_IGNORED: IntCounterVec = IntCounterVec::new(
        Opts::new("web_moves_ignored_total", "Moves ignored by the session"),
        &["reason"]
    ).unwrap();

    /// Best score seen by this process
    pub static ref BEST_SCORE: IntGauge = IntGauge::with_opts(
        Opts::new("web_best_score", "Best score seen by this process")
    ).unwrap();

    /// Randomness beacon failures, including timeouts
    pub static ref RANDOMNESS_FAILURES: IntCounter = IntCounter::with_opts(
        Opts::new("web_randomness_failures_total", "Randomness source failures")
    ).unwrap();

    // ========== Submissions ==========

    /// Score submissions by outcome (accepted, rejected, error)
    pub static ref SUBMISSIONS: IntCounterVec = IntCounterVec::new(
        Opts::new("web_submissions_total", "Score submissions by outcome"),
        &["outcome"]
    ).unwrap();

    // ========== Request Latency ==========

    /// HTTP request latency by endpoint and method
    pub static ref REQUEST_LATENCY: HistogramVec = HistogramVec::new(
        HistogramOpts::new("web_request_duration_seconds", "HTTP request latency")
            .buckets(vec![0.001, 0.005, 0.01, 0.05, 0.1, 0.5, 1.0]),
        &["endpoint", "method"]
    ).unwrap();
}

static INIT: Once = Once::new();

fn register<C: Collector + Clone + 'static>(collector: &C) {
    if let Err(e) = REGISTRY.register(Box::new(collector.clone())) {
        warn!("Failed to register metric: {}", e);
    }
}

/// Initialize and register all metrics with the registry.
/// Safe to call multiple times - only initializes once.
pub fn init_metrics() {
    INIT.call_once(|| {
        register(&*GAMES_CREATED);
        register(&*MOVES_PLAYED);
        register(&*MOVES_IGNORED);
        register(&*BEST_SCORE);
        register(&*RANDOMNESS_FAILURES);
        register(&*SUBMISSIONS);
        register(&*REQUEST_LATENCY);
    });
}

/// Raise the best-score gauge; lower scores leave it unchanged.
pub fn record_best_score(score: u64) {
    let score = i64::try_from(score).unwrap_or(i64::MAX);
    if score > BEST_SCORE.get() {
        BEST_SCORE.set(score);
    }
}

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_init() {
        init_metrics();
        init_metrics();
    }

    #[test]
    fn test_encode_metrics() {
        init_metrics();
        GAMES_CREATED.inc();
        MOVES_PLAYED.with_label_values(&["left"]).inc();
        SUBMISSIONS.with_label_values(&["accepted"]).inc();
        let output = encode_metrics();
        assert!(output.contains("web_games_created_total"));
        assert!(output.contains("web_moves_played_total"));
        assert!(output.contains("web_submissions_total"));
    }

    #[test]
    fn test_best_score_only_rises() {
        record_best_score(1 << 40);
        record_best_score(8);
        assert_eq!(BEST_SCORE.get(), 1 << 40);
    }
}
