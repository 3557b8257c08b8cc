//! Response types for the web API.
//!
//! Game, leaderboard and season payloads are the session crate's views,
//! serialized as-is.

use serde::{Deserialize, Serialize};

/// Health check response.
#[derive(Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub season: String,
}
