//! External collaborators: the randomness beacon and player identity.

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha20Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use engine_config::IdentityConfig;

/// Milliseconds since the Unix epoch.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or_default()
}

/// Public randomness plus the time the session starts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Beacon {
    /// Hex string, `0x` optional
    pub randomness: String,
    pub start_time: u64,
}

/// Supplies the randomness each new game is seeded from.
#[async_trait]
pub trait RandomnessSource: Send + Sync {
    async fn fetch(&self) -> Result<Beacon>;
}

/// Randomness from the local CSPRNG, stamped with the wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalBeacon;

#[async_trait]
impl RandomnessSource for LocalBeacon {
    async fn fetch(&self) -> Result<Beacon> {
        let mut bytes = [0u8; 32];
        ChaCha20Rng::from_entropy().fill_bytes(&mut bytes);
        Ok(Beacon {
            randomness: hex::encode(bytes),
            start_time: now_ms(),
        })
    }
}

/// An authenticated player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    pub id: u64,
    pub display_name: Option<String>,
    pub address: Option<String>,
}

impl Player {
    /// Identifier mixed into the session seed: the wallet address when the
    /// player has one, otherwise the numeric id.
    pub fn seed_identifier(&self) -> String {
        self.address
            .clone()
            .unwrap_or_else(|| self.id.to_string())
    }
}

/// Resolves a bearer token to a player.
#[async_trait]
pub trait IdentityVerifier: Send + Sync {
    async fn verify(&self, token: &str) -> Result<Player>;
}

/// Token table loaded from the `[identity]` config section.
#[derive(Debug, Default, Clone)]
pub struct StaticTokenVerifier {
    players: HashMap<String, Player>,
}

impl StaticTokenVerifier {
    pub fn from_config(config: &IdentityConfig) -> Self {
        let players = config
            .players
            .iter()
            .map(|entry| {
                (
                    entry.token.clone(),
                    Player {
                        id: entry.id,
                        display_name: entry.display_name.clone(),
                        address: entry.address.clone(),
                    },
                )
            })
            .collect::<HashMap<_, _>>();
        debug!(players = players.len(), "Loaded static identity table");
        Self { players }
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[async_trait]
impl IdentityVerifier for StaticTokenVerifier {
    async fn verify(&self, token: &str) -> Result<Player> {
        self.players
            .get(token)
            .cloned()
            .ok_or_else(|| anyhow!("unknown token"))
    }
}
