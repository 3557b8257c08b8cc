//! Request types for the web API.

use serde::Deserialize;
use std::str::FromStr;

use engine_core::{Direction, Submission};

/// A direction given either by its wire code (0-3) or by name.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DirectionInput {
    Code(u8),
    Name(String),
}

impl TryFrom<DirectionInput> for Direction {
    type Error = String;

    fn try_from(input: DirectionInput) -> Result<Self, Self::Error> {
        match input {
            DirectionInput::Code(code) => Direction::from_code(code).map_err(|e| e.to_string()),
            DirectionInput::Name(name) => Direction::from_str(&name).map_err(|e| e.to_string()),
        }
    }
}

/// Request to make a move.
#[derive(Debug, Deserialize)]
pub struct MoveRequest {
    /// `0`-`3` (up, right, down, left) or the direction's name
    pub direction: DirectionInput,
}

/// Request to verify a submission without storing it.
#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    pub submission: Submission,
    /// Address or numeric id to check the seed derivation against
    #[serde(default)]
    pub player: Option<String>,
}
