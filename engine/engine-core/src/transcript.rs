//! Move-hash accumulator.
//!
//! The transcript is a SHA-256 chain over direction codes:
//! `h_0 = [0; 32]`, `h_{n+1} = sha256(h_n || [code_n])`.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

use crate::error::DecodeError;
use crate::tile::Direction;

/// Starting value of every transcript.
pub const INITIAL_MOVE_HASH: [u8; 32] = [0u8; 32];

/// Strip an optional `0x` prefix and decode exactly `N` bytes of hex.
pub(crate) fn decode_fixed_hex<const N: usize>(s: &str) -> Result<[u8; N], DecodeError> {
    let body = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(body).map_err(|e| DecodeError::InvalidHex(format!("{}: {}", s, e)))?;
    bytes
        .as_slice()
        .try_into()
        .map_err(|_| DecodeError::InvalidLength {
            expected: N,
            actual: bytes.len(),
        })
}

/// Running hash of the ordered moves of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct MoveTranscript {
    digest: [u8; 32],
}

impl MoveTranscript {
    pub fn new() -> Self {
        Self {
            digest: INITIAL_MOVE_HASH,
        }
    }

    /// Fold one accepted move into the chain.
    pub fn fold(&mut self, direction: Direction) {
        let mut hasher = Sha256::new();
        hasher.update(self.digest);
        hasher.update([direction.code()]);
        self.digest = hasher.finalize().into();
    }

    /// Transcript of `moves` folded in order from the initial value.
    pub fn from_moves(moves: &[Direction]) -> Self {
        let mut transcript = Self::new();
        for &direction in moves {
            transcript.fold(direction);
        }
        transcript
    }

    pub fn digest(&self) -> [u8; 32] {
        self.digest
    }

    /// `0x` followed by 64 lowercase hex digits.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.digest))
    }

    /// Parse a hash rendered with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        Ok(Self {
            digest: decode_fixed_hex::<32>(s)?,
        })
    }
}

impl Default for MoveTranscript {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for MoveTranscript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl From<MoveTranscript> for String {
    fn from(transcript: MoveTranscript) -> Self {
        transcript.to_hex()
    }
}

impl TryFrom<String> for MoveTranscript {
    type Error = DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        MoveTranscript::from_hex(&s)
    }
}
