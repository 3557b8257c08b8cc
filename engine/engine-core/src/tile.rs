//! Tiles and move directions.
//!
//! A [`Tile`] is the unit the engine moves around; the grid is always derived
//! from the tile list (see [`crate::board`]). Tiles that arrive from outside
//! the engine go through [`RawTile`] first so malformed entries can be dropped.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::DecodeError;
use crate::GRID_SIZE;

/// Largest tile value accepted from untrusted input.
///
/// Sixteen tiles of this value sum to 2^31, so no merge chain starting from
/// validated input can overflow a `u32` or the 5-bit packed encoding.
pub const MAX_INPUT_TILE_VALUE: u32 = 1 << 27;

/// A direction to slide the board.
///
/// The numeric codes are part of the move-hash wire format and must never
/// change: `up=0, right=1, down=2, left=3`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Direction {
    Up = 0,
    Right = 1,
    Down = 2,
    Left = 3,
}

impl Direction {
    /// All directions in wire-code order.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Right,
        Direction::Down,
        Direction::Left,
    ];

    /// The byte folded into the move hash.
    #[inline]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code.
    pub fn from_code(code: u8) -> Result<Self, DecodeError> {
        match code {
            0 => Ok(Direction::Up),
            1 => Ok(Direction::Right),
            2 => Ok(Direction::Down),
            3 => Ok(Direction::Left),
            other => Err(DecodeError::InvalidDirection(other)),
        }
    }

    /// Number of clockwise quarter turns that make this direction "left".
    #[inline]
    pub(crate) fn rotations(self) -> usize {
        match self {
            Direction::Left => 0,
            Direction::Down => 1,
            Direction::Right => 2,
            Direction::Up => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Right => "right",
            Direction::Down => "down",
            Direction::Left => "left",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<Direction> for u8 {
    fn from(direction: Direction) -> Self {
        direction.code()
    }
}

impl TryFrom<u8> for Direction {
    type Error = DecodeError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        Direction::from_code(code)
    }
}

impl FromStr for Direction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "up" => Ok(Direction::Up),
            "right" => Ok(Direction::Right),
            "down" => Ok(Direction::Down),
            "left" => Ok(Direction::Left),
            other => Err(format!(
                "unknown direction '{}', expected up, right, down or left",
                other
            )),
        }
    }
}

/// A positioned, valued piece on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Unique within a session, never reused
    pub id: u32,
    /// Power of two, at least 2
    pub value: u32,
    pub row: u8,
    pub col: u8,
    /// Spawned during the last step
    #[serde(default)]
    pub is_new: bool,
    /// Produced by a merge during the last move
    #[serde(default)]
    pub is_merged: bool,
    /// Set on a merge loser; id of the tile it merged into
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_id: Option<u32>,
}

impl Tile {
    pub fn new(id: u32, value: u32, row: u8, col: u8) -> Self {
        Self {
            id,
            value,
            row,
            col,
            is_new: false,
            is_merged: false,
            winner_id: None,
        }
    }

    /// Grid coordinates, if they are on the board.
    #[inline]
    pub fn position(&self) -> Option<(usize, usize)> {
        let (row, col) = (self.row as usize, self.col as usize);
        (row < GRID_SIZE && col < GRID_SIZE).then_some((row, col))
    }

    /// Base-2 logarithm of the value (0 for a zero value).
    #[inline]
    pub fn exponent(&self) -> u32 {
        if self.value == 0 {
            0
        } else {
            self.value.trailing_zeros()
        }
    }
}

/// A tile as received from an untrusted source (saved games, API clients).
///
/// Every field is optional so that malformed entries deserialize and can be
/// rejected individually instead of failing the whole payload.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTile {
    pub id: Option<i64>,
    pub value: Option<i64>,
    pub row: Option<i64>,
    pub col: Option<i64>,
    #[serde(default)]
    pub is_new: Option<bool>,
    #[serde(default)]
    pub is_merged: Option<bool>,
    #[serde(default)]
    pub winner_id: Option<i64>,
}

impl From<Tile> for RawTile {
    fn from(tile: Tile) -> Self {
        Self {
            id: Some(tile.id as i64),
            value: Some(tile.value as i64),
            row: Some(tile.row as i64),
            col: Some(tile.col as i64),
            is_new: Some(tile.is_new),
            is_merged: Some(tile.is_merged),
            winner_id: tile.winner_id.map(|id| id as i64),
        }
    }
}

impl TryFrom<RawTile> for Tile {
    type Error = DecodeError;

    fn try_from(raw: RawTile) -> Result<Self, Self::Error> {
        let field = |name: &str, v: Option<i64>| {
            v.ok_or_else(|| DecodeError::InvalidTile(format!("missing {}", name)))
        };
        let coord = |name: &str, v: Option<i64>| -> Result<u8, DecodeError> {
            let v = field(name, v)?;
            if (0..GRID_SIZE as i64).contains(&v) {
                Ok(v as u8)
            } else {
                Err(DecodeError::InvalidTile(format!("{} {} is off the board", name, v)))
            }
        };

        let id = field("id", raw.id)?;
        let id = u32::try_from(id)
            .map_err(|_| DecodeError::InvalidTile(format!("id {} out of range", id)))?;
        let value = field("value", raw.value)?;
        if value < 2 || value > MAX_INPUT_TILE_VALUE as i64 || (value & (value - 1)) != 0 {
            return Err(DecodeError::InvalidTile(format!(
                "value {} is not a power of two in [2, {}]",
                value, MAX_INPUT_TILE_VALUE
            )));
        }
        let row = coord("row", raw.row)?;
        let col = coord("col", raw.col)?;

        Ok(Tile {
            id,
            value: value as u32,
            row,
            col,
            is_new: raw.is_new.unwrap_or(false),
            is_merged: raw.is_merged.unwrap_or(false),
            winner_id: raw.winner_id.and_then(|w| u32::try_from(w).ok()),
        })
    }
}
