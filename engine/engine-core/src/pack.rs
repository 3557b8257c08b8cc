//! Compact board encoding for external verifiers.
//!
//! Each cell stores `log2(value)` (0 when empty) in 5 bits; cell `i` in
//! row-major order sits at bit offset `5 * i`. Sixteen cells need 80 bits,
//! which a `u128` holds exactly.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::board::tiles_to_grid;
use crate::error::DecodeError;
use crate::tile::Tile;
use crate::GRID_SIZE;

/// Bits per cell.
pub const CELL_BITS: u32 = 5;

/// Total width of a packed board.
pub const PACKED_BITS: u32 = CELL_BITS * (GRID_SIZE * GRID_SIZE) as u32;

const CELL_MASK: u128 = (1 << CELL_BITS) - 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct PackedBoard(u128);

impl PackedBoard {
    pub fn raw(self) -> u128 {
        self.0
    }

    /// Minimal lowercase hex with a `0x` prefix (`0x0` for an empty board).
    pub fn to_hex(self) -> String {
        format!("{:#x}", self.0)
    }

    pub fn from_hex(s: &str) -> Result<Self, DecodeError> {
        let body = s.strip_prefix("0x").unwrap_or(s);
        if body.is_empty() || !body.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DecodeError::InvalidHex(s.to_string()));
        }
        let value = u128::from_str_radix(body, 16).map_err(|_| DecodeError::Overflow {
            bits: PACKED_BITS,
        })?;
        if value >> PACKED_BITS != 0 {
            return Err(DecodeError::Overflow { bits: PACKED_BITS });
        }
        Ok(Self(value))
    }

    /// The 5-bit exponent stored for `(row, col)`.
    pub fn exponent_at(self, row: usize, col: usize) -> u32 {
        let offset = CELL_BITS as usize * (row * GRID_SIZE + col);
        ((self.0 >> offset) & CELL_MASK) as u32
    }

    /// Decode back to tile values, 0 for empty cells.
    pub fn unpack(self) -> [[u32; GRID_SIZE]; GRID_SIZE] {
        let mut values = [[0u32; GRID_SIZE]; GRID_SIZE];
        for (r, row) in values.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                let exponent = self.exponent_at(r, c);
                *cell = if exponent == 0 { 0 } else { 1 << exponent };
            }
        }
        values
    }
}

/// Pack the board described by `tiles`.
pub fn pack_board(tiles: &[Tile]) -> PackedBoard {
    let grid = tiles_to_grid(tiles);
    let mut packed = 0u128;
    for (i, cell) in grid.iter().flatten().enumerate() {
        if let Some(value) = cell {
            let exponent = value.trailing_zeros() as u128 & CELL_MASK;
            packed |= exponent << (CELL_BITS as usize * i);
        }
    }
    PackedBoard(packed)
}

impl fmt::Display for PackedBoard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

impl From<PackedBoard> for String {
    fn from(board: PackedBoard) -> Self {
        board.to_hex()
    }
}

impl TryFrom<String> for PackedBoard {
    type Error = DecodeError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        PackedBoard::from_hex(&s)
    }
}
