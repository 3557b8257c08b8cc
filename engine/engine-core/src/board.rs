//! Board model: the 4x4 grid derived from a tile list.
//!
//! The tile list is the source of truth; grids are rebuilt on demand and never
//! stored.

use std::collections::HashSet;

use tracing::warn;

use crate::tile::{RawTile, Tile};
use crate::GRID_SIZE;

/// Value of the tile that marks a won game.
pub const WIN_TILE: u32 = 2048;

/// 4x4 grid of optional tile values, indexed `[row][col]`.
pub type Grid = [[Option<u32>; GRID_SIZE]; GRID_SIZE];

/// Build the value grid for a tile list.
///
/// Tiles off the board are skipped, and when two tiles claim the same cell the
/// first one wins. Engine-produced tile sets never hit either case.
pub fn tiles_to_grid(tiles: &[Tile]) -> Grid {
    let mut grid: Grid = [[None; GRID_SIZE]; GRID_SIZE];
    for tile in tiles {
        if let Some((row, col)) = tile.position() {
            if grid[row][col].is_none() {
                grid[row][col] = Some(tile.value);
            }
        }
    }
    grid
}

/// Empty `(row, col)` cells in row-major order.
pub fn empty_cells(grid: &Grid) -> Vec<(usize, usize)> {
    let mut cells = Vec::with_capacity(GRID_SIZE * GRID_SIZE);
    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if cell.is_none() {
                cells.push((r, c));
            }
        }
    }
    cells
}

/// True when no move can change the board: no empty cell and no two
/// orthogonally adjacent cells with the same value.
pub fn is_game_over(tiles: &[Tile]) -> bool {
    let grid = tiles_to_grid(tiles);
    for r in 0..GRID_SIZE {
        for c in 0..GRID_SIZE {
            let Some(value) = grid[r][c] else {
                return false;
            };
            if r + 1 < GRID_SIZE && grid[r + 1][c] == Some(value) {
                return false;
            }
            if c + 1 < GRID_SIZE && grid[r][c + 1] == Some(value) {
                return false;
            }
        }
    }
    true
}

/// Highest tile value on the board (0 when empty).
pub fn max_tile(tiles: &[Tile]) -> u32 {
    tiles.iter().map(|t| t.value).max().unwrap_or(0)
}

/// True once any tile has reached [`WIN_TILE`].
pub fn has_won(tiles: &[Tile]) -> bool {
    max_tile(tiles) >= WIN_TILE
}

/// Convert untrusted tiles, dropping malformed entries, entries that would
/// stack on an occupied cell and entries reusing an earlier id.
pub fn sanitize_tiles(raw: Vec<RawTile>) -> Vec<Tile> {
    let mut occupied = [[false; GRID_SIZE]; GRID_SIZE];
    let mut seen_ids = HashSet::new();
    let mut tiles = Vec::with_capacity(raw.len());
    for (index, entry) in raw.into_iter().enumerate() {
        match Tile::try_from(entry) {
            Ok(tile) => {
                let (row, col) = (tile.row as usize, tile.col as usize);
                if occupied[row][col] {
                    warn!(index, row, col, "Dropping tile stacked on an occupied cell");
                    continue;
                }
                if !seen_ids.insert(tile.id) {
                    warn!(index, id = tile.id, "Dropping tile with a duplicate id");
                    continue;
                }
                occupied[row][col] = true;
                tiles.push(tile);
            }
            Err(e) => warn!(index, error = %e, "Dropping malformed tile"),
        }
    }
    tiles
}

/// Render a value grid as text, one row per line.
pub fn format_grid(grid: &Grid) -> String {
    grid.iter()
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Some(v) => format!("{:>6}", v),
                    None => format!("{:>6}", "."),
                })
                .collect::<Vec<_>>()
                .join("")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
