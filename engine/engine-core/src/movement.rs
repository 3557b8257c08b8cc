//! Move engine: slide and merge the tile set in one direction.
//!
//! Every direction is reduced to "slide left" by rotating the working grid
//! clockwise, processing each row, and rotating back.

use crate::board::tiles_to_grid;
use crate::tile::{Direction, Tile};
use crate::GRID_SIZE;

type TileGrid = [[Option<Tile>; GRID_SIZE]; GRID_SIZE];

/// Result of applying a move.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    /// Surviving tiles, in row-major order of their final cells
    pub tiles: Vec<Tile>,
    /// Merge losers, positioned on their winner's final cell
    pub merged: Vec<Tile>,
    /// Sum of all values produced by merges in this move
    pub score_increase: u64,
    /// Whether the value grid changed
    pub moved: bool,
}

/// Rotate a grid a quarter turn clockwise: `(r, c) -> (c, N-1-r)`.
fn rotate(grid: &TileGrid) -> TileGrid {
    let mut out: TileGrid = [[None; GRID_SIZE]; GRID_SIZE];
    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            out[c][GRID_SIZE - 1 - r] = *cell;
        }
    }
    out
}

fn rotate_times(mut grid: TileGrid, times: usize) -> TileGrid {
    for _ in 0..times {
        grid = rotate(&grid);
    }
    grid
}

/// Slide one row to the left, merging equal neighbours once each.
///
/// The scan compares each survivor with its right neighbour in the compacted
/// list. A merged tile is not compared again, so `[2,2,2,2]` becomes `[4,4]`
/// and `[4,2,2]` becomes `[4,4]`, never `[8]`.
fn slide_and_merge_row(
    row: &[Option<Tile>; GRID_SIZE],
    merged: &mut Vec<Tile>,
) -> ([Option<Tile>; GRID_SIZE], u64) {
    let mut compact: Vec<Tile> = row.iter().flatten().copied().collect();
    let mut score = 0u64;

    let mut i = 0;
    while i + 1 < compact.len() {
        if compact[i].value == compact[i + 1].value {
            let mut loser = compact.remove(i + 1);
            let winner = &mut compact[i];
            winner.value *= 2;
            winner.is_merged = true;
            score += winner.value as u64;
            loser.winner_id = Some(winner.id);
            merged.push(loser);
        }
        i += 1;
    }

    let mut out = [None; GRID_SIZE];
    for (col, tile) in compact.into_iter().enumerate() {
        out[col] = Some(tile);
    }
    (out, score)
}

/// Apply `direction` to `tiles`.
///
/// Transient flags (`is_new`, `is_merged`, `winner_id`) from the previous step
/// are cleared first. When nothing moves the returned tiles equal the input
/// with those flags cleared and `score_increase` is 0.
pub fn apply_move(tiles: &[Tile], direction: Direction) -> MoveOutcome {
    let mut grid: TileGrid = [[None; GRID_SIZE]; GRID_SIZE];
    for tile in tiles {
        if let Some((row, col)) = tile.position() {
            grid[row][col] = Some(Tile {
                is_new: false,
                is_merged: false,
                winner_id: None,
                ..*tile
            });
        }
    }
    let before = tiles_to_grid(tiles);

    let turns = direction.rotations();
    let mut grid = rotate_times(grid, turns);

    let mut merged = Vec::new();
    let mut score_increase = 0;
    for row in grid.iter_mut() {
        let (new_row, score) = slide_and_merge_row(row, &mut merged);
        *row = new_row;
        score_increase += score;
    }

    let grid = rotate_times(grid, (4 - turns) % 4);

    let mut survivors = Vec::with_capacity(tiles.len());
    for (r, row) in grid.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            if let Some(tile) = cell {
                survivors.push(Tile {
                    row: r as u8,
                    col: c as u8,
                    ..*tile
                });
            }
        }
    }

    for loser in merged.iter_mut() {
        if let Some(winner) = survivors.iter().find(|t| Some(t.id) == loser.winner_id) {
            loser.row = winner.row;
            loser.col = winner.col;
        }
    }

    let moved = before != tiles_to_grid(&survivors);

    MoveOutcome {
        tiles: survivors,
        merged,
        score_increase,
        moved,
    }
}

/// Directions that would change the board.
pub fn legal_moves(tiles: &[Tile]) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|&d| apply_move(tiles, d).moved)
        .collect()
}
