//! Tile spawning driven by the seeded generator.

use crate::board::{empty_cells, tiles_to_grid};
use crate::rng::SeededRandom;
use crate::tile::Tile;

/// Draws at or above this threshold spawn a 4 instead of a 2.
pub const FOUR_THRESHOLD: f64 = 0.9;

/// Id given to the first tile of a session.
pub const FIRST_TILE_ID: u32 = 1;

/// Place one new tile on a random empty cell.
///
/// Consumes exactly two draws (cell, then value) when a cell is free. On a full
/// board the input is returned unchanged and nothing is drawn; callers treat
/// that as "board full", not as an error.
pub fn add_random_tile(tiles: &[Tile], rng: &mut SeededRandom, next_id: u32) -> (Vec<Tile>, u32) {
    let empty = empty_cells(&tiles_to_grid(tiles));
    if empty.is_empty() {
        return (tiles.to_vec(), next_id);
    }

    let (row, col) = empty[rng.next_index(empty.len())];
    let value = if rng.next_f64() < FOUR_THRESHOLD { 2 } else { 4 };

    let mut tile = Tile::new(next_id, value, row as u8, col as u8);
    tile.is_new = true;

    let mut out = Vec::with_capacity(tiles.len() + 1);
    out.extend_from_slice(tiles);
    out.push(tile);
    (out, next_id + 1)
}

/// The two starting tiles of a session (four draws), plus the next free id.
pub fn initial_tiles(rng: &mut SeededRandom) -> (Vec<Tile>, u32) {
    let (tiles, next_id) = add_random_tile(&[], rng, FIRST_TILE_ID);
    add_random_tile(&tiles, rng, next_id)
}
