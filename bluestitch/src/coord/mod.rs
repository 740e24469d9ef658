//! Coordinate module
//!
//! Provides tile coordinates, inclusive tile ranges, and conversion from
//! world block positions to the tile grid used by the map server.

mod types;

pub use types::{TileCoord, TileRange, TileRangeIter, BLOCKS_PER_TILE};

/// Converts a world block position to the index of the tile containing it.
///
/// Tiles span [`BLOCKS_PER_TILE`] blocks, and negative positions round
/// toward negative infinity, so block `-1` lives in tile `-1`.
#[inline]
pub fn block_to_tile(pos: i32) -> i32 {
    pos.div_euclid(BLOCKS_PER_TILE)
}

/// Converts a tile index back to the block position of its first block.
#[inline]
pub fn tile_to_block(tile: i32) -> i64 {
    tile as i64 * BLOCKS_PER_TILE as i64
}

/// Builds a tile range covering the block rectangle between two corners.
///
/// Corners may be given in any order.
pub fn range_from_blocks(x1: i32, z1: i32, x2: i32, z2: i32) -> TileRange {
    TileRange::new(
        block_to_tile(x1.min(x2)),
        block_to_tile(z1.min(z2)),
        block_to_tile(x1.max(x2)),
        block_to_tile(z1.max(z2)),
    )
}
