//! Tile data types and tile fetching.
//!
//! A tile moves through three shapes on its way into the composite:
//!
//! ```text
//! RawTile ──────────► CanonicalTile ──────────► BlendedTile
//! (any size/format)   (501×1002 BGRA,           (501×501 BGRA)
//!                      add over base)
//! ```
//!
//! [`TileFetcher`] produces `RawTile`s; the blender consumes
//! `CanonicalTile`s and produces `BlendedTile`s for the stitcher.

mod canonical;
mod fetcher;
mod pixel;
mod raw;

pub use canonical::{BlendedTile, CanonicalTile, CANONICAL_HEIGHT, CANONICAL_WIDTH, TILE_SIZE};
pub use fetcher::{FetchError, HttpTileFetcher, TileFetcher};
pub use pixel::{Bgra, PixelBuffer, BYTES_PER_PIXEL};
pub use raw::RawTile;

pub(crate) use pixel::{set_pixel_in_row, swap_red_blue};
