//! BlueStitch - Elevation-shaded map composites from tiled web maps
//!
//! This library fetches a rectangular range of two-layer map tiles from a
//! tile server, blends each tile's overlay layer onto its elevation layer
//! (with optional contour lines and elevation-band tints), and stitches the
//! results into one large composite canvas.
//!
//! # Architecture
//!
//! ```text
//! TileRange ──► TileFetcher ──► CanonicalTile ──► TileBlender ──► CompositeCanvas
//!  (coord)      (provider,       (tile)            (blend)         (stitch)
//!                tile)
//!                    └──────────── PipelineOrchestrator (pipeline) ───────┘
//! ```
//!
//! Export to PNG/JPEG/BMP lives in [`export`] and is invoked by callers once
//! a run has produced a canvas.

pub mod blend;
pub mod cache;
pub mod config;
pub mod coord;
pub mod export;
pub mod logging;
pub mod pipeline;
pub mod provider;
pub mod stitch;
pub mod tile;

/// Library version, taken from the crate manifest.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
