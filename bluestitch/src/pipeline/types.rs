//! Pipeline requests, results and errors

use std::fmt;

use thiserror::Error;

use crate::blend::{BlendConfig, BlendError};
use crate::coord::{TileCoord, TileRange};
use crate::provider::TileSource;
use crate::stitch::{CompositeCanvas, StitchError};
use crate::tile::FetchError;

/// Everything needed to render one range.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Tiles to render, inclusive on both corners
    pub range: TileRange,
    /// Where to fetch tiles from
    pub source: TileSource,
    /// How to shade each tile
    pub blend: BlendConfig,
}

/// Tile counts for one run.
///
/// `attempted` counts tiles whose work started; `cancelled` counts tiles
/// never started because the run was cancelled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub attempted: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub cancelled: u64,
}

impl fmt::Display for RunStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} tiles succeeded, {} failed, {} cancelled",
            self.succeeded, self.attempted, self.failed, self.cancelled
        )
    }
}

/// The step at which a tile failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureStage {
    /// Download or decode
    Fetch,
    /// Normalisation or shading
    Blend,
    /// Rendering from a cache that has no entry for the tile
    NotCached,
}

impl fmt::Display for FailureStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureStage::Fetch => write!(f, "fetch"),
            FailureStage::Blend => write!(f, "blend"),
            FailureStage::NotCached => write!(f, "cache lookup"),
        }
    }
}

/// One tile that did not make it into the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileFailure {
    pub coord: TileCoord,
    pub stage: FailureStage,
    pub message: String,
}

impl TileFailure {
    pub(crate) fn blend(coord: TileCoord, error: BlendError) -> Self {
        Self {
            coord,
            stage: FailureStage::Blend,
            message: error.to_string(),
        }
    }

    pub(crate) fn not_cached(coord: TileCoord) -> Self {
        Self {
            coord,
            stage: FailureStage::NotCached,
            message: "tile was not fetched".to_string(),
        }
    }
}

impl From<FetchError> for TileFailure {
    fn from(e: FetchError) -> Self {
        Self {
            coord: e.coord,
            stage: FailureStage::Fetch,
            message: e.source.to_string(),
        }
    }
}

impl fmt::Display for TileFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Tile {} failed during {}: {}",
            self.coord, self.stage, self.message
        )
    }
}

/// Outcome of a render run.
#[derive(Debug, Clone)]
pub struct RunResult {
    /// The composite, or `None` when no tile succeeded
    pub canvas: Option<CompositeCanvas>,
    pub stats: RunStats,
    /// Message of the most recently recorded failure
    pub last_error: Option<String>,
    /// Every per-tile failure, in the order they were recorded
    pub failures: Vec<TileFailure>,
}

impl RunResult {
    /// The result of a run that did no work.
    pub fn empty() -> Self {
        Self {
            canvas: None,
            stats: RunStats::default(),
            last_error: None,
            failures: Vec::new(),
        }
    }

    /// True when every tile of the range made it into the canvas.
    pub fn is_complete(&self) -> bool {
        self.canvas.is_some() && self.stats.failed == 0 && self.stats.cancelled == 0
    }
}

/// Outcome of filling a cache.
#[derive(Debug, Clone, Default)]
pub struct FetchReport {
    pub stats: RunStats,
    pub last_error: Option<String>,
    pub failures: Vec<TileFailure>,
}

/// Errors that abort a whole run.
///
/// Per-tile problems are never reported here; they end up in
/// [`RunResult::failures`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Blend settings rejected before any work started
    #[error("Invalid blend settings: {0}")]
    InvalidConfig(#[from] BlendError),

    /// The canvas for the range would be too large to allocate
    #[error("Range needs a {width}×{height} canvas, larger than the {max} pixel limit")]
    CanvasTooLarge { width: u64, height: u64, max: u32 },

    /// A blended tile could not be placed into the canvas
    #[error("Stitching failed: {0}")]
    Stitch(StitchError),
}

impl From<StitchError> for PipelineError {
    fn from(e: StitchError) -> Self {
        match e {
            StitchError::CanvasTooLarge { width, height, max } => {
                PipelineError::CanvasTooLarge { width, height, max }
            }
            other => PipelineError::Stitch(other),
        }
    }
}
