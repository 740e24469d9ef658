//! Range rendering pipeline
//!
//! Drives every tile of a range through fetch → normalise → blend → stitch
//! and collects the composite together with per-tile statistics.
//!
//! ```text
//!              ┌─ worker ─┐
//! TileRange ──►├─ worker ─┤──► mpsc ──► stitch ──► CompositeCanvas
//!              └─ worker ─┘
//!            fetch + blend          (calling thread)
//! ```
//!
//! Two modes are available:
//!
//! - [`PipelineOrchestrator::run`] streams each tile straight through.
//! - [`PipelineOrchestrator::fetch_into`] followed by
//!   [`PipelineOrchestrator::render`] downloads once into a
//!   [`TileCache`](crate::cache::TileCache) and renders from it, so the
//!   same range can be re-shaded without downloading again.

mod orchestrator;
mod progress;
mod types;

pub use orchestrator::{PipelineOrchestrator, DEFAULT_PARALLEL};
pub use progress::{ProgressObserver, ProgressSnapshot, RunProgress};
pub use types::{
    FailureStage, FetchReport, PipelineError, RunRequest, RunResult, RunStats, TileFailure,
};
