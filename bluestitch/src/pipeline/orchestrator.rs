//! Range rendering orchestration

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::progress::{ProgressObserver, RunProgress};
use super::types::{FetchReport, PipelineError, RunRequest, RunResult, RunStats, TileFailure};
use crate::blend::{blend, BlendConfig};
use crate::cache::TileCache;
use crate::coord::{TileCoord, TileRange};
use crate::provider::TileSource;
use crate::stitch::{stitch, CompositeCanvas};
use crate::tile::{BlendedTile, CanonicalTile, RawTile, TileFetcher};

/// Default number of tiles processed concurrently.
pub const DEFAULT_PARALLEL: usize = 4;

/// Renders tile ranges into composite canvases.
///
/// Worker threads pull coordinates in range order and run fetch → normalise
/// → blend; the calling thread stitches each finished tile into the canvas.
/// A failing tile is recorded and skipped, never aborting the run.
///
/// # Example
///
/// ```ignore
/// use bluestitch::pipeline::{PipelineOrchestrator, RunRequest};
/// use bluestitch::provider::ReqwestClient;
/// use bluestitch::tile::HttpTileFetcher;
/// use std::sync::Arc;
///
/// let fetcher = Arc::new(HttpTileFetcher::new(ReqwestClient::new()?));
/// let orchestrator = PipelineOrchestrator::new(fetcher).with_parallel(8);
/// let result = orchestrator.run(&request, &CancellationToken::new())?;
/// ```
pub struct PipelineOrchestrator {
    fetcher: Arc<dyn TileFetcher>,
    parallel: usize,
    progress: Arc<RunProgress>,
    observer: Option<ProgressObserver>,
}

impl PipelineOrchestrator {
    pub fn new(fetcher: Arc<dyn TileFetcher>) -> Self {
        Self {
            fetcher,
            parallel: DEFAULT_PARALLEL,
            progress: Arc::new(RunProgress::new()),
            observer: None,
        }
    }

    /// Sets how many tiles are processed at once (at least one).
    pub fn with_parallel(mut self, parallel: usize) -> Self {
        self.parallel = parallel.max(1);
        self
    }

    /// Registers a callback run on the orchestrating thread after each tile.
    pub fn with_observer(mut self, observer: ProgressObserver) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Shared progress counters, readable while a run is in flight.
    pub fn progress(&self) -> Arc<RunProgress> {
        Arc::clone(&self.progress)
    }

    pub fn parallel(&self) -> usize {
        self.parallel
    }

    /// Fetches, blends and stitches every tile of the request's range.
    ///
    /// An invalid range yields [`RunResult::empty`]. Once `cancel` fires no
    /// further tiles are started; tiles already in flight are still
    /// stitched and the partial canvas is returned.
    pub fn run(
        &self,
        request: &RunRequest,
        cancel: &CancellationToken,
    ) -> Result<RunResult, PipelineError> {
        let range = request.range;
        if !range.is_valid() {
            debug!(range = %range, "Range is empty, nothing to render");
            return Ok(RunResult::empty());
        }
        request.blend.validate()?;
        let canvas = CompositeCanvas::new(range)?;

        info!(
            range = %range,
            tiles = range.tile_count(),
            width = canvas.width(),
            height = canvas.height(),
            parallel = self.parallel,
            "Rendering range"
        );

        let coords: Vec<TileCoord> = range.iter().collect();
        self.render_tiles(canvas, &coords, cancel, |coord| {
            let raw = self.fetcher.fetch(coord, &request.source)?;
            blend_raw(coord, &raw, &request.blend)
        })
    }

    /// Fetches the tiles of `range` that `cache` does not hold yet.
    ///
    /// Tiles already cached are skipped, so calling this again after a
    /// partial failure only retries what is missing. A range too large to
    /// render later is rejected before anything is fetched.
    pub fn fetch_into(
        &self,
        cache: &TileCache,
        range: &TileRange,
        source: &TileSource,
        cancel: &CancellationToken,
    ) -> Result<FetchReport, PipelineError> {
        if !range.is_valid() {
            debug!(range = %range, "Range is empty, nothing to fetch");
            return Ok(FetchReport::default());
        }
        CompositeCanvas::dimensions_for(*range)?;

        let coords = cache.missing_in(range);
        info!(
            range = %range,
            missing = coords.len(),
            cached = cache.len(),
            "Fetching tiles into cache"
        );

        let mut report = FetchReport::default();
        let start = Instant::now();
        let dispatched = self.dispatch(
            &coords,
            cancel,
            |coord| {
                let raw = self.fetcher.fetch(coord, source)?;
                cache.insert(coord, raw);
                Ok(())
            },
            |_, outcome| {
                self.tally(
                    &mut report.stats,
                    &mut report.failures,
                    &mut report.last_error,
                    outcome,
                );
                Ok(())
            },
        );
        if let Err(e) = dispatched {
            warn!(error = %e, "Fetch aborted");
        }

        report.stats.cancelled = coords.len() as u64 - report.stats.attempted;
        info!(
            stats = %report.stats,
            bytes = cache.total_bytes(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Fetch finished"
        );
        Ok(report)
    }

    /// Blends and stitches whatever `cache` holds for `range`.
    ///
    /// Tiles with no cache entry are recorded as failures and left
    /// transparent. Nothing is downloaded.
    pub fn render(
        &self,
        cache: &TileCache,
        range: &TileRange,
        config: &BlendConfig,
    ) -> Result<RunResult, PipelineError> {
        if !range.is_valid() {
            debug!(range = %range, "Range is empty, nothing to render");
            return Ok(RunResult::empty());
        }
        config.validate()?;
        let canvas = CompositeCanvas::new(*range)?;

        info!(range = %range, cached = cache.len(), "Rendering range from cache");

        let coords: Vec<TileCoord> = range.iter().collect();
        self.render_tiles(canvas, &coords, &CancellationToken::new(), |coord| {
            let raw = cache.get(coord).ok_or_else(|| TileFailure::not_cached(coord))?;
            blend_raw(coord, &raw, config)
        })
    }

    fn render_tiles<W>(
        &self,
        mut canvas: CompositeCanvas,
        coords: &[TileCoord],
        cancel: &CancellationToken,
        work: W,
    ) -> Result<RunResult, PipelineError>
    where
        W: Fn(TileCoord) -> Result<BlendedTile, TileFailure> + Sync,
    {
        let start = Instant::now();
        let mut stats = RunStats::default();
        let mut failures = Vec::new();
        let mut last_error = None;

        self.dispatch(coords, cancel, work, |coord, outcome| {
            let outcome = match outcome {
                Ok(tile) => {
                    stitch(&mut canvas, coord, &tile).map_err(PipelineError::Stitch)?;
                    Ok(())
                }
                Err(failure) => Err(failure),
            };
            self.tally(&mut stats, &mut failures, &mut last_error, outcome);
            Ok(())
        })?;

        stats.cancelled = coords.len() as u64 - stats.attempted;
        if stats.cancelled > 0 {
            info!(skipped = stats.cancelled, "Run cancelled");
        }
        info!(
            stats = %stats,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Render finished"
        );

        Ok(RunResult {
            canvas: (stats.succeeded > 0).then_some(canvas),
            stats,
            last_error,
            failures,
        })
    }

    /// Records one tile outcome in the run totals and progress counters.
    fn tally(
        &self,
        stats: &mut RunStats,
        failures: &mut Vec<TileFailure>,
        last_error: &mut Option<String>,
        outcome: Result<(), TileFailure>,
    ) {
        stats.attempted += 1;
        match outcome {
            Ok(()) => {
                stats.succeeded += 1;
                self.progress.record_success();
            }
            Err(failure) => {
                warn!(
                    x = failure.coord.x,
                    z = failure.coord.z,
                    stage = %failure.stage,
                    error = %failure.message,
                    "Tile failed"
                );
                stats.failed += 1;
                let message = failure.to_string();
                self.progress.record_failure(message.clone());
                *last_error = Some(message);
                failures.push(failure);
            }
        }

        if let Some(observer) = &self.observer {
            observer(&self.progress.snapshot());
        }
    }

    /// Runs `work` for each coordinate on a bounded set of worker threads
    /// and feeds every outcome to `handle` on the calling thread.
    ///
    /// Workers stop taking new coordinates once `cancel` fires or `handle`
    /// returns an error.
    fn dispatch<T, W, H>(
        &self,
        coords: &[TileCoord],
        cancel: &CancellationToken,
        work: W,
        mut handle: H,
    ) -> Result<(), PipelineError>
    where
        T: Send,
        W: Fn(TileCoord) -> Result<T, TileFailure> + Sync,
        H: FnMut(TileCoord, Result<T, TileFailure>) -> Result<(), PipelineError>,
    {
        self.progress.reset(coords.len() as u64);
        if coords.is_empty() {
            return Ok(());
        }

        let stop = cancel.child_token();
        let cursor = AtomicUsize::new(0);
        let workers = self.parallel.min(coords.len());

        thread::scope(|s| {
            let (tx, rx) = mpsc::channel();
            for _ in 0..workers {
                let tx = tx.clone();
                let (stop, cursor, work) = (&stop, &cursor, &work);
                s.spawn(move || loop {
                    if stop.is_cancelled() {
                        break;
                    }
                    let index = cursor.fetch_add(1, Ordering::Relaxed);
                    let Some(&coord) = coords.get(index) else {
                        break;
                    };
                    debug!(x = coord.x, z = coord.z, "Processing tile");
                    if tx.send((coord, work(coord))).is_err() {
                        break;
                    }
                });
            }
            // Receiver ends once every worker has exited
            drop(tx);

            for (coord, outcome) in rx {
                if let Err(e) = handle(coord, outcome) {
                    stop.cancel();
                    return Err(e);
                }
            }
            Ok(())
        })
    }
}

fn blend_raw(
    coord: TileCoord,
    raw: &RawTile,
    config: &BlendConfig,
) -> Result<BlendedTile, TileFailure> {
    let canonical = CanonicalTile::from_raw(raw).map_err(|e| TileFailure::blend(coord, e))?;
    blend(&canonical, config).map_err(|e| TileFailure::blend(coord, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{FailureStage, ProgressSnapshot};
    use crate::provider::ProviderError;
    use crate::tile::{Bgra, FetchError, TILE_SIZE};
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::collections::HashSet;

    /// Serves solid full-size tiles whose color encodes the coordinate.
    struct SolidFetcher {
        failing: HashSet<TileCoord>,
        fetches: AtomicUsize,
        cancel_on_fetch: Option<CancellationToken>,
    }

    impl SolidFetcher {
        fn new() -> Self {
            Self {
                failing: HashSet::new(),
                fetches: AtomicUsize::new(0),
                cancel_on_fetch: None,
            }
        }

        fn failing_at(mut self, coord: TileCoord) -> Self {
            self.failing.insert(coord);
            self
        }

        fn cancelling(mut self, token: CancellationToken) -> Self {
            self.cancel_on_fetch = Some(token);
            self
        }
    }

    fn color_for(coord: TileCoord) -> [u8; 4] {
        [(coord.x + 10) as u8, (coord.z + 10) as u8, 77, 255]
    }

    impl TileFetcher for SolidFetcher {
        fn fetch(&self, coord: TileCoord, _source: &TileSource) -> Result<RawTile, FetchError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);
            if let Some(token) = &self.cancel_on_fetch {
                token.cancel();
            }
            if self.failing.contains(&coord) {
                return Err(FetchError {
                    coord,
                    source: ProviderError::HttpError("HTTP 404".to_string()),
                });
            }
            let image = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE * 2, Rgba(color_for(coord)));
            Ok(RawTile::from_image(DynamicImage::ImageRgba8(image)))
        }
    }

    fn request(range: TileRange) -> RunRequest {
        RunRequest {
            range,
            source: TileSource::with_defaults("http://localhost:8100/"),
            blend: BlendConfig::plain(),
        }
    }

    fn expected_pixel(coord: TileCoord) -> Bgra {
        let [r, g, b, a] = color_for(coord);
        Bgra::rgba(r, g, b, a)
    }

    #[test]
    fn test_parallel_is_at_least_one() {
        let fetcher = Arc::new(SolidFetcher::new());
        assert_eq!(PipelineOrchestrator::new(fetcher.clone()).parallel(), DEFAULT_PARALLEL);
        assert_eq!(PipelineOrchestrator::new(fetcher.clone()).with_parallel(0).parallel(), 1);
        assert_eq!(PipelineOrchestrator::new(fetcher).with_parallel(6).parallel(), 6);
    }

    #[test]
    fn test_invalid_range_is_empty_result() {
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());

        let result = orchestrator
            .run(&request(TileRange::new(2, 0, 1, 0)), &CancellationToken::new())
            .unwrap();

        assert!(result.canvas.is_none());
        assert_eq!(result.stats, RunStats::default());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_full_run_stitches_every_tile() {
        let orchestrator = PipelineOrchestrator::new(Arc::new(SolidFetcher::new()));
        let range = TileRange::new(-1, 0, 0, 1);

        let result = orchestrator
            .run(&request(range), &CancellationToken::new())
            .unwrap();

        assert!(result.is_complete());
        assert_eq!(result.stats.attempted, 4);
        assert_eq!(result.stats.succeeded, 4);
        let canvas = result.canvas.unwrap();
        assert_eq!((canvas.width(), canvas.height()), (1002, 1002));
        for coord in &range {
            let (ox, oy) = canvas.offset_of(coord).unwrap();
            assert_eq!(canvas.pixel(ox + 250, oy + 250), Some(expected_pixel(coord)));
        }
    }

    #[test]
    fn test_partial_failure_keeps_going() {
        let bad = TileCoord::new(1, 0);
        let fetcher = SolidFetcher::new().failing_at(bad);
        let orchestrator = PipelineOrchestrator::new(Arc::new(fetcher)).with_parallel(2);

        let result = orchestrator
            .run(&request(TileRange::new(0, 0, 1, 1)), &CancellationToken::new())
            .unwrap();

        assert_eq!(result.stats.attempted, 4);
        assert_eq!(result.stats.succeeded, 3);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].coord, bad);
        assert_eq!(
            result.last_error.as_deref(),
            Some("Tile (1, 0) failed during fetch: HTTP error: HTTP 404")
        );

        // The failed tile's region stays transparent
        let canvas = result.canvas.unwrap();
        assert_eq!(canvas.pixel(501 + 10, 10), Some(Bgra::TRANSPARENT));
        assert_eq!(canvas.pixel(10, 10), Some(expected_pixel(TileCoord::new(0, 0))));
    }

    #[test]
    fn test_all_failures_yield_no_canvas() {
        let coord = TileCoord::new(0, 0);
        let orchestrator = PipelineOrchestrator::new(Arc::new(SolidFetcher::new().failing_at(coord)));

        let result = orchestrator
            .run(&request(TileRange::new(0, 0, 0, 0)), &CancellationToken::new())
            .unwrap();

        assert!(result.canvas.is_none());
        assert_eq!(result.stats.failed, 1);
    }

    #[test]
    fn test_cancel_before_start() {
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = orchestrator
            .run(&request(TileRange::new(0, 0, 2, 2)), &cancel)
            .unwrap();

        assert_eq!(result.stats.attempted, 0);
        assert_eq!(result.stats.cancelled, 9);
        assert!(result.canvas.is_none());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_cancel_mid_run_keeps_in_flight_tile() {
        let cancel = CancellationToken::new();
        let fetcher = SolidFetcher::new().cancelling(cancel.clone());
        let orchestrator = PipelineOrchestrator::new(Arc::new(fetcher)).with_parallel(1);

        let result = orchestrator
            .run(&request(TileRange::new(0, 0, 0, 3)), &cancel)
            .unwrap();

        assert_eq!(result.stats.attempted, 1);
        assert_eq!(result.stats.succeeded, 1);
        assert_eq!(result.stats.cancelled, 3);
        let canvas = result.canvas.unwrap();
        assert_eq!(canvas.pixel(0, 0), Some(expected_pixel(TileCoord::new(0, 0))));
        assert_eq!(canvas.pixel(0, 501), Some(Bgra::TRANSPARENT));
    }

    #[test]
    fn test_invalid_blend_config_rejected_before_fetch() {
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());
        let mut req = request(TileRange::new(0, 0, 0, 0));
        req.blend.interval = 0;

        assert!(matches!(
            orchestrator.run(&req, &CancellationToken::new()),
            Err(PipelineError::InvalidConfig(_))
        ));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_oversized_range_rejected_before_fetch() {
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());

        assert!(matches!(
            orchestrator.run(&request(TileRange::new(0, 0, 0, 500)), &CancellationToken::new()),
            Err(PipelineError::CanvasTooLarge { .. })
        ));
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_observer_sees_every_tile() {
        let calls = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&calls);
        let orchestrator = PipelineOrchestrator::new(Arc::new(SolidFetcher::new()))
            .with_observer(Arc::new(move |snapshot: &ProgressSnapshot| {
                assert_eq!(snapshot.total, 3);
                seen.fetch_add(1, Ordering::SeqCst);
            }));

        orchestrator
            .run(&request(TileRange::new(0, 0, 2, 0)), &CancellationToken::new())
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 3);
        let snapshot = orchestrator.progress().snapshot();
        assert_eq!((snapshot.current, snapshot.succeeded), (3, 3));
    }

    #[test]
    fn test_two_phase_matches_streaming() {
        let range = TileRange::new(3, -2, 4, -1);
        let req = request(range);

        let streaming = PipelineOrchestrator::new(Arc::new(SolidFetcher::new()))
            .run(&req, &CancellationToken::new())
            .unwrap();

        let orchestrator = PipelineOrchestrator::new(Arc::new(SolidFetcher::new()));
        let cache = TileCache::new();
        let report = orchestrator
            .fetch_into(&cache, &range, &req.source, &CancellationToken::new())
            .unwrap();
        assert_eq!(report.stats.succeeded, 4);
        assert_eq!(cache.len(), 4);

        let rendered = orchestrator.render(&cache, &range, &req.blend).unwrap();
        assert_eq!(rendered.canvas, streaming.canvas);
        assert_eq!(rendered.stats, streaming.stats);
    }

    #[test]
    fn test_fetch_into_only_fetches_missing() {
        let range = TileRange::new(0, 0, 1, 0);
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());
        let cache = TileCache::new();
        let source = TileSource::with_defaults("http://localhost/");

        orchestrator
            .fetch_into(&cache, &range, &source, &CancellationToken::new())
            .unwrap();
        let report = orchestrator
            .fetch_into(&cache, &range, &source, &CancellationToken::new())
            .unwrap();

        assert_eq!(report.stats.attempted, 0);
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_full_axis_range_rejected_before_fetch() {
        let fetcher = Arc::new(SolidFetcher::new());
        let orchestrator = PipelineOrchestrator::new(fetcher.clone());
        let range = TileRange::new(i32::MIN, 0, i32::MAX, 0);

        assert!(matches!(
            orchestrator.run(&request(range), &CancellationToken::new()),
            Err(PipelineError::CanvasTooLarge { .. })
        ));

        let cache = TileCache::new();
        let source = TileSource::with_defaults("http://localhost/");
        assert!(matches!(
            orchestrator.fetch_into(&cache, &range, &source, &CancellationToken::new()),
            Err(PipelineError::CanvasTooLarge { .. })
        ));
        assert!(cache.is_empty());
        assert_eq!(fetcher.fetches.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_render_reports_uncached_tiles() {
        let orchestrator = PipelineOrchestrator::new(Arc::new(SolidFetcher::new()));
        let cache = TileCache::new();
        let image = RgbaImage::from_pixel(TILE_SIZE, TILE_SIZE * 2, Rgba([1, 2, 3, 255]));
        cache.insert(TileCoord::new(0, 0), RawTile::from_image(DynamicImage::ImageRgba8(image)));

        let result = orchestrator
            .render(&cache, &TileRange::new(0, 0, 0, 1), &BlendConfig::plain())
            .unwrap();

        assert_eq!(result.stats.succeeded, 1);
        assert_eq!(result.stats.failed, 1);
        assert_eq!(result.failures[0].stage, FailureStage::NotCached);
        assert!(result.canvas.is_some());
    }
}
