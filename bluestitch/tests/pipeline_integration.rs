//! Integration tests for the render pipeline.
//!
//! These tests drive the full flow against an in-memory tile server:
//! - URL templating → HTTP fetch → PNG decode
//! - normalisation → blending → stitching
//! - export of the finished canvas
//!
//! Run with: `cargo test --test pipeline_integration`

use std::collections::HashMap;
use std::io::Cursor;
use std::sync::Arc;

use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;

use bluestitch::blend::{blend_color, darken, BlendConfig};
use bluestitch::cache::TileCache;
use bluestitch::coord::{range_from_blocks, TileCoord, TileRange};
use bluestitch::export::{export_canvas, ExportFormat};
use bluestitch::pipeline::{FailureStage, PipelineOrchestrator, RunRequest};
use bluestitch::provider::{HttpClient, ProviderError, TileSource};
use bluestitch::stitch::CompositeCanvas;
use bluestitch::tile::{Bgra, HttpTileFetcher, TILE_SIZE};

// ============================================================================
// Helper Functions
// ============================================================================

const BASE_URL: &str = "http://maps.test/";

/// Serves PNG bodies by exact URL and records every request.
#[derive(Clone, Default)]
struct FakeTileServer {
    tiles: Arc<HashMap<String, Vec<u8>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl FakeTileServer {
    fn new(tiles: HashMap<String, Vec<u8>>) -> Self {
        Self {
            tiles: Arc::new(tiles),
            requests: Arc::default(),
        }
    }

    fn requests(&self) -> Vec<String> {
        let mut requests = self.requests.lock().clone();
        requests.sort();
        requests
    }
}

impl HttpClient for FakeTileServer {
    fn get(&self, url: &str) -> Result<Vec<u8>, ProviderError> {
        self.requests.lock().push(url.to_string());
        self.tiles
            .get(url)
            .cloned()
            .ok_or_else(|| ProviderError::HttpError("HTTP 404 Not Found".to_string()))
    }
}

fn tile_url(x: i32, z: i32) -> String {
    format!("{}maps/overworld/tiles/1/x{}/z{}.png", BASE_URL, x, z)
}

fn encode_png(image: &RgbaImage) -> Vec<u8> {
    let mut buffer = Cursor::new(Vec::new());
    image
        .write_to(&mut buffer, ImageFormat::Png)
        .expect("Failed to encode PNG");
    buffer.into_inner()
}

/// A full-size two-layer tile: `add` on top, `base` below.
fn layered_tile(add: [u8; 4], base: [u8; 4]) -> Vec<u8> {
    let image = RgbaImage::from_fn(TILE_SIZE, TILE_SIZE * 2, |_, y| {
        if y < TILE_SIZE {
            Rgba(add)
        } else {
            Rgba(base)
        }
    });
    encode_png(&image)
}

fn pixel(rgba: [u8; 4]) -> Bgra {
    Bgra::rgba(rgba[0], rgba[1], rgba[2], rgba[3])
}

fn orchestrator(server: &FakeTileServer) -> PipelineOrchestrator {
    PipelineOrchestrator::new(Arc::new(HttpTileFetcher::new(server.clone()))).with_parallel(3)
}

fn center_of(canvas: &CompositeCanvas, coord: TileCoord) -> Bgra {
    let (ox, oy) = canvas.offset_of(coord).expect("tile inside canvas");
    canvas.pixel(ox + TILE_SIZE / 2, oy + TILE_SIZE / 2).expect("pixel inside canvas")
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_render_range_end_to_end() {
    let transparent_add = [255, 255, 255, 0];
    let low = [10, 20, 40, 255];
    let fit = [10, 20, 70, 255];
    let server = FakeTileServer::new(HashMap::from([
        (tile_url(-1, 0), layered_tile(transparent_add, low)),
        (tile_url(-1, 1), layered_tile(transparent_add, fit)),
        (tile_url(0, 0), layered_tile([255, 0, 0, 128], [0, 0, 255, 255])),
        // (0, 1) is missing on the server
    ]));

    let request = RunRequest {
        range: TileRange::new(-1, 0, 0, 1),
        source: TileSource::with_defaults(BASE_URL),
        blend: BlendConfig::default(),
    };
    let result = orchestrator(&server)
        .run(&request, &CancellationToken::new())
        .unwrap();

    assert_eq!(result.stats.attempted, 4);
    assert_eq!(result.stats.succeeded, 3);
    assert_eq!(result.stats.failed, 1);
    assert_eq!(result.failures[0].coord, TileCoord::new(0, 1));
    assert_eq!(result.failures[0].stage, FailureStage::Fetch);
    assert!(result.last_error.unwrap().contains("HTTP 404"));

    let expected_urls = {
        let mut urls = vec![tile_url(-1, 0), tile_url(-1, 1), tile_url(0, 0), tile_url(0, 1)];
        urls.sort();
        urls
    };
    assert_eq!(server.requests(), expected_urls);

    let canvas = result.canvas.unwrap();
    assert_eq!((canvas.width(), canvas.height()), (1002, 1002));

    // Elevation 40 is below the fit band; lower tint is off by default
    assert_eq!(center_of(&canvas, TileCoord::new(-1, 0)), pixel(low));
    // Elevation 70 is inside the fit band
    let config = BlendConfig::default();
    assert_eq!(
        center_of(&canvas, TileCoord::new(-1, 1)),
        blend_color(config.fit_color.with_alpha(config.opacity), pixel(fit))
    );
    // Blue base has elevation 255, above the fit band
    assert_eq!(
        center_of(&canvas, TileCoord::new(0, 0)),
        Bgra::rgba(128, 0, 127, 255)
    );
    // Missing tile stays transparent
    assert_eq!(center_of(&canvas, TileCoord::new(0, 1)), Bgra::TRANSPARENT);
}

#[test]
fn test_contour_lines_through_pipeline() {
    let add = [200, 100, 40, 0];
    let server = FakeTileServer::new(HashMap::from([
        (tile_url(0, 0), layered_tile(add, [0, 0, 48, 255])),
        (tile_url(1, 0), layered_tile(add, [0, 0, 50, 255])),
    ]));
    let request = RunRequest {
        range: TileRange::new(0, 0, 1, 0),
        source: TileSource::with_defaults(BASE_URL),
        blend: BlendConfig {
            contour: true,
            best_fit: false,
            ..BlendConfig::default()
        },
    };

    let canvas = orchestrator(&server)
        .run(&request, &CancellationToken::new())
        .unwrap()
        .canvas
        .unwrap();

    // 48 is a multiple of 16: every pixel is a contour pixel
    assert_eq!(center_of(&canvas, TileCoord::new(0, 0)), darken(pixel(add)));
    // Flat 50 crosses no boundary
    assert_eq!(
        center_of(&canvas, TileCoord::new(1, 0)),
        Bgra::rgba(0, 0, 50, 255)
    );
}

#[test]
fn test_small_tiles_are_resized() {
    let color = [30, 60, 90, 255];
    let small = encode_png(&RgbaImage::from_pixel(8, 16, Rgba(color)));
    let server = FakeTileServer::new(HashMap::from([(tile_url(5, 5), small)]));
    let request = RunRequest {
        range: TileRange::new(5, 5, 5, 5),
        source: TileSource::with_defaults(BASE_URL),
        blend: BlendConfig::plain(),
    };

    let canvas = orchestrator(&server)
        .run(&request, &CancellationToken::new())
        .unwrap()
        .canvas
        .unwrap();

    assert_eq!((canvas.width(), canvas.height()), (501, 501));
    let center = center_of(&canvas, TileCoord::new(5, 5));
    assert!(center.r.abs_diff(30) <= 1);
    assert!(center.g.abs_diff(60) <= 1);
    assert!(center.b.abs_diff(90) <= 1);
    assert_eq!(center.a, 255);
}

#[test]
fn test_rerender_from_cache_without_refetch() {
    let server = FakeTileServer::new(HashMap::from([
        (tile_url(0, 0), layered_tile([0, 0, 0, 0], [5, 5, 70, 255])),
        (tile_url(0, 1), layered_tile([0, 0, 0, 0], [5, 5, 20, 255])),
    ]));
    let pipeline = orchestrator(&server);
    let range = range_from_blocks(0, 0, 511, 1023);
    assert_eq!(range, TileRange::new(0, 0, 0, 1));

    let cache = TileCache::new();
    let report = pipeline.fetch_into(
        &cache,
        &range,
        &TileSource::with_defaults(BASE_URL),
        &CancellationToken::new(),
    )
    .unwrap();
    assert_eq!(report.stats.succeeded, 2);
    assert_eq!(server.requests().len(), 2);

    let tinted = pipeline
        .render(&cache, &range, &BlendConfig::default())
        .unwrap()
        .canvas
        .unwrap();
    let plain = pipeline
        .render(&cache, &range, &BlendConfig::plain())
        .unwrap()
        .canvas
        .unwrap();

    assert_eq!(server.requests().len(), 2);
    assert_ne!(
        center_of(&tinted, TileCoord::new(0, 0)),
        center_of(&plain, TileCoord::new(0, 0))
    );
    assert_eq!(
        center_of(&tinted, TileCoord::new(0, 1)),
        center_of(&plain, TileCoord::new(0, 1))
    );
}

#[test]
fn test_export_rendered_canvas() {
    let server = FakeTileServer::new(HashMap::from([(
        tile_url(0, 0),
        layered_tile([0, 0, 0, 0], [1, 2, 3, 255]),
    )]));
    let request = RunRequest {
        range: TileRange::new(0, 0, 0, 0),
        source: TileSource::with_defaults(BASE_URL),
        blend: BlendConfig::plain(),
    };
    let canvas = orchestrator(&server)
        .run(&request, &CancellationToken::new())
        .unwrap()
        .canvas
        .unwrap();

    let temp_dir = tempfile::TempDir::new().unwrap();
    let path = temp_dir.path().join("map.png");
    let format = ExportFormat::from_path(&path).unwrap_or_default();
    export_canvas(&canvas, &path, format).unwrap();

    let exported = image::open(&path).unwrap().to_rgba8();
    assert_eq!(exported.dimensions(), (501, 501));
    assert_eq!(exported.get_pixel(250, 250).0, [1, 2, 3, 255]);
}
