//! Render command - fetch, blend and stitch a tile range into one image.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use tokio_util::sync::CancellationToken;
use tracing::info;

use bluestitch::blend::TintColor;
use bluestitch::coord::TileRange;
use bluestitch::export::export_canvas;
use bluestitch::pipeline::{PipelineOrchestrator, ProgressSnapshot, RunRequest, RunResult};
use bluestitch::provider::ReqwestClient;
use bluestitch::tile::HttpTileFetcher;

use super::common::{resolve_blend, resolve_download, resolve_format, resolve_source, FormatArg};
use crate::error::CliError;
use crate::runner::CliRunner;

/// Failures listed individually before the summary is cut short.
const MAX_LISTED_FAILURES: usize = 10;

/// Arguments for the render command.
#[derive(Debug, Args)]
pub struct RenderArgs {
    /// Base address of the map (e.g. http://localhost:8100/)
    #[arg(long)]
    pub map_address: Option<String>,

    /// Tile path template with {x}, {z} and {world} placeholders
    #[arg(long)]
    pub tile_path: Option<String>,

    /// World name substituted for {world}
    #[arg(long)]
    pub world: Option<String>,

    /// First tile column
    #[arg(long, allow_negative_numbers = true)]
    pub start_x: i32,

    /// First tile row
    #[arg(long, allow_negative_numbers = true)]
    pub start_z: i32,

    /// Last tile column (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub end_x: i32,

    /// Last tile row (inclusive)
    #[arg(long, allow_negative_numbers = true)]
    pub end_z: i32,

    /// Output file (format detected from the extension: .png, .jpg, .bmp)
    #[arg(long, short)]
    pub output: PathBuf,

    /// Output format, overriding the file extension
    #[arg(long, value_enum)]
    pub format: Option<FormatArg>,

    /// Draw contour lines
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub contour: Option<bool>,

    /// Elevation step between contour lines
    #[arg(long)]
    pub interval: Option<u32>,

    /// Neighbourhood radius for contour detection, in pixels
    #[arg(long)]
    pub radius: Option<u32>,

    /// Lowest elevation of the fit band
    #[arg(long)]
    pub fit_low: Option<u8>,

    /// Highest elevation of the fit band
    #[arg(long)]
    pub fit_high: Option<u8>,

    /// Tint opacity (0-255)
    #[arg(long)]
    pub opacity: Option<u8>,

    /// Disable all elevation tints
    #[arg(long)]
    pub no_best_fit: bool,

    /// Tint the fit band
    #[arg(long, conflicts_with = "no_fit")]
    pub fit: bool,

    /// Do not tint the fit band
    #[arg(long)]
    pub no_fit: bool,

    /// Tint elevations below the fit band
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub lower: Option<bool>,

    /// Tint elevations above the fit band
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    pub upper: Option<bool>,

    /// Lower band tint as #RRGGBB
    #[arg(long)]
    pub lower_color: Option<TintColor>,

    /// Fit band tint as #RRGGBB
    #[arg(long)]
    pub fit_color: Option<TintColor>,

    /// Upper band tint as #RRGGBB
    #[arg(long)]
    pub upper_color: Option<TintColor>,

    /// Tiles fetched and blended at once
    #[arg(long)]
    pub parallel: Option<usize>,

    /// HTTP request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,
}

impl RenderArgs {
    pub fn range(&self) -> TileRange {
        TileRange::new(self.start_x, self.start_z, self.end_x, self.end_z)
    }
}

/// Run the render command.
pub fn run(args: RenderArgs, debug: bool) -> Result<(), CliError> {
    let runner = CliRunner::with_debug(debug)?;
    runner.log_startup("render");
    let config = runner.config();

    let range = args.range();
    if !range.is_valid() {
        return Err(CliError::InvalidArgument(format!(
            "range {} is empty: start must not exceed end",
            range
        )));
    }

    let source = resolve_source(&args, config)?;
    let blend = resolve_blend(&args, config)?;
    let download = resolve_download(&args, config)?;
    let format = resolve_format(args.format, &args.output);

    println!("Rendering tiles:");
    println!("  Map:    {}", source.base_url);
    println!("  World:  {}", source.world);
    println!(
        "  Range:  {} ({}×{} tiles)",
        range,
        range.tiles_wide(),
        range.tiles_high()
    );
    println!("  Output: {} ({})", args.output.display(), format);
    println!();

    let client = ReqwestClient::with_timeout(download.timeout).map_err(CliError::HttpClient)?;
    let fetcher = Arc::new(HttpTileFetcher::new(client));

    let bar = progress_bar(range.tile_count());
    let observer_bar = bar.clone();
    let orchestrator = PipelineOrchestrator::new(fetcher)
        .with_parallel(download.parallel)
        .with_observer(Arc::new(move |snapshot: &ProgressSnapshot| {
            observer_bar.set_position(snapshot.current);
            if snapshot.failed > 0 {
                observer_bar.set_message(format!("{} failed", snapshot.failed));
            }
        }));

    info!(
        range = %range,
        tiles = range.tile_count(),
        parallel = orchestrator.parallel(),
        "Starting render"
    );

    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    ctrlc::set_handler(move || {
        eprintln!();
        eprintln!("Cancelling, finishing tiles in flight...");
        handler_token.cancel();
    })
    .map_err(|e| CliError::SignalHandler(e.to_string()))?;

    let start = Instant::now();
    let request = RunRequest {
        range,
        source,
        blend,
    };
    let result = orchestrator.run(&request, &cancel)?;
    bar.finish_and_clear();

    print_summary(&result, start.elapsed().as_secs_f64());

    let RunResult {
        canvas, last_error, ..
    } = result;
    let canvas = canvas.ok_or(CliError::NothingRendered { last_error })?;

    export_canvas(&canvas, &args.output, format)?;
    info!(path = %args.output.display(), "Render complete");
    println!(
        "Saved {}×{} {} to {}",
        canvas.width(),
        canvas.height(),
        format,
        args.output.display()
    );

    Ok(())
}

fn progress_bar(total: u64) -> ProgressBar {
    let bar = ProgressBar::new(total);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} tiles ({eta}) {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=> "),
    );
    bar
}

fn print_summary(result: &RunResult, elapsed_secs: f64) {
    let stats = &result.stats;
    println!("Finished in {:.2}s: {}", elapsed_secs, stats);

    if !result.failures.is_empty() {
        println!();
        println!("Failed tiles:");
        for failure in result.failures.iter().take(MAX_LISTED_FAILURES) {
            println!("  {}", failure);
        }
        if result.failures.len() > MAX_LISTED_FAILURES {
            println!(
                "  ... and {} more (see log file)",
                result.failures.len() - MAX_LISTED_FAILURES
            );
        }
    }
    if stats.cancelled > 0 {
        println!("Cancelled before {} tiles were started", stats.cancelled);
    }
    println!();
}
