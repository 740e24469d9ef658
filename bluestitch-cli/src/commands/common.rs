//! Common types and helpers shared across CLI commands.
//!
//! Command-line values take precedence over config.ini, which takes
//! precedence over built-in defaults.

use std::path::Path;

use clap::ValueEnum;

use bluestitch::blend::BlendConfig;
use bluestitch::config::{ConfigFile, DownloadSettings};
use bluestitch::export::ExportFormat;
use bluestitch::provider::TileSource;

use super::render::RenderArgs;
use crate::error::CliError;

/// Output format selection for CLI arguments.
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq)]
pub enum FormatArg {
    /// Lossless PNG with alpha
    Png,
    /// JPEG at 90% quality, alpha dropped
    Jpeg,
    /// Uncompressed BMP
    Bmp,
}

impl From<FormatArg> for ExportFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Png => ExportFormat::Png,
            FormatArg::Jpeg => ExportFormat::Jpeg,
            FormatArg::Bmp => ExportFormat::Bmp,
        }
    }
}

/// Picks the export format: explicit flag, then file extension, then PNG.
pub fn resolve_format(format: Option<FormatArg>, output: &Path) -> ExportFormat {
    format
        .map(ExportFormat::from)
        .or_else(|| ExportFormat::from_path(output))
        .unwrap_or_default()
}

/// Builds the tile source from CLI arguments and config.
pub fn resolve_source(args: &RenderArgs, config: &ConfigFile) -> Result<TileSource, CliError> {
    let map_address = args
        .map_address
        .clone()
        .or_else(|| config.source.map_address.clone())
        .ok_or_else(|| {
            CliError::Config(
                "No map address. Use --map-address or set map_address in the [source] section"
                    .to_string(),
            )
        })?;

    let source = TileSource::new(
        map_address,
        args.tile_path
            .clone()
            .unwrap_or_else(|| config.source.tile_path.clone()),
        args.world.clone().unwrap_or_else(|| config.source.world.clone()),
    );

    // Catch malformed addresses before starting the run
    source
        .build_url(args.range().start)
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;

    Ok(source)
}

/// Overlays blend flags onto the configured blend settings.
pub fn resolve_blend(args: &RenderArgs, config: &ConfigFile) -> Result<BlendConfig, CliError> {
    let mut blend = config.render.blend.clone();

    if let Some(v) = args.contour {
        blend.contour = v;
    }
    if let Some(v) = args.interval {
        blend.interval = v;
    }
    if let Some(v) = args.radius {
        blend.radius = v;
    }
    if let Some(v) = args.fit_low {
        blend.low_threshold = v;
    }
    if let Some(v) = args.fit_high {
        blend.high_threshold = v;
    }
    if let Some(v) = args.opacity {
        blend.opacity = v;
    }
    if args.no_best_fit {
        blend.best_fit = false;
    }
    if args.fit {
        blend.fit = true;
    }
    if args.no_fit {
        blend.fit = false;
    }
    if let Some(v) = args.lower {
        blend.lower = v;
    }
    if let Some(v) = args.upper {
        blend.upper = v;
    }
    if let Some(v) = args.lower_color {
        blend.lower_color = v;
    }
    if let Some(v) = args.fit_color {
        blend.fit_color = v;
    }
    if let Some(v) = args.upper_color {
        blend.upper_color = v;
    }

    blend
        .validate()
        .map_err(|e| CliError::InvalidArgument(e.to_string()))?;
    Ok(blend)
}

/// Overlays download flags onto the configured download settings.
pub fn resolve_download(
    args: &RenderArgs,
    config: &ConfigFile,
) -> Result<DownloadSettings, CliError> {
    let mut download = config.download.clone();
    if let Some(v) = args.timeout {
        if v == 0 {
            return Err(CliError::InvalidArgument(
                "--timeout must be at least 1 second".to_string(),
            ));
        }
        download.timeout = v;
    }
    if let Some(v) = args.parallel {
        if v == 0 {
            return Err(CliError::InvalidArgument(
                "--parallel must be at least 1".to_string(),
            ));
        }
        download.parallel = v;
    }
    Ok(download)
}
