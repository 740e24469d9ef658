//! Writing a composite canvas to a raster file.
//!
//! Export is separate from the pipeline: a run only produces a canvas and
//! the caller decides whether and where to write it.

use std::fmt;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat};
use thiserror::Error;
use tracing::info;

use crate::stitch::CompositeCanvas;

/// JPEG quality used for exports.
pub const JPEG_QUALITY: u8 = 90;

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Png,
    /// Alpha is dropped
    Jpeg,
    Bmp,
}

impl ExportFormat {
    /// Infers the format from a file extension, case-insensitively.
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }

    /// Usual file extension for the format.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Png => "png",
            ExportFormat::Jpeg => "jpg",
            ExportFormat::Bmp => "bmp",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "png" => Ok(ExportFormat::Png),
            "jpg" | "jpeg" => Ok(ExportFormat::Jpeg),
            "bmp" => Ok(ExportFormat::Bmp),
            _ => Err(ExportError::UnknownFormat(s.to_string())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Png => write!(f, "PNG"),
            ExportFormat::Jpeg => write!(f, "JPEG"),
            ExportFormat::Bmp => write!(f, "BMP"),
        }
    }
}

/// Errors while exporting a canvas.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Unknown export format '{0}': expected png, jpg or bmp")]
    UnknownFormat(String),

    #[error("Failed to write {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to encode image: {0}")]
    Encode(#[from] image::ImageError),
}

/// Encodes the canvas and writes it to `path`.
pub fn export_canvas(
    canvas: &CompositeCanvas,
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let io_error = |source: std::io::Error| ExportError::Io {
        path: path.display().to_string(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);

    let rgba = canvas.to_rgba_image();
    match format {
        ExportFormat::Png => rgba.write_to(&mut writer, ImageFormat::Png)?,
        ExportFormat::Bmp => rgba.write_to(&mut writer, ImageFormat::Bmp)?,
        ExportFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(rgba).into_rgb8();
            JpegEncoder::new_with_quality(&mut writer, JPEG_QUALITY).encode_image(&rgb)?;
        }
    }
    // Dropping the writer would discard a failed final write
    writer.flush().map_err(io_error)?;

    info!(
        path = %path.display(),
        format = %format,
        width = canvas.width(),
        height = canvas.height(),
        "Exported canvas"
    );
    Ok(())
}
