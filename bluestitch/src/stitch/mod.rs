//! Composite canvas assembly.
//!
//! Blended tiles are copied into one pre-allocated canvas at offsets that are
//! exact multiples of [`TILE_SIZE`], so adjacent tiles neither overlap nor
//! leave gaps. Each tile owns a disjoint region, which makes stitching order
//! irrelevant to the final pixels.

use image::RgbaImage;
use thiserror::Error;

use crate::coord::{TileCoord, TileRange};
use crate::tile::{swap_red_blue, Bgra, BlendedTile, PixelBuffer, TILE_SIZE};

/// Largest canvas edge, in pixels, the pipeline will allocate.
pub const MAX_CANVAS_DIMENSION: u32 = 65_535;

/// Contract violations while stitching.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StitchError {
    /// The range is invalid, so no canvas can be sized from it.
    #[error("Cannot create a canvas for invalid range {0}")]
    InvalidRange(TileRange),

    /// The canvas would exceed [`MAX_CANVAS_DIMENSION`] on some axis.
    #[error("Canvas {width}×{height} exceeds the {max} pixel limit")]
    CanvasTooLarge { width: u64, height: u64, max: u32 },

    /// The tile is not `TILE_SIZE × TILE_SIZE`.
    #[error("Tile {coord} is {width}×{height}, expected {expected}×{expected}")]
    TileSizeMismatch {
        coord: TileCoord,
        width: u32,
        height: u32,
        expected: u32,
    },

    /// The tile lies outside the canvas range.
    #[error("Tile {coord} is outside canvas range {range}")]
    OutOfRange { coord: TileCoord, range: TileRange },
}

/// The composite image assembled from all tiles of a range.
///
/// The canvas starts fully transparent (all bytes zero); regions whose tile
/// was never stitched keep that fill. Its size is fixed at creation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompositeCanvas {
    range: TileRange,
    pixels: PixelBuffer,
}

impl CompositeCanvas {
    /// Creates a transparent canvas exactly covering `range`.
    pub fn new(range: TileRange) -> Result<Self, StitchError> {
        let (width, height) = Self::dimensions_for(range)?;
        Ok(Self {
            range,
            pixels: PixelBuffer::new(width, height),
        })
    }

    /// Computes the canvas size for a range without allocating.
    pub fn dimensions_for(range: TileRange) -> Result<(u32, u32), StitchError> {
        if !range.is_valid() {
            return Err(StitchError::InvalidRange(range));
        }

        let width = range.tiles_wide().saturating_mul(TILE_SIZE as u64);
        let height = range.tiles_high().saturating_mul(TILE_SIZE as u64);
        if width > MAX_CANVAS_DIMENSION as u64 || height > MAX_CANVAS_DIMENSION as u64 {
            return Err(StitchError::CanvasTooLarge {
                width,
                height,
                max: MAX_CANVAS_DIMENSION,
            });
        }

        Ok((width as u32, height as u32))
    }

    /// The tile range this canvas covers.
    pub fn range(&self) -> TileRange {
        self.range
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Reads one canvas pixel.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Bgra> {
        self.pixels.checked_get(x, y)
    }

    /// Raw BGRA bytes, row-major, `width × 4` bytes per row.
    pub fn as_bgra(&self) -> &[u8] {
        self.pixels.as_bytes()
    }

    /// Pixel offset of a tile's top-left corner.
    pub fn offset_of(&self, coord: TileCoord) -> Option<(u32, u32)> {
        self.range.contains(coord).then(|| {
            let origin = self.range.origin();
            (
                (coord.x - origin.x) as u32 * TILE_SIZE,
                (coord.z - origin.z) as u32 * TILE_SIZE,
            )
        })
    }

    /// Copies the canvas into an RGBA image for encoding.
    pub fn to_rgba_image(&self) -> RgbaImage {
        let mut data = self.pixels.as_bytes().to_vec();
        swap_red_blue(&mut data);
        // Length always matches the dimensions
        RgbaImage::from_raw(self.width(), self.height(), data)
            .unwrap_or_else(|| RgbaImage::new(self.width(), self.height()))
    }
}

/// Writes one blended tile into the canvas at its fixed offset.
pub fn stitch(
    canvas: &mut CompositeCanvas,
    coord: TileCoord,
    tile: &BlendedTile,
) -> Result<(), StitchError> {
    if tile.width() != TILE_SIZE || tile.height() != TILE_SIZE {
        return Err(StitchError::TileSizeMismatch {
            coord,
            width: tile.width(),
            height: tile.height(),
            expected: TILE_SIZE,
        });
    }

    let (offset_x, offset_y) = canvas.offset_of(coord).ok_or(StitchError::OutOfRange {
        coord,
        range: canvas.range,
    })?;

    let start = offset_x as usize * crate::tile::BYTES_PER_PIXEL;
    let len = tile.pixels().stride();
    for row in 0..TILE_SIZE {
        let dst = canvas.pixels.row_mut(offset_y + row);
        dst[start..start + len].copy_from_slice(tile.pixels().row(row));
    }

    Ok(())
}
