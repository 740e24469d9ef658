//! Canonical two-layer tiles and blended output tiles.

use image::imageops::{self, FilterType};

use super::pixel::{swap_red_blue, Bgra, PixelBuffer};
use super::raw::RawTile;
use crate::blend::BlendError;

/// Edge length of a blended tile, and the stride at which tiles are placed.
pub const TILE_SIZE: u32 = 501;

/// Width of a canonical two-layer tile.
pub const CANONICAL_WIDTH: u32 = TILE_SIZE;

/// Height of a canonical two-layer tile (add layer above base layer).
pub const CANONICAL_HEIGHT: u32 = TILE_SIZE * 2;

/// A two-layer tile: the add layer stacked on top of the base layer.
///
/// Height is always exactly twice the width. The top half is the overlay
/// ("add") layer; the bottom half is the elevation ("base") layer whose blue
/// channel encodes elevation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalTile {
    pixels: PixelBuffer,
}

impl CanonicalTile {
    /// Normalizes a decoded tile to 501×1002 BGRA.
    ///
    /// Tiles of any other size are resampled to the canonical size; any
    /// pixel format is converted to 8-bit BGRA.
    pub fn from_raw(raw: &RawTile) -> Result<Self, BlendError> {
        if raw.width() == 0 || raw.height() == 0 {
            return Err(BlendError::InvalidDimensions {
                width: raw.width(),
                height: raw.height(),
                reason: "decoded tile is empty".to_string(),
            });
        }

        let mut rgba = raw.image().to_rgba8();
        if rgba.dimensions() != (CANONICAL_WIDTH, CANONICAL_HEIGHT) {
            rgba = imageops::resize(&rgba, CANONICAL_WIDTH, CANONICAL_HEIGHT, FilterType::Triangle);
        }

        let mut data = rgba.into_raw();
        swap_red_blue(&mut data);

        Self::from_bgra(CANONICAL_WIDTH, CANONICAL_HEIGHT, data)
    }

    /// Wraps BGRA bytes that already have the two-layer shape.
    ///
    /// Any width is accepted as long as the height is exactly twice the width.
    pub fn from_bgra(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BlendError> {
        if width == 0 || height != width * 2 {
            return Err(BlendError::InvalidDimensions {
                width,
                height,
                reason: "height must be exactly twice the width".to_string(),
            });
        }

        let pixels =
            PixelBuffer::from_bgra(width, height, data).ok_or_else(|| {
                BlendError::InvalidDimensions {
                    width,
                    height,
                    reason: "pixel data length does not match dimensions".to_string(),
                }
            })?;

        Ok(Self { pixels })
    }

    /// Builds a tile from separate add and base layers of equal size.
    pub fn from_layers(add: &PixelBuffer, base: &PixelBuffer) -> Result<Self, BlendError> {
        if add.width() != base.width() || add.height() != base.height() {
            return Err(BlendError::InvalidDimensions {
                width: base.width(),
                height: add.height() + base.height(),
                reason: "add and base layers differ in size".to_string(),
            });
        }

        let mut data = Vec::with_capacity(add.as_bytes().len() * 2);
        data.extend_from_slice(add.as_bytes());
        data.extend_from_slice(base.as_bytes());
        Self::from_bgra(add.width(), add.height() * 2, data)
    }

    /// Width of both layers.
    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    /// Height of one layer.
    pub fn half_height(&self) -> u32 {
        self.pixels.height() / 2
    }

    /// Pixel of the add layer.
    #[inline]
    pub fn add_pixel(&self, x: u32, y: u32) -> Bgra {
        self.pixels.get(x, y)
    }

    /// Pixel of the base (elevation) layer.
    #[inline]
    pub fn base_pixel(&self, x: u32, y: u32) -> Bgra {
        self.pixels.get(x, y + self.half_height())
    }

    /// The whole two-layer buffer.
    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

/// A blended, shaded tile ready to be stitched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlendedTile {
    pixels: PixelBuffer,
}

impl BlendedTile {
    /// Wraps a square pixel buffer.
    pub fn from_pixels(pixels: PixelBuffer) -> Self {
        Self { pixels }
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Bgra {
        self.pixels.get(x, y)
    }

    pub fn pixels(&self) -> &PixelBuffer {
        &self.pixels
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgb, RgbImage, Rgba, RgbaImage};

    #[test]
    fn test_from_raw_canonical_size_keeps_pixels() {
        let img = RgbaImage::from_fn(CANONICAL_WIDTH, CANONICAL_HEIGHT, |x, y| {
            if y < TILE_SIZE {
                Rgba([200, 100, 50, 255])
            } else {
                Rgba([0, 0, (x % 256) as u8, 255])
            }
        });
        let raw = RawTile::from_image(DynamicImage::ImageRgba8(img));
        let tile = CanonicalTile::from_raw(&raw).unwrap();

        assert_eq!(tile.width(), 501);
        assert_eq!(tile.half_height(), 501);
        assert_eq!(tile.add_pixel(0, 0), Bgra::rgba(200, 100, 50, 255));
        assert_eq!(tile.base_pixel(300, 0).b, 44);
    }

    #[test]
    fn test_from_raw_resizes_and_converts_format() {
        let img = RgbImage::from_pixel(64, 128, Rgb([10, 20, 30]));
        let raw = RawTile::from_image(DynamicImage::ImageRgb8(img));
        let tile = CanonicalTile::from_raw(&raw).unwrap();

        assert_eq!(tile.width(), CANONICAL_WIDTH);
        assert_eq!(tile.pixels().height(), CANONICAL_HEIGHT);
        // Uniform input stays uniform after resampling
        assert_eq!(tile.add_pixel(250, 250), Bgra::rgba(10, 20, 30, 255));
        assert_eq!(tile.base_pixel(500, 500), Bgra::rgba(10, 20, 30, 255));
    }

    #[test]
    fn test_from_raw_empty_fails() {
        let raw = RawTile::from_image(DynamicImage::new_rgba8(0, 0));
        assert!(matches!(
            CanonicalTile::from_raw(&raw),
            Err(BlendError::InvalidDimensions { .. })
        ));
    }

    #[test]
    fn test_from_bgra_rejects_wrong_aspect() {
        let result = CanonicalTile::from_bgra(4, 4, vec![0; 64]);
        assert!(matches!(
            result,
            Err(BlendError::InvalidDimensions {
                width: 4,
                height: 4,
                ..
            })
        ));
    }

    #[test]
    fn test_from_bgra_rejects_wrong_length() {
        assert!(CanonicalTile::from_bgra(2, 4, vec![0; 31]).is_err());
        assert!(CanonicalTile::from_bgra(2, 4, vec![0; 32]).is_ok());
    }

    #[test]
    fn test_from_layers() {
        let add = PixelBuffer::from_fn(2, 2, |_, _| Bgra::rgba(1, 1, 1, 1));
        let base = PixelBuffer::from_fn(2, 2, |x, _| Bgra::rgba(0, 0, x as u8, 255));
        let tile = CanonicalTile::from_layers(&add, &base).unwrap();

        assert_eq!(tile.add_pixel(1, 1), Bgra::rgba(1, 1, 1, 1));
        assert_eq!(tile.base_pixel(1, 1), Bgra::rgba(0, 0, 1, 255));

        let wrong = PixelBuffer::new(3, 2);
        assert!(CanonicalTile::from_layers(&add, &wrong).is_err());
    }
}
