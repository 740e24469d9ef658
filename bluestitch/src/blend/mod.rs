//! Tile blending: turns a two-layer tile into one shaded elevation tile.
//!
//! For every output pixel the add layer is composited over the base layer,
//! optionally replaced by a contour line, and optionally tinted by the
//! elevation band it falls into:
//!
//! ```text
//!            ┌── contour? ──► add / 4 (opaque)
//! add, base ─┤
//!            └── add over base ──► fit tint ──► lower tint ──► upper tint
//! ```
//!
//! Rows are independent and are shaded in parallel.
//!
//! # Example
//!
//! ```
//! use bluestitch::blend::{blend, BlendConfig};
//! use bluestitch::tile::{Bgra, CanonicalTile, PixelBuffer};
//!
//! let add = PixelBuffer::new(4, 4);
//! let base = PixelBuffer::from_fn(4, 4, |_, _| Bgra::rgba(10, 20, 30, 255));
//! let tile = CanonicalTile::from_layers(&add, &base).unwrap();
//!
//! let shaded = blend(&tile, &BlendConfig::plain()).unwrap();
//! assert_eq!(shaded.pixel(0, 0), Bgra::rgba(10, 20, 30, 255));
//! ```

mod composite;
mod config;
mod contour;
mod error;

pub use composite::{blend_color, darken};
pub use config::{
    BlendConfig, ParseColorError, TintColor, DEFAULT_HIGH_THRESHOLD, DEFAULT_INTERVAL,
    DEFAULT_LOW_THRESHOLD, DEFAULT_OPACITY, DEFAULT_RADIUS,
};
pub use error::BlendError;

use rayon::prelude::*;

use crate::tile::{set_pixel_in_row, Bgra, BlendedTile, CanonicalTile, PixelBuffer};

/// Blends one canonical tile into a shaded output tile.
///
/// The output is `width × width`. The function is pure: the same tile and
/// settings always produce the same output.
pub fn blend(tile: &CanonicalTile, config: &BlendConfig) -> Result<BlendedTile, BlendError> {
    config.validate()?;

    let width = tile.width();
    let mut output = PixelBuffer::new(width, tile.half_height());
    let stride = output.stride();

    output
        .as_bytes_mut()
        .par_chunks_mut(stride)
        .enumerate()
        .for_each(|(y, row)| {
            let y = y as u32;
            for x in 0..width {
                set_pixel_in_row(row, x, shade_pixel(tile, config, x, y));
            }
        });

    Ok(BlendedTile::from_pixels(output))
}

fn shade_pixel(tile: &CanonicalTile, config: &BlendConfig, x: u32, y: u32) -> Bgra {
    let add = tile.add_pixel(x, y);
    let base = tile.base_pixel(x, y);

    if config.contour && contour::on_contour(tile, x, y, config.interval, config.radius) {
        return darken(add);
    }

    let mut color = blend_color(add, base);
    let elevation = base.b;

    // Fixed order: fit, lower, upper
    if config.tints_fit(elevation) {
        color = blend_color(config.fit_color.with_alpha(config.opacity), color);
    }
    if config.tints_lower(elevation) {
        color = blend_color(config.lower_color.with_alpha(config.opacity), color);
    }
    if config.tints_upper(elevation) {
        color = blend_color(config.upper_color.with_alpha(config.opacity), color);
    }

    color
}
