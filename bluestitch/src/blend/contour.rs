//! Contour-line detection on the base (elevation) layer.

use crate::tile::CanonicalTile;

/// Returns true if the output pixel `(x, y)` belongs to a contour line.
///
/// A pixel is on a line when its own elevation is a multiple of `interval`,
/// or when the highest interval boundary at or below the neighbourhood's
/// maximum elevation is also at or above its minimum, i.e. a boundary is
/// crossed within `radius` pixels. The neighbourhood is clipped to the base
/// layer.
pub(crate) fn on_contour(tile: &CanonicalTile, x: u32, y: u32, interval: u32, radius: u32) -> bool {
    let elevation = tile.base_pixel(x, y).b as u32;
    if elevation % interval == 0 {
        return true;
    }

    let (min, max) = neighbourhood_extent(tile, x, y, radius);
    let boundary = max / interval * interval;
    min <= boundary && boundary <= max
}

/// Minimum and maximum elevation in the clipped square around `(x, y)`.
fn neighbourhood_extent(tile: &CanonicalTile, x: u32, y: u32, radius: u32) -> (u32, u32) {
    let x_end = x.saturating_add(radius).saturating_add(1).min(tile.width());
    let y_end = y.saturating_add(radius).saturating_add(1).min(tile.half_height());

    let mut min = u8::MAX;
    let mut max = u8::MIN;
    for yy in y.saturating_sub(radius)..y_end {
        for xx in x.saturating_sub(radius)..x_end {
            let b = tile.base_pixel(xx, yy).b;
            min = min.min(b);
            max = max.max(b);
        }
    }

    (min as u32, max as u32)
}
