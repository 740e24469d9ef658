//! Straight-alpha "over" compositing.

use crate::tile::Bgra;

/// Composites `add` over `base` with straight (non-premultiplied) alpha.
///
/// Arithmetic is single precision. Channels are rounded half-to-even and
/// clamped to `0..=255`; a fully transparent result has zero color.
///
/// ```text
/// aTop  = add.a / 255        aBase = base.a / 255
/// outA  = aTop + aBase·(1 − aTop)
/// ch    = (add.ch·aTop + base.ch·aBase·(1 − aTop)) / outA
/// alpha = outA · 255
/// ```
#[inline]
pub fn blend_color(add: Bgra, base: Bgra) -> Bgra {
    let a_top = add.a as f32 / 255.0;
    let a_bottom = base.a as f32 / 255.0;
    let out_a = a_top + a_bottom * (1.0 - a_top);

    let alpha = to_channel(out_a * 255.0);
    if out_a <= 0.0 {
        return Bgra::new(0, 0, 0, alpha);
    }

    let channel = |top: u8, bottom: u8| {
        to_channel((top as f32 * a_top + bottom as f32 * a_bottom * (1.0 - a_top)) / out_a)
    };

    Bgra::new(
        channel(add.b, base.b),
        channel(add.g, base.g),
        channel(add.r, base.r),
        alpha,
    )
}

/// The contour-line color: each color channel divided by four, fully opaque.
#[inline]
pub fn darken(add: Bgra) -> Bgra {
    Bgra::new(add.b / 4, add.g / 4, add.r / 4, 255)
}

#[inline]
fn to_channel(value: f32) -> u8 {
    value.round_ties_even().clamp(0.0, 255.0) as u8
}
