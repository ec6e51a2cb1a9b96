//! Geometric transforms of brush images.
//!
//! - [`flip_h`] / [`flip_v`] - mirror
//! - [`square`] - pad to a square, original centered
//! - [`rotate`] - arbitrary angle, canvas grown to the rotated bounds
//!
//! All functions return a new tightly packed surface in the source's alpha
//! mode. Zero-area inputs produce a 1x1 transparent surface.

use brushfx_core::{AlphaMode, Bgra, Surface};
use tracing::trace;

/// Minimal stand-in returned for zero-area inputs.
pub(crate) fn empty_result(alpha: AlphaMode) -> Surface {
    Surface::new(1, 1, alpha)
}

/// Flips a surface horizontally (left-right mirror).
///
/// ```rust
/// use brushfx_core::{AlphaMode, Bgra, Surface};
/// use brushfx_ops::transform::flip_h;
///
/// let pixels = vec![Bgra::BLACK, Bgra::WHITE];
/// let src = Surface::from_pixels(2, 1, pixels, AlphaMode::Straight).unwrap();
/// let flipped = flip_h(&src);
/// assert_eq!(flipped.pixel(0, 0), Bgra::WHITE);
/// ```
pub fn flip_h(src: &Surface) -> Surface {
    if src.is_empty() {
        return empty_result(src.alpha_mode());
    }
    let mut dst = Surface::new(src.width(), src.height(), src.alpha_mode());
    for (y, row) in dst.rows_mut() {
        row.copy_from_slice(src.row(y));
        row.reverse();
    }
    dst
}

/// Flips a surface vertically (top-bottom mirror).
pub fn flip_v(src: &Surface) -> Surface {
    if src.is_empty() {
        return empty_result(src.alpha_mode());
    }
    let h = src.height();
    let mut dst = Surface::new(src.width(), h, src.alpha_mode());
    for (y, row) in dst.rows_mut() {
        row.copy_from_slice(src.row(h - 1 - y));
    }
    dst
}

/// Pads the shorter side with transparent pixels so width equals height.
///
/// The original is centered; when the padding is odd the extra column or
/// row goes to the right or bottom.
///
/// ```rust
/// use brushfx_core::{AlphaMode, Bgra, Surface};
/// use brushfx_ops::transform::square;
///
/// let src = Surface::filled(4, 2, Bgra::WHITE, AlphaMode::Straight);
/// let sq = square(&src);
/// assert_eq!((sq.width(), sq.height()), (4, 4));
/// assert_eq!(sq.pixel(0, 0), Bgra::TRANSPARENT);
/// assert_eq!(sq.pixel(0, 1), Bgra::WHITE);
/// ```
pub fn square(src: &Surface) -> Surface {
    if src.is_empty() {
        return empty_result(src.alpha_mode());
    }
    let (w, h) = (src.width(), src.height());
    if w == h {
        return src.clone();
    }
    let side = w.max(h);
    let left = ((side - w) / 2) as usize;
    let top = (side - h) / 2;
    trace!(w, h, side, "square");

    let mut dst = Surface::new(side, side, src.alpha_mode());
    for y in 0..h {
        dst.row_mut(y + top)[left..left + w as usize].copy_from_slice(src.row(y));
    }
    dst
}

/// Rotated bounding-box size of a `w x h` rectangle.
fn rotated_size(w: u32, h: u32, angle_degrees: f32) -> (u32, u32) {
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (sin, cos) = (sin.abs(), cos.abs());
    // Shave float noise so 90 degree turns don't grow by a pixel.
    let bw = (w as f32 * cos + h as f32 * sin - 1e-3).ceil().max(1.0);
    let bh = (w as f32 * sin + h as f32 * cos - 1e-3).ceil().max(1.0);
    (bw as u32, bh as u32)
}

/// Bilinear premultiplied sample at a continuous pixel position; outside
/// pixels count as transparent.
fn sample_bilinear(src: &[[f32; 4]], w: u32, h: u32, x: f32, y: f32) -> [f32; 4] {
    let fx = x - 0.5;
    let fy = y - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let at = |px: i64, py: i64| -> [f32; 4] {
        if px < 0 || py < 0 || px >= w as i64 || py >= h as i64 {
            [0.0; 4]
        } else {
            src[py as usize * w as usize + px as usize]
        }
    };

    let p00 = at(x0, y0);
    let p10 = at(x0 + 1, y0);
    let p01 = at(x0, y0 + 1);
    let p11 = at(x0 + 1, y0 + 1);
    let mut out = [0.0f32; 4];
    for c in 0..4 {
        let top = p00[c] + (p10[c] - p00[c]) * tx;
        let bottom = p01[c] + (p11[c] - p01[c]) * tx;
        out[c] = top + (bottom - top) * ty;
    }
    out
}

/// Loads a surface as premultiplied unit floats, row-major.
pub(crate) fn to_premultiplied_f32(src: &Surface) -> Vec<[f32; 4]> {
    let straight = src.alpha_mode() == AlphaMode::Straight;
    src.pixels()
        .map(|(_, _, p)| {
            let p = if straight { p.to_premultiplied() } else { p };
            p.to_unit()
        })
        .collect()
}

/// Converts a premultiplied float pixel back to a byte pixel in `alpha`
/// mode.
pub(crate) fn from_premultiplied_f32(px: [f32; 4], alpha: AlphaMode) -> Bgra {
    let a = px[3].clamp(0.0, 1.0);
    if a <= 0.0 {
        return Bgra::TRANSPARENT;
    }
    // Straight color from the float data, so only one rounding step happens.
    let inv = 1.0 / a;
    let straight = Bgra::from_unit([px[0] * inv, px[1] * inv, px[2] * inv, a]);
    match alpha {
        AlphaMode::Straight => straight,
        AlphaMode::Premultiplied => straight.to_premultiplied(),
    }
}

/// Rotates a surface about its center.
///
/// The output grows to the bounding box of the rotated rectangle. Sampling
/// is bilinear on premultiplied color. With `alias_max_alpha`, every output
/// alpha becomes either 0 or that maximum, cut at half the maximum, keeping
/// the straight color; this gives hard-edged pixel-art brushes after a
/// smooth rotation.
///
/// ```rust
/// use brushfx_core::{AlphaMode, Bgra, Surface};
/// use brushfx_ops::transform::rotate;
///
/// let src = Surface::filled(4, 2, Bgra::WHITE, AlphaMode::Straight);
/// let r = rotate(&src, 90.0, None);
/// assert_eq!((r.width(), r.height()), (2, 4));
/// ```
pub fn rotate(src: &Surface, angle_degrees: f32, alias_max_alpha: Option<u8>) -> Surface {
    if src.is_empty() {
        return empty_result(src.alpha_mode());
    }
    let (w, h) = (src.width(), src.height());
    let (dw, dh) = rotated_size(w, h, angle_degrees);
    trace!(w, h, dw, dh, angle_degrees, "rotate");

    let data = to_premultiplied_f32(src);
    let (sin, cos) = angle_degrees.to_radians().sin_cos();
    let (scx, scy) = (w as f32 / 2.0, h as f32 / 2.0);
    let (dcx, dcy) = (dw as f32 / 2.0, dh as f32 / 2.0);
    let mode = src.alpha_mode();

    let mut dst = Surface::new(dw, dh, mode);
    for (y, row) in dst.rows_mut() {
        for (x, out) in row.iter_mut().enumerate() {
            // Inverse rotation of the destination pixel center.
            let px = x as f32 + 0.5 - dcx;
            let py = y as f32 + 0.5 - dcy;
            let sx = px * cos + py * sin + scx;
            let sy = -px * sin + py * cos + scy;
            let sample = sample_bilinear(&data, w, h, sx, sy);
            let mut p = from_premultiplied_f32(sample, mode);
            if let Some(max) = alias_max_alpha {
                p = alias_alpha(p, mode, max);
            }
            *out = p;
        }
    }
    dst
}

/// Snaps alpha to 0 or `max` at the half threshold, keeping straight color.
fn alias_alpha(p: Bgra, mode: AlphaMode, max: u8) -> Bgra {
    let keep = max > 0 && p.a as u16 * 2 >= max as u16;
    if !keep {
        return Bgra::TRANSPARENT;
    }
    match mode {
        AlphaMode::Straight => p.with_alpha(max),
        AlphaMode::Premultiplied => p.to_straight().with_alpha(max).to_premultiplied(),
    }
}
