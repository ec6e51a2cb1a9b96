//! Brush image scaling.
//!
//! [`scale`] resizes a brush image, optionally mirrors it, and optionally
//! recolors it through a [`ColorMatrix`]. Filtering runs on premultiplied
//! floats so transparent pixels don't bleed their (meaningless) color into
//! opaque neighbours.
//!
//! # Interpolation
//!
//! - [`Interpolation::Nearest`] - direct pixel mapping, keeps hard edges
//! - [`Interpolation::Bilinear`] - triangle filter
//! - [`Interpolation::Bicubic`] - Mitchell-Netravali cubic, highest quality
//!
//! Linear and cubic filters widen their support when downscaling, so a
//! large brush shrunk to a few pixels is averaged rather than aliased.
//!
//! # Example
//!
//! ```rust
//! use brushfx_core::{AlphaMode, Bgra, Surface};
//! use brushfx_ops::resample::{Interpolation, ScaleOptions, scale};
//!
//! let brush = Surface::filled(8, 8, Bgra::WHITE, AlphaMode::Straight);
//! let opts = ScaleOptions::default().with_interpolation(Interpolation::Bilinear);
//! let small = scale(&brush, 3, 3, &opts);
//! assert_eq!(small.pixel(1, 1), Bgra::WHITE);
//! ```

use brushfx_core::Surface;
use tracing::trace;

use crate::color_matrix::ColorMatrix;
use crate::transform::{
    empty_result, flip_h, flip_v, from_premultiplied_f32, to_premultiplied_f32,
};

/// Interpolation quality for [`scale`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Interpolation {
    /// Nearest neighbour.
    Nearest,
    /// Linear interpolation.
    Bilinear,
    /// Cubic interpolation (Mitchell-Netravali).
    #[default]
    Bicubic,
}

impl Interpolation {
    /// Returns the support radius of the filter kernel.
    #[inline]
    pub fn support(&self) -> f32 {
        match self {
            Self::Nearest => 0.5,
            Self::Bilinear => 1.0,
            Self::Bicubic => 2.0,
        }
    }

    /// Evaluates the filter kernel at distance `x`.
    #[inline]
    pub fn weight(&self, x: f32) -> f32 {
        match self {
            Self::Nearest => {
                if x.abs() < 0.5 {
                    1.0
                } else {
                    0.0
                }
            }
            Self::Bilinear => {
                let ax = x.abs();
                if ax < 1.0 { 1.0 - ax } else { 0.0 }
            }
            Self::Bicubic => mitchell(x),
        }
    }
}

/// Mitchell-Netravali cubic with B = C = 1/3.
#[inline]
fn mitchell(x: f32) -> f32 {
    const B: f32 = 1.0 / 3.0;
    const C: f32 = 1.0 / 3.0;

    let ax = x.abs();
    if ax < 1.0 {
        ((12.0 - 9.0 * B - 6.0 * C) * ax * ax * ax
            + (-18.0 + 12.0 * B + 6.0 * C) * ax * ax
            + (6.0 - 2.0 * B))
            / 6.0
    } else if ax < 2.0 {
        ((-B - 6.0 * C) * ax * ax * ax
            + (6.0 * B + 30.0 * C) * ax * ax
            + (-12.0 * B - 48.0 * C) * ax
            + (8.0 * B + 24.0 * C))
            / 6.0
    } else {
        0.0
    }
}

/// Options for [`scale`].
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ScaleOptions {
    /// Mirror left-right
    pub flip_x: bool,
    /// Mirror top-bottom
    pub flip_y: bool,
    /// Recolor after resampling
    pub color_matrix: Option<ColorMatrix>,
    /// Filter quality
    pub interpolation: Interpolation,
}

impl ScaleOptions {
    /// Sets the interpolation mode.
    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// Sets the mirror flags.
    pub fn with_flip(mut self, flip_x: bool, flip_y: bool) -> Self {
        self.flip_x = flip_x;
        self.flip_y = flip_y;
        self
    }

    /// Sets the color matrix.
    pub fn with_color_matrix(mut self, matrix: ColorMatrix) -> Self {
        self.color_matrix = Some(matrix);
        self
    }
}

/// Scales `src` to `width x height`.
///
/// The result is tightly packed and keeps the source alpha mode. A zero
/// source or target size yields a 1x1 transparent surface.
pub fn scale(src: &Surface, width: u32, height: u32, options: &ScaleOptions) -> Surface {
    if src.is_empty() || width == 0 || height == 0 {
        trace!(width, height, "scale: zero area");
        return empty_result(src.alpha_mode());
    }
    trace!(
        src_w = src.width(),
        src_h = src.height(),
        width,
        height,
        interpolation = ?options.interpolation,
        "scale"
    );

    let mut out = if options.interpolation == Interpolation::Nearest {
        scale_nearest(src, width, height)
    } else {
        scale_filtered(src, width, height, options.interpolation)
    };

    if options.flip_x {
        out = flip_h(&out);
    }
    if options.flip_y {
        out = flip_v(&out);
    }
    if let Some(matrix) = options.color_matrix.filter(|m| !m.is_identity()) {
        apply_color_matrix(&mut out, &matrix);
    }
    out
}

/// Recolors a surface in place, in straight space.
pub fn apply_color_matrix(surface: &mut Surface, matrix: &ColorMatrix) {
    let premultiplied = surface.is_premultiplied();
    for (_, row) in surface.rows_mut() {
        for p in row.iter_mut() {
            let straight = if premultiplied { p.to_straight() } else { *p };
            let out = matrix.apply(straight);
            *p = if premultiplied { out.to_premultiplied() } else { out };
        }
    }
}

fn scale_nearest(src: &Surface, width: u32, height: u32) -> Surface {
    let (sw, sh) = (src.width(), src.height());
    let sx_of = |x: u32| {
        let sx = ((x as u64 * 2 + 1) * sw as u64) / (width as u64 * 2);
        sx.min(sw as u64 - 1) as usize
    };

    let mut dst = Surface::new(width, height, src.alpha_mode());
    for (y, row) in dst.rows_mut() {
        let sy = (((y as u64 * 2 + 1) * sh as u64) / (height as u64 * 2)).min(sh as u64 - 1) as u32;
        let src_row = src.row(sy);
        for (x, out) in row.iter_mut().enumerate() {
            *out = src_row[sx_of(x as u32)];
        }
    }
    dst
}

fn scale_filtered(src: &Surface, width: u32, height: u32, filter: Interpolation) -> Surface {
    let (sw, sh) = (src.width() as usize, src.height() as usize);
    let data = to_premultiplied_f32(src);
    let temp = resample_horizontal(&data, sw, sh, width as usize, filter);
    let result = resample_vertical(&temp, width as usize, sh, height as usize, filter);

    let mode = src.alpha_mode();
    let mut dst = Surface::new(width, height, mode);
    for (y, row) in dst.rows_mut() {
        let start = y as usize * width as usize;
        for (out, px) in row.iter_mut().zip(&result[start..start + width as usize]) {
            *out = from_premultiplied_f32(clamp_premultiplied(*px), mode);
        }
    }
    dst
}

/// Cubic overshoot can leave color above alpha or outside `[0, 1]`.
#[inline]
fn clamp_premultiplied(px: [f32; 4]) -> [f32; 4] {
    let a = px[3].clamp(0.0, 1.0);
    [
        px[0].clamp(0.0, a),
        px[1].clamp(0.0, a),
        px[2].clamp(0.0, a),
        a,
    ]
}

/// Filter taps for one output coordinate: first source index plus weights.
fn taps(
    center: f32,
    scale: f32,
    support: f32,
    len: usize,
    filter: Interpolation,
) -> (usize, Vec<f32>) {
    let first = ((center - support).floor() as isize).max(0) as usize;
    let last = ((center + support).ceil().max(0.0) as usize).min(len - 1);
    let stretch = scale.max(1.0);
    let weights = (first..=last)
        .map(|s| filter.weight((s as f32 - center) / stretch))
        .collect();
    (first, weights)
}

fn resample_horizontal(
    src: &[[f32; 4]],
    src_w: usize,
    src_h: usize,
    dst_w: usize,
    filter: Interpolation,
) -> Vec<[f32; 4]> {
    let mut dst = vec![[0.0f32; 4]; dst_w * src_h];
    let scale = src_w as f32 / dst_w as f32;
    let support = filter.support() * scale.max(1.0);

    for x in 0..dst_w {
        let center = (x as f32 + 0.5) * scale - 0.5;
        let (first, weights) = taps(center, scale, support, src_w, filter);
        let weight_sum: f32 = weights.iter().sum();
        if weight_sum <= 0.0 {
            continue;
        }
        for y in 0..src_h {
            let mut sum = [0.0f32; 4];
            for (i, w) in weights.iter().enumerate() {
                let px = src[y * src_w + first + i];
                for c in 0..4 {
                    sum[c] += px[c] * w;
                }
            }
            dst[y * dst_w + x] = sum.map(|v| v / weight_sum);
        }
    }

    dst
}

fn resample_vertical(
    src: &[[f32; 4]],
    src_w: usize,
    src_h: usize,
    dst_h: usize,
    filter: Interpolation,
) -> Vec<[f32; 4]> {
    let mut dst = vec![[0.0f32; 4]; src_w * dst_h];
    let scale = src_h as f32 / dst_h as f32;
    let support = filter.support() * scale.max(1.0);

    for y in 0..dst_h {
        let center = (y as f32 + 0.5) * scale - 0.5;
        let (first, weights) = taps(center, scale, support, src_h, filter);
        let weight_sum: f32 = weights.iter().sum();
        if weight_sum <= 0.0 {
            continue;
        }
        for x in 0..src_w {
            let mut sum = [0.0f32; 4];
            for (i, w) in weights.iter().enumerate() {
                let px = src[(first + i) * src_w + x];
                for c in 0..4 {
                    sum[c] += px[c] * w;
                }
            }
            dst[y * src_w + x] = sum.map(|v| v / weight_sum);
        }
    }

    dst
}
