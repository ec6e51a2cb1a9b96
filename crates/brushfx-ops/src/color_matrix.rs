//! 5x4 affine color transform for brush images.
//!
//! Rows are the inputs R, G, B, A plus a constant bias row; columns are the
//! outputs R, G, B, A. A straight color `[r, g, b, a]` in `[0, 1]` maps to
//!
//! ```text
//! out[j] = r * m[0][j] + g * m[1][j] + b * m[2][j] + a * m[3][j] + m[4][j]
//! ```
//!
//! The usual use is [`ColorMatrix::tint`]: turn a white/gray brush mask into
//! a solid-colored stamp with scaled opacity.

use brushfx_core::{Bgra, clamp_f32};

/// A 5x4 color matrix applied to straight-alpha pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ColorMatrix {
    /// `m[input][output]`, input row 4 is the bias
    pub m: [[f32; 4]; 5],
}

impl Default for ColorMatrix {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ColorMatrix {
    /// Leaves colors unchanged.
    pub const IDENTITY: ColorMatrix = ColorMatrix {
        m: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
            [0.0, 0.0, 0.0, 0.0],
        ],
    };

    /// Multiplies each channel independently.
    pub const fn scale(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self {
            m: [
                [r, 0.0, 0.0, 0.0],
                [0.0, g, 0.0, 0.0],
                [0.0, 0.0, b, 0.0],
                [0.0, 0.0, 0.0, a],
                [0.0, 0.0, 0.0, 0.0],
            ],
        }
    }

    /// Tints a brush by a straight color and scales its alpha.
    ///
    /// White maps to `color`, black stays black, alpha is multiplied by
    /// `alpha_scale`.
    ///
    /// ```
    /// use brushfx_core::Bgra;
    /// use brushfx_ops::color_matrix::ColorMatrix;
    ///
    /// let red = ColorMatrix::tint(Bgra::from_rgba(255, 0, 0, 255), 0.5);
    /// assert_eq!(red.apply(Bgra::WHITE), Bgra::from_rgba(255, 0, 0, 128));
    /// ```
    pub fn tint(color: Bgra, alpha_scale: f32) -> Self {
        Self::scale(
            color.r as f32 / 255.0,
            color.g as f32 / 255.0,
            color.b as f32 / 255.0,
            alpha_scale,
        )
    }

    /// Returns `true` if this is the identity.
    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Transforms one straight-alpha pixel.
    #[inline]
    pub fn apply(&self, px: Bgra) -> Bgra {
        let input = [
            px.r as f32 / 255.0,
            px.g as f32 / 255.0,
            px.b as f32 / 255.0,
            px.a as f32 / 255.0,
        ];
        let mut out = [0.0f32; 4];
        for (j, o) in out.iter_mut().enumerate() {
            let mut sum = self.m[4][j];
            for (i, v) in input.iter().enumerate() {
                sum += v * self.m[i][j];
            }
            *o = clamp_f32(sum, 0.0, 1.0);
        }
        // out is R, G, B, A
        Bgra::from_unit([out[2], out[1], out[0], out[3]])
    }
}
