//! BGRA pixel type and per-pixel conversions.
//!
//! Destination, committed and staged buffers always hold **premultiplied**
//! BGRA (each of B, G, R is at most A). Brush images may be straight alpha
//! and are normalized on read.
//!
//! # Rounding
//!
//! - Premultiplying uses the ceiling: `ceil(c * a / 255)`. Every code path
//!   that premultiplies goes through [`Bgra::to_premultiplied`], so repeated
//!   stroke passes see one consistent rule.
//! - Unpremultiplying rounds to nearest and clamps to 255.
//! - `A == 0` unpremultiplies to transparent black.
//!
//! # Example
//!
//! ```
//! use brushfx_core::Bgra;
//!
//! let straight = Bgra::new(200, 100, 50, 128);
//! let premul = straight.to_premultiplied();
//! assert_eq!(premul, Bgra::new(101, 51, 26, 128));
//! ```

use bytemuck::{Pod, Zeroable};

/// A single 32-bit pixel in B, G, R, A byte order.
///
/// Whether the color bytes are premultiplied is a property of the buffer
/// that holds the pixel (see [`crate::AlphaMode`]), not of the value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Pod, Zeroable)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[repr(C)]
pub struct Bgra {
    /// Blue
    pub b: u8,
    /// Green
    pub g: u8,
    /// Red
    pub r: u8,
    /// Alpha
    pub a: u8,
}

impl Bgra {
    /// Fully transparent black.
    pub const TRANSPARENT: Bgra = Bgra::new(0, 0, 0, 0);
    /// Opaque black.
    pub const BLACK: Bgra = Bgra::new(0, 0, 0, 255);
    /// Opaque white.
    pub const WHITE: Bgra = Bgra::new(255, 255, 255, 255);

    /// Creates a pixel from bytes in storage order.
    #[inline]
    pub const fn new(b: u8, g: u8, r: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Creates a pixel from bytes in R, G, B, A order.
    #[inline]
    pub const fn from_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { b, g, r, a }
    }

    /// Returns the same color with a different alpha byte.
    #[inline]
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Converts a premultiplied pixel to straight alpha.
    ///
    /// Alpha is unchanged. When alpha is zero the color is defined as black.
    #[inline]
    pub fn to_straight(self) -> Self {
        match self.a {
            0 => Self::TRANSPARENT,
            255 => self,
            a => Self {
                b: unpremultiply_channel(self.b, a),
                g: unpremultiply_channel(self.g, a),
                r: unpremultiply_channel(self.r, a),
                a,
            },
        }
    }

    /// Converts a straight-alpha pixel to premultiplied alpha.
    ///
    /// Each color channel becomes `ceil(c * a / 255)`.
    #[inline]
    pub fn to_premultiplied(self) -> Self {
        match self.a {
            0 => Self::TRANSPARENT,
            255 => self,
            a => Self {
                b: premultiply_channel(self.b, a),
                g: premultiply_channel(self.g, a),
                r: premultiply_channel(self.r, a),
                a,
            },
        }
    }

    /// Returns `true` if no color byte exceeds alpha.
    #[inline]
    pub fn is_valid_premultiplied(self) -> bool {
        self.b <= self.a && self.g <= self.a && self.r <= self.a
    }

    /// Returns the channels as floats in `[0, 1]`, ordered B, G, R, A.
    #[inline]
    pub fn to_unit(self) -> [f32; 4] {
        [
            self.b as f32 / 255.0,
            self.g as f32 / 255.0,
            self.r as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }

    /// Builds a pixel from `[0, 1]` floats ordered B, G, R, A, rounding and
    /// clamping each channel.
    #[inline]
    pub fn from_unit(unit: [f32; 4]) -> Self {
        Self {
            b: unit_to_byte(unit[0]),
            g: unit_to_byte(unit[1]),
            r: unit_to_byte(unit[2]),
            a: unit_to_byte(unit[3]),
        }
    }
}

impl From<[u8; 4]> for Bgra {
    /// Interprets the array in storage order (B, G, R, A).
    #[inline]
    fn from(v: [u8; 4]) -> Self {
        Self::new(v[0], v[1], v[2], v[3])
    }
}

impl From<Bgra> for [u8; 4] {
    #[inline]
    fn from(p: Bgra) -> Self {
        [p.b, p.g, p.r, p.a]
    }
}

/// Premultiplies one channel with the ceiling rule.
#[inline]
pub fn premultiply_channel(c: u8, a: u8) -> u8 {
    ((c as u32 * a as u32 + 254) / 255) as u8
}

/// Unpremultiplies one channel, rounding to nearest. `a == 0` yields 0.
#[inline]
pub fn unpremultiply_channel(c: u8, a: u8) -> u8 {
    if a == 0 {
        return 0;
    }
    let a = a as u32;
    ((c as u32 * 255 + a / 2) / a).min(255) as u8
}

/// Clamps an integer into `[low, high]`.
#[inline]
pub fn clamp_i32(value: i32, low: i32, high: i32) -> i32 {
    value.max(low).min(high)
}

/// Clamps a float into `[low, high]`. NaN maps to `low`.
#[inline]
pub fn clamp_f32(value: f32, low: f32, high: f32) -> f32 {
    if value.is_nan() {
        return low;
    }
    value.max(low).min(high)
}

/// Rounds a float in byte scale (`0..=255`) to a byte, clamping first.
#[inline]
pub fn round_byte(value: f32) -> u8 {
    clamp_f32(value, 0.0, 255.0).round() as u8
}

/// Converts a `[0, 1]` float to a byte, clamping first.
#[inline]
pub fn unit_to_byte(value: f32) -> u8 {
    round_byte(value * 255.0)
}

/// Divides, treating a zero divisor as 1.
#[inline]
pub fn safe_div(numerator: f32, divisor: f32) -> f32 {
    if divisor == 0.0 {
        numerator
    } else {
        numerator / divisor
    }
}
