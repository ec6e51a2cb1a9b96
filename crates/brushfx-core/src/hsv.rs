//! Float HSV conversion for straight-alpha BGRA colors.
//!
//! Hue is in degrees `[0, 360)`, saturation and value in `[0, 1]`.
//! Conversions run directly on floats and only round when a byte is
//! finally produced, so a color taken through HSV and back reproduces its
//! original bytes exactly.
//!
//! ```
//! use brushfx_core::{Bgra, Hsv};
//!
//! let c = Bgra::new(12, 200, 99, 255);
//! let hsv = Hsv::from_bgra(c);
//! assert_eq!(hsv.to_bgra(c.a), c);
//! ```

use crate::pixel::{Bgra, clamp_f32, round_byte};

/// A color in hue/saturation/value space.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Hsv {
    /// Hue in degrees, `[0, 360)`
    pub h: f32,
    /// Saturation, `[0, 1]`
    pub s: f32,
    /// Value, `[0, 1]`
    pub v: f32,
}

impl Hsv {
    /// Creates an HSV color, wrapping hue and clamping saturation/value.
    #[inline]
    pub fn new(h: f32, s: f32, v: f32) -> Self {
        Self {
            h: wrap_hue(h),
            s: clamp_f32(s, 0.0, 1.0),
            v: clamp_f32(v, 0.0, 1.0),
        }
    }

    /// Converts the color bytes of a straight-alpha pixel. Alpha is ignored.
    #[inline]
    pub fn from_bgra(c: Bgra) -> Self {
        Self::from_rgb_f32(c.r as f32 / 255.0, c.g as f32 / 255.0, c.b as f32 / 255.0)
    }

    /// Converts unit-range RGB floats.
    pub fn from_rgb_f32(r: f32, g: f32, b: f32) -> Self {
        let max = r.max(g).max(b);
        let min = r.min(g).min(b);
        let delta = max - min;

        let h = if delta <= 0.0 {
            0.0
        } else if max == r {
            60.0 * ((g - b) / delta)
        } else if max == g {
            60.0 * ((b - r) / delta + 2.0)
        } else {
            60.0 * ((r - g) / delta + 4.0)
        };
        let s = if max <= 0.0 { 0.0 } else { delta / max };

        Self {
            h: wrap_hue(h),
            s,
            v: max,
        }
    }

    /// Returns unit-range `[r, g, b]` floats.
    pub fn to_rgb_f32(self) -> [f32; 3] {
        let c = self.v * self.s;
        let h_prime = wrap_hue(self.h) / 60.0;
        let x = c * (1.0 - ((h_prime % 2.0) - 1.0).abs());

        let (r1, g1, b1) = if h_prime < 1.0 {
            (c, x, 0.0)
        } else if h_prime < 2.0 {
            (x, c, 0.0)
        } else if h_prime < 3.0 {
            (0.0, c, x)
        } else if h_prime < 4.0 {
            (0.0, x, c)
        } else if h_prime < 5.0 {
            (x, 0.0, c)
        } else {
            (c, 0.0, x)
        };

        let m = self.v - c;
        [r1 + m, g1 + m, b1 + m]
    }

    /// Converts back to a straight-alpha pixel with the given alpha.
    #[inline]
    pub fn to_bgra(self, alpha: u8) -> Bgra {
        let [r, g, b] = self.to_rgb_f32();
        Bgra::new(round_byte(b * 255.0), round_byte(g * 255.0), round_byte(r * 255.0), alpha)
    }

    /// Interpolates toward `other` by `t` in `[0, 1]`.
    ///
    /// Hue travels the shorter way around the color wheel.
    pub fn lerp(self, other: Hsv, t: f32) -> Hsv {
        Hsv {
            h: lerp_hue(self.h, other.h, t),
            s: self.s + (other.s - self.s) * t,
            v: self.v + (other.v - self.v) * t,
        }
    }
}

/// Wraps a hue in degrees into `[0, 360)`.
#[inline]
pub fn wrap_hue(h: f32) -> f32 {
    if !h.is_finite() {
        return 0.0;
    }
    let wrapped = h.rem_euclid(360.0);
    // rem_euclid can return 360.0 for tiny negative inputs
    if wrapped >= 360.0 { 0.0 } else { wrapped }
}

/// Interpolates between two hues along the shortest arc.
#[inline]
pub fn lerp_hue(from: f32, to: f32, t: f32) -> f32 {
    let mut delta = to - from;
    if delta > 180.0 {
        delta -= 360.0;
    } else if delta < -180.0 {
        delta += 360.0;
    }
    wrap_hue(from + delta * t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_primaries() {
        let red = Hsv::from_bgra(Bgra::from_rgba(255, 0, 0, 255));
        assert_abs_diff_eq!(red.h, 0.0);
        assert_abs_diff_eq!(red.s, 1.0);
        assert_abs_diff_eq!(red.v, 1.0);

        let green = Hsv::from_bgra(Bgra::from_rgba(0, 255, 0, 255));
        assert_abs_diff_eq!(green.h, 120.0, epsilon = 1e-4);

        let blue = Hsv::from_bgra(Bgra::from_rgba(0, 0, 255, 255));
        assert_abs_diff_eq!(blue.h, 240.0, epsilon = 1e-4);

        let magenta = Hsv::from_bgra(Bgra::from_rgba(255, 0, 255, 255));
        assert_abs_diff_eq!(magenta.h, 300.0, epsilon = 1e-4);
    }

    #[test]
    fn test_gray_has_no_saturation() {
        let gray = Hsv::from_bgra(Bgra::new(90, 90, 90, 255));
        assert_eq!(gray.h, 0.0);
        assert_eq!(gray.s, 0.0);
        assert_abs_diff_eq!(gray.v, 90.0 / 255.0);
    }

    #[test]
    fn test_roundtrip_exact() {
        // Coarse sweep of the cube plus every gray level.
        for r in (0..=255u32).step_by(15) {
            for g in (0..=255u32).step_by(17) {
                for b in (0..=255u32).step_by(5) {
                    let c = Bgra::new(b as u8, g as u8, r as u8, 255);
                    assert_eq!(Hsv::from_bgra(c).to_bgra(255), c);
                }
            }
        }
        for v in 0..=255u8 {
            let c = Bgra::new(v, v, v, 77);
            assert_eq!(Hsv::from_bgra(c).to_bgra(77), c);
        }
    }

    #[test]
    fn test_wrap_hue() {
        assert_eq!(wrap_hue(360.0), 0.0);
        assert_abs_diff_eq!(wrap_hue(-30.0), 330.0);
        assert_abs_diff_eq!(wrap_hue(725.0), 5.0, epsilon = 1e-4);
        assert_eq!(wrap_hue(f32::NAN), 0.0);
    }

    #[test]
    fn test_lerp_hue_shortest_arc() {
        assert_abs_diff_eq!(lerp_hue(350.0, 10.0, 0.5), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(lerp_hue(10.0, 350.0, 0.5), 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(lerp_hue(0.0, 90.0, 0.5), 45.0);
    }

    #[test]
    fn test_lerp_endpoints() {
        let a = Hsv::new(30.0, 0.2, 0.4);
        let b = Hsv::new(200.0, 0.8, 1.0);
        assert_eq!(a.lerp(b, 0.0), a);
        let end = a.lerp(b, 1.0);
        assert_abs_diff_eq!(end.h, 200.0, epsilon = 1e-4);
        assert_abs_diff_eq!(end.s, 0.8);
        assert_abs_diff_eq!(end.v, 1.0);
    }
}
