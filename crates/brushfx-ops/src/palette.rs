//! Palette helpers built on the pixel conversions.
//!
//! - [`from_surface`] - most frequent colors of an image
//! - [`gradient`] - evenly spaced colors between two endpoints in HSV
//!
//! Colors are returned straight (not premultiplied).

use std::collections::HashMap;

use brushfx_core::{Bgra, Hsv, Surface};
use tracing::debug;

/// Counts how often each stored pixel value occurs.
///
/// Uses the row-parallel counter when the `parallel` feature is enabled.
pub fn count_colors(surface: &Surface) -> HashMap<Bgra, u64> {
    #[cfg(feature = "parallel")]
    {
        crate::parallel::count_colors(surface)
    }
    #[cfg(not(feature = "parallel"))]
    {
        let mut counts = HashMap::new();
        for (_, _, p) in surface.pixels() {
            *counts.entry(p).or_insert(0u64) += 1;
        }
        counts
    }
}

/// Returns up to `max_colors` of the most frequent non-transparent colors.
///
/// Pixels are unpremultiplied and their alpha dropped, so the same paint
/// at different opacities is counted as one opaque color. Ties are broken
/// by color value, which makes the result deterministic.
///
/// ```rust
/// use brushfx_core::{AlphaMode, Bgra, Surface};
/// use brushfx_ops::palette::from_surface;
///
/// let mut s = Surface::filled(4, 4, Bgra::WHITE, AlphaMode::Premultiplied);
/// s.set_pixel(0, 0, Bgra::BLACK);
/// assert_eq!(from_surface(&s, 8), vec![Bgra::WHITE, Bgra::BLACK]);
/// ```
pub fn from_surface(surface: &Surface, max_colors: usize) -> Vec<Bgra> {
    let premultiplied = surface.is_premultiplied();
    let mut straight: HashMap<Bgra, u64> = HashMap::new();
    for (p, n) in count_colors(surface) {
        if p.a == 0 {
            continue;
        }
        let color = if premultiplied { p.to_straight() } else { p };
        *straight.entry(color.with_alpha(255)).or_insert(0) += n;
    }

    let mut ranked: Vec<(Bgra, u64)> = straight.into_iter().collect();
    ranked.sort_unstable_by(|(ca, na), (cb, nb)| nb.cmp(na).then(ca.cmp(cb)));
    debug!(distinct = ranked.len(), max_colors, "palette from surface");
    ranked.into_iter().take(max_colors).map(|(c, _)| c).collect()
}

/// Returns `steps` colors from `from` to `to`, both included.
///
/// Hue takes the short way around the wheel; alpha is interpolated
/// linearly.
///
/// ```rust
/// use brushfx_core::Bgra;
/// use brushfx_ops::palette::gradient;
///
/// let red = Bgra::from_rgba(255, 0, 0, 255);
/// let blue = Bgra::from_rgba(0, 0, 255, 255);
/// let g = gradient(red, blue, 3);
/// assert_eq!(g, vec![red, Bgra::from_rgba(255, 0, 255, 255), blue]);
/// ```
pub fn gradient(from: Bgra, to: Bgra, steps: usize) -> Vec<Bgra> {
    match steps {
        0 => return Vec::new(),
        1 => return vec![from],
        _ => {}
    }
    let a = Hsv::from_bgra(from);
    let b = Hsv::from_bgra(to);
    let last = steps - 1;

    (0..steps)
        .map(|i| {
            if i == 0 {
                return from;
            }
            if i == last {
                return to;
            }
            let t = i as f32 / last as f32;
            let alpha = from.a as f32 + (to.a as f32 - from.a as f32) * t;
            a.lerp(b, t).to_bgra(brushfx_core::round_byte(alpha))
        })
        .collect()
}
