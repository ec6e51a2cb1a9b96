//! Per-pixel building blocks shared by draw, overwrite and merge.
//!
//! Colors here are straight-alpha unit floats in B, G, R order. The
//! operations unpremultiply once on read, do all arithmetic in float and
//! premultiply once on write through [`write_unlocked`], so every path uses
//! the same ceiling rule.

use brushfx_core::{Bgra, ChannelLocks, Hsv, Surface};

use crate::region::DrawRegion;

/// Returns `true` if the dither checkerboard keeps canvas pixel (x, y).
///
/// Parity is taken from canvas coordinates, so wrapped regions and the
/// primary region agree on which pixels are drawn.
#[inline]
pub fn dither_keeps(x: u32, y: u32) -> bool {
    (x + y) % 2 == 0
}

/// Straight color as unit floats `[b, g, r]`.
#[inline]
pub(crate) fn color_unit(c: Bgra) -> [f32; 3] {
    [c.b as f32 / 255.0, c.g as f32 / 255.0, c.r as f32 / 255.0]
}

/// Copies the locked hue, saturation or value of `dest` into `src`.
///
/// Both colors are straight; the result keeps the alpha of `src`.
#[inline]
pub(crate) fn resolve_hsv_locks(src: Bgra, dest: Bgra, locks: &ChannelLocks) -> Bgra {
    if !locks.any_hsv() {
        return src;
    }
    let d = Hsv::from_bgra(dest);
    let mut s = Hsv::from_bgra(src);
    if locks.h {
        s.h = d.h;
    }
    if locks.s {
        s.s = d.s;
    }
    if locks.v {
        s.v = d.v;
    }
    s.to_bgra(src.a)
}

/// Puts the locked hue, saturation or value of `dest` back into a blended
/// color.
///
/// Mixing two colors in RGB moves every HSV component, so the locks are
/// applied again after the blend. `color` is straight `[b, g, r]`.
#[inline]
pub(crate) fn relock_hsv(color: [f32; 3], dest: Bgra, locks: &ChannelLocks) -> [f32; 3] {
    if !locks.any_hsv() {
        return color;
    }
    let d = Hsv::from_bgra(dest);
    let mut c = Hsv::from_rgb_f32(color[2], color[1], color[0]);
    if locks.h {
        c.h = d.h;
    }
    if locks.s {
        c.s = d.s;
    }
    if locks.v {
        c.v = d.v;
    }
    let [r, g, b] = c.to_rgb_f32();
    [b, g, r]
}

/// Alpha-weighted interpolation of two straight colors.
///
/// Returns the color of `dest` (weight `dest_a * (1 - t)`) mixed with `src`
/// (weight `src_a * t`). When both weights vanish the source color wins, so
/// painting onto transparent pixels never darkens toward black.
#[inline]
pub(crate) fn weighted_mix(
    dest: [f32; 3],
    dest_a: f32,
    src: [f32; 3],
    src_a: f32,
    t: f32,
) -> [f32; 3] {
    let wd = dest_a * (1.0 - t);
    let ws = src_a * t;
    let total = wd + ws;
    if total <= 1e-8 {
        return src;
    }
    let inv = 1.0 / total;
    [
        (dest[0] * wd + src[0] * ws) * inv,
        (dest[1] * wd + src[1] * ws) * inv,
        (dest[2] * wd + src[2] * ws) * inv,
    ]
}

/// Builds the premultiplied output pixel, keeping locked bytes of `dest`.
///
/// `color` is straight, `alpha` in `[0, 1]`. A locked alpha keeps the
/// destination alpha. When alpha is free but some color bytes are locked,
/// alpha is raised to at least those bytes so the result stays a valid
/// premultiplied pixel.
#[inline]
pub(crate) fn write_unlocked(
    dest: Bgra,
    color: [f32; 3],
    alpha: f32,
    locks: &ChannelLocks,
) -> Bgra {
    let a = if locks.a {
        dest.a
    } else {
        brushfx_core::unit_to_byte(alpha)
    };
    let straight = Bgra::from_unit([color[0], color[1], color[2], 1.0]).with_alpha(a);
    let mut out = straight.to_premultiplied();

    if locks.b {
        out.b = dest.b;
    }
    if locks.g {
        out.g = dest.g;
    }
    if locks.r {
        out.r = dest.r;
    }
    if !locks.a && locks.any_rgb() {
        out.a = out.a.max(out.b).max(out.g).max(out.r);
    }
    out
}

/// Walks the pixels of one region, pairing each destination pixel with the
/// stamp pixel that lands on it.
///
/// Pixels rejected by the dither checkerboard are skipped untouched.
pub(crate) fn for_each_in_region(
    dest: &mut Surface,
    stamp: &Surface,
    region: DrawRegion,
    dither: bool,
    mut f: impl FnMut(u32, u32, &mut Bgra, Bgra),
) {
    let w = region.width as usize;
    for row in 0..region.height {
        let dy = region.dst_y + row;
        let sy = region.src_y + row;
        let src_row = &stamp.row(sy)[region.src_x as usize..region.src_x as usize + w];
        let dst_row = &mut dest.row_mut(dy)[region.dst_x as usize..region.dst_x as usize + w];
        for (i, (d, s)) in dst_row.iter_mut().zip(src_row).enumerate() {
            let dx = region.dst_x + i as u32;
            if dither && !dither_keeps(dx, dy) {
                continue;
            }
            f(dx, dy, d, *s);
        }
    }
}
