//! Masked overwrite: replace destination pixels with a source surface.
//!
//! Used for erase and clone strokes. The stamp is an alpha mask; its alpha
//! byte is the interpolation factor between the destination and a
//! full-canvas source surface read at the same canvas coordinates.
//!
//! ```text
//! out.a     = d.a + f * (s.a - d.a)            f = mask.a / 255
//! out.color = alpha-weighted mix of d and s by f
//! ```
//!
//! Locked RGB/A bytes are left as they were. Locked H/S/V components are
//! taken from the destination both before and after blending, so partial
//! mask coverage cannot drift them.

use brushfx_core::{Bgra, ChannelLocks, Point, StampOptions, Surface};
use tracing::trace;

use crate::channels::{
    color_unit, for_each_in_region, relock_hsv, resolve_hsv_locks, weighted_mix, write_unlocked,
};
use crate::region::{DrawRegion, stamp_regions};
use crate::{OpsError, OpsResult};

/// One overwrite stamp, ready to be applied region by region.
#[derive(Debug, Clone, Copy)]
pub struct OverwriteStamp<'a> {
    source: &'a Surface,
    mask: &'a Surface,
    locks: ChannelLocks,
    dither: bool,
}

impl<'a> OverwriteStamp<'a> {
    /// Creates a stamp that copies from `source` through `mask`.
    pub fn new(source: &'a Surface, mask: &'a Surface, locks: ChannelLocks, dither: bool) -> Self {
        Self {
            source,
            mask,
            locks,
            dither,
        }
    }

    /// Blends one destination pixel toward a straight source color.
    #[inline]
    pub fn blend(&self, dest: Bgra, source: Bgra, mask_alpha: u8) -> Bgra {
        if mask_alpha == 0 {
            return dest;
        }
        let f = mask_alpha as f32 / 255.0;
        let d = dest.to_straight();
        let s = resolve_hsv_locks(source, d, &self.locks);
        let da = d.a as f32 / 255.0;
        let sa = s.a as f32 / 255.0;

        let out_a = da + f * (sa - da);
        let color = weighted_mix(color_unit(d), da, color_unit(s), sa, f);
        write_unlocked(dest, relock_hsv(color, d, &self.locks), out_a, &self.locks)
    }

    /// Applies the stamp to one region of `dest`.
    ///
    /// The region must lie inside both the mask and `dest`, and `dest` must
    /// match the source size; [`overwrite`] guarantees both.
    pub fn apply_region(&self, dest: &mut Surface, region: DrawRegion) {
        for_each_in_region(dest, self.mask, region, self.dither, |x, y, d, m| {
            let s = self.source.straight_pixel(x, y);
            *d = self.blend(*d, s, m.a);
        });
    }
}

/// Overwrites `dest` with `source` through the alpha of `mask` placed at
/// `location`.
///
/// `options.mode` is ignored. Nothing happens if every RGB or every HSV
/// channel is locked, or if the mask misses the canvas.
///
/// # Errors
///
/// - [`OpsError::SizeMismatch`] if `source` and `dest` differ in size
/// - [`OpsError::Core`] if `dest` is not premultiplied
pub fn overwrite(
    source: &Surface,
    dest: &mut Surface,
    mask: &Surface,
    location: Point,
    options: &StampOptions,
) -> OpsResult<()> {
    dest.ensure_premultiplied("destination")?;
    if !source.same_size(dest) {
        return Err(OpsError::size_mismatch("overwrite source/destination", source, dest));
    }

    let locks = options.locks;
    if locks.color_frozen() {
        trace!(?locks, "overwrite: color channels locked, nothing to do");
        return Ok(());
    }

    let regions = stamp_regions(mask.size(), dest.size(), location, options.wrap_around);
    if regions.is_empty() {
        trace!(x = location.x, y = location.y, "overwrite: stamp off canvas");
        return Ok(());
    }
    trace!(
        mask_w = mask.width(),
        mask_h = mask.height(),
        regions = regions.len(),
        dither = options.dither,
        "overwrite"
    );

    let stamp = OverwriteStamp::new(source, mask, locks, options.dither);
    for region in regions {
        stamp.apply_region(dest, region);
    }
    Ok(())
}
