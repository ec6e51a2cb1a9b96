//! Masked brush draw.
//!
//! Draws one brush stamp onto a premultiplied destination. The stamp's
//! alpha decides how strongly each pixel is affected; its color only matters
//! when a [`ColorInfluence`] is given, in which case the brush keeps its own
//! colors and is pulled toward the user color in HSV.
//!
//! # Blend modes
//!
//! With `f` the per-pixel factor, `d` the destination and `u` the user
//! color (all straight):
//!
//! | Mode      | Alpha                       | Color                          |
//! |-----------|-----------------------------|--------------------------------|
//! | Normal    | `min(1, u.a * f + d.a)`     | source over destination        |
//! | Overwrite | `d.a + f * (u.a - d.a)`     | alpha-weighted mix by `f`      |
//!
//! Normal is ink buildup: repeated passes only ever add opacity. Overwrite
//! pulls the pixel toward the user color and opacity, so it can also lower
//! alpha.
//!
//! Locked H/S/V components of the destination replace the source's before
//! the blend and the blended color's after it, so partial coverage keeps
//! them too.
//!
//! # Example
//!
//! ```rust
//! use brushfx_core::{AlphaMode, Bgra, Point, StampOptions, Surface, UserColor};
//! use brushfx_ops::draw::draw;
//!
//! let mut canvas = Surface::new(8, 8, AlphaMode::Premultiplied);
//! let brush = Surface::filled(3, 3, Bgra::WHITE, AlphaMode::Straight);
//! let blue = UserColor::new(Bgra::new(255, 0, 0, 255), 0);
//!
//! draw(&mut canvas, &brush, Point::new(2, 2), &blue, None, &StampOptions::default()).unwrap();
//! assert_eq!(canvas.pixel(3, 3), Bgra::new(255, 0, 0, 255));
//! ```

use brushfx_core::{
    AlphaMode, Bgra, BrushBlendMode, ChannelLocks, ColorInfluence, Hsv, Point, StampOptions,
    Surface, UserColor, lerp_hue,
};
use tracing::trace;

use crate::OpsResult;
use crate::channels::{
    color_unit, for_each_in_region, relock_hsv, resolve_hsv_locks, weighted_mix, write_unlocked,
};
use crate::region::{DrawRegion, stamp_regions};

/// A brush stamp with all per-call parameters resolved.
///
/// [`draw`] builds one and applies it to each placement region; it can also
/// be applied to hand-picked regions, e.g. when a caller splits a canvas
/// into tiles.
#[derive(Debug, Clone, Copy)]
pub struct BrushStamp<'a> {
    mask: &'a Surface,
    user: UserColor,
    user_straight: Bgra,
    user_hsv: Hsv,
    influence: Option<ColorInfluence>,
    mode: BrushBlendMode,
    locks: ChannelLocks,
    dither: bool,
}

impl<'a> BrushStamp<'a> {
    /// Resolves a stamp from the draw parameters.
    pub fn new(
        mask: &'a Surface,
        user: &UserColor,
        influence: Option<&ColorInfluence>,
        options: &StampOptions,
    ) -> Self {
        let user_straight = user.straight();
        Self {
            mask,
            user: *user,
            user_straight,
            user_hsv: Hsv::from_bgra(user_straight),
            influence: influence.copied(),
            mode: options.mode,
            locks: options.locks,
            dither: options.dither,
        }
    }

    /// Source color (straight, alpha = user alpha) and blend factor for one
    /// mask pixel.
    #[inline]
    fn source(&self, mask_px: Bgra) -> (Bgra, f32) {
        let mask_a = mask_px.a as f32 / 255.0;
        let Some(inf) = self.influence else {
            return (self.user_straight, mask_a);
        };

        let brush = match self.mask.alpha_mode() {
            AlphaMode::Straight => mask_px,
            AlphaMode::Premultiplied => mask_px.to_straight(),
        };
        let factor = mask_a * self.user.min_alpha_scale();

        let hue = inf.hue && !self.locks.h;
        let sat = inf.saturation && !self.locks.s;
        let val = inf.value && !self.locks.v;
        let t = inf.factor();
        if t <= 0.0 || !(hue || sat || val) {
            return (brush.with_alpha(self.user_straight.a), factor);
        }

        let target = self.user_hsv;
        let mut hsv = Hsv::from_bgra(brush);
        if hue {
            hsv.h = lerp_hue(hsv.h, target.h, t);
        }
        if sat {
            hsv.s += (target.s - hsv.s) * t;
        }
        if val {
            hsv.v += (target.v - hsv.v) * t;
        }
        (hsv.to_bgra(self.user_straight.a), factor)
    }

    /// Computes the new value of one destination pixel.
    ///
    /// `dest` is premultiplied; `mask_px` is read in the mask's own
    /// encoding.
    pub fn shade(&self, dest: Bgra, mask_px: Bgra) -> Bgra {
        let (src, f) = self.source(mask_px);
        if f <= 0.0 {
            return dest;
        }

        let d = dest.to_straight();
        let s = resolve_hsv_locks(src, d, &self.locks);
        let da = d.a as f32 / 255.0;
        let ua = s.a as f32 / 255.0;

        let (alpha, color) = match self.mode {
            BrushBlendMode::Normal => {
                let sa = ua * f;
                let alpha = (sa + da).min(1.0);
                (alpha, weighted_mix(color_unit(d), da, color_unit(s), 1.0, sa))
            }
            BrushBlendMode::Overwrite => {
                let alpha = da + f * (ua - da);
                (alpha, weighted_mix(color_unit(d), da, color_unit(s), ua, f))
            }
        };
        write_unlocked(dest, relock_hsv(color, d, &self.locks), alpha, &self.locks)
    }

    /// Applies the stamp to one region of `dest`.
    pub fn apply_region(&self, dest: &mut Surface, region: DrawRegion) {
        for_each_in_region(dest, self.mask, region, self.dither, |_, _, d, m| {
            *d = self.shade(*d, m);
        });
    }
}

/// Draws `mask` at `location` onto `dest` in the user color.
///
/// `influence` switches from "solid user color" to "brush colors pulled
/// toward the user color". Nothing happens when a full color triad and
/// alpha are locked together, or when the stamp misses the canvas.
///
/// # Errors
///
/// Returns [`crate::OpsError::Core`] if `dest` is not premultiplied.
pub fn draw(
    dest: &mut Surface,
    mask: &Surface,
    location: Point,
    user: &UserColor,
    influence: Option<&ColorInfluence>,
    options: &StampOptions,
) -> OpsResult<()> {
    dest.ensure_premultiplied("destination")?;

    if options.locks.is_degenerate() {
        trace!(locks = ?options.locks, "draw: all channels locked, nothing to do");
        return Ok(());
    }

    let regions = stamp_regions(mask.size(), dest.size(), location, options.wrap_around);
    if regions.is_empty() {
        trace!(x = location.x, y = location.y, "draw: stamp off canvas");
        return Ok(());
    }
    trace!(
        mask_w = mask.width(),
        mask_h = mask.height(),
        mode = options.mode.name(),
        regions = regions.len(),
        influence = influence.is_some(),
        "draw"
    );

    let stamp = BrushStamp::new(mask, user, influence, options);
    for region in regions {
        stamp.apply_region(dest, region);
    }
    Ok(())
}
