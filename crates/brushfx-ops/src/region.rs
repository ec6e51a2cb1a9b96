//! Stamp placement and wrap-around region math.
//!
//! A stamp of size `w x h` placed at `location` on a `W x H` canvas may hang
//! off any edge. [`Placement::compute`] clips it to the on-canvas part, and
//! [`Placement::wrap_regions`] derives up to eight extra draws that repeat
//! the clipped-off pixels on the opposite edges:
//!
//! ```text
//!   top-left  │    top     │ top-right
//!   ──────────┼────────────┼──────────
//!     left    │  primary   │   right
//!   ──────────┼────────────┼──────────
//! bottom-left │   bottom   │ bottom-right
//! ```
//!
//! Every region is a [`DrawRegion`]: an offset into the stamp, an offset
//! into the canvas and a size, all already in bounds. Pixel loops consume
//! regions and never redo the clipping.
//!
//! Wrap is only exact when the stamp fits inside the canvas. An axis on
//! which the stamp is larger than the canvas gets no wrap draws (and no
//! corners); the primary draw is still produced.

use brushfx_core::{Point, Rect, Size};
use smallvec::SmallVec;
use tracing::debug;

/// One rectangular copy from stamp space to canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawRegion {
    /// Left edge in the stamp
    pub src_x: u32,
    /// Top edge in the stamp
    pub src_y: u32,
    /// Left edge on the canvas
    pub dst_x: u32,
    /// Top edge on the canvas
    pub dst_y: u32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl DrawRegion {
    /// Creates a region.
    #[inline]
    pub const fn new(src: (u32, u32), dst: (u32, u32), size: (u32, u32)) -> Self {
        Self {
            src_x: src.0,
            src_y: src.1,
            dst_x: dst.0,
            dst_y: dst.1,
            width: size.0,
            height: size.1,
        }
    }

    /// A region copying `width x height` pixels at the same offset in both
    /// spaces.
    #[inline]
    pub const fn identity(width: u32, height: u32) -> Self {
        Self::new((0, 0), (0, 0), (width, height))
    }

    /// Returns `true` if the region covers no pixel.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// The covered canvas rectangle.
    #[inline]
    pub fn dst_rect(&self) -> Rect {
        Rect::new(self.dst_x as i32, self.dst_y as i32, self.width, self.height)
    }

    /// The covered stamp rectangle.
    #[inline]
    pub fn src_rect(&self) -> Rect {
        Rect::new(self.src_x as i32, self.src_y as i32, self.width, self.height)
    }
}

/// Regions produced for one stamp application.
pub type Regions = SmallVec<[DrawRegion; 9]>;

/// A stamp clipped against the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    /// Stamp size
    pub stamp: Size,
    /// Canvas size
    pub canvas: Size,
    /// Columns hanging off the left edge
    pub neg_x: u32,
    /// Rows hanging off the top edge
    pub neg_y: u32,
    /// Columns hanging off the right edge
    pub extra_x: u32,
    /// Rows hanging off the bottom edge
    pub extra_y: u32,
    /// The on-canvas part
    pub primary: DrawRegion,
}

impl Placement {
    /// Clips a stamp placed at `location`.
    ///
    /// Returns `None` when no stamp pixel lands on the canvas.
    ///
    /// ```
    /// use brushfx_core::{Point, Size};
    /// use brushfx_ops::region::Placement;
    ///
    /// let p = Placement::compute(Size::new(4, 4), Size::new(10, 10), Point::new(-1, 8)).unwrap();
    /// assert_eq!((p.neg_x, p.extra_y), (1, 2));
    /// assert_eq!((p.primary.width, p.primary.height), (3, 2));
    /// ```
    pub fn compute(stamp: Size, canvas: Size, location: Point) -> Option<Placement> {
        let (w, h) = (stamp.width as i64, stamp.height as i64);
        let (cw, ch) = (canvas.width as i64, canvas.height as i64);
        let (lx, ly) = (location.x as i64, location.y as i64);

        let neg_x = (-lx).max(0);
        let neg_y = (-ly).max(0);
        let extra_x = (lx + w - cw).max(0);
        let extra_y = (ly + h - ch).max(0);

        let adj_w = w - neg_x - extra_x;
        let adj_h = h - neg_y - extra_y;
        if adj_w <= 0 || adj_h <= 0 {
            return None;
        }

        // adj_w > 0 bounds every overhang by the stamp size, so the casts hold.
        let primary = DrawRegion::new(
            (neg_x as u32, neg_y as u32),
            (lx.max(0) as u32, ly.max(0) as u32),
            (adj_w as u32, adj_h as u32),
        );

        Some(Placement {
            stamp,
            canvas,
            neg_x: neg_x as u32,
            neg_y: neg_y as u32,
            extra_x: extra_x as u32,
            extra_y: extra_y as u32,
            primary,
        })
    }

    /// Derives the wrap-around draws for the clipped-off pixels.
    ///
    /// Empty regions are dropped, so a stamp fully on canvas yields nothing.
    pub fn wrap_regions(&self) -> SmallVec<[DrawRegion; 8]> {
        let mut out = SmallVec::new();

        let (cw, ch) = (self.canvas.width, self.canvas.height);
        let (w, h) = (self.stamp.width, self.stamp.height);
        let wrap_x = w <= cw;
        let wrap_y = h <= ch;
        if !wrap_x || !wrap_y {
            debug!(
                stamp_w = w,
                stamp_h = h,
                canvas_w = cw,
                canvas_h = ch,
                wrap_x,
                wrap_y,
                "stamp larger than canvas, skipping wrap on that axis"
            );
        }

        let neg_x = self.neg_x.min(cw);
        let neg_y = self.neg_y.min(ch);
        let extra_x = self.extra_x.min(cw);
        let extra_y = self.extra_y.min(ch);

        let p = self.primary;
        let (adj_x, adj_y, adj_w, adj_h) = (p.dst_x, p.dst_y, p.width, p.height);

        let mut push = |region: DrawRegion| {
            if !region.is_empty() {
                out.push(region);
            }
        };

        if wrap_x {
            // left
            push(DrawRegion::new((0, neg_y), (cw - neg_x, adj_y), (neg_x, adj_h)));
            // right
            push(DrawRegion::new((w - extra_x, neg_y), (0, adj_y), (extra_x, adj_h)));
        }
        if wrap_y {
            // top
            push(DrawRegion::new((neg_x, 0), (adj_x, ch - neg_y), (adj_w, neg_y)));
            // bottom
            push(DrawRegion::new((neg_x, h - extra_y), (adj_x, 0), (adj_w, extra_y)));
        }
        if wrap_x && wrap_y {
            push(DrawRegion::new((0, 0), (cw - neg_x, ch - neg_y), (neg_x, neg_y)));
            push(DrawRegion::new((w - extra_x, 0), (0, ch - neg_y), (extra_x, neg_y)));
            push(DrawRegion::new((0, h - extra_y), (cw - neg_x, 0), (neg_x, extra_y)));
            push(DrawRegion::new((w - extra_x, h - extra_y), (0, 0), (extra_x, extra_y)));
        }

        out
    }
}

/// All draws for one stamp: the primary region, followed by the wrap
/// regions when `wrap_around` is set. Empty when the stamp misses the
/// canvas.
pub fn stamp_regions(stamp: Size, canvas: Size, location: Point, wrap_around: bool) -> Regions {
    let mut regions = Regions::new();
    let Some(placement) = Placement::compute(stamp, canvas, location) else {
        return regions;
    };
    regions.push(placement.primary);
    if wrap_around {
        regions.extend(placement.wrap_regions());
    }
    regions
}
