//! Integer geometry in buffer-pixel coordinates.
//!
//! - [`Point`] - a signed location; brush placements routinely start left
//!   of or above the canvas
//! - [`Size`] - unsigned dimensions
//! - [`Rect`] - signed origin plus unsigned size
//!
//! # Coordinate System
//!
//! ```text
//! (0,0) ────────► X
//!   │
//!   │   ┌──────────┐
//!   │   │ Surface  │
//!   │   └──────────┘
//!   ▼
//!   Y
//! ```
//!
//! Rectangles are inclusive on the left/top edge and exclusive on the
//! right/bottom edge. Nothing in this module touches pixels; clipping to a
//! surface happens through [`Rect::clamp_to`] or the placement math in
//! `brushfx-ops`.
//!
//! ```rust
//! use brushfx_core::Rect;
//!
//! let stamp = Rect::new(-3, 2, 10, 10);
//! let visible = stamp.clamp_to(8, 8).unwrap();
//! assert_eq!(visible, Rect::new(0, 2, 7, 6));
//! ```

/// A location in pixel coordinates. May be negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Point {
    /// Horizontal coordinate
    pub x: i32,
    /// Vertical coordinate
    pub y: i32,
}

impl Point {
    /// Creates a point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// The origin.
    pub const ZERO: Point = Point::new(0, 0);
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Size {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Size {
    /// Creates a size.
    #[inline]
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns `true` if either dimension is zero.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

/// A rectangle defined by origin (x, y) and dimensions (width, height).
///
/// # Example
///
/// ```rust
/// use brushfx_core::Rect;
///
/// let rect = Rect::new(10, 20, 100, 50);
/// assert_eq!(rect.right(), 110);
/// assert_eq!(rect.bottom(), 70);
/// assert_eq!(rect.area(), 5000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Rect {
    /// X coordinate of the left edge (inclusive)
    pub x: i32,
    /// Y coordinate of the top edge (inclusive)
    pub y: i32,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl Rect {
    /// Creates a new rectangle with the given origin and dimensions.
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Creates a rectangle at the origin with the given dimensions.
    #[inline]
    pub const fn from_size(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// Returns the top-left corner.
    #[inline]
    pub const fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Returns the dimensions.
    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the X coordinate of the right edge (exclusive).
    #[inline]
    pub const fn right(&self) -> i64 {
        self.x as i64 + self.width as i64
    }

    /// Returns the Y coordinate of the bottom edge (exclusive).
    #[inline]
    pub const fn bottom(&self) -> i64 {
        self.y as i64 + self.height as i64
    }

    /// Returns the area of the rectangle in pixels.
    #[inline]
    pub const fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    /// Returns `true` if the rectangle has zero area.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if the point (px, py) is inside this rectangle.
    #[inline]
    pub const fn contains(&self, px: i32, py: i32) -> bool {
        px >= self.x && (px as i64) < self.right() && py >= self.y && (py as i64) < self.bottom()
    }

    /// Returns the intersection of this rectangle with another, or `None`
    /// when they share no pixel.
    ///
    /// ```rust
    /// use brushfx_core::Rect;
    ///
    /// let a = Rect::new(0, 0, 100, 100);
    /// let b = Rect::new(50, -50, 100, 100);
    /// assert_eq!(a.intersect(&b), Some(Rect::new(50, 0, 50, 50)));
    /// ```
    #[inline]
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if (x as i64) < right && (y as i64) < bottom {
            Some(Rect::new(
                x,
                y,
                (right - x as i64) as u32,
                (bottom - y as i64) as u32,
            ))
        } else {
            None
        }
    }

    /// Clips this rectangle to `[0, max_width) x [0, max_height)`.
    #[inline]
    pub fn clamp_to(&self, max_width: u32, max_height: u32) -> Option<Rect> {
        self.intersect(&Rect::from_size(max_width, max_height))
    }

    /// Returns an iterator over all (x, y) coordinates, row by row.
    ///
    /// ```rust
    /// use brushfx_core::Rect;
    ///
    /// let coords: Vec<_> = Rect::new(-1, 0, 2, 2).iter_coords().collect();
    /// assert_eq!(coords, vec![(-1, 0), (0, 0), (-1, 1), (0, 1)]);
    /// ```
    #[inline]
    pub fn iter_coords(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        let (x0, w) = (self.x, self.width as i32);
        (self.y..self.y + self.height as i32).flat_map(move |y| (x0..x0 + w).map(move |x| (x, y)))
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Rect({}, {}, {}x{})", self.x, self.y, self.width, self.height)
    }
}
