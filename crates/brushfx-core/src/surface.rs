//! Stride-aware BGRA pixel buffers.
//!
//! A [`Surface`] is the only pixel container in brushfx. It models the
//! host's native bitmap: rows of 32-bit BGRA pixels, each row `stride`
//! bytes long (at least `width * 4`), plus a tag saying whether the color
//! bytes are premultiplied.
//!
//! # Memory Layout
//!
//! ```text
//! Memory: [B G R A B G R A ... padding]  ← Row 0 (stride bytes)
//!         [B G R A B G R A ... padding]  ← Row 1
//!         ...
//! ```
//!
//! # Row access
//!
//! Per-pixel loops go through [`Surface::row`] / [`Surface::row_mut`], which
//! hand out bounds-checked `[Bgra]` slices for the visible part of a row.
//! The cast from bytes is zero-copy (`bytemuck`), so the inner loops index a
//! plain slice instead of recomputing offsets.
//!
//! ```rust
//! use brushfx_core::{AlphaMode, Bgra, Surface};
//!
//! let mut s = Surface::new(4, 2, AlphaMode::Premultiplied);
//! s.row_mut(1)[3] = Bgra::WHITE;
//! assert_eq!(s.pixel(3, 1), Bgra::WHITE);
//! assert_eq!(s.pixel(0, 0), Bgra::TRANSPARENT);
//! ```

use crate::{Bgra, Error, Rect, Result, Size};

/// How the color bytes of a surface relate to its alpha.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AlphaMode {
    /// Color bytes are already multiplied by alpha (host native format).
    #[default]
    Premultiplied,
    /// Color bytes are independent of alpha (typical brush source images).
    Straight,
}

impl AlphaMode {
    /// Human-readable name, used in error messages.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Premultiplied => "premultiplied",
            Self::Straight => "straight",
        }
    }
}

/// Owned BGRA pixel buffer.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    /// Raw bytes, `stride * height` long at least
    data: Vec<u8>,
    /// Width in pixels
    width: u32,
    /// Height in pixels
    height: u32,
    /// Bytes per row (may include padding)
    stride: usize,
    /// Alpha encoding of the color bytes
    alpha: AlphaMode,
}

impl Surface {
    /// Creates a fully transparent surface with a tight stride.
    pub fn new(width: u32, height: u32, alpha: AlphaMode) -> Self {
        let stride = width as usize * 4;
        Self {
            data: vec![0; stride * height as usize],
            width,
            height,
            stride,
            alpha,
        }
    }

    /// Creates a surface filled with one pixel value.
    pub fn filled(width: u32, height: u32, pixel: Bgra, alpha: AlphaMode) -> Self {
        let mut surface = Self::new(width, height, alpha);
        surface.fill(pixel);
        surface
    }

    /// Wraps existing bytes.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidStride`] if `stride < width * 4`
    /// - [`Error::InvalidDimensions`] if `data` is shorter than `stride * height`
    pub fn from_data(
        width: u32,
        height: u32,
        stride: usize,
        data: Vec<u8>,
        alpha: AlphaMode,
    ) -> Result<Self> {
        let min_stride = width as usize * 4;
        if stride < min_stride {
            return Err(Error::InvalidStride {
                stride,
                min_stride,
                width,
            });
        }
        let required = stride
            .checked_mul(height as usize)
            .ok_or_else(|| Error::invalid_dimensions(width, height, "buffer size overflows"))?;
        if data.len() < required {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected at least {} bytes, got {}", required, data.len()),
            ));
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
            alpha,
        })
    }

    /// Builds a tightly packed surface from a pixel vector in row order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimensions`] if the pixel count doesn't match.
    pub fn from_pixels(
        width: u32,
        height: u32,
        pixels: Vec<Bgra>,
        alpha: AlphaMode,
    ) -> Result<Self> {
        let expected = width as usize * height as usize;
        if pixels.len() != expected {
            return Err(Error::invalid_dimensions(
                width,
                height,
                format!("expected {} pixels, got {}", expected, pixels.len()),
            ));
        }
        let data: Vec<u8> = bytemuck::cast_slice(&pixels).to_vec();
        Self::from_data(width, height, width as usize * 4, data, alpha)
    }

    /// Returns the surface width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Returns the surface height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Returns the dimensions.
    #[inline]
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    /// Returns the stride (bytes per row).
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the alpha encoding of the color bytes.
    #[inline]
    pub fn alpha_mode(&self) -> AlphaMode {
        self.alpha
    }

    /// Returns `true` if the color bytes are premultiplied.
    #[inline]
    pub fn is_premultiplied(&self) -> bool {
        self.alpha == AlphaMode::Premultiplied
    }

    /// Returns a rectangle covering the entire surface.
    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::from_size(self.width, self.height)
    }

    /// Returns `true` if the surface has zero area.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Returns `true` if both surfaces have the same width and height.
    #[inline]
    pub fn same_size(&self, other: &Surface) -> bool {
        self.width == other.width && self.height == other.height
    }

    /// Fails with [`Error::AlphaMode`] unless the surface is premultiplied.
    #[inline]
    pub fn ensure_premultiplied(&self, role: &'static str) -> Result<()> {
        if self.is_premultiplied() {
            Ok(())
        } else {
            Err(Error::not_premultiplied(role))
        }
    }

    /// Returns the raw bytes, padding included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Returns the raw bytes mutably, padding included.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Returns the visible pixels of row `y`.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row(&self, y: u32) -> &[Bgra] {
        assert!(y < self.height, "row {} out of bounds for height {}", y, self.height);
        let start = y as usize * self.stride;
        bytemuck::cast_slice(&self.data[start..start + self.width as usize * 4])
    }

    /// Returns the visible pixels of row `y` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `y >= height`.
    #[inline]
    pub fn row_mut(&mut self, y: u32) -> &mut [Bgra] {
        assert!(y < self.height, "row {} out of bounds for height {}", y, self.height);
        let start = y as usize * self.stride;
        let end = start + self.width as usize * 4;
        bytemuck::cast_slice_mut(&mut self.data[start..end])
    }

    /// Iterates over all rows mutably, top to bottom.
    pub fn rows_mut(&mut self) -> impl Iterator<Item = (u32, &mut [Bgra])> + '_ {
        let row_bytes = self.width as usize * 4;
        let height = self.height as usize;
        self.data
            .chunks_mut(self.stride.max(1))
            .take(height)
            .enumerate()
            .map(move |(y, chunk)| (y as u32, bytemuck::cast_slice_mut(&mut chunk[..row_bytes])))
    }

    /// Returns the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Bgra {
        self.row(y)[x as usize]
    }

    /// Returns the pixel at (x, y), or `None` if out of bounds.
    #[inline]
    pub fn get_pixel(&self, x: u32, y: u32) -> Option<Bgra> {
        if x < self.width && y < self.height {
            Some(self.pixel(x, y))
        } else {
            None
        }
    }

    /// Sets the pixel at (x, y).
    ///
    /// # Panics
    ///
    /// Panics if (x, y) is out of bounds.
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, pixel: Bgra) {
        self.row_mut(y)[x as usize] = pixel;
    }

    /// Fills the visible area with a pixel value.
    pub fn fill(&mut self, pixel: Bgra) {
        for (_, row) in self.rows_mut() {
            row.fill(pixel);
        }
    }

    /// Iterates over all pixels with their coordinates.
    pub fn pixels(&self) -> impl Iterator<Item = (u32, u32, Bgra)> + '_ {
        (0..self.height).flat_map(move |y| {
            self.row(y)
                .iter()
                .enumerate()
                .map(move |(x, p)| (x as u32, y, *p))
        })
    }

    /// Returns a premultiplied copy, converting straight color if needed.
    pub fn to_premultiplied(&self) -> Surface {
        let mut out = self.clone();
        if self.alpha == AlphaMode::Straight {
            for (_, row) in out.rows_mut() {
                for p in row.iter_mut() {
                    *p = p.to_premultiplied();
                }
            }
            out.alpha = AlphaMode::Premultiplied;
        }
        out
    }

    /// Returns a straight-alpha copy, converting premultiplied color if needed.
    pub fn to_straight(&self) -> Surface {
        let mut out = self.clone();
        if self.alpha == AlphaMode::Premultiplied {
            for (_, row) in out.rows_mut() {
                for p in row.iter_mut() {
                    *p = p.to_straight();
                }
            }
            out.alpha = AlphaMode::Straight;
        }
        out
    }

    /// Reads a pixel as straight alpha regardless of the surface encoding.
    #[inline]
    pub fn straight_pixel(&self, x: u32, y: u32) -> Bgra {
        let p = self.pixel(x, y);
        match self.alpha {
            AlphaMode::Premultiplied => p.to_straight(),
            AlphaMode::Straight => p,
        }
    }
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("alpha", &self.alpha)
            .finish()
    }
}
