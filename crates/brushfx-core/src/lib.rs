//! # brushfx-core
//!
//! Core types for brush compositing.
//!
//! This crate holds the data model shared by every brushfx operation:
//!
//! - [`Bgra`] - 32-bit pixel in host byte order, plus premultiply/unpremultiply
//! - [`Hsv`] - float HSV with exact byte round-trips
//! - [`Surface`] - stride-aware BGRA buffer with safe row access
//! - [`Rect`], [`Point`], [`Size`] - placement geometry (may be negative)
//! - [`ChannelLocks`], [`ColorInfluence`], [`UserColor`], [`BrushBlendMode`],
//!   [`StampOptions`] - per-call drawing parameters
//!
//! ## Crate Structure
//!
//! ```text
//! brushfx-core (this crate)
//!    ^
//!    |
//!    +-- brushfx-ops (placement, draw, overwrite, merge, resample)
//!    +-- brushfx-bench
//!    +-- brushfx-tests
//! ```
//!
//! ## Feature Flags
//!
//! - `serde` - Enable serialization for pixel and parameter types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

pub mod error;
pub mod hsv;
pub mod params;
pub mod pixel;
pub mod rect;
pub mod surface;

pub use error::{Error, Result};
pub use hsv::{Hsv, lerp_hue, wrap_hue};
pub use params::{BrushBlendMode, ChannelLocks, ColorInfluence, StampOptions, UserColor};
pub use pixel::{
    Bgra, clamp_f32, clamp_i32, premultiply_channel, round_byte, safe_div, unit_to_byte,
    unpremultiply_channel,
};
pub use rect::{Point, Rect, Size};
pub use surface::{AlphaMode, Surface};

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```
/// use brushfx_core::prelude::*;
///
/// let s = Surface::new(2, 2, AlphaMode::Premultiplied);
/// assert_eq!(s.bounds(), Rect::from_size(2, 2));
/// ```
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::hsv::Hsv;
    pub use crate::params::{BrushBlendMode, ChannelLocks, ColorInfluence, StampOptions, UserColor};
    pub use crate::pixel::Bgra;
    pub use crate::rect::{Point, Rect, Size};
    pub use crate::surface::{AlphaMode, Surface};
}
