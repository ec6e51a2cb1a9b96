//! # brushfx-ops
//!
//! Masked brush compositing on premultiplied BGRA surfaces.
//!
//! # Modules
//!
//! - [`region`] - stamp clipping and the eight wrap-around regions
//! - [`draw`] - masked brush draw (Normal / Overwrite, locks, influence)
//! - [`overwrite`] - masked replace from a source surface
//! - [`composite`] - staged-to-committed layer merge
//! - [`blend`] - named merge blend operations and their registry
//! - [`resample`] - brush scaling with selectable interpolation
//! - [`transform`] - flip, square, rotate
//! - [`color_matrix`] - 5x4 color transform for tinting brushes
//! - [`palette`] - color counting and gradients
//! - [`parallel`] - rayon variants (feature `parallel`)
//!
//! # Stroke flow
//!
//! ```text
//! brush image ──resample/rotate──► stamp
//! stamp ──draw / overwrite──► staged
//! staged + committed ──merge──► visible
//! ```
//!
//! # Example
//!
//! ```rust
//! use brushfx_core::prelude::*;
//! use brushfx_ops::composite::{LayerMerge, merge};
//! use brushfx_ops::draw::draw;
//!
//! let committed = Surface::filled(16, 16, Bgra::WHITE, AlphaMode::Premultiplied);
//! let mut staged = Surface::new(16, 16, AlphaMode::Premultiplied);
//! let mut visible = committed.clone();
//!
//! let brush = Surface::filled(4, 4, Bgra::WHITE, AlphaMode::Straight);
//! let ink = UserColor::new(Bgra::BLACK, 0);
//! draw(&mut staged, &brush, Point::new(6, 6), &ink, None, &StampOptions::default())?;
//!
//! let bounds = visible.bounds();
//! merge(&staged, &committed, &mut visible, bounds, &LayerMerge::normal(128))?;
//! assert_eq!(visible.pixel(7, 7), Bgra::new(127, 127, 127, 255));
//! assert_eq!(visible.pixel(0, 0), Bgra::WHITE);
//! # Ok::<(), brushfx_ops::OpsError>(())
//! ```
//!
//! # Feature Flags
//!
//! - `parallel` (default) - rayon-backed merge and color counting
//! - `serde` - serialization of option types

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod channels;
mod error;

pub mod blend;
pub mod color_matrix;
pub mod composite;
pub mod draw;
pub mod overwrite;
pub mod palette;
pub mod region;
pub mod resample;
pub mod transform;

#[cfg(feature = "parallel")]
pub mod parallel;

pub use blend::{BlendOp, BlendRegistry, MergeBlend};
pub use channels::dither_keeps;
pub use color_matrix::ColorMatrix;
pub use composite::LayerMerge;
pub use error::{OpsError, OpsResult};
pub use region::{DrawRegion, Placement, stamp_regions};
pub use resample::{Interpolation, ScaleOptions};
