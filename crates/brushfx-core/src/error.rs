//! Error types for brushfx-core.
//!
//! Everything that can go wrong in this crate is a caller precondition:
//! a buffer whose byte length or stride cannot hold the advertised
//! dimensions, a surface in the wrong alpha encoding, or a setting name
//! that doesn't parse.
//! Per-pixel arithmetic never fails (see [`crate::pixel`] for the
//! division-by-zero fallbacks).
//!
//! # Usage
//!
//! ```rust
//! use brushfx_core::{Error, Result};
//!
//! fn check(width: u32, height: u32) -> Result<()> {
//!     if width == 0 {
//!         return Err(Error::invalid_dimensions(width, height, "zero width"));
//!     }
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// Result type alias using [`Error`] as the error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced while constructing surfaces or parsing settings.
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid surface dimensions.
    #[error("invalid dimensions: {width}x{height} ({reason})")]
    InvalidDimensions {
        /// Requested width
        width: u32,
        /// Requested height
        height: u32,
        /// Reason why dimensions are invalid
        reason: String,
    },

    /// Stride is too small for the given width.
    ///
    /// Every row must hold at least `width * 4` bytes.
    #[error("stride {stride} is less than minimum {min_stride} for width {width}")]
    InvalidStride {
        /// Provided stride
        stride: usize,
        /// Minimum required stride
        min_stride: usize,
        /// Surface width
        width: u32,
    },

    /// A surface is in the wrong alpha encoding for the operation.
    #[error("{role} surface must be {expected}")]
    AlphaMode {
        /// Which argument was wrong ("destination", "committed", ...)
        role: &'static str,
        /// The encoding the operation requires
        expected: &'static str,
    },

    /// A brush blend mode name that doesn't parse.
    #[error("unknown brush blend mode: {0}")]
    UnknownBlendMode(String),
}

impl Error {
    /// Creates an [`Error::InvalidDimensions`] error.
    #[inline]
    pub fn invalid_dimensions(width: u32, height: u32, reason: impl Into<String>) -> Self {
        Self::InvalidDimensions {
            width,
            height,
            reason: reason.into(),
        }
    }

    /// Creates an [`Error::AlphaMode`] error demanding premultiplied input.
    #[inline]
    pub fn not_premultiplied(role: &'static str) -> Self {
        Self::AlphaMode {
            role,
            expected: "premultiplied",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_dimensions() {
        let err = Error::invalid_dimensions(100, 0, "zero height");
        assert_eq!(err.to_string(), "invalid dimensions: 100x0 (zero height)");
    }

    #[test]
    fn test_alpha_mode() {
        let err = Error::not_premultiplied("destination");
        assert_eq!(err.to_string(), "destination surface must be premultiplied");
    }

    #[test]
    fn test_unknown_blend_mode() {
        let err = Error::UnknownBlendMode("soft".into());
        assert_eq!(err.to_string(), "unknown brush blend mode: soft");
    }
}
