//! Error types for brush operations.

use thiserror::Error;

/// Error type for brush operations.
///
/// Every variant is a caller precondition. Operations validate their
/// arguments up front and return before touching any pixel.
#[derive(Error, Debug)]
pub enum OpsError {
    /// A surface failed a core check (alpha mode, stride).
    #[error(transparent)]
    Core(#[from] brushfx_core::Error),

    /// Surfaces read at the same coordinates differ in size.
    ///
    /// Returned by merge and overwrite.
    #[error("size mismatch: {0}")]
    SizeMismatch(String),

    /// A named blend operation is not registered.
    #[error("unknown blend operation: {0}")]
    UnknownBlend(String),
}

impl OpsError {
    /// Builds a [`OpsError::SizeMismatch`] naming two surfaces.
    pub(crate) fn size_mismatch(
        what: &str,
        a: &brushfx_core::Surface,
        b: &brushfx_core::Surface,
    ) -> Self {
        Self::SizeMismatch(format!(
            "{}: {}x{} vs {}x{}",
            what,
            a.width(),
            a.height(),
            b.width(),
            b.height()
        ))
    }
}

/// Result type for brush operations.
pub type OpsResult<T> = Result<T, OpsError>;
