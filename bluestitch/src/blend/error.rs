//! Error types for tile blending.

use thiserror::Error;

/// Errors that can occur while preparing or blending a tile.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BlendError {
    /// The tile does not have the two-layer shape (height = 2 × width).
    #[error("Invalid tile dimensions {width}×{height}: {reason}")]
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },

    /// The blend settings cannot be applied.
    #[error("Invalid blend configuration: {0}")]
    InvalidConfig(String),
}
