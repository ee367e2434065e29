//! Error types for deskew-color

use deskew_core::PixelFormat;
use thiserror::Error;

/// Errors that can occur during binarization
#[derive(Debug, Error)]
pub enum ColorError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] deskew_core::Error),

    /// Unsupported pixel format for this operation
    #[error("unsupported format: expected {expected}, got {actual:?}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: PixelFormat,
    },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for color operations
pub type ColorResult<T> = Result<T, ColorError>;
