//! Error types for deskew-recog

use deskew_core::PixelFormat;
use thiserror::Error;

/// Errors that can occur during skew estimation
#[derive(Debug, Error)]
pub enum RecogError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] deskew_core::Error),

    /// Unsupported pixel format for this operation
    #[error("unsupported format: expected {expected}, got {actual:?}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: PixelFormat,
    },

    /// Invalid parameter provided
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type for recognition operations
pub type RecogResult<T> = Result<T, RecogError>;
