//! Error types for deskew-core
//!
//! Provides a unified error type for buffer construction and pixel access.
//! Each variant captures enough context for diagnostics without exposing
//! internal implementation details.

use thiserror::Error;

/// deskew-rs core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Zero width or height
    #[error("invalid image dimensions: {width}x{height}")]
    InvalidDimension { width: u32, height: u32 },

    /// Row stride shorter than one row of pixels
    #[error("invalid stride: {stride} bytes, at least {min} required")]
    InvalidStride { stride: usize, min: usize },

    /// Backing slice does not cover `stride * (height - 1) + row_bytes`
    #[error("buffer too small: {required} bytes required, got {actual}")]
    BufferTooSmall { required: usize, actual: usize },

    /// Pixel coordinates outside the image
    #[error("pixel ({x}, {y}) out of range for {width}x{height} image")]
    OutOfRange {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },

    /// Operation does not support this pixel format
    #[error("unsupported pixel format: expected {expected}, got {actual:?}")]
    UnsupportedFormat {
        expected: &'static str,
        actual: crate::PixelFormat,
    },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Empty backing buffer
    #[error("null or empty input: {0}")]
    NullInput(&'static str),
}

/// Result type alias for core operations
pub type Result<T> = std::result::Result<T, Error>;
