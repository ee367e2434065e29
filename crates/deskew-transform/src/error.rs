//! Error types for deskew-transform

use thiserror::Error;

/// Errors that can occur during geometric transformations
#[derive(Debug, Error)]
pub enum TransformError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] deskew_core::Error),

    /// Invalid transformation parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),

    /// Singular matrix (non-invertible)
    #[error("singular transformation matrix")]
    SingularMatrix,

    /// The transformed image would have zero area
    #[error("degenerate geometry: {width}x{height} output")]
    DegenerateGeometry { width: f64, height: f64 },
}

/// Result type for transform operations
pub type TransformResult<T> = Result<T, TransformError>;
