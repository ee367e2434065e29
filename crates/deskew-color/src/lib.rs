//! deskew-color - Adaptive binarization
//!
//! This crate turns a 3-channel page image into a two-level image suitable
//! for line detection:
//!
//! - **Luma** ([`threshold::luma`]): channel weighting for brightness
//! - **Integral image** ([`IntegralImage`]): constant-time window sums
//! - **Adaptive threshold** ([`adaptive_threshold`]): each pixel is compared
//!   against the mean brightness of its neighbourhood, so uneven lighting
//!   across a scan does not wash out or blacken whole regions

pub mod error;
pub mod threshold;

// Re-export core types
pub use deskew_core;

// Re-export error types
pub use error::{ColorError, ColorResult};

// Re-export threshold functions
pub use threshold::{
    // Types
    AdaptiveThresholdOptions,
    IntegralImage,
    LumaWeighting,
    // Functions
    adaptive_threshold,
    adaptive_threshold_pix,
    binarize,
};
