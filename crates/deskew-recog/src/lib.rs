//! deskew-recog - Skew estimation for document images
//!
//! - **Hough transform** ([`hough`]): votes every ink pixel into a
//!   one-degree (angle, distance) accumulator and reports the strongest
//!   straight line
//! - **Overlay** ([`overlay`]): paints the detected line onto an image for
//!   inspection

pub mod error;
pub mod hough;
pub mod overlay;

// Re-export core types
pub use deskew_core;

pub use error::{RecogError, RecogResult};
pub use hough::{ANGLE_BUCKETS, HoughAccumulator, HoughOptions, SkewEstimate, estimate_skew};
pub use overlay::draw_detected_line;
