//! deskew - Straighten scanned document images
//!
//! A scanned page is corrected in three stages:
//!
//! 1. **Binarize** ([`color`]): adaptive threshold over an integral image,
//!    robust to uneven lighting
//! 2. **Estimate** ([`recog`]): Hough transform over the ink pixels finds
//!    the dominant text-line direction
//! 3. **Rotate** ([`transform`]): the original image is rotated onto a
//!    canvas that exactly bounds the result
//!
//! [`deskew`] runs all three; the stage crates are re-exported for callers
//! that need one stage on its own.
//!
//! # Example
//!
//! ```
//! use deskew::{Bgr, DeskewOptions, Pix, PixelFormat};
//!
//! let page = Pix::new_filled(64, 48, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
//! let out = deskew::deskew(&page, &DeskewOptions::default()).unwrap();
//! // A page without ink is returned unrotated
//! assert!(!out.rotated);
//! assert_eq!(out.image.width(), 64);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use deskew_core::*;

// Re-export stage crates as modules to avoid name conflicts
pub use deskew_color as color;
pub use deskew_io as io;
pub use deskew_recog as recog;
pub use deskew_transform as transform;

pub mod pipeline;

pub use pipeline::{DeskewError, DeskewOptions, DeskewOutput, DeskewResult, deskew, deskew_file, deskew_view};
