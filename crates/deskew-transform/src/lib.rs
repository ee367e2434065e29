//! deskew-transform - Geometric transformations for deskew-rs
//!
//! This crate provides:
//!
//! - Affine transformations from three point correspondences, rendered
//!   by inverse-mapped nearest-neighbour sampling ([`affine`])
//! - Arbitrary-angle rotation onto a canvas that exactly contains the
//!   rotated image ([`rotate`])

pub mod affine;
mod error;
pub mod rotate;

pub use affine::{AffineMatrix, Point, affine_sampled, affine_sampled_pta};
pub use error::{TransformError, TransformResult};
pub use rotate::{Quadrant, RotateFill, RotateOptions, RotatedBounds, rotate, rotate_pix};
