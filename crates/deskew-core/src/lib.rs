//! deskew-core - Pixel buffers for the deskew pipeline
//!
//! This crate provides the data structures shared by every stage:
//!
//! - [`Pix`] - An exclusively owned pixel buffer with an explicit row stride
//! - [`PixView`] / [`PixViewMut`] - Bounds-checked 2-D accessors over a
//!   borrowed byte slice (read-only / mutable)
//! - [`PixelFormat`] - 3-channel BGR or 1-channel gray
//! - [`Bgr`] - A single 3-channel pixel value
//!
//! Every algorithm in the workspace addresses pixels through a view, so the
//! stride/offset arithmetic lives in exactly one place.

pub mod error;
pub mod pix;

pub use error::{Error, Result};
pub use pix::{ImageFormat, Pix, PixView, PixViewMut, PixelFormat};

/// A 3-channel pixel value.
///
/// Field order follows the in-memory byte order (blue, green, red).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Bgr {
    pub b: u8,
    pub g: u8,
    pub r: u8,
}

impl Bgr {
    /// Pure black
    pub const BLACK: Bgr = Bgr { b: 0, g: 0, r: 0 };
    /// Pure white
    pub const WHITE: Bgr = Bgr {
        b: 255,
        g: 255,
        r: 255,
    };
    /// Pure red, used for diagnostic overlays
    pub const RED: Bgr = Bgr { b: 0, g: 0, r: 255 };

    /// Create a pixel from red, green and blue components.
    #[inline]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { b, g, r }
    }

    /// Create a gray pixel with all three channels equal.
    #[inline]
    pub const fn gray(v: u8) -> Self {
        Self { b: v, g: v, r: v }
    }

    /// Build a pixel from three bytes in memory order.
    #[inline]
    pub const fn from_bytes(bytes: [u8; 3]) -> Self {
        Self {
            b: bytes[0],
            g: bytes[1],
            r: bytes[2],
        }
    }

    /// The pixel as three bytes in memory order.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 3] {
        [self.b, self.g, self.r]
    }

    /// True if all three channels hold the same value.
    #[inline]
    pub fn is_gray(self) -> bool {
        self.b == self.g && self.g == self.r
    }
}
