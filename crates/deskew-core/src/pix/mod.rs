//! PIX - The owned pixel buffer
//!
//! `Pix` holds one image: a contiguous byte buffer, its dimensions, a row
//! stride and a [`PixelFormat`].
//!
//! # Pixel layout
//!
//! - Rows are `stride` bytes apart; `stride >= width * channels`
//! - Padding bytes at the end of a row are never read or written by
//!   pixel operations
//! - 3-channel pixels are stored blue, green, red
//!
//! # Ownership model
//!
//! A `Pix` is a value: it is exclusively owned by whichever stage holds it.
//! Stages either mutate a buffer in place through [`PixViewMut`] or
//! allocate and return a new `Pix`. Borrowed buffers supplied by a caller
//! (for example a locked bitmap from a UI toolkit) are wrapped with
//! [`PixView::new`] / [`PixViewMut::new`] without copying.

mod access;

pub use access::{PixView, PixViewMut};

use crate::Bgr;
use crate::error::{Error, Result};

/// Pixel format of a buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// 3 channels, 8 bits each, blue-green-red byte order
    Bgr24,
    /// 1 channel, 8 bits (grayscale or binary intermediate)
    Gray8,
}

impl PixelFormat {
    /// Number of bytes per pixel.
    #[inline]
    pub fn channels(self) -> usize {
        match self {
            PixelFormat::Bgr24 => 3,
            PixelFormat::Gray8 => 1,
        }
    }
}

/// Image file format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ImageFormat {
    /// Unknown format
    #[default]
    Unknown,
    /// Windows bitmap
    Bmp,
    /// PNG
    Png,
}

impl ImageFormat {
    /// Get the file extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Unknown => "dat",
            Self::Bmp => "bmp",
            Self::Png => "png",
        }
    }
}

/// Validated buffer geometry shared by [`Pix`] and the views.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Layout {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) stride: usize,
    pub(crate) format: PixelFormat,
}

impl Layout {
    /// Check dimensions and stride, and that `len` bytes cover every row.
    pub(crate) fn new(
        len: usize,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        if len == 0 {
            return Err(Error::NullInput("pixel buffer"));
        }
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let row_bytes = (width as usize)
            .checked_mul(format.channels())
            .ok_or_else(|| Error::InvalidParameter(format!("row of width {width} overflows")))?;
        if stride < row_bytes {
            return Err(Error::InvalidStride {
                stride,
                min: row_bytes,
            });
        }
        let required = stride
            .checked_mul(height as usize - 1)
            .and_then(|n| n.checked_add(row_bytes))
            .ok_or_else(|| {
                Error::InvalidParameter(format!("buffer of {height} rows overflows"))
            })?;
        if len < required {
            return Err(Error::BufferTooSmall {
                required,
                actual: len,
            });
        }
        Ok(Self {
            width,
            height,
            stride,
            format,
        })
    }

    #[inline]
    pub(crate) fn row_bytes(&self) -> usize {
        self.width as usize * self.format.channels()
    }

    /// Byte offset of pixel (x, y), bounds-checked.
    #[inline]
    pub(crate) fn offset(&self, x: u32, y: u32) -> Result<usize> {
        if x >= self.width || y >= self.height {
            return Err(Error::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride + x as usize * self.format.channels())
    }

    /// Byte range of row `y` (pixels only, no padding).
    #[inline]
    pub(crate) fn row_range(&self, y: u32) -> Result<std::ops::Range<usize>> {
        if y >= self.height {
            return Err(Error::OutOfRange {
                x: 0,
                y,
                width: self.width,
                height: self.height,
            });
        }
        let start = y as usize * self.stride;
        Ok(start..start + self.row_bytes())
    }
}

/// PIX - Owned pixel buffer
///
/// # Examples
///
/// ```
/// use deskew_core::{Bgr, Pix, PixelFormat};
///
/// let mut pix = Pix::new(640, 480, PixelFormat::Bgr24).unwrap();
/// pix.set(10, 20, Bgr::WHITE).unwrap();
/// assert_eq!(pix.get(10, 20).unwrap(), Bgr::WHITE);
/// assert!(pix.stride() >= 640 * 3);
/// ```
#[derive(Debug, Clone)]
pub struct Pix {
    layout: Layout,
    /// Input file format, if the image was decoded from a file
    informat: ImageFormat,
    data: Vec<u8>,
}

impl Pix {
    /// Create a new zero-filled (black) image.
    ///
    /// Rows are padded to a multiple of 4 bytes, the 24-bit DIB convention.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if width or height is 0.
    pub fn new(width: u32, height: u32, format: PixelFormat) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(Error::InvalidDimension { width, height });
        }
        let stride = Self::default_stride(width, format);
        let data = vec![0u8; stride * height as usize];
        let layout = Layout::new(data.len(), width, height, stride, format)?;
        Ok(Self {
            layout,
            informat: ImageFormat::Unknown,
            data,
        })
    }

    /// Create a new image with every pixel set to `color`.
    ///
    /// For [`PixelFormat::Gray8`] the blue channel of `color` is used.
    pub fn new_filled(width: u32, height: u32, format: PixelFormat, color: Bgr) -> Result<Self> {
        let mut pix = Self::new(width, height, format)?;
        pix.view_mut().fill(color);
        Ok(pix)
    }

    /// Adopt a caller-supplied buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullInput`] for an empty `data`, and
    /// [`Error::InvalidDimension`], [`Error::InvalidStride`] or
    /// [`Error::BufferTooSmall`] if the geometry does not fit `data`.
    pub fn from_raw(
        data: Vec<u8>,
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let layout = Layout::new(data.len(), width, height, stride, format)?;
        Ok(Self {
            layout,
            informat: ImageFormat::Unknown,
            data,
        })
    }

    /// Default stride for a width: one row rounded up to 4 bytes.
    #[inline]
    pub fn default_stride(width: u32, format: PixelFormat) -> usize {
        (width as usize * format.channels()).div_ceil(4) * 4
    }

    /// Get the image width in pixels.
    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    /// Get the image height in pixels.
    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    /// Get the row stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    /// Get the pixel format.
    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Get the input file format.
    #[inline]
    pub fn informat(&self) -> ImageFormat {
        self.informat
    }

    /// Record the file format the image was decoded from.
    #[inline]
    pub fn set_informat(&mut self, format: ImageFormat) {
        self.informat = format;
    }

    /// Get raw access to the image data, padding included.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Borrow the image through a read-only accessor.
    #[inline]
    pub fn view(&self) -> PixView<'_> {
        PixView::from_layout(&self.data, self.layout)
    }

    /// Borrow the image through a mutable accessor.
    #[inline]
    pub fn view_mut(&mut self) -> PixViewMut<'_> {
        PixViewMut::from_layout(&mut self.data, self.layout)
    }

    /// Get the pixel at (x, y). See [`PixView::get`].
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Result<Bgr> {
        self.view().get(x, y)
    }

    /// Set the pixel at (x, y). See [`PixViewMut::set`].
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Bgr) -> Result<()> {
        self.view_mut().set(x, y, color)
    }

    /// Compare pixel content, ignoring stride and padding bytes.
    pub fn equals(&self, other: &Pix) -> bool {
        self.view().equals(&other.view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pix_new_rgb() {
        let pix = Pix::new(5, 3, PixelFormat::Bgr24).unwrap();
        assert_eq!(pix.width(), 5);
        assert_eq!(pix.height(), 3);
        // 15 bytes per row, padded to 16
        assert_eq!(pix.stride(), 16);
        assert_eq!(pix.data().len(), 48);
        assert_eq!(pix.get(4, 2).unwrap(), Bgr::BLACK);
    }

    #[test]
    fn test_pix_new_gray_stride() {
        let pix = Pix::new(6, 2, PixelFormat::Gray8).unwrap();
        assert_eq!(pix.stride(), 8);
    }

    #[test]
    fn test_pix_new_zero_dimension() {
        assert!(matches!(
            Pix::new(0, 10, PixelFormat::Bgr24),
            Err(Error::InvalidDimension { width: 0, height: 10 })
        ));
        assert!(Pix::new(10, 0, PixelFormat::Gray8).is_err());
    }

    #[test]
    fn test_pix_new_filled() {
        let pix = Pix::new_filled(4, 4, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        for y in 0..4 {
            for x in 0..4 {
                assert_eq!(pix.get(x, y).unwrap(), Bgr::WHITE);
            }
        }
    }

    #[test]
    fn test_from_raw_rejects_short_stride() {
        let data = vec![0u8; 100];
        let err = Pix::from_raw(data, 10, 3, 20, PixelFormat::Bgr24).unwrap_err();
        assert!(matches!(err, Error::InvalidStride { stride: 20, min: 30 }));
    }

    #[test]
    fn test_from_raw_rejects_short_buffer() {
        // Last row needs only row_bytes, not a full stride
        let ok = Pix::from_raw(vec![0u8; 32 * 2 + 30], 10, 3, 32, PixelFormat::Bgr24);
        assert!(ok.is_ok());
        let err = Pix::from_raw(vec![0u8; 32 * 2 + 29], 10, 3, 32, PixelFormat::Bgr24);
        assert!(matches!(err, Err(Error::BufferTooSmall { required: 94, actual: 93 })));
    }

    #[test]
    fn test_equals_ignores_padding() {
        let mut a = Pix::new(3, 2, PixelFormat::Bgr24).unwrap();
        let mut raw = vec![0xAAu8; 20 * 2];
        for y in 0..2 {
            for x in 0..3 {
                let off = y * 20 + x * 3;
                raw[off..off + 3].copy_from_slice(&[1, 2, 3]);
            }
        }
        let b = Pix::from_raw(raw, 3, 2, 20, PixelFormat::Bgr24).unwrap();
        a.view_mut().fill(Bgr::from_bytes([1, 2, 3]));
        assert!(a.equals(&b));
        a.set(0, 0, Bgr::WHITE).unwrap();
        assert!(!a.equals(&b));
    }

    #[test]
    fn test_image_format_extension() {
        assert_eq!(ImageFormat::Bmp.extension(), "bmp");
        assert_eq!(ImageFormat::Png.extension(), "png");
        assert_eq!(ImageFormat::Unknown.extension(), "dat");
    }
}
