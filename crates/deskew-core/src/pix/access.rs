//! Bounds-checked pixel access
//!
//! [`PixView`] and [`PixViewMut`] wrap a byte slice plus its geometry and
//! are the only place in the workspace that turns `(x, y)` into a byte
//! offset. Every access is checked against the image extent; a malformed
//! stride is rejected when the view is built, not when a pixel is read.

use super::{Layout, Pix, PixelFormat};
use crate::Bgr;
use crate::error::{Error, Result};

/// Read-only accessor over a borrowed pixel buffer.
#[derive(Debug, Clone, Copy)]
pub struct PixView<'a> {
    data: &'a [u8],
    layout: Layout,
}

/// Mutable accessor over a borrowed pixel buffer.
#[derive(Debug)]
pub struct PixViewMut<'a> {
    data: &'a mut [u8],
    layout: Layout,
}

impl<'a> PixView<'a> {
    /// Wrap a caller buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NullInput`] for an empty slice,
    /// [`Error::InvalidDimension`] for a zero-sized image,
    /// [`Error::InvalidStride`] if `stride < width * channels`, and
    /// [`Error::BufferTooSmall`] if `data` does not cover the last row.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let layout = Layout::new(data.len(), width, height, stride, format)?;
        Ok(Self { data, layout })
    }

    pub(crate) fn from_layout(data: &'a [u8], layout: Layout) -> Self {
        Self { data, layout }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Get the pixel at (x, y).
    ///
    /// A [`PixelFormat::Gray8`] sample is returned replicated into all
    /// three channels.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the coordinates are outside the image.
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Result<Bgr> {
        let off = self.layout.offset(x, y)?;
        Ok(read_pixel(self.data, off, self.layout.format))
    }

    /// Get a single channel of the pixel at (x, y).
    ///
    /// Channel 0 is blue for [`PixelFormat::Bgr24`] and the only channel for
    /// [`PixelFormat::Gray8`].
    #[inline]
    pub fn get_channel(&self, x: u32, y: u32, channel: usize) -> Result<u8> {
        let off = self.layout.offset(x, y)?;
        check_channel(channel, self.layout.format)?;
        Ok(self.data[off + channel])
    }

    /// Get the sample of a [`PixelFormat::Gray8`] image.
    pub fn get_gray(&self, x: u32, y: u32) -> Result<u8> {
        require_gray(self.layout.format)?;
        self.get_channel(x, y, 0)
    }

    /// Pixel bytes of row `y`, without padding.
    pub fn row(&self, y: u32) -> Result<&'a [u8]> {
        let range = self.layout.row_range(y)?;
        Ok(&self.data[range])
    }

    /// Copy the viewed pixels into a new owned image with default stride.
    pub fn to_pix(&self) -> Result<Pix> {
        let mut out = Pix::new(self.width(), self.height(), self.format())?;
        let mut dst = out.view_mut();
        for y in 0..self.height() {
            dst.row_mut(y)?.copy_from_slice(self.row(y)?);
        }
        Ok(out)
    }

    /// Compare pixel content, ignoring stride and padding bytes.
    pub fn equals(&self, other: &PixView<'_>) -> bool {
        if self.width() != other.width()
            || self.height() != other.height()
            || self.format() != other.format()
        {
            return false;
        }
        (0..self.height()).all(|y| match (self.row(y), other.row(y)) {
            (Ok(a), Ok(b)) => a == b,
            _ => false,
        })
    }

    /// Count pixels whose channel 0 equals `value`.
    pub fn count_value(&self, value: u8) -> usize {
        let channels = self.layout.format.channels();
        (0..self.height())
            .filter_map(|y| self.row(y).ok())
            .map(|row| row.chunks_exact(channels).filter(|px| px[0] == value).count())
            .sum()
    }
}

impl<'a> PixViewMut<'a> {
    /// Wrap a mutable caller buffer. Same validation as [`PixView::new`].
    pub fn new(
        data: &'a mut [u8],
        width: u32,
        height: u32,
        stride: usize,
        format: PixelFormat,
    ) -> Result<Self> {
        let layout = Layout::new(data.len(), width, height, stride, format)?;
        Ok(Self { data, layout })
    }

    pub(crate) fn from_layout(data: &'a mut [u8], layout: Layout) -> Self {
        Self { data, layout }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.layout.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.layout.height
    }

    #[inline]
    pub fn stride(&self) -> usize {
        self.layout.stride
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.layout.format
    }

    /// Reborrow as a read-only view.
    #[inline]
    pub fn as_view(&self) -> PixView<'_> {
        PixView::from_layout(&*self.data, self.layout)
    }

    /// Get the pixel at (x, y). See [`PixView::get`].
    #[inline]
    pub fn get(&self, x: u32, y: u32) -> Result<Bgr> {
        let off = self.layout.offset(x, y)?;
        Ok(read_pixel(&*self.data, off, self.layout.format))
    }

    /// Set the pixel at (x, y).
    ///
    /// For [`PixelFormat::Gray8`] the blue channel of `color` is stored.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfRange`] if the coordinates are outside the image.
    #[inline]
    pub fn set(&mut self, x: u32, y: u32, color: Bgr) -> Result<()> {
        let off = self.layout.offset(x, y)?;
        write_pixel(self.data, off, self.layout.format, color);
        Ok(())
    }

    /// Set a single channel of the pixel at (x, y).
    #[inline]
    pub fn set_channel(&mut self, x: u32, y: u32, channel: usize, val: u8) -> Result<()> {
        let off = self.layout.offset(x, y)?;
        check_channel(channel, self.layout.format)?;
        self.data[off + channel] = val;
        Ok(())
    }

    /// Get the sample of a [`PixelFormat::Gray8`] image.
    pub fn get_gray(&self, x: u32, y: u32) -> Result<u8> {
        self.as_view().get_gray(x, y)
    }

    /// Set the sample of a [`PixelFormat::Gray8`] image.
    pub fn set_gray(&mut self, x: u32, y: u32, val: u8) -> Result<()> {
        require_gray(self.layout.format)?;
        self.set_channel(x, y, 0, val)
    }

    /// Mutable pixel bytes of row `y`, without padding.
    pub fn row_mut(&mut self, y: u32) -> Result<&mut [u8]> {
        let range = self.layout.row_range(y)?;
        Ok(&mut self.data[range])
    }

    /// Set every pixel to `color`; padding bytes are left untouched.
    pub fn fill(&mut self, color: Bgr) {
        let layout = self.layout;
        let bytes = color.to_bytes();
        for y in 0..layout.height {
            let start = y as usize * layout.stride;
            let row = &mut self.data[start..start + layout.row_bytes()];
            match layout.format {
                PixelFormat::Bgr24 => row
                    .chunks_exact_mut(3)
                    .for_each(|px| px.copy_from_slice(&bytes)),
                PixelFormat::Gray8 => row.fill(color.b),
            }
        }
    }
}

#[inline]
fn read_pixel(data: &[u8], off: usize, format: PixelFormat) -> Bgr {
    match format {
        PixelFormat::Bgr24 => Bgr::from_bytes([data[off], data[off + 1], data[off + 2]]),
        PixelFormat::Gray8 => Bgr::gray(data[off]),
    }
}

#[inline]
fn write_pixel(data: &mut [u8], off: usize, format: PixelFormat, color: Bgr) {
    match format {
        PixelFormat::Bgr24 => data[off..off + 3].copy_from_slice(&color.to_bytes()),
        PixelFormat::Gray8 => data[off] = color.b,
    }
}

#[inline]
fn check_channel(channel: usize, format: PixelFormat) -> Result<()> {
    if channel >= format.channels() {
        return Err(Error::InvalidParameter(format!(
            "channel {channel} out of range for {format:?}"
        )));
    }
    Ok(())
}

#[inline]
fn require_gray(format: PixelFormat) -> Result<()> {
    if format != PixelFormat::Gray8 {
        return Err(Error::UnsupportedFormat {
            expected: "Gray8",
            actual: format,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 4x2 BGR buffer with 16-byte stride (4 padding bytes per row)
    fn padded_buffer() -> Vec<u8> {
        let mut data = vec![0xEEu8; 16 * 2];
        for y in 0..2usize {
            for x in 0..4usize {
                let off = y * 16 + x * 3;
                data[off] = (x * 10) as u8;
                data[off + 1] = (y * 10) as u8;
                data[off + 2] = 99;
            }
        }
        data
    }

    #[test]
    fn test_view_honors_stride() {
        let data = padded_buffer();
        let view = PixView::new(&data, 4, 2, 16, PixelFormat::Bgr24).unwrap();
        assert_eq!(view.get(3, 1).unwrap(), Bgr::from_bytes([30, 10, 99]));
        assert_eq!(view.row(1).unwrap().len(), 12);
    }

    #[test]
    fn test_view_out_of_range() {
        let data = padded_buffer();
        let view = PixView::new(&data, 4, 2, 16, PixelFormat::Bgr24).unwrap();
        assert!(matches!(
            view.get(4, 0),
            Err(Error::OutOfRange { x: 4, y: 0, width: 4, height: 2 })
        ));
        assert!(view.get(0, 2).is_err());
        assert!(view.row(2).is_err());
    }

    #[test]
    fn test_view_rejects_inconsistent_geometry() {
        let data = padded_buffer();
        assert!(matches!(
            PixView::new(&data, 4, 2, 8, PixelFormat::Bgr24),
            Err(Error::InvalidStride { .. })
        ));
        assert!(matches!(
            PixView::new(&data, 4, 3, 16, PixelFormat::Bgr24),
            Err(Error::BufferTooSmall { .. })
        ));
        assert!(matches!(
            PixView::new(&data, 0, 2, 16, PixelFormat::Bgr24),
            Err(Error::InvalidDimension { .. })
        ));
    }

    #[test]
    fn test_empty_buffer_is_null_input() {
        assert!(matches!(
            PixView::new(&[], 4, 2, 12, PixelFormat::Bgr24),
            Err(Error::NullInput(_))
        ));
        let mut empty: Vec<u8> = Vec::new();
        assert!(matches!(
            PixViewMut::new(&mut empty, 0, 0, 0, PixelFormat::Gray8),
            Err(Error::NullInput(_))
        ));
        assert!(matches!(
            Pix::from_raw(Vec::new(), 1, 1, 3, PixelFormat::Bgr24),
            Err(Error::NullInput(_))
        ));
    }

    #[test]
    fn test_set_leaves_padding_alone() {
        let mut data = padded_buffer();
        {
            let mut view = PixViewMut::new(&mut data, 4, 2, 16, PixelFormat::Bgr24).unwrap();
            view.fill(Bgr::WHITE);
            view.set(0, 0, Bgr::RED).unwrap();
        }
        assert_eq!(&data[0..3], &[0, 0, 255]);
        assert_eq!(&data[12..16], &[0xEE; 4]);
        assert_eq!(&data[28..32], &[0xEE; 4]);
    }

    #[test]
    fn test_gray_access() {
        let mut pix = Pix::new(3, 3, PixelFormat::Gray8).unwrap();
        let mut view = pix.view_mut();
        view.set_gray(1, 2, 200).unwrap();
        assert_eq!(view.get_gray(1, 2).unwrap(), 200);
        assert_eq!(view.get(1, 2).unwrap(), Bgr::gray(200));
        assert!(view.set_channel(0, 0, 1, 5).is_err());
    }

    #[test]
    fn test_get_gray_rejects_rgb() {
        let pix = Pix::new(2, 2, PixelFormat::Bgr24).unwrap();
        assert!(matches!(
            pix.view().get_gray(0, 0),
            Err(Error::UnsupportedFormat { .. })
        ));
        assert_eq!(pix.view().get_channel(0, 0, 2).unwrap(), 0);
    }

    #[test]
    fn test_to_pix_repacks_rows() {
        let data = padded_buffer();
        let view = PixView::new(&data, 4, 2, 16, PixelFormat::Bgr24).unwrap();
        let pix = view.to_pix().unwrap();
        assert_eq!(pix.stride(), 12);
        assert!(pix.view().equals(&view));
    }

    #[test]
    fn test_count_value() {
        let mut pix = Pix::new_filled(5, 4, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        pix.set(1, 1, Bgr::BLACK).unwrap();
        pix.set(4, 3, Bgr::BLACK).unwrap();
        assert_eq!(pix.view().count_value(0), 2);
        assert_eq!(pix.view().count_value(255), 18);
    }
}
