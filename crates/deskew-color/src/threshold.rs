//! Adaptive thresholding over an integral image
//!
//! Every pixel is compared against a threshold derived from the summed
//! brightness of the `(2r + 1)`-wide window around it, where `r` is the
//! half window. Window sums come from a full 2-D prefix-sum table, so the
//! cost per pixel is four lookups regardless of `r`.
//!
//! The threshold is `window_sum / (4 * r * r)`. The divisor is deliberately
//! the same at the image border, where the window is clipped: clipped
//! windows produce lower thresholds, so border pixels lean towards white.
//!
//! # See also
//!
//! Bradley & Roth, "Adaptive Thresholding Using the Integral Image".

use crate::{ColorError, ColorResult};
use deskew_core::{Bgr, Pix, PixView, PixViewMut, PixelFormat};
use tracing::debug;

/// How the three channels are combined into a single brightness value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LumaWeighting {
    /// `(B + G + R) / 3`
    Mean,
    /// `(28 B + 77 G + 150 R) >> 8`, red-heavy integer weights
    #[default]
    Perceptual,
}

/// Brightness of one pixel under the given weighting.
#[inline]
pub fn luma(px: Bgr, weighting: LumaWeighting) -> u8 {
    let (b, g, r) = (px.b as u32, px.g as u32, px.r as u32);
    match weighting {
        LumaWeighting::Mean => ((b + g + r) / 3) as u8,
        LumaWeighting::Perceptual => (((b * 28 + g * 77 + r * 150) >> 8) & 0xFF) as u8,
    }
}

/// Options for adaptive thresholding
#[derive(Debug, Clone)]
pub struct AdaptiveThresholdOptions {
    /// Half the side of the local window, in pixels
    pub half_window: u32,
    /// Channel weighting used for both the window sums and the tested pixel
    pub weighting: LumaWeighting,
}

impl Default for AdaptiveThresholdOptions {
    fn default() -> Self {
        Self {
            half_window: 6,
            weighting: LumaWeighting::Perceptual,
        }
    }
}

impl AdaptiveThresholdOptions {
    /// Create new options with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the half window.
    pub fn with_half_window(mut self, half_window: u32) -> Self {
        self.half_window = half_window;
        self
    }

    /// Set the luma weighting.
    pub fn with_weighting(mut self, weighting: LumaWeighting) -> Self {
        self.weighting = weighting;
        self
    }

    /// Validate options.
    pub fn validate(&self) -> ColorResult<()> {
        if self.half_window == 0 {
            return Err(ColorError::InvalidParameters(
                "half_window must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Divisor applied to every window sum.
    #[inline]
    fn divisor(&self) -> i64 {
        let r = self.half_window as i64;
        4 * r * r
    }
}

/// Summed-area table of pixel brightness
///
/// `at(x, y)` is the sum of luma over every pixel `(i, j)` with
/// `i <= x` and `j <= y`.
#[derive(Debug, Clone)]
pub struct IntegralImage {
    width: u32,
    height: u32,
    sums: Vec<i64>,
}

impl IntegralImage {
    /// Build the table from a 3-channel image.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::UnsupportedFormat`] unless the view is
    /// [`PixelFormat::Bgr24`].
    pub fn build(view: &PixView<'_>, weighting: LumaWeighting) -> ColorResult<Self> {
        require_bgr(view.format())?;
        let w = view.width() as usize;
        let h = view.height() as usize;
        let mut sums = vec![0i64; w * h];

        for y in 0..h {
            let row = view.row(y as u32)?;
            let mut running = 0i64;
            for (x, px) in row.chunks_exact(3).enumerate() {
                running += luma(Bgr::from_bytes([px[0], px[1], px[2]]), weighting) as i64;
                let above = if y > 0 { sums[(y - 1) * w + x] } else { 0 };
                sums[y * w + x] = running + above;
            }
        }

        debug!(width = w, height = h, total = sums.last().copied().unwrap_or(0), "integral image built");
        Ok(Self {
            width: view.width(),
            height: view.height(),
            sums,
        })
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Prefix sum at (x, y).
    ///
    /// # Errors
    ///
    /// Returns [`deskew_core::Error::OutOfRange`] outside the table.
    pub fn at(&self, x: u32, y: u32) -> ColorResult<i64> {
        if x >= self.width || y >= self.height {
            return Err(deskew_core::Error::OutOfRange {
                x,
                y,
                width: self.width,
                height: self.height,
            }
            .into());
        }
        Ok(self.at_unchecked(x, y))
    }

    /// Sum of luma over the half-open rectangle `(x1, x2] x (y1, y2]`.
    ///
    /// # Errors
    ///
    /// Returns [`ColorError::InvalidParameters`] if `x1 > x2` or `y1 > y2`,
    /// and [`deskew_core::Error::OutOfRange`] if `(x2, y2)` is outside the
    /// table.
    pub fn window_sum(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> ColorResult<i64> {
        if x1 > x2 || y1 > y2 {
            return Err(ColorError::InvalidParameters(format!(
                "inverted window ({x1}, {x2}] x ({y1}, {y2}]"
            )));
        }
        self.at(x2, y2)?;
        Ok(self.window_sum_unchecked(x1, y1, x2, y2))
    }

    #[inline]
    fn at_unchecked(&self, x: u32, y: u32) -> i64 {
        self.sums[y as usize * self.width as usize + x as usize]
    }

    /// Caller guarantees `x1 <= x2 < width` and `y1 <= y2 < height`.
    #[inline]
    fn window_sum_unchecked(&self, x1: u32, y1: u32, x2: u32, y2: u32) -> i64 {
        self.at_unchecked(x2, y2) - self.at_unchecked(x1, y2) - self.at_unchecked(x2, y1)
            + self.at_unchecked(x1, y1)
    }
}

/// Binarize a 3-channel image in place.
///
/// Each pixel becomes pure white if its luma is at least the local
/// threshold, pure black otherwise. For pixel `(x, y)` with half window `r`
/// the window is clipped to the image:
///
/// ```text
/// x1 = max(0, x - r)      x2 = min(w - 1, x + r)
/// y1 = max(0, y - r)      y2 = min(h - 1, y + r)
/// ```
///
/// The integral image is built from the input before any pixel is written,
/// so the result does not depend on visiting order.
///
/// # Arguments
///
/// * `view` - 3-channel image, overwritten with the two-level result
/// * `options` - Window size and luma weighting
///
/// # Errors
///
/// Returns [`ColorError::UnsupportedFormat`] for a 1-channel image and
/// [`ColorError::InvalidParameters`] for a zero half window.
pub fn adaptive_threshold(
    view: &mut PixViewMut<'_>,
    options: &AdaptiveThresholdOptions,
) -> ColorResult<()> {
    options.validate()?;
    require_bgr(view.format())?;

    let integral = IntegralImage::build(&view.as_view(), options.weighting)?;
    let w = view.width();
    let h = view.height();
    let r = options.half_window;
    let divisor = options.divisor();
    let white = Bgr::WHITE.to_bytes();
    let black = Bgr::BLACK.to_bytes();
    let mut ink = 0usize;

    for y in 0..h {
        let y1 = y.saturating_sub(r);
        let y2 = y.saturating_add(r).min(h - 1);
        let row = view.row_mut(y)?;
        for (x, px) in row.chunks_exact_mut(3).enumerate() {
            let x = x as u32;
            let x1 = x.saturating_sub(r);
            let x2 = x.saturating_add(r).min(w - 1);
            let threshold = integral.window_sum_unchecked(x1, y1, x2, y2) / divisor;
            let value = luma(Bgr::from_bytes([px[0], px[1], px[2]]), options.weighting) as i64;
            if value >= threshold {
                px.copy_from_slice(&white);
            } else {
                px.copy_from_slice(&black);
                ink += 1;
            }
        }
    }

    debug!(width = w, height = h, half_window = r, ink, "adaptive threshold applied");
    Ok(())
}

/// Binarize an owned image in place. See [`adaptive_threshold`].
pub fn adaptive_threshold_pix(pix: &mut Pix, options: &AdaptiveThresholdOptions) -> ColorResult<()> {
    adaptive_threshold(&mut pix.view_mut(), options)
}

/// Binarize into a new image, leaving the input untouched.
pub fn binarize(view: &PixView<'_>, options: &AdaptiveThresholdOptions) -> ColorResult<Pix> {
    let mut out = view.to_pix()?;
    adaptive_threshold_pix(&mut out, options)?;
    Ok(out)
}

fn require_bgr(format: PixelFormat) -> ColorResult<()> {
    if format != PixelFormat::Bgr24 {
        return Err(ColorError::UnsupportedFormat {
            expected: "Bgr24",
            actual: format,
        });
    }
    Ok(())
}
