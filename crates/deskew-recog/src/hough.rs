//! Skew estimation by Hough transform
//!
//! Every ink pixel `(x, y)` votes, for each one-degree angle `theta` in the
//! configured range, for the line in normal form
//!
//! ```text
//! d = floor(|y * sin(theta) + x * cos(theta)|)
//! ```
//!
//! The (angle, distance) cell with the most votes is the dominant straight
//! line. `theta` is the direction of the line's normal, so a level text
//! line reports 90 and the correction that levels the page is
//! `90 - theta` degrees.
//!
//! # Accumulator layout
//!
//! `180 x (max_distance + 1)` vote counts, angle-major, with
//! `max_distance = ceil(sqrt(w^2 + h^2))`. Peaks are found by a row-major
//! scan with a strictly-greater comparison, so among equal maxima the
//! smallest angle (then the smallest distance) wins.

use crate::{RecogError, RecogResult};
use deskew_core::PixView;
use std::ops::Range;
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Number of one-degree angle buckets, covering `[0, 180)`
pub const ANGLE_BUCKETS: usize = 180;

/// Sine and cosine of every angle bucket
#[derive(Debug)]
pub(crate) struct TrigTable {
    sin: [f64; ANGLE_BUCKETS],
    cos: [f64; ANGLE_BUCKETS],
}

impl TrigTable {
    fn build() -> Self {
        let mut sin = [0.0; ANGLE_BUCKETS];
        let mut cos = [0.0; ANGLE_BUCKETS];
        for i in 0..ANGLE_BUCKETS {
            let (s, c) = (i as f64).to_radians().sin_cos();
            sin[i] = s;
            cos[i] = c;
        }
        Self { sin, cos }
    }

    /// Callers keep `angle < ANGLE_BUCKETS`.
    #[inline]
    pub(crate) fn sin(&self, angle: usize) -> f64 {
        self.sin[angle]
    }

    #[inline]
    pub(crate) fn cos(&self, angle: usize) -> f64 {
        self.cos[angle]
    }

    /// Signed projection `y sin(angle) + x cos(angle)` of a pixel.
    #[inline]
    pub(crate) fn project(&self, x: u32, y: u32, angle: usize) -> f64 {
        y as f64 * self.sin(angle) + x as f64 * self.cos(angle)
    }
}

static TRIG: LazyLock<TrigTable> = LazyLock::new(TrigTable::build);

/// The process-wide trig table, built on first use.
pub(crate) fn trig_table() -> &'static TrigTable {
    &TRIG
}

/// Options for skew estimation
#[derive(Debug, Clone)]
pub struct HoughOptions {
    /// First angle bucket that receives votes (default: 0)
    pub min_angle: u32,
    /// One past the last angle bucket that receives votes (default: 180)
    pub max_angle: u32,
    /// Sample value that marks an ink pixel (default: 0, black)
    ///
    /// Compared with the gray sample of a 1-channel image and with the
    /// blue channel of a 3-channel image.
    pub ink_value: u8,
}

impl Default for HoughOptions {
    fn default() -> Self {
        Self {
            min_angle: 0,
            max_angle: ANGLE_BUCKETS as u32,
            ink_value: 0,
        }
    }
}

impl HoughOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Vote only for normals within 30 degrees of vertical.
    ///
    /// Text lines on a page that is not rotated by more than 30 degrees all
    /// fall into this range, and vertical strokes of glyphs cannot win.
    pub fn near_horizontal() -> Self {
        Self::default().with_angle_range(60, 120)
    }

    /// Set the range of angle buckets that receive votes
    pub fn with_angle_range(mut self, min_angle: u32, max_angle: u32) -> Self {
        self.min_angle = min_angle;
        self.max_angle = max_angle;
        self
    }

    /// Set the ink sample value
    pub fn with_ink_value(mut self, ink_value: u8) -> Self {
        self.ink_value = ink_value;
        self
    }

    /// Validate options
    pub fn validate(&self) -> RecogResult<()> {
        if self.min_angle >= self.max_angle {
            return Err(RecogError::InvalidParameter(format!(
                "empty angle range {}..{}",
                self.min_angle, self.max_angle
            )));
        }
        if self.max_angle as usize > ANGLE_BUCKETS {
            return Err(RecogError::InvalidParameter(format!(
                "max_angle must not exceed {ANGLE_BUCKETS}, got {}",
                self.max_angle
            )));
        }
        Ok(())
    }

    fn angles(&self) -> Range<usize> {
        self.min_angle as usize..self.max_angle as usize
    }
}

/// The strongest line found by the estimator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SkewEstimate {
    /// Normal angle of the line in degrees, `0..180`
    pub angle: u32,
    /// Distance of the line from the origin, in pixels
    pub distance: u32,
    /// Number of ink pixels on the line; 0 if the image has no ink
    pub votes: u32,
    /// The voting pixels mostly lie on `x cos + y sin = -distance`.
    ///
    /// Distances are folded to their absolute value, so one cell collects
    /// two parallel lines. Only [`estimate_skew`] sets this; it matters
    /// for drawing the line, not for the correction angle.
    pub negative_distance: bool,
}

impl SkewEstimate {
    /// Rotation, in degrees, that turns the detected line level.
    pub fn correction_degrees(&self) -> f64 {
        90.0 - self.angle as f64
    }

    /// True if at least one ink pixel voted.
    pub fn has_ink(&self) -> bool {
        self.votes > 0
    }
}

/// Vote counts over (angle, distance)
#[derive(Debug, Clone)]
pub struct HoughAccumulator {
    max_distance: usize,
    votes: Vec<u32>,
}

impl HoughAccumulator {
    /// Create an empty accumulator for a `width x height` image.
    pub fn new(width: u32, height: u32) -> Self {
        let (w, h) = (width as f64, height as f64);
        let max_distance = (w * w + h * h).sqrt().ceil() as usize;
        Self {
            max_distance,
            votes: vec![0; ANGLE_BUCKETS * (max_distance + 1)],
        }
    }

    /// Largest distance bucket
    #[inline]
    pub fn max_distance(&self) -> usize {
        self.max_distance
    }

    /// Add one vote per angle in `angles` for the pixel at (x, y).
    pub fn accumulate(&mut self, x: u32, y: u32, angles: Range<usize>) {
        let trig = trig_table();
        let stride = self.max_distance + 1;
        for angle in angles.start..angles.end.min(ANGLE_BUCKETS) {
            let d = self.bucket(trig.project(x, y, angle));
            self.votes[angle * stride + d] += 1;
        }
    }

    #[inline]
    fn bucket(&self, projection: f64) -> usize {
        (projection.abs() as usize).min(self.max_distance)
    }

    /// Votes in one cell; 0 outside the accumulator.
    pub fn votes(&self, angle: usize, distance: usize) -> u32 {
        if angle >= ANGLE_BUCKETS || distance > self.max_distance {
            return 0;
        }
        self.votes[angle * (self.max_distance + 1) + distance]
    }

    /// The first cell holding the maximum vote count.
    ///
    /// An accumulator without votes yields angle 0, distance 0, votes 0.
    pub fn peak(&self) -> SkewEstimate {
        let stride = self.max_distance + 1;
        let mut best = SkewEstimate::default();
        for (i, &v) in self.votes.iter().enumerate() {
            if v > best.votes {
                best = SkewEstimate {
                    angle: (i / stride) as u32,
                    distance: (i % stride) as u32,
                    votes: v,
                    negative_distance: false,
                };
            }
        }
        best
    }
}

/// Estimate the dominant line direction of a two-level image.
///
/// # Arguments
///
/// * `view` - Binarized image; ink pixels have `options.ink_value`
/// * `options` - Angle range and ink value
///
/// # Returns
///
/// The accumulator peak. The input is not modified.
pub fn estimate_skew(view: &PixView<'_>, options: &HoughOptions) -> RecogResult<SkewEstimate> {
    options.validate()?;
    // Channel 0 is gray or blue
    let channels = view.format().channels();

    let mut acc = HoughAccumulator::new(view.width(), view.height());
    let angles = options.angles();
    let mut ink = 0usize;
    for y in 0..view.height() {
        let row = view.row(y)?;
        for (x, px) in row.chunks_exact(channels).enumerate() {
            if px[0] == options.ink_value {
                acc.accumulate(x as u32, y, angles.clone());
                ink += 1;
            }
        }
    }
    trace!(ink, max_distance = acc.max_distance(), "hough votes cast");

    let mut peak = acc.peak();
    if peak.has_ink() {
        peak.negative_distance = peak_side_is_negative(view, options.ink_value, &acc, &peak)?;
    }
    debug!(
        angle = peak.angle,
        distance = peak.distance,
        votes = peak.votes,
        negative = peak.negative_distance,
        ink,
        "hough peak found"
    );
    Ok(peak)
}

/// Re-walk the ink pixels that voted for the peak cell and report whether
/// most of them projected to `-distance`.
fn peak_side_is_negative(
    view: &PixView<'_>,
    ink_value: u8,
    acc: &HoughAccumulator,
    peak: &SkewEstimate,
) -> RecogResult<bool> {
    let trig = trig_table();
    let angle = peak.angle as usize;
    let channels = view.format().channels();
    let (mut negative, mut positive) = (0u32, 0u32);
    for y in 0..view.height() {
        let row = view.row(y)?;
        for (x, px) in row.chunks_exact(channels).enumerate() {
            if px[0] != ink_value {
                continue;
            }
            let rho = trig.project(x as u32, y, angle);
            if acc.bucket(rho) != peak.distance as usize {
                continue;
            }
            if rho < 0.0 {
                negative += 1;
            } else {
                positive += 1;
            }
        }
    }
    trace!(negative, positive, "peak side tallied");
    Ok(negative > positive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deskew_core::{Bgr, Pix, PixelFormat};

    fn blank_gray(w: u32, h: u32) -> Pix {
        Pix::new_filled(w, h, PixelFormat::Gray8, Bgr::WHITE).unwrap()
    }

    #[test]
    fn test_trig_table() {
        let t = trig_table();
        assert_eq!(t.sin(90), 1.0);
        assert_eq!(t.cos(0), 1.0);
        assert!(t.cos(90).abs() < 1e-12);
        assert!((t.sin(30) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_options_validate() {
        assert!(HoughOptions::default().validate().is_ok());
        assert!(HoughOptions::near_horizontal().validate().is_ok());
        assert!(HoughOptions::new().with_angle_range(50, 50).validate().is_err());
        assert!(HoughOptions::new().with_angle_range(0, 181).validate().is_err());
    }

    #[test]
    fn test_accumulator_size() {
        let acc = HoughAccumulator::new(3, 4);
        assert_eq!(acc.max_distance(), 5);
        let acc = HoughAccumulator::new(10, 10);
        assert_eq!(acc.max_distance(), 15);
    }

    #[test]
    fn test_empty_image_gives_zero() {
        let pix = Pix::new_filled(100, 100, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!(est, SkewEstimate { angle: 0, distance: 0, votes: 0, negative_distance: false });
        assert!(!est.has_ink());
        assert_eq!(est.correction_degrees(), 90.0);
    }

    #[test]
    fn test_single_pixel_ties_resolve_to_first_angle() {
        let mut pix = blank_gray(10, 10);
        pix.view_mut().set_gray(3, 4, 0).unwrap();
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!(est, SkewEstimate { angle: 0, distance: 3, votes: 1, negative_distance: false });

        let est = estimate_skew(&pix.view(), &HoughOptions::near_horizontal()).unwrap();
        assert_eq!(est.angle, 60);
    }

    #[test]
    fn test_horizontal_line() {
        let mut pix = blank_gray(100, 60);
        for x in 0..100 {
            pix.view_mut().set_gray(x, 20, 0).unwrap();
        }
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!(est, SkewEstimate {
            angle: 90,
            distance: 20,
            votes: 100,
            negative_distance: false,
        });
        assert_eq!(est.correction_degrees(), 0.0);
    }

    #[test]
    fn test_vertical_line() {
        let mut pix = blank_gray(50, 80);
        for y in 0..80 {
            pix.view_mut().set_gray(30, y, 0).unwrap();
        }
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!(est, SkewEstimate {
            angle: 0,
            distance: 30,
            votes: 80,
            negative_distance: false,
        });
    }

    #[test]
    fn test_bgr_uses_blue_channel() {
        let mut pix = Pix::new_filled(40, 30, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        for x in 0..40 {
            // Blue channel 0, others not: still ink
            pix.set(x, 7, Bgr::rgb(255, 255, 0)).unwrap();
        }
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!((est.angle, est.distance, est.votes), (90, 7, 40));
    }

    #[test]
    fn test_custom_ink_value() {
        let mut pix = Pix::new_filled(20, 20, PixelFormat::Gray8, Bgr::BLACK).unwrap();
        for x in 0..20 {
            pix.view_mut().set_gray(x, 5, 255).unwrap();
        }
        let opts = HoughOptions::new().with_ink_value(255);
        let est = estimate_skew(&pix.view(), &opts).unwrap();
        assert_eq!((est.angle, est.distance), (90, 5));
    }

    #[test]
    fn test_accumulator_votes_lookup() {
        let mut acc = HoughAccumulator::new(10, 10);
        acc.accumulate(2, 0, 0..180);
        assert_eq!(acc.votes(0, 2), 1);
        assert_eq!(acc.votes(90, 0), 1);
        assert_eq!(acc.votes(180, 0), 0);
        assert_eq!(acc.votes(0, 99), 0);
    }

    /// Ink on `y = x - 20`, whose normal at 135 degrees projects to -14.1.
    fn descending_diagonal() -> Pix {
        let mut pix = blank_gray(60, 40);
        for x in 20..60 {
            pix.set(x, x - 20, Bgr::BLACK).unwrap();
        }
        pix
    }

    #[test]
    fn test_peak_records_negative_side() {
        let pix = descending_diagonal();
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert_eq!(
            est,
            SkewEstimate {
                angle: 135,
                distance: 14,
                votes: 40,
                negative_distance: true,
            }
        );
        // The accumulator alone cannot tell the sides apart
        let mut acc = HoughAccumulator::new(60, 40);
        for x in 20..60 {
            acc.accumulate(x, x - 20, 0..ANGLE_BUCKETS);
        }
        assert!(!acc.peak().negative_distance);
    }
}
