//! Binarize, estimate, rotate
//!
//! The binarizer and estimator work on a private copy; the rotation is
//! applied to the untouched input so the corrected page keeps its colours.

use deskew_color::{AdaptiveThresholdOptions, ColorError, binarize};
use deskew_core::{ImageFormat, Pix, PixView};
use deskew_io::{IoError, format_from_extension, read_image, write_image};
use deskew_recog::{HoughOptions, RecogError, SkewEstimate, estimate_skew};
use deskew_transform::{RotateOptions, TransformError, rotate};
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from any pipeline stage
#[derive(Debug, Error)]
pub enum DeskewError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] deskew_core::Error),

    /// Binarization failed
    #[error("binarize: {0}")]
    Color(#[from] ColorError),

    /// Skew estimation failed
    #[error("estimate: {0}")]
    Recog(#[from] RecogError),

    /// Rotation failed
    #[error("rotate: {0}")]
    Transform(#[from] TransformError),

    /// Reading or writing an image failed
    #[error("io: {0}")]
    Io(#[from] IoError),

    /// Invalid pipeline options
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for the pipeline
pub type DeskewResult<T> = Result<T, DeskewError>;

/// Options for the whole pipeline
#[derive(Debug, Clone)]
pub struct DeskewOptions {
    /// Binarizer window and luma weighting
    pub threshold: AdaptiveThresholdOptions,
    /// Estimator angle range and ink value (default: normals within 30
    /// degrees of vertical)
    pub hough: HoughOptions,
    /// Background of the rotated canvas (default: white)
    pub rotate: RotateOptions,
    /// Corrections smaller than this many degrees are skipped (default: 0)
    pub min_correction: f64,
    /// Estimates with fewer votes are skipped (default: 1, so a page
    /// without ink is never rotated)
    pub min_votes: u32,
}

impl Default for DeskewOptions {
    fn default() -> Self {
        Self {
            threshold: AdaptiveThresholdOptions::default(),
            hough: HoughOptions::near_horizontal(),
            rotate: RotateOptions::default(),
            min_correction: 0.0,
            min_votes: 1,
        }
    }
}

impl DeskewOptions {
    /// Create new options with default values
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_threshold(mut self, threshold: AdaptiveThresholdOptions) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_hough(mut self, hough: HoughOptions) -> Self {
        self.hough = hough;
        self
    }

    pub fn with_rotate(mut self, rotate: RotateOptions) -> Self {
        self.rotate = rotate;
        self
    }

    pub fn with_min_correction(mut self, degrees: f64) -> Self {
        self.min_correction = degrees;
        self
    }

    pub fn with_min_votes(mut self, votes: u32) -> Self {
        self.min_votes = votes;
        self
    }

    /// Validate options, including every stage's options
    pub fn validate(&self) -> DeskewResult<()> {
        self.threshold.validate()?;
        self.hough.validate()?;
        if !self.min_correction.is_finite() || self.min_correction < 0.0 {
            return Err(DeskewError::InvalidParameters(format!(
                "min_correction must be a non-negative number, got {}",
                self.min_correction
            )));
        }
        Ok(())
    }
}

/// Everything the pipeline produced
#[derive(Debug, Clone)]
pub struct DeskewOutput {
    /// Corrected image, or a copy of the input if no rotation was applied
    pub image: Pix,
    /// Raw estimator result
    pub estimate: SkewEstimate,
    /// Rotation that levels the detected line, `90 - estimate.angle`
    pub correction_degrees: f64,
    /// Whether `image` was rotated
    pub rotated: bool,
    /// The two-level image the estimate was computed from
    pub binarized: Pix,
}

/// Deskew a borrowed 3-channel buffer.
///
/// # Errors
///
/// Fails with [`DeskewError::Color`] if the buffer is not
/// [`PixelFormat::Bgr24`](deskew_core::PixelFormat::Bgr24), and with the
/// corresponding stage error if any stage rejects its input.
#[instrument(skip_all, fields(width = view.width(), height = view.height()))]
pub fn deskew_view(view: &PixView<'_>, options: &DeskewOptions) -> DeskewResult<DeskewOutput> {
    options.validate()?;

    let binarized = binarize(view, &options.threshold)?;
    let estimate = estimate_skew(&binarized.view(), &options.hough)?;
    let correction = estimate.correction_degrees();

    let rotated = estimate.votes >= options.min_votes && correction.abs() >= options.min_correction;
    let image = if rotated {
        rotate(view, correction, &options.rotate)?
    } else {
        debug!(votes = estimate.votes, correction, "correction skipped");
        view.to_pix()?
    };

    info!(
        angle = estimate.angle,
        votes = estimate.votes,
        correction,
        rotated,
        out_width = image.width(),
        out_height = image.height(),
        "deskew finished"
    );
    Ok(DeskewOutput {
        image,
        estimate,
        correction_degrees: correction,
        rotated,
        binarized,
    })
}

/// Deskew an owned image. See [`deskew_view`].
pub fn deskew(pix: &Pix, options: &DeskewOptions) -> DeskewResult<DeskewOutput> {
    deskew_view(&pix.view(), options)
}

/// Read an image file, deskew it and write the result.
///
/// The output format follows the output file's extension; an unknown
/// extension falls back to the input's format.
pub fn deskew_file<P: AsRef<Path>, Q: AsRef<Path>>(
    input: P,
    output: Q,
    options: &DeskewOptions,
) -> DeskewResult<DeskewOutput> {
    let pix = read_image(input)?;
    let result = deskew(&pix, options)?;
    let format = match format_from_extension(&output) {
        ImageFormat::Unknown => pix.informat(),
        known => known,
    };
    write_image(&result.image, output, format)?;
    Ok(result)
}
