//! Arbitrary-angle rotation onto an exactly fitting canvas
//!
//! The output canvas is the axis-aligned bounding box of the rotated image,
//! rounded up to whole pixels. Nothing of the source is clipped and the
//! uncovered corners are painted with [`RotateFill`].
//!
//! # Direction
//!
//! Image coordinates have y pointing down, so a positive angle turns the
//! picture clockwise as it is displayed.
//!
//! # Bounds
//!
//! For a `w x h` image rotated by `theta` the four triangle legs are:
//!
//! ```text
//! theta in [0, 90) or [180, 270):        otherwise:
//!   adj_top    = |cos| * w                 adj_top    = |sin| * h
//!   opp_top    = |sin| * w                 opp_top    = |cos| * h
//!   adj_bottom = |cos| * h                 adj_bottom = |sin| * w
//!   opp_bottom = |sin| * h                 opp_bottom = |cos| * w
//!
//! width  = adj_top + opp_bottom
//! height = adj_bottom + opp_top
//! ```

use crate::affine::{Point, affine_sampled_pta};
use crate::{TransformError, TransformResult};
use deskew_core::{Bgr, Pix, PixView};
use tracing::debug;

/// Floating noise tolerated before rounding a canvas side up.
const CEIL_TOLERANCE: f64 = 1e-9;

/// Background fill color for rotation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RotateFill {
    /// Fill with white pixels
    #[default]
    White,
    /// Fill with black pixels
    Black,
    /// Fill with a specific color
    Color(Bgr),
}

impl RotateFill {
    /// The pixel value painted into uncovered areas.
    pub fn to_color(self) -> Bgr {
        match self {
            RotateFill::White => Bgr::WHITE,
            RotateFill::Black => Bgr::BLACK,
            RotateFill::Color(c) => c,
        }
    }
}

/// Options for rotation
#[derive(Debug, Clone, Default)]
pub struct RotateOptions {
    /// Colour of the canvas areas the rotated image does not cover
    pub fill: RotateFill,
}

impl RotateOptions {
    /// Create options with default values (white fill).
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the fill colour.
    pub fn with_fill(mut self, fill: RotateFill) -> Self {
        self.fill = fill;
        self
    }
}

/// Quarter of the circle a normalized angle falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quadrant {
    /// `[0, 90)`
    First,
    /// `[90, 180)`
    Second,
    /// `[180, 270)`
    Third,
    /// `[270, 360)`
    Fourth,
}

impl Quadrant {
    fn of(degrees: f64) -> Self {
        if degrees < 90.0 {
            Quadrant::First
        } else if degrees < 180.0 {
            Quadrant::Second
        } else if degrees < 270.0 {
            Quadrant::Third
        } else {
            Quadrant::Fourth
        }
    }
}

/// Geometry of a rotated rectangle
#[derive(Debug, Clone, PartialEq)]
pub struct RotatedBounds {
    /// Source width
    pub src_width: u32,
    /// Source height
    pub src_height: u32,
    /// Rotation angle normalized to `[0, 360)` degrees
    pub degrees: f64,
    pub quadrant: Quadrant,
    pub adj_top: f64,
    pub opp_top: f64,
    pub adj_bottom: f64,
    pub opp_bottom: f64,
    /// Exact bounding box width, `adj_top + opp_bottom`
    pub exact_width: f64,
    /// Exact bounding box height, `adj_bottom + opp_top`
    pub exact_height: f64,
    /// Canvas width in pixels
    pub width: u32,
    /// Canvas height in pixels
    pub height: u32,
}

impl RotatedBounds {
    /// Compute the bounding box of a `width x height` image rotated by
    /// `degrees`.
    ///
    /// Any finite angle is accepted; it is reduced to `[0, 360)` first.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::InvalidParameters`] for a NaN or infinite
    /// angle and [`TransformError::DegenerateGeometry`] if the box has no
    /// area.
    pub fn compute(width: u32, height: u32, degrees: f64) -> TransformResult<Self> {
        if !degrees.is_finite() {
            return Err(TransformError::InvalidParameters(format!(
                "rotation angle must be finite, got {degrees}"
            )));
        }
        let mut normalized = degrees.rem_euclid(360.0);
        if normalized >= 360.0 {
            normalized = 0.0;
        }

        let quadrant = Quadrant::of(normalized);
        let radians = normalized.to_radians();
        let sin = radians.sin().abs();
        let cos = radians.cos().abs();
        let w = width as f64;
        let h = height as f64;

        let (adj_top, opp_top, adj_bottom, opp_bottom) = match quadrant {
            Quadrant::First | Quadrant::Third => (cos * w, sin * w, cos * h, sin * h),
            Quadrant::Second | Quadrant::Fourth => (sin * h, cos * h, sin * w, cos * w),
        };
        let exact_width = adj_top + opp_bottom;
        let exact_height = adj_bottom + opp_top;
        let canvas_w = ceil_side(exact_width);
        let canvas_h = ceil_side(exact_height);
        if canvas_w == 0 || canvas_h == 0 {
            return Err(TransformError::DegenerateGeometry {
                width: exact_width,
                height: exact_height,
            });
        }

        Ok(Self {
            src_width: width,
            src_height: height,
            degrees: normalized,
            quadrant,
            adj_top,
            opp_top,
            adj_bottom,
            opp_bottom,
            exact_width,
            exact_height,
            width: canvas_w,
            height: canvas_h,
        })
    }

    /// Source corner points: top-left, top-right and bottom-left.
    pub fn source_corners(&self) -> [Point; 3] {
        let w = self.src_width as f64;
        let h = self.src_height as f64;
        [Point::new(0.0, 0.0), Point::new(w, 0.0), Point::new(0.0, h)]
    }

    /// Where the top-left, top-right and bottom-left source corners land on
    /// the canvas.
    pub fn anchors(&self) -> [Point; 3] {
        let (w, h) = (self.exact_width, self.exact_height);
        let (at, ot) = (self.adj_top, self.opp_top);
        let (ab, ob) = (self.adj_bottom, self.opp_bottom);
        match self.quadrant {
            Quadrant::First => [Point::new(ob, 0.0), Point::new(w, ot), Point::new(0.0, ab)],
            Quadrant::Second => [Point::new(w, ot), Point::new(at, h), Point::new(ob, 0.0)],
            Quadrant::Third => [Point::new(at, h), Point::new(0.0, ab), Point::new(w, ot)],
            Quadrant::Fourth => [Point::new(0.0, ab), Point::new(ob, 0.0), Point::new(at, h)],
        }
    }
}

fn ceil_side(v: f64) -> u32 {
    (v - CEIL_TOLERANCE).ceil().max(0.0) as u32
}

/// Rotate an image by an arbitrary angle onto a canvas that contains it.
///
/// # Arguments
/// * `view` - Input image (either pixel format)
/// * `degrees` - Clockwise rotation as displayed
/// * `options` - Fill colour for the uncovered corners
///
/// # Returns
/// A new image of size [`RotatedBounds::compute`] with the same pixel
/// format as the input. The input is not modified.
pub fn rotate(view: &PixView<'_>, degrees: f64, options: &RotateOptions) -> TransformResult<Pix> {
    let bounds = RotatedBounds::compute(view.width(), view.height(), degrees)?;
    debug!(
        degrees = bounds.degrees,
        src_width = bounds.src_width,
        src_height = bounds.src_height,
        width = bounds.width,
        height = bounds.height,
        "rotated bounds computed"
    );
    affine_sampled_pta(
        view,
        bounds.source_corners(),
        bounds.anchors(),
        bounds.width,
        bounds.height,
        options.fill.to_color(),
    )
}

/// Rotate an owned image. See [`rotate`].
pub fn rotate_pix(pix: &Pix, degrees: f64, options: &RotateOptions) -> TransformResult<Pix> {
    rotate(&pix.view(), degrees, options)
}
