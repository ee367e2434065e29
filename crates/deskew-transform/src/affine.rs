//! Affine transformations for images
//!
//! An affine transformation is represented as:
//! ```text
//! | a  b  tx |
//! | c  d  ty |
//! | 0  0  1  |
//! ```
//!
//! with the equations:
//! ```text
//! x' = a*x + b*y + tx
//! y' = c*x + d*y + ty
//! ```
//!
//! Coordinates are continuous: pixel `(i, j)` covers the unit square
//! `[i, i + 1) x [j, j + 1)` and its centre is `(i + 0.5, j + 0.5)`.
//! Rendering walks the destination, maps each pixel centre back through
//! the inverse matrix and copies the source pixel it lands in.

use crate::{TransformError, TransformResult};
use deskew_core::{Bgr, Pix, PixView};
use tracing::trace;

/// Points closer to collinear than this are rejected.
const MIN_DETERMINANT: f64 = 1e-12;

/// A 2D point with floating-point coordinates
///
/// Used as control points for three-point affine transformations.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Affine transformation matrix
#[derive(Debug, Clone, PartialEq)]
pub struct AffineMatrix {
    /// Coefficients [a, b, tx, c, d, ty]
    coeffs: [f64; 6],
}

impl Default for AffineMatrix {
    fn default() -> Self {
        Self::identity()
    }
}

impl AffineMatrix {
    /// Create the identity transformation
    pub fn identity() -> Self {
        Self {
            coeffs: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0],
        }
    }

    /// Create from raw coefficients
    pub fn from_coeffs(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// Get the raw coefficients
    pub fn coeffs(&self) -> &[f64; 6] {
        &self.coeffs
    }

    /// Determinant of the linear part.
    #[inline]
    pub fn determinant(&self) -> f64 {
        let [a, b, _, c, d, _] = self.coeffs;
        a * d - b * c
    }

    /// Find the transformation that maps each `src_pts[i]` onto `dst_pts[i]`.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SingularMatrix`] if the source points are
    /// collinear.
    pub fn from_three_points(src_pts: [Point; 3], dst_pts: [Point; 3]) -> TransformResult<Self> {
        let [p0, p1, p2] = src_pts;
        let [q0, q1, q2] = dst_pts;

        // Edge vectors from the first point; the linear part maps u->uu, v->vv
        let (ux, uy) = (p1.x - p0.x, p1.y - p0.y);
        let (vx, vy) = (p2.x - p0.x, p2.y - p0.y);
        let (uux, uuy) = (q1.x - q0.x, q1.y - q0.y);
        let (vvx, vvy) = (q2.x - q0.x, q2.y - q0.y);

        let det = ux * vy - vx * uy;
        if det.abs() < MIN_DETERMINANT {
            return Err(TransformError::SingularMatrix);
        }

        let a = (uux * vy - vvx * uy) / det;
        let b = (vvx * ux - uux * vx) / det;
        let c = (uuy * vy - vvy * uy) / det;
        let d = (vvy * ux - uuy * vx) / det;
        let tx = q0.x - a * p0.x - b * p0.y;
        let ty = q0.y - c * p0.x - d * p0.y;

        Ok(Self {
            coeffs: [a, b, tx, c, d, ty],
        })
    }

    /// Compute the inverse transformation.
    ///
    /// # Errors
    ///
    /// Returns [`TransformError::SingularMatrix`] if the determinant is zero.
    pub fn inverse(&self) -> TransformResult<Self> {
        let det = self.determinant();
        if det.abs() < MIN_DETERMINANT {
            return Err(TransformError::SingularMatrix);
        }
        let [a, b, tx, c, d, ty] = self.coeffs;
        let ia = d / det;
        let ib = -b / det;
        let ic = -c / det;
        let id = a / det;
        Ok(Self {
            coeffs: [ia, ib, -(ia * tx + ib * ty), ic, id, -(ic * tx + id * ty)],
        })
    }

    /// Transform a point.
    #[inline]
    pub fn transform_point(&self, pt: Point) -> Point {
        let [a, b, tx, c, d, ty] = self.coeffs;
        Point::new(a * pt.x + b * pt.y + tx, c * pt.x + d * pt.y + ty)
    }
}

/// Render an image through a forward transformation onto a new canvas.
///
/// `matrix` maps source coordinates to destination coordinates. Destination
/// pixels whose centre maps outside the source are set to `fill`; for a
/// 1-channel image the blue component of `fill` is used.
///
/// # Arguments
/// * `view` - Input image
/// * `matrix` - Forward (source to destination) transformation
/// * `width`, `height` - Output canvas size
/// * `fill` - Background colour
pub fn affine_sampled(
    view: &PixView<'_>,
    matrix: &AffineMatrix,
    width: u32,
    height: u32,
    fill: Bgr,
) -> TransformResult<Pix> {
    let inv = matrix.inverse()?;
    let sw = view.width() as f64;
    let sh = view.height() as f64;
    let mut out = Pix::new_filled(width, height, view.format(), fill)?;
    let mut dst = out.view_mut();
    let mut copied = 0usize;

    for dy in 0..height {
        for dx in 0..width {
            let src = inv.transform_point(Point::new(dx as f64 + 0.5, dy as f64 + 0.5));
            let sx = src.x.floor();
            let sy = src.y.floor();
            if sx < 0.0 || sy < 0.0 || sx >= sw || sy >= sh {
                continue;
            }
            dst.set(dx, dy, view.get(sx as u32, sy as u32)?)?;
            copied += 1;
        }
    }

    trace!(width, height, copied, "affine sampled");
    Ok(out)
}

/// Render an image through the transformation defined by three point pairs.
///
/// See [`AffineMatrix::from_three_points`] and [`affine_sampled`].
pub fn affine_sampled_pta(
    view: &PixView<'_>,
    src_pts: [Point; 3],
    dst_pts: [Point; 3],
    width: u32,
    height: u32,
    fill: Bgr,
) -> TransformResult<Pix> {
    let matrix = AffineMatrix::from_three_points(src_pts, dst_pts)?;
    affine_sampled(view, &matrix, width, height, fill)
}
