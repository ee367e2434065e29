//! Diagnostic overlay of a detected line

use crate::hough::{ANGLE_BUCKETS, SkewEstimate, trig_table};
use crate::{RecogError, RecogResult};
use deskew_core::{Bgr, PixViewMut};

/// Paint the line described by `estimate` onto an image.
///
/// For every column `x` the pixel at `y = (d - x cos(theta)) / sin(theta)`
/// is painted if it falls inside the image, where `d` is the estimate's
/// distance, negated when [`SkewEstimate::negative_distance`] is set. A
/// line with a horizontal normal (`theta == 0`) is painted as the column
/// `x = d`. Nothing is painted for an estimate without votes.
///
/// Returns the number of pixels painted.
///
/// # Errors
///
/// Returns [`RecogError::InvalidParameter`] for an angle of 180 or more.
pub fn draw_detected_line(
    view: &mut PixViewMut<'_>,
    estimate: &SkewEstimate,
    color: Bgr,
) -> RecogResult<usize> {
    if !estimate.has_ink() {
        return Ok(0);
    }
    let angle = estimate.angle as usize;
    if angle >= ANGLE_BUCKETS {
        return Err(RecogError::InvalidParameter(format!(
            "line angle must be below {ANGLE_BUCKETS}, got {angle}"
        )));
    }
    let trig = trig_table();
    let (sin, cos) = (trig.sin(angle), trig.cos(angle));
    let d = if estimate.negative_distance {
        -(estimate.distance as f64)
    } else {
        estimate.distance as f64
    };
    let (w, h) = (view.width(), view.height());
    let mut painted = 0;

    if angle == 0 {
        if estimate.distance < w {
            for y in 0..h {
                view.set(estimate.distance, y, color)?;
            }
            painted = h as usize;
        }
        return Ok(painted);
    }

    for x in 0..w {
        let y = ((d - x as f64 * cos) / sin).round();
        if y >= 0.0 && y < h as f64 {
            view.set(x, y as u32, color)?;
            painted += 1;
        }
    }
    Ok(painted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hough::{HoughOptions, estimate_skew};
    use deskew_core::{Pix, PixelFormat};

    #[test]
    fn test_horizontal_overlay() {
        let mut pix = Pix::new_filled(30, 20, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        let est = SkewEstimate { angle: 90, distance: 12, votes: 5, ..Default::default() };
        let n = draw_detected_line(&mut pix.view_mut(), &est, Bgr::RED).unwrap();
        assert_eq!(n, 30);
        assert_eq!(pix.get(17, 12).unwrap(), Bgr::RED);
        assert_eq!(pix.get(17, 11).unwrap(), Bgr::WHITE);
    }

    #[test]
    fn test_vertical_overlay() {
        let mut pix = Pix::new_filled(30, 20, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        let est = SkewEstimate { angle: 0, distance: 4, votes: 5, ..Default::default() };
        assert_eq!(draw_detected_line(&mut pix.view_mut(), &est, Bgr::RED).unwrap(), 20);
        assert_eq!(pix.get(4, 19).unwrap(), Bgr::RED);
        let far = SkewEstimate { angle: 0, distance: 40, votes: 5, ..Default::default() };
        assert_eq!(draw_detected_line(&mut pix.view_mut(), &far, Bgr::RED).unwrap(), 0);
    }

    #[test]
    fn test_steep_line_is_clipped() {
        let mut pix = Pix::new_filled(50, 10, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        let est = SkewEstimate { angle: 45, distance: 10, votes: 1, ..Default::default() };
        let n = draw_detected_line(&mut pix.view_mut(), &est, Bgr::RED).unwrap();
        assert!(n > 0 && n < 50);
    }

    #[test]
    fn test_no_votes_paints_nothing() {
        let mut pix = Pix::new_filled(5, 5, PixelFormat::Gray8, Bgr::WHITE).unwrap();
        let n = draw_detected_line(&mut pix.view_mut(), &SkewEstimate::default(), Bgr::BLACK)
            .unwrap();
        assert_eq!(n, 0);
        assert_eq!(pix.view().count_value(255), 25);
    }

    #[test]
    fn test_negative_distance_line_lands_on_ink() {
        let mut pix = Pix::new_filled(60, 40, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        for x in 20..60 {
            pix.set(x, x - 20, Bgr::BLACK).unwrap();
        }
        let est = estimate_skew(&pix.view(), &HoughOptions::default()).unwrap();
        assert!(est.negative_distance);

        let n = draw_detected_line(&mut pix.view_mut(), &est, Bgr::RED).unwrap();
        assert_eq!(n, 40);
        for x in 20..60 {
            assert_eq!(pix.get(x, x - 20).unwrap(), Bgr::RED);
        }
        // The mirrored line y = x + 20 stays untouched
        assert_eq!(pix.get(5, 25).unwrap(), Bgr::WHITE);
    }

    #[test]
    fn test_angle_out_of_range_is_rejected() {
        let mut pix = Pix::new_filled(8, 8, PixelFormat::Bgr24, Bgr::WHITE).unwrap();
        let est = SkewEstimate { angle: 180, distance: 1, votes: 3, ..Default::default() };
        assert!(matches!(
            draw_detected_line(&mut pix.view_mut(), &est, Bgr::RED),
            Err(RecogError::InvalidParameter(_))
        ));
    }
}
