//! Synthetic test images
//!
//! Generated inputs keep the regression tests independent of checked-in
//! scans and make the expected skew known exactly.

use deskew_core::{Bgr, Pix, PixelFormat, Result};

/// Parameters for a page ruled with parallel dark lines
#[derive(Debug, Clone)]
pub struct RuledPage {
    pub width: u32,
    pub height: u32,
    /// Slope of the lines in degrees; positive slopes descend to the right
    pub angle_degrees: f64,
    /// Vertical distance between successive lines, in pixels
    pub spacing: f64,
    /// Vertical thickness of each line, in pixels
    pub thickness: f64,
    pub ink: Bgr,
    pub paper: Bgr,
    /// Brightness lost towards the right edge, simulating uneven lighting
    pub shading: u8,
}

impl Default for RuledPage {
    fn default() -> Self {
        Self {
            width: 200,
            height: 150,
            angle_degrees: 0.0,
            spacing: 12.0,
            thickness: 2.0,
            ink: Bgr::gray(30),
            paper: Bgr::gray(230),
            shading: 0,
        }
    }
}

impl RuledPage {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    pub fn with_angle(mut self, degrees: f64) -> Self {
        self.angle_degrees = degrees;
        self
    }

    pub fn with_spacing(mut self, spacing: f64) -> Self {
        self.spacing = spacing;
        self
    }

    pub fn with_shading(mut self, shading: u8) -> Self {
        self.shading = shading;
        self
    }

    /// Render the page as a 3-channel image.
    pub fn render(&self) -> Result<Pix> {
        let mut pix = Pix::new(self.width, self.height, PixelFormat::Bgr24)?;
        let slope = self.angle_degrees.to_radians().tan();
        let mut view = pix.view_mut();
        for y in 0..self.height {
            for x in 0..self.width {
                // Offset of this pixel above the line through the origin
                let offset = (y as f64 - x as f64 * slope).rem_euclid(self.spacing);
                let base = if offset < self.thickness {
                    self.ink
                } else {
                    self.paper
                };
                let dim = (self.shading as u32 * x / self.width.max(1)) as u8;
                view.set(x, y, darken(base, dim))?;
            }
        }
        Ok(pix)
    }
}

fn darken(px: Bgr, by: u8) -> Bgr {
    Bgr {
        b: px.b.saturating_sub(by),
        g: px.g.saturating_sub(by),
        r: px.r.saturating_sub(by),
    }
}

/// Render a page ruled at `angle_degrees` with default spacing.
pub fn ruled_page(width: u32, height: u32, angle_degrees: f64) -> Result<Pix> {
    RuledPage::new(width, height).with_angle(angle_degrees).render()
}

/// Gray checkerboard of `cell`-pixel squares; the top-left square is light.
pub fn checkerboard(width: u32, height: u32, cell: u32, light: u8, dark: u8) -> Result<Pix> {
    let cell = cell.max(1);
    let mut pix = Pix::new(width, height, PixelFormat::Bgr24)?;
    let mut view = pix.view_mut();
    for y in 0..height {
        for x in 0..width {
            let v = if (x / cell + y / cell) % 2 == 0 { light } else { dark };
            view.set(x, y, Bgr::gray(v))?;
        }
    }
    Ok(pix)
}

/// Horizontal ramp from black at the left edge to white at the right.
pub fn gradient(width: u32, height: u32) -> Result<Pix> {
    let mut pix = Pix::new(width, height, PixelFormat::Bgr24)?;
    let span = width.saturating_sub(1).max(1);
    let mut view = pix.view_mut();
    for y in 0..height {
        for x in 0..width {
            view.set(x, y, Bgr::gray((x * 255 / span) as u8))?;
        }
    }
    Ok(pix)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ruled_page_level_lines() {
        let pix = ruled_page(40, 30, 0.0).unwrap();
        // Rows 0, 1, 12, 13, 24, 25 are ink
        for y in 0..30 {
            let want = if y % 12 < 2 { Bgr::gray(30) } else { Bgr::gray(230) };
            assert_eq!(pix.get(17, y).unwrap(), want, "row {y}");
        }
    }

    #[test]
    fn test_ruled_page_shading() {
        let pix = RuledPage::new(100, 10).with_shading(100).render().unwrap();
        assert_eq!(pix.get(0, 5).unwrap(), Bgr::gray(230));
        assert_eq!(pix.get(99, 5).unwrap(), Bgr::gray(131));
    }

    #[test]
    fn test_checkerboard_cells() {
        let pix = checkerboard(8, 8, 2, 200, 10).unwrap();
        assert_eq!(pix.get(0, 0).unwrap(), Bgr::gray(200));
        assert_eq!(pix.get(2, 0).unwrap(), Bgr::gray(10));
        assert_eq!(pix.get(3, 3).unwrap(), Bgr::gray(200));
    }

    #[test]
    fn test_gradient_ends() {
        let pix = gradient(16, 2).unwrap();
        assert_eq!(pix.get(0, 1).unwrap(), Bgr::BLACK);
        assert_eq!(pix.get(15, 1).unwrap(), Bgr::WHITE);
    }
}
