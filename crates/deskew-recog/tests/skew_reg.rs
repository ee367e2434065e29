//! Skew estimation regression test
//!
//! Estimates the rule angle of synthetic ruled pages after adaptive
//! binarization, and draws the detected line for inspection.

use deskew_color::{AdaptiveThresholdOptions, binarize};
use deskew_core::{Bgr, ImageFormat, Pix, PixelFormat};
use deskew_io::write_image;
use deskew_recog::{HoughOptions, draw_detected_line, estimate_skew};
use deskew_test::{RegParams, regout_dir};
use deskew_test::synth::RuledPage;

fn binarized_page(angle: f64, shading: u8) -> Pix {
    let page = RuledPage::new(200, 150)
        .with_angle(angle)
        .with_shading(shading)
        .render()
        .expect("render ruled page");
    binarize(&page.view(), &AdaptiveThresholdOptions::default()).expect("binarize")
}

#[test]
fn skew_reg() {
    let mut rp = RegParams::new("skew");
    let options = HoughOptions::near_horizontal();

    // --- Test 1: Rule angle recovered on clean and shaded pages ---
    // A rule drawn at `angle` below horizontal has its normal at 90 + angle.
    eprintln!("=== Ruled pages ===");
    for (angle, shading) in [(15.0, 0u8), (-7.0, 120), (-20.0, 60), (0.0, 0)] {
        let bw = binarized_page(angle, shading);
        let est = estimate_skew(&bw.view(), &options).expect("estimate_skew");
        eprintln!(
            "  angle={angle:>5} shading={shading:>3}: theta={} d={} votes={} correction={:.1}",
            est.angle,
            est.distance,
            est.votes,
            est.correction_degrees()
        );
        rp.compare_values(90.0 + angle, est.angle as f64, 1.0);
        rp.compare_values(-angle, est.correction_degrees(), 1.0);
        // A full-length rule is at least as long as the page is wide
        rp.compare_values(1.0, if est.votes >= 200 { 1.0 } else { 0.0 }, 0.0);
    }

    // --- Test 2: Restricting the range does not move an in-range peak ---
    eprintln!("=== Full range ===");
    let bw = binarized_page(15.0, 0);
    let narrow = estimate_skew(&bw.view(), &options).expect("narrow");
    let full = estimate_skew(&bw.view(), &HoughOptions::default()).expect("full");
    rp.compare_values(narrow.angle as f64, full.angle as f64, 0.0);
    rp.compare_values(narrow.votes as f64, full.votes as f64, 0.0);

    // --- Test 3: Estimation leaves the input untouched ---
    let before = bw.clone();
    let _ = estimate_skew(&bw.view(), &options).expect("estimate_skew");
    rp.compare_pix(&before, &bw);

    // --- Test 4: Blank page has no ink and no skew ---
    eprintln!("=== Blank page ===");
    let blank = Pix::new_filled(120, 80, PixelFormat::Gray8, Bgr::WHITE).unwrap();
    let est = estimate_skew(&blank.view(), &options).expect("blank");
    rp.compare_values(0.0, est.angle as f64, 0.0);
    rp.compare_values(0.0, est.distance as f64, 0.0);
    rp.compare_values(0.0, est.votes as f64, 0.0);
    rp.compare_values(0.0, if est.has_ink() { 1.0 } else { 0.0 }, 0.0);

    // --- Test 5: Overlay of the detected line ---
    eprintln!("=== Overlay ===");
    let mut shown = binarized_page(-7.0, 120);
    let est = estimate_skew(&shown.view(), &options).expect("estimate_skew");
    let painted = draw_detected_line(&mut shown.view_mut(), &est, Bgr::RED).expect("overlay");
    eprintln!("  painted {painted} pixels");
    rp.compare_values(1.0, if painted > 0 { 1.0 } else { 0.0 }, 0.0);
    rp.compare_values(1.0, if painted <= 200 { 1.0 } else { 0.0 }, 0.0);
    // Row rounding makes the painted pixels sensitive to the platform's
    // trig, so the overlay is written for inspection only
    write_image(&shown, regout_dir().join("skew_overlay.png"), ImageFormat::Png)
        .expect("write overlay");

    // --- Test 6: Invalid angle range ---
    let bad = HoughOptions::new().with_angle_range(120, 60);
    rp.compare_values(1.0, if estimate_skew(&bw.view(), &bad).is_err() { 1.0 } else { 0.0 }, 0.0);

    assert!(rp.cleanup(), "skew regression test failed");
}
