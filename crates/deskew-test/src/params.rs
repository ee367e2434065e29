//! Regression test parameters and checks

use crate::error::{TestError, TestResult};
use crate::{golden_dir, init_tracing, load_image, regout_dir};
use deskew_core::{ImageFormat, Pix};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Regression test mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RegTestMode {
    /// Generate golden files
    Generate,
    /// Compare with golden files (default)
    #[default]
    Compare,
    /// Display mode - run without comparison
    Display,
}

impl RegTestMode {
    /// Read the mode from `REGTEST_MODE`.
    pub fn from_env() -> Self {
        Self::parse(&std::env::var("REGTEST_MODE").unwrap_or_default())
    }

    /// Parse a mode name; anything unrecognised means compare.
    pub fn parse(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "generate" => Self::Generate,
            "display" => Self::Display,
            _ => Self::Compare,
        }
    }
}

/// Regression test state
///
/// Every check advances `index`, so output and golden files are numbered
/// in the order the checks run.
#[derive(Debug)]
pub struct RegParams {
    /// Name of the test (e.g., "skew")
    pub test_name: String,
    index: usize,
    /// Test mode (generate, compare, or display)
    pub mode: RegTestMode,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a regression test, taking the mode from `REGTEST_MODE`.
    pub fn new(test_name: &str) -> Self {
        Self::with_mode(test_name, RegTestMode::from_env())
    }

    /// Start a regression test in an explicit mode.
    pub fn with_mode(test_name: &str, mode: RegTestMode) -> Self {
        init_tracing();
        let _ = fs::create_dir_all(golden_dir());
        let _ = fs::create_dir_all(regout_dir());
        info!(test = test_name, ?mode, "regression test started");

        Self {
            test_name: test_name.to_string(),
            index: 0,
            mode,
            failures: Vec::new(),
        }
    }

    /// Get the current test index
    pub fn index(&self) -> usize {
        self.index
    }

    /// Check if in display mode
    pub fn display(&self) -> bool {
        self.mode == RegTestMode::Display
    }

    fn fail(&mut self, what: String) {
        let msg = format!("Failure in {}_reg, index {}: {}", self.test_name, self.index, what);
        eprintln!("{msg}");
        self.failures.push(msg);
    }

    /// Compare two floating-point values.
    ///
    /// Returns `true` if `|expected - actual| <= delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        self.index += 1;
        let diff = (expected - actual).abs();
        // NaN never compares within delta
        if diff <= delta {
            return true;
        }
        self.fail(format!(
            "value comparison: expected = {expected}, actual = {actual}, \
             difference = {diff} but allowed delta = {delta}"
        ));
        false
    }

    /// Compare two images for exact pixel equality.
    ///
    /// Stride and padding bytes are ignored.
    pub fn compare_pix(&mut self, pix1: &Pix, pix2: &Pix) -> bool {
        self.index += 1;
        match first_difference(pix1, pix2) {
            None => true,
            Some(what) => {
                self.fail(format!("pix comparison: {what}"));
                false
            }
        }
    }

    /// Write an image to the regout directory and check it against its
    /// golden file.
    ///
    /// In compare mode a missing golden file is a failure; golden files are
    /// only created with `REGTEST_MODE=generate`.
    pub fn write_pix_and_check(&mut self, pix: &Pix, format: ImageFormat) -> TestResult<()> {
        self.index += 1;
        let local = self.local_path(format.extension());
        deskew_io::write_image(pix, &local, format).map_err(|e| TestError::ImageWrite {
            path: local.display().to_string(),
            message: e.to_string(),
        })?;
        self.check_file(&local)
    }

    fn local_path(&self, ext: &str) -> PathBuf {
        regout_dir().join(format!("{}.{:02}.{}", self.test_name, self.index, ext))
    }

    fn golden_path(&self, ext: &str) -> PathBuf {
        golden_dir().join(format!("{}_golden.{:02}.{}", self.test_name, self.index, ext))
    }

    fn check_file(&mut self, local: &Path) -> TestResult<()> {
        let ext = local.extension().and_then(|e| e.to_str()).unwrap_or("dat");
        let golden = self.golden_path(ext);

        match self.mode {
            RegTestMode::Generate => {
                fs::copy(local, &golden)?;
                info!(path = %golden.display(), "generated golden file");
            }
            RegTestMode::Compare if !golden.exists() => {
                warn!(path = %golden.display(), "golden file missing");
                self.fail(format!("golden file not found: {}", golden.display()));
            }
            RegTestMode::Compare => {
                if fs::read(local)? == fs::read(&golden)? {
                    return Ok(());
                }
                // Encoders may differ in metadata; fall back to pixels
                let same = match (load_image(local), load_image(&golden)) {
                    (Ok(a), Ok(b)) => first_difference(&a, &b).is_none(),
                    _ => false,
                };
                if !same {
                    self.fail(format!(
                        "comparing {} with {}",
                        local.display(),
                        golden.display()
                    ));
                }
            }
            RegTestMode::Display => {}
        }
        Ok(())
    }

    /// Report results and return `true` if every check passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("SUCCESS: {}_reg ({} checks)", self.test_name, self.index);
        } else {
            eprintln!("FAILURE: {}_reg", self.test_name);
            for failure in &self.failures {
                eprintln!("  {failure}");
            }
        }
        self.failures.is_empty()
    }

    /// Check if all tests have passed so far
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Get list of failures
    pub fn failures(&self) -> &[String] {
        &self.failures
    }
}

fn first_difference(pix1: &Pix, pix2: &Pix) -> Option<String> {
    if pix1.width() != pix2.width()
        || pix1.height() != pix2.height()
        || pix1.format() != pix2.format()
    {
        return Some(format!(
            "geometry mismatch: {}x{} {:?} vs {}x{} {:?}",
            pix1.width(),
            pix1.height(),
            pix1.format(),
            pix2.width(),
            pix2.height(),
            pix2.format()
        ));
    }
    if pix1.equals(pix2) {
        return None;
    }
    for y in 0..pix1.height() {
        for x in 0..pix1.width() {
            let (a, b) = (pix1.get(x, y).ok(), pix2.get(x, y).ok());
            if a != b {
                return Some(format!("pixel mismatch at ({x}, {y}): {a:?} vs {b:?}"));
            }
        }
    }
    Some("pixel mismatch".to_string())
}
