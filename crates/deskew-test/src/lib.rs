//! deskew-test - Regression test framework for deskew-rs
//!
//! This crate provides a regression test harness with three modes:
//!
//! - **Generate**: Create golden files for comparison
//! - **Compare**: Compare results with golden files
//! - **Display**: Run tests without comparison (visual inspection)
//!
//! and the synthetic page generators ([`synth`]) the regression tests use
//! as input, so no binary fixtures need to be checked in.
//!
//! # Usage
//!
//! ```ignore
//! use deskew_test::RegParams;
//!
//! let mut rp = RegParams::new("skew");
//! rp.compare_values(105.0, estimate.angle as f64, 1.0);
//! assert!(rp.cleanup());
//! ```
//!
//! # Environment Variables
//!
//! - `REGTEST_MODE`: Set to "generate", "compare", or "display"
//! - `RUST_LOG`: Log filter for the pipeline's `tracing` output

mod error;
mod params;
pub mod synth;

pub use error::{TestError, TestResult};
pub use params::{RegParams, RegTestMode};

use std::path::{Path, PathBuf};
use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a `tracing` subscriber that prints through the test harness.
///
/// Safe to call from every test; only the first call has an effect.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Get the path to the workspace root
fn workspace_root() -> PathBuf {
    // deskew-test is at crates/deskew-test, so go up two directories
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../..")
}

/// Get the path to the golden files directory
pub fn golden_dir() -> PathBuf {
    workspace_root().join("tests/golden")
}

/// Get the path to the regout (regression output) directory
pub fn regout_dir() -> PathBuf {
    workspace_root().join("tests/regout")
}

/// Read an image written by an earlier test step.
pub fn load_image(path: &Path) -> TestResult<deskew_core::Pix> {
    deskew_io::read_image(path).map_err(|e| TestError::ImageLoad {
        path: path.display().to_string(),
        message: e.to_string(),
    })
}
