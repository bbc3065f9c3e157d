//! sprout-test - Regression test support for SPROUT
//!
//! [`RegParams`] records named checks without panicking, so a regression
//! test reports every failure at once. [`builders`] makes the deterministic
//! synthetic volumes the tests run on.
//!
//! # Usage
//!
//! ```ignore
//! use sprout_test::{RegParams, builders};
//!
//! let mut rp = RegParams::new("erode");
//! let blobs = builders::bridged_blobs()?;
//! rp.compare_values(253.0, blobs.count_nonzero() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```
//!
//! Files written by tests go under `tests/regout/` at the workspace root.

pub mod builders;
mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::RegParams;

use std::path::PathBuf;

/// Regression output directory at the workspace root
pub fn regout_dir() -> PathBuf {
    // crates/sprout-test -> workspace root
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../tests/regout")
}

/// Empty scratch directory for one test under [`regout_dir`].
pub fn scratch_dir(test_name: &str) -> TestResult<PathBuf> {
    let dir = regout_dir().join(format!("{test_name}_out"));
    if dir.exists() {
        std::fs::remove_dir_all(&dir)?;
    }
    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
