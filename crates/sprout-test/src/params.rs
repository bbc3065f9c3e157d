//! Regression check recorder

use sprout_core::{Volume, Voxel};

/// Running record of one regression test
///
/// Every check bumps a counter and, on failure, stores a message naming the
/// check. Checks never panic, so one run reports every broken property.
/// Finish with `assert!(rp.cleanup())`.
#[derive(Debug)]
pub struct RegParams {
    pub test_name: String,
    index: usize,
    failures: Vec<String>,
}

impl RegParams {
    /// Start a test and print its banner to stderr.
    pub fn new(test_name: &str) -> Self {
        eprintln!();
        eprintln!("==== {test_name}_reg ====");
        Self {
            test_name: test_name.to_string(),
            index: 0,
            failures: Vec::new(),
        }
    }

    /// Number of checks run so far
    pub fn index(&self) -> usize {
        self.index
    }

    fn record(&mut self, ok: bool, detail: impl FnOnce() -> String) -> bool {
        self.index += 1;
        if !ok {
            let msg = format!("{}_reg check {}: {}", self.test_name, self.index, detail());
            eprintln!("  FAIL {msg}");
            self.failures.push(msg);
        }
        ok
    }

    /// Compare two numbers within `delta`.
    pub fn compare_values(&mut self, expected: f64, actual: f64, delta: f64) -> bool {
        let diff = (expected - actual).abs();
        self.record(diff <= delta, || {
            format!("expected {expected}, got {actual} (delta {diff} > {delta})")
        })
    }

    /// Record a named condition.
    pub fn check(&mut self, condition: bool, what: &str) -> bool {
        self.record(condition, || what.to_string())
    }

    /// Compare two volumes voxel by voxel.
    ///
    /// The failure message names the first differing `(z, y, x)`.
    pub fn compare_volumes<T: Voxel>(&mut self, a: &Volume<T>, b: &Volume<T>) -> bool {
        if a.shape() != b.shape() {
            let (sa, sb) = (a.shape(), b.shape());
            return self.record(false, || format!("shape {sa} vs {sb}"));
        }
        let first_diff = a.data().iter().zip(b.data()).position(|(p, q)| p != q);
        let shape = a.shape();
        self.record(first_diff.is_none(), || match first_diff {
            Some(pos) => {
                let (z, y, x) = shape.coords(pos);
                format!("voxel ({z}, {y}, {x}) differs")
            }
            None => String::new(),
        })
    }

    /// Whether every check so far passed
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    pub fn failures(&self) -> &[String] {
        &self.failures
    }

    /// Print the summary and return whether the test passed.
    pub fn cleanup(self) -> bool {
        if self.failures.is_empty() {
            eprintln!("SUCCESS: {}_reg ({} checks)", self.test_name, self.index);
        } else {
            eprintln!(
                "FAILURE: {}_reg ({} of {} checks)",
                self.test_name,
                self.failures.len(),
                self.index
            );
        }
        self.failures.is_empty()
    }
}
