//! Run options
//!
//! [`SeedOptions`] carries every knob of an adaptive seed run. It is built
//! with `Default` plus `with_*` methods (or from a YAML
//! [`SeedConfig`](crate::config::SeedConfig)) and checked once by
//! [`SeedOptions::validate`] before any voxel is touched.

use crate::error::{SeedError, SeedResult};
use serde::{Deserialize, Serialize};
use sprout_core::Threshold;
use sprout_morph::Footprint;
use sprout_region::Connectivity;

/// Optional `(lower, upper)` bounds; `None` disables that side
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Bounds(pub Option<f64>, pub Option<f64>);

impl Bounds {
    /// Bounds with neither side set.
    pub const UNBOUNDED: Bounds = Bounds(None, None);

    /// Create bounds.
    pub fn new(lower: Option<f64>, upper: Option<f64>) -> Self {
        Bounds(lower, upper)
    }

    /// Lower bound.
    pub fn lower(&self) -> Option<f64> {
        self.0
    }

    /// Upper bound.
    pub fn upper(&self) -> Option<f64> {
        self.1
    }

    /// Whether either side is set.
    pub fn is_active(&self) -> bool {
        self.0.is_some() || self.1.is_some()
    }

    /// Inclusive containment; unset sides always pass.
    pub fn contains(&self, value: f64) -> bool {
        self.0.is_none_or(|lo| value >= lo) && self.1.is_none_or(|hi| value <= hi)
    }
}

/// Footprint selection: one name for every iteration, or one per iteration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FootprintSpec {
    /// Same footprint at every iteration (`"default"` allowed)
    Uniform(String),
    /// Explicit footprint per iteration
    PerIteration(Vec<String>),
}

impl Default for FootprintSpec {
    fn default() -> Self {
        FootprintSpec::Uniform("ball".to_string())
    }
}

impl FootprintSpec {
    /// Resolve to one footprint per erosion iteration.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::FootprintLengthMismatch`] when a per-iteration
    /// list does not have `n_iters` entries, or a morphology error for an
    /// unknown or dimension-incompatible name.
    pub fn resolve(&self, ndim: usize, n_iters: usize) -> SeedResult<Vec<Footprint>> {
        match self {
            FootprintSpec::Uniform(name) => {
                let fp = Footprint::resolve(name, ndim)?;
                Ok(vec![fp; n_iters])
            }
            FootprintSpec::PerIteration(names) => {
                if names.len() != n_iters {
                    return Err(SeedError::FootprintLengthMismatch {
                        expected: n_iters,
                        actual: names.len(),
                    });
                }
                names
                    .iter()
                    .map(|n| Footprint::resolve(n, ndim).map_err(SeedError::from))
                    .collect()
            }
        }
    }

    /// Folder-friendly name of the sequence.
    pub fn folder_name(&self) -> String {
        match self {
            FootprintSpec::Uniform(name) => name.clone(),
            FootprintSpec::PerIteration(names) => {
                let first = names.first().map(String::as_str).unwrap_or("none");
                if names.iter().all(|n| n == first) {
                    first.to_string()
                } else {
                    names.join("-")
                }
            }
        }
    }
}

/// What advances between iterations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum DrivingMode {
    /// Fixed threshold; each step erodes the mask once more
    Erosion(Threshold),
    /// Threshold sequence; each step thresholds anew and erodes to the
    /// fixed depth. The first threshold seeds the run.
    ThresholdSweep(Vec<Threshold>),
}

impl DrivingMode {
    /// Every threshold this mode uses.
    pub fn thresholds(&self) -> &[Threshold] {
        match self {
            DrivingMode::Erosion(t) => std::slice::from_ref(t),
            DrivingMode::ThresholdSweep(ts) => ts,
        }
    }
}

/// Options for one adaptive seed run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedOptions {
    /// Erosion or threshold-sweep driving
    pub mode: DrivingMode,
    /// Erosion iterations (erosion mode) or erosion depth (sweep mode)
    pub n_iters: usize,
    /// Largest components kept per labeling (0 keeps all)
    pub segments: usize,
    /// Component cap for the initial labeling (defaults to `segments`)
    pub init_segments: Option<usize>,
    /// Footprint per erosion iteration
    pub footprints: FootprintSpec,
    /// Labeling connectivity
    pub connectivity: Connectivity,
    /// Consecutive no-split steps before stopping early
    pub no_split_limit: usize,
    /// Final components smaller than this are dropped
    pub min_size: usize,
    /// Per-candidate proportion threshold, as a fraction in `[0, 1]`
    pub min_split_prop: f64,
    /// Candidate proportion sum threshold, as a fraction in `[0, 1]`
    pub min_split_sum_prop: f64,
    /// Reference voxel-count bounds for accepting a split
    pub split_size_limit: Bounds,
    /// Reference hull area / volume bounds for accepting a split
    pub split_convex_hull_limit: Bounds,
    /// Overlap workers
    pub num_threads: usize,
    /// Renumber final identities by descending size
    pub sort: bool,
    /// Label value treated as background when listing identities
    pub background: u32,
    /// Save the component labels of every step
    pub save_every_iter: bool,
    /// Save a finalized copy of the merged seeds after every step
    pub save_merged_every_iter: bool,
    /// Output name prefix
    pub name_prefix: String,
}

impl Default for SeedOptions {
    fn default() -> Self {
        Self {
            mode: DrivingMode::Erosion(Threshold::Single(1.0)),
            n_iters: 5,
            segments: 20,
            init_segments: None,
            footprints: FootprintSpec::default(),
            connectivity: Connectivity::Full,
            no_split_limit: 3,
            min_size: 5,
            min_split_prop: 0.01,
            min_split_sum_prop: 0.0,
            split_size_limit: Bounds::UNBOUNDED,
            split_convex_hull_limit: Bounds::UNBOUNDED,
            num_threads: 1,
            sort: true,
            background: 0,
            save_every_iter: false,
            save_merged_every_iter: false,
            name_prefix: "Merged_seed".to_string(),
        }
    }
}

impl SeedOptions {
    /// Erosion-driven run at a fixed threshold.
    pub fn erosion(threshold: Threshold, n_iters: usize, segments: usize) -> Self {
        Self {
            mode: DrivingMode::Erosion(threshold),
            n_iters,
            segments,
            ..Self::default()
        }
    }

    /// Threshold-sequence run eroding each mask `n_iters` times.
    pub fn threshold_sweep(thresholds: Vec<Threshold>, n_iters: usize, segments: usize) -> Self {
        Self {
            mode: DrivingMode::ThresholdSweep(thresholds),
            n_iters,
            segments,
            ..Self::default()
        }
    }

    pub fn with_init_segments(mut self, init_segments: usize) -> Self {
        self.init_segments = Some(init_segments);
        self
    }

    pub fn with_footprint(mut self, name: &str) -> Self {
        self.footprints = FootprintSpec::Uniform(name.to_string());
        self
    }

    pub fn with_footprints<S: Into<String>>(mut self, names: impl IntoIterator<Item = S>) -> Self {
        self.footprints = FootprintSpec::PerIteration(names.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_no_split_limit(mut self, limit: usize) -> Self {
        self.no_split_limit = limit;
        self
    }

    pub fn with_min_size(mut self, min_size: usize) -> Self {
        self.min_size = min_size;
        self
    }

    pub fn with_min_split_prop(mut self, prop: f64) -> Self {
        self.min_split_prop = prop;
        self
    }

    pub fn with_min_split_sum_prop(mut self, prop: f64) -> Self {
        self.min_split_sum_prop = prop;
        self
    }

    pub fn with_split_size_limit(mut self, bounds: Bounds) -> Self {
        self.split_size_limit = bounds;
        self
    }

    pub fn with_split_convex_hull_limit(mut self, bounds: Bounds) -> Self {
        self.split_convex_hull_limit = bounds;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_sort(mut self, sort: bool) -> Self {
        self.sort = sort;
        self
    }

    pub fn with_background(mut self, background: u32) -> Self {
        self.background = background;
        self
    }

    pub fn with_save_every_iter(mut self, save: bool) -> Self {
        self.save_every_iter = save;
        self
    }

    pub fn with_save_merged_every_iter(mut self, save: bool) -> Self {
        self.save_merged_every_iter = save;
        self
    }

    pub fn with_name_prefix(mut self, prefix: &str) -> Self {
        self.name_prefix = prefix.to_string();
        self
    }

    /// Component cap of the initial labeling.
    pub fn initial_segments(&self) -> usize {
        self.init_segments.unwrap_or(self.segments)
    }

    /// Base name shared by the output files of this run.
    pub fn output_name(&self) -> String {
        match &self.mode {
            DrivingMode::Erosion(t) => {
                format!("{}_thre_{}_ero_{}", self.name_prefix, t.label(), self.n_iters)
            }
            DrivingMode::ThresholdSweep(_) => format!("{}_ero_{}", self.name_prefix, self.n_iters),
        }
    }

    /// Check every option and resolve the footprint list.
    ///
    /// # Arguments
    ///
    /// * `ndim` - Dimensionality of the volume the run will process
    ///
    /// # Errors
    ///
    /// Fails on a malformed threshold, an unsupported footprint, a footprint
    /// list of the wrong length, or an out-of-range numeric option.
    pub fn validate(&self, ndim: usize) -> SeedResult<Vec<Footprint>> {
        for t in self.mode.thresholds() {
            t.validate()?;
        }
        if let DrivingMode::ThresholdSweep(ts) = &self.mode
            && ts.len() < 2
        {
            return Err(SeedError::InvalidConfig(format!(
                "threshold sweep needs at least 2 thresholds, got {}",
                ts.len()
            )));
        }
        if let DrivingMode::ThresholdSweep(ts) = &self.mode
            && let Some(w) = ts.windows(2).find(|w| w[0].lower() >= w[1].lower())
        {
            return Err(SeedError::InvalidConfig(format!(
                "sweep thresholds must ascend, got {} then {}",
                w[0], w[1]
            )));
        }
        if self.num_threads == 0 {
            return Err(SeedError::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }
        for (name, prop) in [
            ("min_split_prop", self.min_split_prop),
            ("min_split_sum_prop", self.min_split_sum_prop),
        ] {
            if !(0.0..=1.0).contains(&prop) {
                return Err(SeedError::InvalidConfig(format!(
                    "{name} must be within [0, 1], got {prop}"
                )));
            }
        }
        for (name, b) in [
            ("split_size_limit", self.split_size_limit),
            ("split_convex_hull_limit", self.split_convex_hull_limit),
        ] {
            if let (Some(lo), Some(hi)) = (b.lower(), b.upper())
                && lo > hi
            {
                return Err(SeedError::InvalidConfig(format!(
                    "{name} lower {lo} exceeds upper {hi}"
                )));
            }
        }
        self.footprints.resolve(ndim, self.n_iters)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds() {
        assert!(Bounds::UNBOUNDED.contains(1e12));
        assert!(!Bounds::UNBOUNDED.is_active());
        let b = Bounds::new(Some(10.0), Some(20.0));
        assert!(b.contains(10.0) && b.contains(20.0));
        assert!(!b.contains(9.9) && !b.contains(20.1));
        assert!(Bounds::new(None, Some(5.0)).contains(-3.0));
    }

    #[test]
    fn test_footprint_spec_resolve() {
        let fps = FootprintSpec::default().resolve(3, 3).unwrap();
        assert_eq!(fps, vec![Footprint::Ball; 3]);
        let spec = FootprintSpec::PerIteration(vec!["ball".into(), "ball_XY".into()]);
        assert!(matches!(
            spec.resolve(3, 3),
            Err(SeedError::FootprintLengthMismatch {
                expected: 3,
                actual: 2
            })
        ));
        assert_eq!(spec.resolve(3, 2).unwrap()[1], Footprint::BallXY);
        assert_eq!(spec.folder_name(), "ball-ball_XY");
    }

    #[test]
    fn test_validate_rejects_bad_footprint() {
        let opts = SeedOptions::default().with_footprint("hexagon");
        assert!(matches!(opts.validate(3), Err(SeedError::Morph(_))));
        let opts = SeedOptions::default().with_footprint("disk");
        assert!(opts.validate(3).is_err());
        assert!(opts.validate(2).is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_range() {
        let opts = SeedOptions::erosion(Threshold::Ranged(300.0, 150.0), 3, 5);
        assert!(matches!(
            opts.validate(3),
            Err(SeedError::Core(sprout_core::Error::InvalidRange { .. }))
        ));
        let opts = SeedOptions::threshold_sweep(vec![Threshold::Single(1.0)], 3, 5);
        assert!(opts.validate(3).is_err());
        let opts = SeedOptions::default().with_min_split_prop(5.0);
        assert!(opts.validate(3).is_err());
    }

    #[test]
    fn test_validate_rejects_descending_sweep() {
        let descending = vec![Threshold::Single(150.0), Threshold::Single(50.0)];
        let opts = SeedOptions::threshold_sweep(descending, 1, 5);
        assert!(matches!(opts.validate(3), Err(SeedError::InvalidConfig(_))));
        let repeated = vec![Threshold::Single(50.0), Threshold::Ranged(50.0, 90.0)];
        let opts = SeedOptions::threshold_sweep(repeated, 1, 5);
        assert!(opts.validate(3).is_err());
        let ascending = vec![Threshold::Single(50.0), Threshold::Single(150.0)];
        let opts = SeedOptions::threshold_sweep(ascending, 1, 5);
        assert!(opts.validate(3).is_ok());
    }

    #[test]
    fn test_output_name() {
        let opts = SeedOptions::erosion(Threshold::Single(150.0), 4, 10);
        assert_eq!(opts.output_name(), "Merged_seed_thre_150_None_ero_4");
        let opts = SeedOptions::threshold_sweep(
            vec![Threshold::Single(100.0), Threshold::Single(120.0)],
            2,
            10,
        )
        .with_name_prefix("Run");
        assert_eq!(opts.output_name(), "Run_ero_2");
    }
}
