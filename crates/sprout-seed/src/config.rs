//! YAML run configuration
//!
//! [`SeedConfig`] mirrors the keys of an adaptive seed YAML file and
//! [`SweepConfig`] those of an erosion sweep file. Optional keys fall back to
//! the same defaults as [`SeedOptions`].

use crate::error::{SeedError, SeedResult};
use crate::options::{Bounds, FootprintSpec, SeedOptions};
use crate::sweep::SweepOptions;
use serde::{Deserialize, Serialize};
use sprout_core::Threshold;
use sprout_region::Connectivity;
use std::path::{Path, PathBuf};

/// A scalar or a list of scalars
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OneOrMany<T> {
    One(T),
    Many(Vec<T>),
}

impl<T: Clone> OneOrMany<T> {
    pub fn to_vec(&self) -> Vec<T> {
        match self {
            OneOrMany::One(v) => vec![v.clone()],
            OneOrMany::Many(vs) => vs.clone(),
        }
    }
}

fn default_no_split_limit() -> usize {
    3
}

fn default_min_size() -> usize {
    5
}

fn default_min_split_prop() -> f64 {
    0.01
}

fn default_true() -> bool {
    true
}

fn default_num_threads() -> usize {
    1
}

fn default_name_prefix() -> String {
    "Merged_seed".to_string()
}

/// Pair thresholds with their optional upper bounds.
fn build_thresholds(lower: &[f64], upper: Option<&OneOrMany<f64>>) -> SeedResult<Vec<Threshold>> {
    let uppers = upper.map(OneOrMany::to_vec);
    if let Some(u) = &uppers
        && u.len() != lower.len()
    {
        return Err(SeedError::InvalidConfig(format!(
            "{} thresholds but {} upper_thresholds",
            lower.len(),
            u.len()
        )));
    }
    lower
        .iter()
        .enumerate()
        .map(|(i, &lo)| {
            let hi = uppers.as_ref().map(|u| u[i]);
            Threshold::new(lo, hi).map_err(SeedError::from)
        })
        .collect()
}

/// Adaptive seed configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeedConfig {
    pub img_path: PathBuf,
    pub output_folder: PathBuf,
    /// One value selects erosion mode, several select a threshold sweep
    pub thresholds: OneOrMany<f64>,
    pub ero_iters: usize,
    pub segments: usize,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default)]
    pub boundary_path: Option<PathBuf>,
    #[serde(default)]
    pub upper_thresholds: Option<OneOrMany<f64>>,
    #[serde(default)]
    pub background: u32,
    #[serde(default = "default_true")]
    pub sort: bool,
    #[serde(default = "default_name_prefix")]
    pub name_prefix: String,
    #[serde(default = "default_no_split_limit")]
    pub no_split_limit: usize,
    #[serde(default = "default_min_size")]
    pub min_size: usize,
    #[serde(default = "default_min_split_prop")]
    pub min_split_prop: f64,
    #[serde(default)]
    pub min_split_sum_prop: f64,
    #[serde(default)]
    pub save_every_iter: bool,
    #[serde(default)]
    pub save_merged_every_iter: bool,
    #[serde(default)]
    pub init_segments: Option<usize>,
    #[serde(default)]
    pub footprints: FootprintSpec,
    #[serde(default)]
    pub connectivity: Connectivity,
    #[serde(default)]
    pub split_size_limit: Bounds,
    #[serde(default)]
    pub split_convex_hull_limit: Bounds,
}

impl SeedConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> SeedResult<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Whether the thresholds select a threshold sweep.
    pub fn is_threshold_sweep(&self) -> bool {
        matches!(&self.thresholds, OneOrMany::Many(v) if v.len() > 1)
    }

    /// Output folder of the run: `output_folder/<image file name>`.
    pub fn run_folder(&self) -> PathBuf {
        match self.img_path.file_name() {
            Some(name) => self.output_folder.join(name),
            None => self.output_folder.clone(),
        }
    }

    /// Convert into run options.
    ///
    /// # Errors
    ///
    /// Fails when a threshold pair is malformed or the upper bounds do not
    /// match the thresholds in length.
    pub fn into_options(self) -> SeedResult<SeedOptions> {
        let lower = self.thresholds.to_vec();
        if lower.is_empty() {
            return Err(SeedError::InvalidConfig("thresholds is empty".to_string()));
        }
        let thresholds = build_thresholds(&lower, self.upper_thresholds.as_ref())?;
        let base = if thresholds.len() == 1 {
            SeedOptions::erosion(thresholds[0], self.ero_iters, self.segments)
        } else {
            SeedOptions::threshold_sweep(thresholds, self.ero_iters, self.segments)
        };
        Ok(SeedOptions {
            init_segments: self.init_segments,
            footprints: self.footprints,
            connectivity: self.connectivity,
            no_split_limit: self.no_split_limit,
            min_size: self.min_size,
            min_split_prop: self.min_split_prop,
            min_split_sum_prop: self.min_split_sum_prop,
            split_size_limit: self.split_size_limit,
            split_convex_hull_limit: self.split_convex_hull_limit,
            num_threads: self.num_threads,
            sort: self.sort,
            background: self.background,
            save_every_iter: self.save_every_iter,
            save_merged_every_iter: self.save_merged_every_iter,
            name_prefix: self.name_prefix,
            ..base
        })
    }
}

/// Erosion sweep configuration file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepConfig {
    pub img_path: PathBuf,
    pub output_folder: PathBuf,
    pub thresholds: OneOrMany<f64>,
    pub erosion_steps: usize,
    pub segments: usize,
    #[serde(default = "default_num_threads")]
    pub num_threads: usize,
    #[serde(default)]
    pub boundary_path: Option<PathBuf>,
    #[serde(default)]
    pub upper_thresholds: Option<OneOrMany<f64>>,
    /// Footprint sequences; each entry is one name or a per-step list
    #[serde(default)]
    pub footprints: Option<Vec<FootprintSpec>>,
    #[serde(default)]
    pub connectivity: Connectivity,
}

impl SweepConfig {
    /// Parse a YAML document.
    pub fn from_yaml_str(text: &str) -> SeedResult<Self> {
        Ok(serde_yml::from_str(text)?)
    }

    /// Convert into sweep options.
    pub fn into_options(self) -> SeedResult<SweepOptions> {
        let thresholds =
            build_thresholds(&self.thresholds.to_vec(), self.upper_thresholds.as_ref())?;
        Ok(SweepOptions {
            thresholds,
            erosion_steps: self.erosion_steps,
            segments: self.segments,
            footprints: self.footprints,
            connectivity: self.connectivity,
            num_threads: self.num_threads,
            keep_in_memory: false,
        })
    }
}

/// A parsed configuration file
#[derive(Debug, Clone, PartialEq)]
pub enum RunConfig {
    Seed(SeedConfig),
    Sweep(SweepConfig),
}

impl RunConfig {
    pub fn img_path(&self) -> &Path {
        match self {
            RunConfig::Seed(c) => &c.img_path,
            RunConfig::Sweep(c) => &c.img_path,
        }
    }

    pub fn boundary_path(&self) -> Option<&Path> {
        match self {
            RunConfig::Seed(c) => c.boundary_path.as_deref(),
            RunConfig::Sweep(c) => c.boundary_path.as_deref(),
        }
    }
}

/// Read a YAML configuration, telling the two kinds apart by their
/// iteration key (`ero_iters` or `erosion_steps`).
pub fn load_yaml(path: impl AsRef<Path>) -> SeedResult<RunConfig> {
    let text = std::fs::read_to_string(path.as_ref()).map_err(sprout_io::IoError::from)?;
    parse_yaml(&text)
}

/// Parse a YAML configuration document.
pub fn parse_yaml(text: &str) -> SeedResult<RunConfig> {
    let value: serde_yml::Value = serde_yml::from_str(text)?;
    if value.get("erosion_steps").is_some() {
        Ok(RunConfig::Sweep(serde_yml::from_value(value)?))
    } else if value.get("ero_iters").is_some() {
        Ok(RunConfig::Seed(serde_yml::from_value(value)?))
    } else {
        Err(SeedError::InvalidConfig(
            "configuration needs either ero_iters or erosion_steps".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::DrivingMode;

    const EROSION_YAML: &str = "
img_path: data/stack.svol
output_folder: out
thresholds: 150
ero_iters: 4
segments: 10
";

    #[test]
    fn test_erosion_defaults() {
        let cfg = SeedConfig::from_yaml_str(EROSION_YAML).unwrap();
        assert!(!cfg.is_threshold_sweep());
        assert_eq!(cfg.run_folder(), PathBuf::from("out/stack.svol"));
        let opts = cfg.into_options().unwrap();
        assert_eq!(opts.mode, DrivingMode::Erosion(Threshold::Single(150.0)));
        assert_eq!(opts.no_split_limit, 3);
        assert_eq!(opts.min_size, 5);
        assert_eq!(opts.min_split_prop, 0.01);
        assert_eq!(opts.min_split_sum_prop, 0.0);
        assert!(opts.sort);
        assert_eq!(opts.name_prefix, "Merged_seed");
        assert_eq!(opts.footprints, FootprintSpec::Uniform("ball".to_string()));
        assert_eq!(opts.split_size_limit, Bounds::UNBOUNDED);
        assert_eq!(opts.num_threads, 1);
    }

    #[test]
    fn test_threshold_list() {
        let yaml = "
img_path: a.svol
output_folder: out
thresholds: [100, 120, 140]
upper_thresholds: [300, 300, 300]
ero_iters: 2
segments: 5
footprints: [ball, ball_XY]
split_size_limit: [null, 5000]
";
        let cfg = SeedConfig::from_yaml_str(yaml).unwrap();
        assert!(cfg.is_threshold_sweep());
        let opts = cfg.into_options().unwrap();
        let DrivingMode::ThresholdSweep(ts) = &opts.mode else {
            panic!("expected threshold sweep");
        };
        assert_eq!(ts[1], Threshold::Ranged(120.0, 300.0));
        assert_eq!(opts.split_size_limit, Bounds(None, Some(5000.0)));
        assert_eq!(opts.validate(3).unwrap().len(), 2);
    }

    #[test]
    fn test_one_element_list_is_erosion() {
        let yaml = "
img_path: a.svol
output_folder: out
thresholds: [150]
upper_thresholds: [400]
ero_iters: 2
segments: 5
";
        let opts = SeedConfig::from_yaml_str(yaml).unwrap().into_options().unwrap();
        assert_eq!(opts.mode, DrivingMode::Erosion(Threshold::Ranged(150.0, 400.0)));
    }

    #[test]
    fn test_upper_length_mismatch() {
        let yaml = "
img_path: a.svol
output_folder: out
thresholds: [100, 120]
upper_thresholds: [300]
ero_iters: 2
segments: 5
";
        let cfg = SeedConfig::from_yaml_str(yaml).unwrap();
        assert!(matches!(cfg.into_options(), Err(SeedError::InvalidConfig(_))));
    }

    #[test]
    fn test_parse_dispatch() {
        assert!(matches!(parse_yaml(EROSION_YAML), Ok(RunConfig::Seed(_))));
        let sweep = "
img_path: a.svol
output_folder: out
thresholds: [100, 200]
erosion_steps: 3
segments: 8
footprints: [ball, [ball, ball_XY, ball]]
";
        let RunConfig::Sweep(cfg) = parse_yaml(sweep).unwrap() else {
            panic!("expected sweep config");
        };
        let opts = cfg.into_options().unwrap();
        assert_eq!(opts.thresholds.len(), 2);
        assert_eq!(opts.footprints.as_ref().map(Vec::len), Some(2));
        assert!(parse_yaml("img_path: a.svol\n").is_err());
    }
}
