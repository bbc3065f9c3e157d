//! sprout-seed - Split-tracking seed generation
//!
//! Turns an intensity volume into seeds for region growing. A foreground
//! mask is eroded (or re-thresholded) step by step; whenever a tracked seed
//! breaks into several pieces the pieces replace it, and every seed keeps a
//! record of the root it came from.
//!
//! # Modules
//!
//! - [`options`] / [`config`]: run options and their YAML form
//! - [`overlap`]: multi-worker intersection of a seed with a fresh labeling
//! - [`policy`]: split acceptance gates
//! - [`ancestry`]: root -> descendants map
//! - [`history`]: per-step record and history table
//! - [`controller`]: the iteration state machine
//! - [`sink`]: where snapshots and records go
//! - [`sweep`]: the non-adaptive erosion sweep
//!
//! # Examples
//!
//! ```
//! use sprout_core::{Shape, Threshold, Volume};
//! use sprout_seed::{NullSink, SeedOptions, make_adaptive_seeds};
//!
//! let shape = Shape::new_3d(5, 5, 5).unwrap();
//! let volume = Volume::from_fn(shape, |z, y, x| {
//!     if (1..4).contains(&z) && (1..4).contains(&y) && (1..4).contains(&x) { 10u8 } else { 0 }
//! });
//! let options = SeedOptions::erosion(Threshold::Single(5.0), 1, 4).with_min_size(1);
//! let run = make_adaptive_seeds(&volume, None, options, &mut NullSink).unwrap();
//! assert_eq!(run.final_count, 1);
//! ```

pub mod ancestry;
pub mod config;
pub mod controller;
mod error;
pub mod history;
pub mod options;
pub mod overlap;
pub mod policy;
pub mod sink;
pub mod sweep;

pub use ancestry::AncestryMap;
pub use config::{OneOrMany, RunConfig, SeedConfig, SweepConfig, load_yaml, parse_yaml};
pub use controller::{RunState, SeedController, SeedRun, make_adaptive_seeds};
pub use error::{SeedError, SeedResult};
pub use history::{IterationRecord, RunHistory, SplitEvent, StepKey};
pub use options::{Bounds, DrivingMode, FootprintSpec, SeedOptions};
pub use overlap::{IntersectionLog, Overlap, OverlapEvaluator};
pub use policy::{SplitDecision, SplitPolicy, Verdict};
pub use sink::{DirectorySink, MemorySink, NullSink, SnapshotSink};
pub use sweep::{SweepJob, SweepOptions, SweepResult, run_sweep, sweep_file_name, sweep_folder};
