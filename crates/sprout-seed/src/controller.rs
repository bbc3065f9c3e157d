//! Adaptive seed iteration
//!
//! [`SeedController`] owns the state of one run: the merged seed volume,
//! the ancestry map, the run history and the identity counter. It moves
//! through
//!
//! ```text
//! Initialized -> Iterating -> Converged | Exhausted -> Finalized
//! ```
//!
//! Each step produces a fresh labeling (one more erosion, or the next
//! threshold eroded to the full depth), intersects every live seed with it
//! and splits the seeds the [`SplitPolicy`] accepts. The run converges when
//! `no_split_limit` consecutive steps split nothing and is exhausted when
//! the erosion or threshold budget runs out first.

use crate::ancestry::AncestryMap;
use crate::error::{SeedError, SeedResult};
use crate::history::{IterationRecord, RunHistory, SplitEvent, StepKey};
use crate::options::{DrivingMode, SeedOptions};
use crate::overlap::OverlapEvaluator;
use crate::policy::SplitPolicy;
use crate::sink::SnapshotSink;
use log::{debug, info};
use sprout_core::{Threshold, Volume, VolumeMut, Voxel, foreground_mask};
use sprout_io::timestamped_name;
use sprout_morph::{Footprint, erode, erode_sequence};
use sprout_region::{label_largest, reorder};
use std::collections::BTreeMap;

/// Lifecycle of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Initial labeling done, no step taken
    Initialized,
    /// At least one step taken, budget left
    Iterating,
    /// Stopped after `no_split_limit` steps without a split
    Converged,
    /// Stopped because the iteration or threshold budget ran out
    Exhausted,
    /// Small seeds dropped and the result emitted
    Finalized,
}

impl RunState {
    /// Whether another step can be taken.
    pub fn can_step(self) -> bool {
        matches!(self, RunState::Initialized | RunState::Iterating)
    }
}

/// Result of a finished run
#[derive(Debug, Clone)]
pub struct SeedRun {
    /// Final seeds, small ones dropped and optionally renumbered by size
    pub seeds: Volume<u32>,
    pub ancestry: AncestryMap,
    pub history: RunHistory,
    /// State the iteration stopped in (`Converged` or `Exhausted`, or
    /// `Initialized` / `Iterating` when finalized early)
    pub state: RunState,
    pub steps_run: usize,
    pub output_name: String,
    /// Number of identities in `seeds`
    pub final_count: usize,
}

/// Driver of one adaptive seed run
#[derive(Debug)]
pub struct SeedController<'a, T: Voxel> {
    volume: &'a Volume<T>,
    boundary: Option<&'a Volume<bool>>,
    options: SeedOptions,
    footprints: Vec<Footprint>,
    policy: SplitPolicy,
    evaluator: OverlapEvaluator,
    merged: VolumeMut<u32>,
    working: Volume<bool>,
    ancestry: AncestryMap,
    history: RunHistory,
    state: RunState,
    steps: usize,
    last_id: u32,
    no_split_count: usize,
    output_name: String,
}

/// Distinct labels other than 0 and `background`.
fn live_ids(labels: &[u32], background: u32) -> Vec<u32> {
    let mut ids: Vec<u32> = labels
        .iter()
        .copied()
        .filter(|&v| v != 0 && v != background)
        .collect();
    ids.sort_unstable();
    ids.dedup();
    ids
}

/// Linear indices of every label, in raster order.
fn group_indices(labels: &Volume<u32>) -> BTreeMap<u32, Vec<usize>> {
    let mut groups: BTreeMap<u32, Vec<usize>> = BTreeMap::new();
    for (i, &v) in labels.data().iter().enumerate() {
        if v != 0 {
            groups.entry(v).or_default().push(i);
        }
    }
    groups
}

impl<'a, T: Voxel> SeedController<'a, T> {
    /// Validate the options and build the initial labeling.
    ///
    /// # Arguments
    ///
    /// * `volume` - Intensity volume
    /// * `boundary` - Optional exclusion mask of the same shape
    /// * `options` - Run options
    ///
    /// # Errors
    ///
    /// Fails before any processing on a malformed threshold, an unsupported
    /// footprint, a footprint list of the wrong length or a boundary of the
    /// wrong shape.
    pub fn new(
        volume: &'a Volume<T>,
        boundary: Option<&'a Volume<bool>>,
        options: SeedOptions,
    ) -> SeedResult<Self> {
        let footprints = options.validate(volume.ndim())?;
        if let Some(b) = boundary {
            volume.check_same_shape(b)?;
        }
        let policy = SplitPolicy::from_options(&options);
        let evaluator = OverlapEvaluator::new(options.num_threads)?;

        let (first, working) = match &options.mode {
            DrivingMode::Erosion(t) => (*t, foreground_mask(volume, t, boundary)?),
            DrivingMode::ThresholdSweep(ts) => {
                let t = ts.first().copied().ok_or_else(|| {
                    SeedError::InvalidConfig("threshold sweep has no thresholds".to_string())
                })?;
                let mask = foreground_mask(volume, &t, boundary)?;
                (t, erode_sequence(&mask, &footprints)?)
            }
        };
        let (labels, n) =
            label_largest(&working, options.initial_segments(), options.connectivity)?;

        let roots = live_ids(labels.data(), options.background);
        let ancestry = AncestryMap::seed(roots.iter().copied());
        let last_id = labels.max_label();
        info!(
            "Initial labeling at threshold {first}: {n} components, {} foreground voxels",
            labels.count_nonzero()
        );

        let key = match &options.mode {
            DrivingMode::Erosion(_) => StepKey::Erosion(0),
            DrivingMode::ThresholdSweep(_) => StepKey::Threshold(first),
        };
        let mut history = RunHistory::new();
        let output_name = options.output_name();
        history.push(IterationRecord {
            key,
            total_ids: roots.len(),
            events: Vec::new(),
            snapshot_name: Self::component_file_name(&options, key),
        });

        Ok(Self {
            volume,
            boundary,
            footprints,
            policy,
            evaluator,
            merged: labels.to_mut(),
            working,
            ancestry,
            history,
            state: RunState::Initialized,
            steps: 0,
            last_id,
            no_split_count: 0,
            output_name,
            options,
        })
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn steps_run(&self) -> usize {
        self.steps
    }

    pub fn options(&self) -> &SeedOptions {
        &self.options
    }

    pub fn ancestry(&self) -> &AncestryMap {
        &self.ancestry
    }

    pub fn history(&self) -> &RunHistory {
        &self.history
    }

    /// Current merged seeds as a fresh volume.
    pub fn merged(&self) -> Volume<u32> {
        let mut copy = VolumeMut::new(self.merged.shape());
        copy.data_mut().copy_from_slice(self.merged.data());
        copy.into()
    }

    /// Steps available after the initial labeling.
    pub fn budget(&self) -> usize {
        match &self.options.mode {
            DrivingMode::Erosion(_) => self.options.n_iters,
            DrivingMode::ThresholdSweep(ts) => ts.len().saturating_sub(1),
        }
    }

    fn component_file_name(options: &SeedOptions, key: StepKey) -> String {
        match (&options.mode, key) {
            (DrivingMode::Erosion(t), StepKey::Erosion(i)) => {
                format!("INTER_thre_{}_ero_{i}.svol", t.label())
            }
            _ => format!("INTER_thre_{key}_ero_{}.svol", options.n_iters),
        }
    }

    fn merged_file_name(&self, key: StepKey) -> String {
        match key {
            StepKey::Erosion(i) => format!("INTER_merged_{}ero_{i}.svol", self.output_name),
            StepKey::Threshold(_) => format!("INTER_merged_{}thre_{key}.svol", self.output_name),
        }
    }

    /// Fresh labeling for step `i` (1-based).
    fn next_labeling(&mut self, i: usize) -> SeedResult<(StepKey, Volume<u32>)> {
        let segments = self.options.segments;
        let connectivity = self.options.connectivity;
        let key = match &self.options.mode {
            DrivingMode::Erosion(_) => {
                self.working = erode(&self.working, self.footprints[i - 1])?;
                StepKey::Erosion(i)
            }
            DrivingMode::ThresholdSweep(ts) => {
                let t: Threshold = ts[i];
                let mask = foreground_mask(self.volume, &t, self.boundary)?;
                self.working = erode_sequence(&mask, &self.footprints)?;
                StepKey::Threshold(t)
            }
        };
        let (labels, _) = label_largest(&self.working, segments, connectivity)?;
        Ok((key, labels))
    }

    /// Take one step.
    ///
    /// # Returns
    ///
    /// The state after the step. Once the run has converged or is exhausted
    /// further calls return that state unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Finalized`] after [`finalize`](Self::finalize).
    pub fn step(&mut self, sink: &mut dyn SnapshotSink) -> SeedResult<RunState> {
        if self.state == RunState::Finalized {
            return Err(SeedError::Finalized);
        }
        if !self.state.can_step() {
            return Ok(self.state);
        }
        if self.steps >= self.budget() {
            self.state = RunState::Exhausted;
            return Ok(self.state);
        }

        let i = self.steps + 1;
        let (key, labels) = self.next_labeling(i)?;
        if self.options.save_every_iter {
            sink.save_volume(&Self::component_file_name(&self.options, key), &labels)?;
        }

        let background = self.options.background;
        let shape = labels.shape();
        let candidates = live_ids(labels.data(), background);
        let groups = group_indices(&labels);
        let references = live_ids(self.merged.data(), background);

        let mut events = Vec::new();
        let mut has_split = false;
        for &reference in &references {
            let ref_indices: Vec<usize> = self
                .merged
                .data()
                .iter()
                .enumerate()
                .filter_map(|(idx, &v)| (v == reference).then_some(idx))
                .collect();
            let log = self.evaluator.evaluate(&ref_indices, &labels, &candidates);
            let decision = self.policy.decide(&log, &ref_indices, shape);
            debug!(
                "step {i}: seed {reference} ({} voxels) meets {} components: {:?}",
                log.reference_voxels,
                log.count(),
                decision.verdict
            );
            if !decision.verdict.is_accepted() {
                continue;
            }

            let mut new_ids = Vec::with_capacity(decision.filtered.len());
            if !decision.filtered.is_empty() {
                has_split = true;
                let data = self.merged.data_mut();
                for &idx in &ref_indices {
                    data[idx] = 0;
                }
                for hit in &decision.filtered {
                    self.last_id += 1;
                    let new_id = self.last_id;
                    if let Some(voxels) = groups.get(&hit.id) {
                        for &idx in voxels {
                            data[idx] = new_id;
                        }
                    }
                    self.ancestry.register(reference, new_id)?;
                    new_ids.push(new_id);
                }
            }
            events.push(SplitEvent {
                reference,
                new_ids,
                candidate_ids: log.ids(),
                filtered_ids: decision.filtered.iter().map(|h| h.id).collect(),
                proportions: log.proportions(),
            });
        }

        if has_split {
            self.no_split_count = 0;
        } else {
            self.no_split_count += 1;
        }

        let total_ids = live_ids(self.merged.data(), background).len();
        let snapshot_name = Self::component_file_name(&self.options, key);
        info!(
            "Step {i} ({key}): {} components, {} splits, {total_ids} seeds",
            candidates.len(),
            events.iter().filter(|e| !e.new_ids.is_empty()).count()
        );

        if self.options.save_merged_every_iter {
            let (snapshot, _) = reorder(&self.merged(), self.options.min_size, self.options.sort);
            sink.save_volume(&self.merged_file_name(key), &snapshot)?;
        }

        self.history.push(IterationRecord {
            key,
            total_ids,
            events,
            snapshot_name,
        });
        self.steps = i;
        self.state = if self.no_split_count >= self.options.no_split_limit {
            info!(
                "No split for {} consecutive steps, stopping at step {i}",
                self.no_split_count
            );
            RunState::Converged
        } else if self.steps >= self.budget() {
            RunState::Exhausted
        } else {
            RunState::Iterating
        };
        Ok(self.state)
    }

    /// Step until the run converges or is exhausted, then finalize.
    pub fn run(&mut self, sink: &mut dyn SnapshotSink) -> SeedResult<SeedRun> {
        info!(
            "Starting {} over {} volume, {} steps, {} workers",
            self.output_name,
            self.volume.shape(),
            self.budget(),
            self.evaluator.workers()
        );
        while self.state.can_step() {
            self.step(sink)?;
        }
        self.finalize(sink)
    }

    /// Drop small seeds, optionally renumber by size and emit the final
    /// volume, parameters, ancestry and history.
    ///
    /// # Errors
    ///
    /// Returns [`SeedError::Finalized`] when called twice.
    pub fn finalize(&mut self, sink: &mut dyn SnapshotSink) -> SeedResult<SeedRun> {
        if self.state == RunState::Finalized {
            return Err(SeedError::Finalized);
        }
        let stopped_in = self.state;
        let (seeds, final_count) =
            reorder(&self.merged(), self.options.min_size, self.options.sort);

        let final_name = if self.options.sort {
            format!("FINAL_{}_sorted.svol", self.output_name)
        } else {
            format!("FINAL_{}.svol", self.output_name)
        };
        sink.save_volume(&final_name, &seeds)?;

        let params = serde_json::json!({
            "params": &self.options,
            "footprints": &self.footprints,
            "shape": self.volume.shape().dims(),
            "steps_run": self.steps,
            "final_count": final_count,
        });
        sink.save_json("config.json", &params)?;
        let ancestry = serde_json::to_value(&self.ancestry).map_err(sprout_io::IoError::from)?;
        sink.save_json("ancestry.json", &ancestry)?;
        sink.save_table(&timestamped_name("output_dict", "csv"), &self.history.to_table())?;

        info!(
            "Finished {} after {} steps ({stopped_in:?}): {final_count} seeds",
            self.output_name, self.steps
        );
        self.state = RunState::Finalized;
        Ok(SeedRun {
            seeds,
            ancestry: self.ancestry.clone(),
            history: self.history.clone(),
            state: stopped_in,
            steps_run: self.steps,
            output_name: self.output_name.clone(),
            final_count,
        })
    }
}

/// Run an adaptive seed generation from start to finish.
pub fn make_adaptive_seeds<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    options: SeedOptions,
    sink: &mut dyn SnapshotSink,
) -> SeedResult<SeedRun> {
    SeedController::new(volume, boundary, options)?.run(sink)
}
