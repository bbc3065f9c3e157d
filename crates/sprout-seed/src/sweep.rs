//! Erosion seed sweep
//!
//! The non-adaptive mode: for every threshold and every footprint sequence,
//! threshold the volume, then erode it step by step and keep the largest
//! components of every step. Nothing is merged or tracked between steps.
//!
//! Jobs (threshold x sequence pairs) are dealt round-robin to the workers of
//! a dedicated pool. Each job writes its label volumes into a sub-folder
//! named after its footprint sequence, plus a JSON log of what it saved.

use crate::error::{SeedError, SeedResult};
use crate::options::FootprintSpec;
use crate::sink::{DirectorySink, SnapshotSink};
use log::info;
use rayon::ThreadPoolBuilder;
use serde::{Deserialize, Serialize};
use sprout_core::{Threshold, Volume, Voxel, foreground_mask};
use sprout_io::timestamped_name;
use sprout_morph::{Footprint, erode};
use sprout_region::{Connectivity, label_largest};
use std::path::{Path, PathBuf};
use std::sync::mpsc;

/// Options for an erosion sweep
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepOptions {
    pub thresholds: Vec<Threshold>,
    /// Erosion steps per job
    pub erosion_steps: usize,
    /// Largest components kept per step (0 keeps all)
    pub segments: usize,
    /// Footprint sequences; `None` uses the presets of the dimensionality
    pub footprints: Option<Vec<FootprintSpec>>,
    pub connectivity: Connectivity,
    pub num_threads: usize,
    /// Return every step's labels in the result
    pub keep_in_memory: bool,
}

impl Default for SweepOptions {
    fn default() -> Self {
        Self {
            thresholds: Vec::new(),
            erosion_steps: 3,
            segments: 20,
            footprints: None,
            connectivity: Connectivity::Full,
            num_threads: 1,
            keep_in_memory: false,
        }
    }
}

impl SweepOptions {
    pub fn new(thresholds: Vec<Threshold>, erosion_steps: usize, segments: usize) -> Self {
        Self {
            thresholds,
            erosion_steps,
            segments,
            ..Self::default()
        }
    }

    pub fn with_footprints(mut self, sequences: Vec<FootprintSpec>) -> Self {
        self.footprints = Some(sequences);
        self
    }

    pub fn with_connectivity(mut self, connectivity: Connectivity) -> Self {
        self.connectivity = connectivity;
        self
    }

    pub fn with_num_threads(mut self, num_threads: usize) -> Self {
        self.num_threads = num_threads;
        self
    }

    pub fn with_keep_in_memory(mut self, keep: bool) -> Self {
        self.keep_in_memory = keep;
        self
    }

    /// Check the options and resolve every footprint sequence.
    ///
    /// # Returns
    ///
    /// `(folder name, per-step footprints)` for each sequence.
    pub fn validate(&self, ndim: usize) -> SeedResult<Vec<(String, Vec<Footprint>)>> {
        if self.thresholds.is_empty() {
            return Err(SeedError::InvalidConfig(
                "sweep needs at least one threshold".to_string(),
            ));
        }
        for t in &self.thresholds {
            t.validate()?;
        }
        if self.num_threads == 0 {
            return Err(SeedError::InvalidConfig(
                "num_threads must be at least 1".to_string(),
            ));
        }
        let specs: Vec<FootprintSpec> = match &self.footprints {
            Some(specs) => specs.clone(),
            None => Footprint::presets(ndim)
                .into_iter()
                .map(|fp| FootprintSpec::Uniform(fp.name().to_string()))
                .collect(),
        };
        specs
            .iter()
            .map(|spec| {
                let fps = spec.resolve(ndim, self.erosion_steps)?;
                Ok::<_, SeedError>((spec.folder_name(), fps))
            })
            .collect()
    }
}

/// Output of one threshold x sequence job
#[derive(Debug, Clone)]
pub struct SweepJob {
    pub threshold: Threshold,
    pub footprints: Vec<Footprint>,
    /// Sub-folder of the sequence
    pub folder: String,
    /// File name of every step's labels
    pub files: Vec<String>,
    /// Components kept at every step
    pub component_counts: Vec<usize>,
    /// Every step's labels, when kept in memory
    pub seeds: Vec<Volume<u32>>,
}

/// Every job of a sweep, in (sequence, threshold) order
#[derive(Debug, Clone, Default)]
pub struct SweepResult {
    pub jobs: Vec<SweepJob>,
}

/// File name of the labels after `step` erosions at `threshold`.
pub fn sweep_file_name(step: usize, threshold: &Threshold) -> String {
    format!("thre_ero_{step}iter_thre{}.svol", threshold.label())
}

struct JobSpec<'a> {
    threshold: Threshold,
    folder: &'a str,
    footprints: &'a [Footprint],
}

fn run_job<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    job: &JobSpec<'_>,
    options: &SweepOptions,
    output_dir: Option<&Path>,
) -> SeedResult<SweepJob> {
    let mut sink = output_dir
        .map(|dir| DirectorySink::new(dir.join(job.folder)))
        .transpose()?;

    let mut mask = foreground_mask(volume, &job.threshold, boundary)?;
    let mut out = SweepJob {
        threshold: job.threshold,
        footprints: job.footprints.to_vec(),
        folder: job.folder.to_string(),
        files: Vec::new(),
        component_counts: Vec::new(),
        seeds: Vec::new(),
    };
    for (i, &fp) in job.footprints.iter().enumerate() {
        mask = erode(&mask, fp)?;
        let (labels, n) = label_largest(&mask, options.segments, options.connectivity)?;
        let name = sweep_file_name(i + 1, &job.threshold);
        if let Some(sink) = sink.as_mut() {
            sink.save_volume(&name, &labels)?;
        }
        out.files.push(name);
        out.component_counts.push(n);
        if options.keep_in_memory {
            out.seeds.push(labels);
        }
    }

    if let Some(sink) = sink.as_mut() {
        let log = serde_json::json!({
            "threshold": job.threshold,
            "footprints": job.footprints,
            "segments": options.segments,
            "output_files": &out.files,
            "component_counts": &out.component_counts,
        });
        let name = timestamped_name(&format!("seed_log_thre{}", job.threshold.label()), "json");
        sink.save_json(&name, &log)?;
    }
    info!(
        "Sweep {} at threshold {}: components per step {:?}",
        job.folder, job.threshold, out.component_counts
    );
    Ok(out)
}

/// Run an erosion sweep.
///
/// # Arguments
///
/// * `volume` - Intensity volume
/// * `boundary` - Optional exclusion mask of the same shape
/// * `options` - Sweep options
/// * `output_dir` - Folder receiving one sub-folder per sequence; `None`
///   writes nothing
pub fn run_sweep<T: Voxel>(
    volume: &Volume<T>,
    boundary: Option<&Volume<bool>>,
    options: &SweepOptions,
    output_dir: Option<&Path>,
) -> SeedResult<SweepResult> {
    let sequences = options.validate(volume.ndim())?;
    if let Some(b) = boundary {
        volume.check_same_shape(b)?;
    }
    let jobs: Vec<JobSpec<'_>> = sequences
        .iter()
        .flat_map(|(folder, fps)| {
            options.thresholds.iter().map(move |&threshold| JobSpec {
                threshold,
                folder: folder.as_str(),
                footprints: fps.as_slice(),
            })
        })
        .collect();
    let workers = options.num_threads.min(jobs.len()).max(1);
    info!(
        "Erosion sweep: {} jobs ({} sequences x {} thresholds) on {workers} workers",
        jobs.len(),
        sequences.len(),
        options.thresholds.len()
    );

    let pool = ThreadPoolBuilder::new()
        .num_threads(workers)
        .thread_name(|i| format!("sprout-sweep-{i}"))
        .build()?;
    let (tx, rx) = mpsc::channel::<(usize, SeedResult<SweepJob>)>();
    let jobs_ref = &jobs;
    pool.scope(|s| {
        for w in 0..workers {
            let tx = tx.clone();
            s.spawn(move |_| {
                for (idx, job) in jobs_ref.iter().enumerate().skip(w).step_by(workers) {
                    let result = run_job(volume, boundary, job, options, output_dir);
                    let _ = tx.send((idx, result));
                }
            });
        }
    });
    drop(tx);

    let mut results: Vec<(usize, SeedResult<SweepJob>)> = rx.into_iter().collect();
    results.sort_by_key(|(idx, _)| *idx);
    let jobs = results
        .into_iter()
        .map(|(_, r)| r)
        .collect::<SeedResult<Vec<_>>>()?;
    Ok(SweepResult { jobs })
}

/// Output folder of a sweep over `img_path`: `output_folder/<file name>`.
pub fn sweep_folder(output_folder: &Path, img_path: &Path) -> PathBuf {
    match img_path.file_name() {
        Some(name) => output_folder.join(name),
        None => output_folder.to_path_buf(),
    }
}
