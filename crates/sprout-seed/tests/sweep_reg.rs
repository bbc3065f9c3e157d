//! Erosion sweep regression test
//!
//! Sweeps the bridged-blob pair over two thresholds and every preset
//! footprint sequence, writing label volumes and logs to a scratch folder.
//!
//! Run with:
//! ```
//! cargo test -p sprout-seed --test sweep_reg
//! ```

use sprout_core::Threshold;
use sprout_io::read_volume_file;
use sprout_morph::Footprint;
use sprout_seed::{FootprintSpec, SweepOptions, run_sweep, sweep_file_name};
use sprout_test::{RegParams, builders, scratch_dir};

#[test]
fn sweep_reg() {
    let mut rp = RegParams::new("sweep");
    let blobs = builders::bridged_blobs().unwrap();
    let out = scratch_dir("sweep").unwrap();

    let opts = SweepOptions::new(vec![Threshold::Single(1.0), Threshold::Single(150.0)], 2, 10)
        .with_num_threads(3)
        .with_keep_in_memory(true);
    let result = run_sweep(&blobs, None, &opts, Some(&out)).unwrap();
    rp.compare_values(8.0, result.jobs.len() as f64, 0.0);

    // Jobs come back in (sequence, threshold) order
    let first = &result.jobs[0];
    rp.check(first.folder == "ball", "first sequence is ball");
    rp.check(first.footprints == vec![Footprint::Ball; 2], "two ball steps");
    rp.check(first.threshold == Threshold::Single(1.0), "first threshold");
    eprintln!("  ball components per step: {:?}", first.component_counts);
    rp.compare_values(2.0, first.component_counts[0] as f64, 0.0);
    rp.compare_values(2.0, first.seeds.len() as f64, 0.0);
    rp.compare_values(28.0, first.seeds[0].label_indices(1).len() as f64, 0.0);

    // Files on disk match the in-memory labels
    let path = out.join("ball").join(sweep_file_name(1, &Threshold::Single(1.0)));
    rp.check(path.exists(), "label volume written");
    if let Ok(saved) = read_volume_file::<u32>(&path) {
        rp.compare_volumes(&first.seeds[0], &saved);
    }
    let logs = std::fs::read_dir(out.join("ball"))
        .map(|entries| {
            entries
                .filter_map(Result::ok)
                .filter(|e| e.file_name().to_string_lossy().starts_with("seed_log_"))
                .count()
        })
        .unwrap_or(0);
    rp.compare_values(2.0, logs as f64, 0.0);

    // Worker count does not change the jobs
    let serial = run_sweep(&blobs, None, &opts.clone().with_num_threads(1), None).unwrap();
    for (a, b) in serial.jobs.iter().zip(&result.jobs) {
        rp.check(a.folder == b.folder && a.threshold == b.threshold, "same job order");
        rp.check(a.component_counts == b.component_counts, "same counts");
    }

    // Explicit mixed sequence
    let opts = SweepOptions::new(vec![Threshold::Single(1.0)], 2, 10).with_footprints(vec![
        FootprintSpec::PerIteration(vec!["ball_XY".into(), "ball".into()]),
    ]);
    let result = run_sweep(&blobs, None, &opts, None).unwrap();
    rp.compare_values(1.0, result.jobs.len() as f64, 0.0);
    rp.check(result.jobs[0].folder == "ball_XY-ball", "sequence folder name");
    rp.check(result.jobs[0].seeds.is_empty(), "labels not kept by default");

    assert!(rp.cleanup());
}
