//! Adaptive seed regression test
//!
//! Runs the split-tracking controller on synthetic volumes with known
//! structure: a sphere that never splits, a bridged pair that splits once,
//! and the same pair with the size and hull gates closed.
//!
//! Run with:
//! ```
//! cargo test -p sprout-seed --test seed_reg
//! ```

use sprout_core::{Shape, Threshold, Volume};
use sprout_seed::{
    Bounds, MemorySink, NullSink, RunState, SeedController, SeedOptions, StepKey,
    make_adaptive_seeds,
};
use sprout_test::{RegParams, builders};

fn blob_options(n_iters: usize) -> SeedOptions {
    SeedOptions::erosion(Threshold::Single(100.0), n_iters, 10)
}

#[test]
fn seed_sphere_reg() {
    let mut rp = RegParams::new("seed_sphere");
    let sphere = builders::sphere(21, 8.0).unwrap();

    // Early stop after 3 quiet steps
    let opts = SeedOptions::erosion(Threshold::Single(100.0), 5, 5).with_no_split_limit(3);
    let run = make_adaptive_seeds(&sphere, None, opts, &mut NullSink).unwrap();
    eprintln!("  limit 3: {:?} after {} steps", run.state, run.steps_run);
    rp.check(run.state == RunState::Converged, "limit 3 converges");
    rp.compare_values(3.0, run.steps_run as f64, 0.0);
    rp.compare_values(1.0, run.final_count as f64, 0.0);
    rp.compare_values(4.0, run.history.len() as f64, 0.0);

    // Limit equal to the budget stops at the last step
    let opts = SeedOptions::erosion(Threshold::Single(100.0), 5, 5).with_no_split_limit(5);
    let run = make_adaptive_seeds(&sphere, None, opts, &mut NullSink).unwrap();
    rp.check(run.state == RunState::Converged, "limit 5 converges");
    rp.compare_values(5.0, run.steps_run as f64, 0.0);

    // Budget runs out first
    let opts = SeedOptions::erosion(Threshold::Single(100.0), 5, 5).with_no_split_limit(10);
    let run = make_adaptive_seeds(&sphere, None, opts, &mut NullSink).unwrap();
    rp.check(run.state == RunState::Exhausted, "large limit exhausts");
    rp.compare_values(5.0, run.steps_run as f64, 0.0);
    rp.compare_values(1.0, run.final_count as f64, 0.0);
    rp.compare_values(1.0, run.ancestry.identity_count() as f64, 0.0);

    assert!(rp.cleanup());
}

#[test]
fn seed_bridge_reg() {
    let mut rp = RegParams::new("seed_bridge");
    let blobs = builders::bridged_blobs().unwrap();

    let mut sink = MemorySink::new();
    let opts = blob_options(1)
        .with_save_every_iter(true)
        .with_save_merged_every_iter(true);
    let run = make_adaptive_seeds(&blobs, None, opts, &mut sink).unwrap();
    eprintln!("  bridge: {} seeds, ancestry {:?}", run.final_count, run.ancestry);
    rp.compare_values(2.0, run.final_count as f64, 0.0);
    rp.check(run.state == RunState::Exhausted, "single step exhausts");
    rp.compare_values(1.0, run.ancestry.len() as f64, 0.0);
    rp.check(run.ancestry.lineage(1) == Some(&[1, 2, 3][..]), "root 1 -> 1, 2, 3");

    let step = &run.history.records[1];
    rp.check(step.key == StepKey::Erosion(1), "step key");
    rp.compare_values(2.0, step.total_ids as f64, 0.0);
    rp.check(
        step.snapshot_name == "INTER_thre_100_None_ero_1.svol",
        "history names the component label file",
    );
    rp.compare_values(1.0, step.events.len() as f64, 0.0);
    let event = &step.events[0];
    rp.check(event.candidate_ids == vec![1, 2], "both halves intersect");
    rp.check(event.new_ids == vec![2, 3], "fresh identities");
    for &p in &event.proportions {
        rp.compare_values(11.0672, p, 1e-9);
    }

    // Equal sizes: ties keep identity order after renumbering
    rp.compare_values(28.0, run.seeds.label_indices(1).len() as f64, 0.0);
    rp.check(run.seeds.get(3, 3, 3) == Some(1), "left half is 1");
    rp.check(run.seeds.get(3, 3, 11) == Some(2), "right half is 2");

    rp.check(
        sink.volume("INTER_thre_100_None_ero_1.svol").is_some(),
        "component snapshot saved",
    );
    let merged = sink
        .volume("INTER_merged_Merged_seed_thre_100_None_ero_1ero_1.svol")
        .cloned();
    rp.check(merged.is_some(), "merged snapshot saved");
    if let Some(merged) = merged {
        rp.compare_volumes(&run.seeds, &merged);
    }
    rp.check(
        sink.volume("FINAL_Merged_seed_thre_100_None_ero_1_sorted.svol")
            .is_some(),
        "final volume saved",
    );
    rp.check(sink.json.contains_key("config.json"), "parameters saved");
    rp.check(
        sink.tables.keys().any(|k| k.starts_with("output_dict_")),
        "history table saved",
    );

    assert!(rp.cleanup());
}

#[test]
fn seed_gates_reg() {
    let mut rp = RegParams::new("seed_gates");
    let blobs = builders::bridged_blobs().unwrap();

    // Size gate below the 253-voxel reference
    let opts = blob_options(1).with_split_size_limit(Bounds(None, Some(100.0)));
    let run = make_adaptive_seeds(&blobs, None, opts, &mut NullSink).unwrap();
    rp.compare_values(1.0, run.final_count as f64, 0.0);
    rp.check(run.history.records[1].events.is_empty(), "no event when gated");

    // Hull of the pair is a 4 x 4 x 12 box
    let opts = blob_options(1).with_split_convex_hull_limit(Bounds(None, Some(100.0)));
    let run = make_adaptive_seeds(&blobs, None, opts, &mut NullSink).unwrap();
    rp.compare_values(1.0, run.final_count as f64, 0.0);

    let opts = blob_options(1).with_split_convex_hull_limit(Bounds(Some(150.0), Some(200.0)));
    let run = make_adaptive_seeds(&blobs, None, opts, &mut NullSink).unwrap();
    rp.compare_values(2.0, run.final_count as f64, 0.0);

    // Sum gate: the halves cover 22% of the reference
    let opts = blob_options(1).with_min_split_sum_prop(0.5);
    let run = make_adaptive_seeds(&blobs, None, opts, &mut NullSink).unwrap();
    rp.compare_values(1.0, run.final_count as f64, 0.0);

    // Per-candidate filter above both halves: event kept, seed kept
    let opts = blob_options(1).with_min_split_prop(0.2);
    let run = make_adaptive_seeds(&blobs, None, opts, &mut NullSink).unwrap();
    rp.compare_values(1.0, run.final_count as f64, 0.0);
    let events = &run.history.records[1].events;
    rp.compare_values(1.0, events.len() as f64, 0.0);
    rp.check(events[0].new_ids.is_empty(), "no survivors");
    rp.check(run.ancestry.lineage(1) == Some(&[1][..]), "ancestry untouched");

    assert!(rp.cleanup());
}

#[test]
fn seed_2d_reg() {
    let mut rp = RegParams::new("seed_2d");

    // Two 5x5 squares joined by a one-pixel bridge
    let shape = Shape::new_2d(9, 17).unwrap();
    let image = Volume::from_fn(shape, |_, y, x| {
        let in_y = (2..7).contains(&y);
        let square = in_y && ((1..6).contains(&x) || (11..16).contains(&x));
        let bridge = y == 4 && (6..11).contains(&x);
        if square || bridge { 50u8 } else { 0 }
    });
    let opts = SeedOptions::erosion(Threshold::Ranged(10.0, 60.0), 2, 5).with_footprint("default");
    let run = make_adaptive_seeds(&image, None, opts, &mut NullSink).unwrap();
    eprintln!("  2D: {} seeds after {} steps", run.final_count, run.steps_run);
    rp.compare_values(2.0, run.final_count as f64, 0.0);
    rp.check(run.history.records[1].has_split(), "split at the first step");

    assert!(rp.cleanup());
}

#[test]
fn seed_threshold_sweep_reg() {
    let mut rp = RegParams::new("seed_threshold_sweep");

    // Bright cubes joined by a dim bridge
    let shape = Shape::new_3d(7, 7, 15).unwrap();
    let image = Volume::from_fn(shape, |z, y, x| {
        let in_zy = (1..6).contains(&z) && (1..6).contains(&y);
        let cube = in_zy && ((1..6).contains(&x) || (9..14).contains(&x));
        let bridge = z == 3 && y == 3 && (6..9).contains(&x);
        if cube {
            200u16
        } else if bridge {
            100
        } else {
            0
        }
    });

    let opts = SeedOptions::threshold_sweep(
        vec![Threshold::Single(50.0), Threshold::Single(150.0)],
        0,
        10,
    )
    .with_save_every_iter(true)
    .with_save_merged_every_iter(true);
    let mut sink = MemorySink::new();
    let run = make_adaptive_seeds(&image, None, opts, &mut sink).unwrap();
    rp.compare_values(2.0, run.final_count as f64, 0.0);
    rp.check(run.state == RunState::Exhausted, "threshold list exhausted");
    rp.check(
        run.history.records[1].key == StepKey::Threshold(Threshold::Single(150.0)),
        "keyed by threshold",
    );
    rp.compare_values(125.0, run.seeds.label_indices(1).len() as f64, 0.0);
    rp.check(
        sink.volume("INTER_thre_150_ero_0.svol").is_some(),
        "component snapshot name",
    );
    rp.check(
        sink.volume("INTER_merged_Merged_seed_ero_0thre_150.svol")
            .is_some(),
        "merged snapshot name",
    );
    rp.check(
        sink.volume("FINAL_Merged_seed_ero_0_sorted.svol").is_some(),
        "final name",
    );

    assert!(rp.cleanup());
}

#[test]
fn seed_stepwise_reg() {
    let mut rp = RegParams::new("seed_stepwise");
    let field = builders::random_blobs(12, 40, 30, 7).unwrap();
    let opts = SeedOptions::erosion(Threshold::Single(120.0), 4, 0)
        .with_no_split_limit(10)
        .with_min_size(1);

    let mut ctl = SeedController::new(&field, None, opts).unwrap();
    let mut prev = ctl.merged().count_nonzero();
    let mut sink = NullSink;
    while ctl.state().can_step() {
        ctl.step(&mut sink).unwrap();
        let now = ctl.merged().count_nonzero();
        eprintln!("  step {}: {now} seed voxels", ctl.steps_run());
        rp.check(now <= prev, "seed foreground never grows");
        prev = now;

        let merged = ctl.merged();
        rp.check(!ctl.ancestry().contains(0), "0 is never tracked");
        rp.check(
            merged.unique_labels().iter().all(|&id| ctl.ancestry().contains(id)),
            "every live seed is tracked",
        );
    }
    let run = ctl.finalize(&mut sink).unwrap();
    rp.check(run.state == RunState::Exhausted, "no early stop with limit 10");

    // Identities are allocated once
    let mut all: Vec<u32> = run.ancestry.iter().flat_map(|(_, ids)| ids.to_vec()).collect();
    let n = all.len();
    all.sort_unstable();
    all.dedup();
    rp.compare_values(n as f64, all.len() as f64, 0.0);

    assert!(rp.cleanup());
}
