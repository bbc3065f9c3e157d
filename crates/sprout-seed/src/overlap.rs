//! Overlap evaluation between one reference identity and the components of
//! the next labeling
//!
//! Candidates are dealt round-robin to a fixed number of workers: worker `w`
//! takes list positions `w, w + W, w + 2W, ...`. Each worker scans the
//! reference voxels once, counts hits for its own candidates and sends its
//! findings back over a channel. The collector merges them after every
//! worker has finished, in candidate-list order, so the result does not
//! depend on the worker count or on scheduling.

use crate::error::SeedResult;
use rayon::{ThreadPool, ThreadPoolBuilder};
use sprout_core::Volume;
use std::collections::HashMap;
use std::sync::mpsc;

/// Intersection of one candidate with the reference
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Overlap {
    /// Candidate identity in the fresh labeling
    pub id: u32,
    /// Shared voxel count
    pub voxels: usize,
    /// `voxels / reference_voxels` rounded to 6 places, times 100
    pub proportion: f64,
}

/// Per-reference result of an evaluation
#[derive(Debug, Clone, PartialEq, Default)]
pub struct IntersectionLog {
    /// Voxel count of the reference identity
    pub reference_voxels: usize,
    /// Intersecting candidates in candidate-list order
    pub hits: Vec<Overlap>,
}

impl IntersectionLog {
    /// Number of intersecting candidates.
    pub fn count(&self) -> usize {
        self.hits.len()
    }

    pub fn ids(&self) -> Vec<u32> {
        self.hits.iter().map(|h| h.id).collect()
    }

    pub fn proportions(&self) -> Vec<f64> {
        self.hits.iter().map(|h| h.proportion).collect()
    }

    /// Sum of all candidate proportions.
    pub fn sum(&self) -> f64 {
        self.hits.iter().map(|h| h.proportion).sum()
    }
}

/// Overlap proportion in percent.
pub fn proportion(voxels: usize, reference_voxels: usize) -> f64 {
    if reference_voxels == 0 {
        return 0.0;
    }
    let ratio = voxels as f64 / reference_voxels as f64;
    (ratio * 1e6).round() / 1e6 * 100.0
}

/// Worker pool for overlap counting
pub struct OverlapEvaluator {
    pool: ThreadPool,
    workers: usize,
}

impl std::fmt::Debug for OverlapEvaluator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlapEvaluator")
            .field("workers", &self.workers)
            .finish()
    }
}

impl OverlapEvaluator {
    /// Create an evaluator with `workers` threads (at least one).
    pub fn new(workers: usize) -> SeedResult<Self> {
        let workers = workers.max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("sprout-overlap-{i}"))
            .build()?;
        Ok(Self { pool, workers })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Intersect one reference identity with a list of candidates.
    ///
    /// # Arguments
    ///
    /// * `reference` - Linear indices of the reference identity's voxels
    /// * `labels` - Fresh component labeling
    /// * `candidates` - Candidate identities to test
    pub fn evaluate(
        &self,
        reference: &[usize],
        labels: &Volume<u32>,
        candidates: &[u32],
    ) -> IntersectionLog {
        let reference_voxels = reference.len();
        let data = labels.data();
        let (tx, rx) = mpsc::channel::<Vec<(usize, usize)>>();

        self.pool.scope(|s| {
            for w in 0..self.workers.min(candidates.len()) {
                let tx = tx.clone();
                s.spawn(move |_| {
                    // candidate identity -> list position
                    let mine: HashMap<u32, usize> = candidates
                        .iter()
                        .enumerate()
                        .skip(w)
                        .step_by(self.workers)
                        .map(|(pos, &id)| (id, pos))
                        .collect();
                    let mut counts: HashMap<usize, usize> = HashMap::new();
                    for &idx in reference {
                        if let Some(&pos) = data.get(idx).and_then(|l| mine.get(l)) {
                            *counts.entry(pos).or_default() += 1;
                        }
                    }
                    // The receiver outlives the scope
                    let _ = tx.send(counts.into_iter().collect());
                });
            }
        });
        drop(tx);

        let mut found: Vec<(usize, usize)> = rx.into_iter().flatten().collect();
        found.sort_unstable();
        let hits = found
            .into_iter()
            .map(|(pos, voxels)| Overlap {
                id: candidates[pos],
                voxels,
                proportion: proportion(voxels, reference_voxels),
            })
            .collect();

        IntersectionLog {
            reference_voxels,
            hits,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::Shape;

    fn striped() -> Volume<u32> {
        // 1 row of 10: labels 1 1 2 2 2 3 3 0 4 4
        let shape = Shape::new_2d(1, 10).unwrap();
        Volume::from_vec(shape, vec![1, 1, 2, 2, 2, 3, 3, 0, 4, 4]).unwrap()
    }

    #[test]
    fn test_proportion_rounding() {
        assert!((proportion(1, 3) - 33.3333).abs() < 1e-9);
        assert_eq!(proportion(2, 4), 50.0);
        assert_eq!(proportion(0, 0), 0.0);
    }

    #[test]
    fn test_evaluate() {
        let labels = striped();
        let ev = OverlapEvaluator::new(2).unwrap();
        let log = ev.evaluate(&[1, 2, 3, 7], &labels, &[4, 3, 2, 1]);
        assert_eq!(log.reference_voxels, 4);
        assert_eq!(log.ids(), vec![2, 1]);
        assert_eq!(log.hits[0].voxels, 2);
        assert_eq!(log.proportions(), vec![50.0, 25.0]);
        assert_eq!(log.sum(), 75.0);
    }

    #[test]
    fn test_worker_count_invariance() {
        let labels = striped();
        let reference: Vec<usize> = (0..10).collect();
        let candidates = [1, 2, 3, 4, 5];
        let base = OverlapEvaluator::new(1)
            .unwrap()
            .evaluate(&reference, &labels, &candidates);
        for w in [2, 3, 5, 8] {
            let log = OverlapEvaluator::new(w)
                .unwrap()
                .evaluate(&reference, &labels, &candidates);
            assert_eq!(log, base, "workers = {w}");
        }
        assert_eq!(base.count(), 4);
    }

    #[test]
    fn test_no_candidates() {
        let ev = OverlapEvaluator::new(3).unwrap();
        let log = ev.evaluate(&[0, 1], &striped(), &[]);
        assert_eq!(log.count(), 0);
        assert_eq!(log.sum(), 0.0);
    }
}
