//! Split acceptance gates
//!
//! A reference identity that overlaps several fresh components is split
//! only when every gate passes:
//!
//! 1. more than one intersecting candidate
//! 2. candidate proportion sum `>=` the split-sum threshold
//! 3. reference voxel count within the size bounds
//! 4. reference hull area / volume within the hull bounds
//!
//! Gates are checked in that order and stop at the first failure, so the
//! hull is only computed when it can change the outcome. Candidates of an
//! accepted split are then filtered by the per-candidate threshold.

use crate::options::{Bounds, SeedOptions};
use crate::overlap::{IntersectionLog, Overlap};
use log::{debug, warn};
use sprout_core::{Shape, Volume, VolumeMut};
use sprout_region::{RegionError, convex_hull_measure};

/// Outcome of the gates for one reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// At most one candidate intersects the reference
    NoSplit,
    /// Candidate proportions do not add up to the split-sum threshold
    BelowSumProportion,
    /// Reference voxel count outside the size bounds
    SizeOutOfBounds,
    /// Reference hull outside the hull bounds, or too few voxels for a hull
    HullOutOfBounds,
    /// Every gate passed
    Accepted,
}

impl Verdict {
    pub fn is_accepted(self) -> bool {
        self == Verdict::Accepted
    }
}

/// Gate result plus the candidates that survive the proportion filter
#[derive(Debug, Clone, PartialEq)]
pub struct SplitDecision {
    pub verdict: Verdict,
    /// Empty unless the split was accepted
    pub filtered: Vec<Overlap>,
}

/// Thresholds of the split gates, with proportions in percent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitPolicy {
    pub min_split_prop: f64,
    pub min_split_sum_prop: f64,
    pub size_limit: Bounds,
    pub hull_limit: Bounds,
}

impl SplitPolicy {
    /// Policy from run options; fractional thresholds become percentages.
    pub fn from_options(options: &SeedOptions) -> Self {
        Self {
            min_split_prop: options.min_split_prop * 100.0,
            min_split_sum_prop: options.min_split_sum_prop * 100.0,
            size_limit: options.split_size_limit,
            hull_limit: options.split_convex_hull_limit,
        }
    }

    pub fn size_gate(&self, reference_voxels: usize) -> bool {
        self.size_limit.contains(reference_voxels as f64)
    }

    /// Hull gate over a reference mask. Passes trivially when no hull
    /// bound is set; fails when the mask has too few voxels for a hull.
    pub fn hull_gate(&self, mask: &Volume<bool>) -> bool {
        if !self.hull_limit.is_active() {
            return true;
        }
        match convex_hull_measure(mask) {
            Ok(measure) => {
                let measure = measure.trunc();
                debug!("reference hull measure {measure}");
                self.hull_limit.contains(measure)
            }
            Err(RegionError::InsufficientHullPoints { needed, got }) => {
                warn!("hull needs {needed} voxels, reference has {got}; split gate fails");
                false
            }
            Err(e) => {
                warn!("hull computation failed: {e}; split gate fails");
                false
            }
        }
    }

    /// Candidates strictly above the per-candidate threshold.
    pub fn filter(&self, log: &IntersectionLog) -> Vec<Overlap> {
        log.hits
            .iter()
            .filter(|h| h.proportion > self.min_split_prop)
            .copied()
            .collect()
    }

    /// Run every gate for one reference.
    ///
    /// # Arguments
    ///
    /// * `log` - Overlaps of the reference with the fresh labeling
    /// * `reference` - Linear indices of the reference voxels
    /// * `shape` - Shape of the volumes the indices refer to
    pub fn decide(&self, log: &IntersectionLog, reference: &[usize], shape: Shape) -> SplitDecision {
        let verdict = if log.count() <= 1 {
            Verdict::NoSplit
        } else if log.sum() < self.min_split_sum_prop {
            Verdict::BelowSumProportion
        } else if !self.size_gate(log.reference_voxels) {
            Verdict::SizeOutOfBounds
        } else if !self.hull_gate(&indices_to_mask(reference, shape)) {
            Verdict::HullOutOfBounds
        } else {
            Verdict::Accepted
        };
        let filtered = if verdict.is_accepted() {
            self.filter(log)
        } else {
            Vec::new()
        };
        SplitDecision { verdict, filtered }
    }
}

/// Mask with exactly the given voxels set.
pub fn indices_to_mask(indices: &[usize], shape: Shape) -> Volume<bool> {
    let mut mask = VolumeMut::new(shape);
    let data = mask.data_mut();
    for &i in indices {
        if let Some(v) = data.get_mut(i) {
            *v = true;
        }
    }
    mask.into()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log_of(reference_voxels: usize, props: &[(u32, usize)]) -> IntersectionLog {
        IntersectionLog {
            reference_voxels,
            hits: props
                .iter()
                .map(|&(id, voxels)| Overlap {
                    id,
                    voxels,
                    proportion: crate::overlap::proportion(voxels, reference_voxels),
                })
                .collect(),
        }
    }

    fn policy() -> SplitPolicy {
        SplitPolicy::from_options(&SeedOptions::default())
    }

    fn cube_indices(shape: Shape, n: usize) -> Vec<usize> {
        let mut out = Vec::new();
        for z in 0..n {
            for y in 0..n {
                for x in 0..n {
                    out.push(shape.index(z, y, x));
                }
            }
        }
        out
    }

    #[test]
    fn test_percent_conversion() {
        let p = policy();
        assert_eq!(p.min_split_prop, 1.0);
        assert_eq!(p.min_split_sum_prop, 0.0);
    }

    #[test]
    fn test_single_candidate_is_no_split() {
        let shape = Shape::new_3d(4, 4, 4).unwrap();
        let refs = cube_indices(shape, 3);
        let d = policy().decide(&log_of(27, &[(1, 20)]), &refs, shape);
        assert_eq!(d.verdict, Verdict::NoSplit);
        assert!(d.filtered.is_empty());
    }

    #[test]
    fn test_accept_and_filter() {
        let shape = Shape::new_3d(4, 4, 4).unwrap();
        let refs = cube_indices(shape, 3);
        let mut p = policy();
        p.min_split_prop = 20.0;
        // 10/27 = 37%, 5/27 = 18.5%
        let d = p.decide(&log_of(27, &[(3, 10), (4, 5)]), &refs, shape);
        assert_eq!(d.verdict, Verdict::Accepted);
        assert_eq!(d.filtered.len(), 1);
        assert_eq!(d.filtered[0].id, 3);
    }

    #[test]
    fn test_filter_is_strict() {
        let p = SplitPolicy {
            min_split_prop: 50.0,
            ..policy()
        };
        let log = log_of(4, &[(1, 2), (2, 2)]);
        assert!(p.filter(&log).is_empty());
    }

    #[test]
    fn test_sum_gate() {
        let shape = Shape::new_3d(4, 4, 4).unwrap();
        let refs = cube_indices(shape, 3);
        let p = SplitPolicy {
            min_split_sum_prop: 50.0,
            ..policy()
        };
        let d = p.decide(&log_of(27, &[(1, 5), (2, 5)]), &refs, shape);
        assert_eq!(d.verdict, Verdict::BelowSumProportion);
    }

    #[test]
    fn test_size_gate() {
        let shape = Shape::new_3d(4, 4, 4).unwrap();
        let refs = cube_indices(shape, 3);
        let p = SplitPolicy {
            size_limit: Bounds(None, Some(26.0)),
            ..policy()
        };
        let d = p.decide(&log_of(27, &[(1, 5), (2, 5)]), &refs, shape);
        assert_eq!(d.verdict, Verdict::SizeOutOfBounds);
        assert!(p.size_gate(26));
    }

    #[test]
    fn test_hull_gate() {
        let shape = Shape::new_3d(4, 4, 4).unwrap();
        // 3x3x3 block of centres: hull volume 8
        let mask = indices_to_mask(&cube_indices(shape, 3), shape);
        let mut p = policy();
        assert!(p.hull_gate(&mask));
        p.hull_limit = Bounds(Some(8.0), Some(8.0));
        assert!(p.hull_gate(&mask));
        p.hull_limit = Bounds(Some(9.0), None);
        assert!(!p.hull_gate(&mask));

        // Three voxels cannot span a 3D hull
        let tiny = indices_to_mask(&[0, 1, 2], shape);
        p.hull_limit = Bounds(None, Some(100.0));
        assert!(!p.hull_gate(&tiny));
    }
}
