//! Label volume post-processing
//!
//! Size filtering and dense renumbering of label volumes. Renumbering only
//! changes label values; the set of voxels carrying each label is preserved.

use sprout_core::{Volume, VolumeMut};
use std::collections::BTreeMap;

/// Voxel count of every non-zero label.
pub fn component_sizes(labels: &Volume<u32>) -> BTreeMap<u32, usize> {
    let mut sizes = BTreeMap::new();
    for &l in labels.data() {
        if l != 0 {
            *sizes.entry(l).or_insert(0) += 1;
        }
    }
    sizes
}

/// Set labels with fewer than `min_size` voxels to background.
pub fn remove_small(labels: &Volume<u32>, min_size: usize) -> Volume<u32> {
    let sizes = component_sizes(labels);
    labels.map(|l| match sizes.get(&l) {
        Some(&n) if n >= min_size => l,
        _ => 0,
    })
}

/// Mapping from old label to new label, ordered by descending size.
///
/// Ties keep ascending old-label order. New labels start at 1.
pub fn size_order_mapping(labels: &Volume<u32>) -> BTreeMap<u32, u32> {
    let mut by_size: Vec<(u32, usize)> = component_sizes(labels).into_iter().collect();
    by_size.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    by_size
        .into_iter()
        .enumerate()
        .map(|(rank, (old, _))| (old, rank as u32 + 1))
        .collect()
}

/// Renumber labels densely 1..N by descending size.
pub fn renumber_by_size(labels: &Volume<u32>) -> Volume<u32> {
    let mapping = size_order_mapping(labels);
    let mut out = VolumeMut::<u32>::new(labels.shape());
    for (o, &l) in out.data_mut().iter_mut().zip(labels.data()) {
        if l != 0 {
            *o = mapping.get(&l).copied().unwrap_or(0);
        }
    }
    out.into()
}

/// Drop labels below `min_size`, then optionally renumber by size.
///
/// # Returns
///
/// The finalized volume and the number of labels it contains.
pub fn reorder(labels: &Volume<u32>, min_size: usize, sort: bool) -> (Volume<u32>, usize) {
    let filtered = remove_small(labels, min_size);
    let out = if sort {
        renumber_by_size(&filtered)
    } else {
        filtered
    };
    let count = component_sizes(&out).len();
    (out, count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sprout_core::Shape;

    fn labels() -> Volume<u32> {
        let shape = Shape::new_2d(2, 5).unwrap();
        Volume::from_vec(shape, vec![7, 7, 0, 3, 3, 3, 9, 0, 5, 5]).unwrap()
    }

    #[test]
    fn test_component_sizes() {
        let sizes = component_sizes(&labels());
        assert_eq!(sizes.get(&3), Some(&3));
        assert_eq!(sizes.get(&7), Some(&2));
        assert_eq!(sizes.get(&9), Some(&1));
        assert_eq!(sizes.get(&0), None);
    }

    #[test]
    fn test_remove_small() {
        let out = remove_small(&labels(), 2);
        assert_eq!(out.unique_labels(), vec![3, 5, 7]);
    }

    #[test]
    fn test_renumber_by_size_ties() {
        let out = renumber_by_size(&labels());
        // 3 (size 3) -> 1, then 5 and 7 (size 2) in label order, then 9
        assert_eq!(out.data(), &[3, 3, 0, 1, 1, 1, 4, 0, 2, 2]);
    }

    #[test]
    fn test_reorder_unsorted_keeps_ids() {
        let (out, n) = reorder(&labels(), 2, false);
        assert_eq!(n, 3);
        assert_eq!(out.get(0, 0, 0), Some(7));
    }
}
