//! Mask and label helpers
//!
//! Binary masks are `Volume<bool>`; label volumes are `Volume<u32>` with 0
//! reserved for background.

use super::{Volume, VolumeMut};
use crate::error::Result;
use std::collections::BTreeSet;

impl Volume<bool> {
    /// Count foreground voxels.
    pub fn count(&self) -> usize {
        self.data().iter().filter(|&&v| v).count()
    }

    /// Linear indices of all foreground voxels, in raster order.
    pub fn foreground_indices(&self) -> Vec<usize> {
        self.data()
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| v.then_some(i))
            .collect()
    }

    /// Voxel-wise logical AND.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`](crate::Error::ShapeMismatch) if the
    /// shapes differ.
    pub fn and(&self, other: &Volume<bool>) -> Result<Volume<bool>> {
        self.check_same_shape(other)?;
        let mut out = VolumeMut::new(self.shape());
        for ((o, &a), &b) in out.data_mut().iter_mut().zip(self.data()).zip(other.data()) {
            *o = a && b;
        }
        Ok(out.into())
    }
}

impl Volume<u32> {
    /// Mask of voxels carrying `label`.
    pub fn label_mask(&self, label: u32) -> Volume<bool> {
        self.map(|v| v == label)
    }

    /// Linear indices of voxels carrying `label`, in raster order.
    pub fn label_indices(&self, label: u32) -> Vec<usize> {
        self.data()
            .iter()
            .enumerate()
            .filter_map(|(i, &v)| (v == label).then_some(i))
            .collect()
    }

    /// Mask of all non-background voxels.
    pub fn foreground(&self) -> Volume<bool> {
        self.map(|v| v != 0)
    }

    /// Count non-background voxels.
    pub fn count_nonzero(&self) -> usize {
        self.data().iter().filter(|&&v| v != 0).count()
    }

    /// Sorted distinct non-zero labels.
    pub fn unique_labels(&self) -> Vec<u32> {
        let set: BTreeSet<u32> = self.data().iter().copied().filter(|&v| v != 0).collect();
        set.into_iter().collect()
    }

    /// Largest label present (0 for an all-background volume).
    pub fn max_label(&self) -> u32 {
        self.data().iter().copied().max().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use crate::volume::{Shape, Volume};

    #[test]
    fn test_bool_helpers() {
        let shape = Shape::new_2d(2, 3).unwrap();
        let a = Volume::from_vec(shape, vec![true, false, true, true, false, false]).unwrap();
        let b = Volume::from_vec(shape, vec![true, true, false, true, false, true]).unwrap();
        assert_eq!(a.count(), 3);
        assert_eq!(a.foreground_indices(), vec![0, 2, 3]);
        assert_eq!(a.and(&b).unwrap().foreground_indices(), vec![0, 3]);
    }

    #[test]
    fn test_label_helpers() {
        let shape = Shape::new_2d(2, 3).unwrap();
        let labels = Volume::from_vec(shape, vec![0u32, 4, 4, 0, 2, 9]).unwrap();
        assert_eq!(labels.unique_labels(), vec![2, 4, 9]);
        assert_eq!(labels.max_label(), 9);
        assert_eq!(labels.count_nonzero(), 4);
        assert_eq!(labels.label_indices(4), vec![1, 2]);
        assert_eq!(labels.label_mask(9).count(), 1);
    }

    #[test]
    fn test_empty_labels() {
        let labels: Volume<u32> = Volume::new(Shape::new_3d(2, 2, 2).unwrap());
        assert_eq!(labels.max_label(), 0);
        assert!(labels.unique_labels().is_empty());
    }
}
