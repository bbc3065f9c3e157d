//! Connected component labeling
//!
//! Components are found with a breadth-first flood fill started from each
//! unvisited foreground voxel in raster order, so provisional labels follow
//! first encounter. [`label_largest`] then keeps the K biggest components
//! and renumbers them 1..K' by descending size.

use crate::error::RegionResult;
use serde::{Deserialize, Serialize};
use sprout_core::{Volume, VolumeMut};
use std::collections::VecDeque;

/// Connectivity type for component analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Connectivity {
    /// Face neighbors only (6 in 3D, 4 in 2D)
    Face,
    /// Face, edge and corner neighbors (26 in 3D, 8 in 2D)
    #[default]
    Full,
}

impl Connectivity {
    /// Neighbor offsets `(dz, dy, dx)` for a dimensionality.
    pub fn offsets(self, ndim: usize) -> Vec<(isize, isize, isize)> {
        let z_range = if ndim == 2 { 0isize..=0 } else { -1isize..=1 };
        let mut out = Vec::new();
        for dz in z_range {
            for dy in -1isize..=1 {
                for dx in -1isize..=1 {
                    let manhattan = dz.abs() + dy.abs() + dx.abs();
                    let keep = match self {
                        Connectivity::Face => manhattan == 1,
                        Connectivity::Full => manhattan > 0,
                    };
                    if keep {
                        out.push((dz, dy, dx));
                    }
                }
            }
        }
        out
    }
}

/// A connected component of a mask
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Component {
    /// Label in the labeling that produced it
    pub label: u32,
    /// Number of voxels
    pub voxel_count: usize,
    /// Linear index of the first voxel in raster order
    pub first_index: usize,
}

/// Label every connected component of a mask.
///
/// Labels are assigned 1, 2, ... in order of first encounter in raster scan.
///
/// # Returns
///
/// The label volume and one [`Component`] per label, in label order.
pub fn label_components(
    mask: &Volume<bool>,
    connectivity: Connectivity,
) -> (Volume<u32>, Vec<Component>) {
    let shape = mask.shape();
    let offsets = connectivity.offsets(shape.ndim());
    let src = mask.data();
    let mut out = VolumeMut::<u32>::new(shape);
    let labels = out.data_mut();
    let mut components = Vec::new();
    let mut queue = VecDeque::new();

    for start in 0..src.len() {
        if !src[start] || labels[start] != 0 {
            continue;
        }
        let label = components.len() as u32 + 1;
        labels[start] = label;
        queue.push_back(start);
        let mut count = 0usize;

        while let Some(idx) = queue.pop_front() {
            count += 1;
            let (z, y, x) = shape.coords(idx);
            for &(dz, dy, dx) in &offsets {
                if let Some(n) = shape.offset(z, y, x, dz, dy, dx)
                    && src[n]
                    && labels[n] == 0
                {
                    labels[n] = label;
                    queue.push_back(n);
                }
            }
        }

        components.push(Component {
            label,
            voxel_count: count,
            first_index: start,
        });
    }

    (out.into(), components)
}

/// Label the `max_components` largest connected components of a mask.
///
/// Retained components get labels 1..K' in descending size order; ties keep
/// raster first-encounter order. Every other foreground voxel becomes
/// background. `max_components == 0` keeps all components.
///
/// # Returns
///
/// The label volume and the number of retained components K'.
pub fn label_largest(
    mask: &Volume<bool>,
    max_components: usize,
    connectivity: Connectivity,
) -> RegionResult<(Volume<u32>, usize)> {
    let (provisional, mut components) = label_components(mask, connectivity);
    let mut remap = vec![0u32; components.len() + 1];

    components.sort_by(|a, b| b.voxel_count.cmp(&a.voxel_count).then(a.label.cmp(&b.label)));
    if max_components > 0 {
        components.truncate(max_components);
    }
    for (rank, comp) in components.iter().enumerate() {
        remap[comp.label as usize] = rank as u32 + 1;
    }

    let relabeled = provisional.map(|l| remap[l as usize]);
    Ok((relabeled, components.len()))
}

/// Count connected components without keeping the label volume.
pub fn count_components(mask: &Volume<bool>, connectivity: Connectivity) -> usize {
    label_components(mask, connectivity).1.len()
}
