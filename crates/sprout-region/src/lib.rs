//! sprout-region - Region processing for seed generation
//!
//! This crate provides:
//!
//! - **Connected component labeling** - BFS labeling with a largest-K cap
//! - **Relabeling** - size filtering and dense size-ordered renumbering
//! - **Convex hull measures** - exact hull area / volume of voxel sets
//!
//! # Examples
//!
//! ```
//! use sprout_core::{Shape, Volume};
//! use sprout_region::{Connectivity, label_largest};
//!
//! let shape = Shape::new_2d(3, 5).unwrap();
//! let mask = Volume::from_fn(shape, |_, y, x| y == 1 && x != 2);
//! let (labels, n) = label_largest(&mask, 0, Connectivity::Full).unwrap();
//! assert_eq!(n, 2);
//! assert_eq!(labels.max_label(), 2);
//! ```

pub mod conncomp;
mod error;
pub mod hull;
pub mod relabel;

pub use conncomp::{Component, Connectivity, count_components, label_components, label_largest};
pub use error::{RegionError, RegionResult};
pub use hull::{convex_hull_measure, min_hull_points};
pub use relabel::{component_sizes, remove_small, renumber_by_size, reorder, size_order_mapping};
