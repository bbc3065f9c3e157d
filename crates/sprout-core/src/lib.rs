//! Sprout Core - Basic data structures for seed generation
//!
//! This crate provides the fundamental data structures used throughout
//! the SPROUT seed generator:
//!
//! - [`Volume`] / [`VolumeMut`] - 2D/3D voxel container (immutable / mutable)
//! - [`Shape`] - Volume extent in `(z, y, x)` order
//! - [`Voxel`] / [`DType`] - Scalar sample types
//! - [`Threshold`] - Single- or double-sided intensity threshold

pub mod error;
pub mod threshold;
pub mod volume;
pub mod voxel;

pub use error::{Error, Result};
pub use threshold::{Threshold, exclude_boundary, foreground_mask, threshold_volume};
pub use volume::{Shape, Volume, VolumeMut};
pub use voxel::{DType, Voxel};
