//! Binary erosion
//!
//! A voxel survives erosion when it and every in-bounds neighbor selected by
//! the footprint are foreground. Neighbors outside the volume are ignored, so
//! the volume border does not erode the mask.

use crate::error::MorphResult;
use crate::footprint::Footprint;
use sprout_core::{Volume, VolumeMut};

/// Erode a binary mask by one footprint step.
///
/// # Arguments
///
/// * `mask` - Binary mask (2D or 3D)
/// * `footprint` - Footprint selector; must support the mask dimensionality
///
/// # Returns
///
/// A new mask with the same shape.
///
/// # Errors
///
/// Returns [`MorphError::DimensionMismatch`](crate::MorphError::DimensionMismatch)
/// if the footprint does not apply to the mask.
pub fn erode(mask: &Volume<bool>, footprint: Footprint) -> MorphResult<Volume<bool>> {
    let shape = mask.shape();
    footprint.check_ndim(shape.ndim())?;

    let offsets = footprint.offsets();
    let src = mask.data();
    let mut out = VolumeMut::<bool>::new(shape);
    let dst = out.data_mut();

    for z in 0..shape.depth() {
        for y in 0..shape.height() {
            for x in 0..shape.width() {
                let idx = shape.index(z, y, x);
                if !src[idx] {
                    continue;
                }
                dst[idx] = offsets.iter().all(|&(dz, dy, dx)| {
                    shape
                        .offset(z, y, x, dz, dy, dx)
                        .is_none_or(|n| src[n])
                });
            }
        }
    }

    Ok(out.into())
}

/// Erode a mask `n` times with the same footprint.
///
/// `n == 0` returns the mask unchanged.
pub fn erode_n(mask: &Volume<bool>, footprint: Footprint, n: usize) -> MorphResult<Volume<bool>> {
    footprint.check_ndim(mask.ndim())?;
    let mut current = mask.clone();
    for _ in 0..n {
        current = erode(&current, footprint)?;
    }
    Ok(current)
}

/// Erode a mask once per footprint, in order.
pub fn erode_sequence(mask: &Volume<bool>, footprints: &[Footprint]) -> MorphResult<Volume<bool>> {
    for fp in footprints {
        fp.check_ndim(mask.ndim())?;
    }
    let mut current = mask.clone();
    for &fp in footprints {
        current = erode(&current, fp)?;
    }
    Ok(current)
}
