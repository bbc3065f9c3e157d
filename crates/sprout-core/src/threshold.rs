//! Intensity thresholding
//!
//! Builds the foreground mask from an intensity volume. A threshold is either
//! single-sided (`value >= low`) or double-sided (`low <= value <= high`).
//! An optional boundary mask forces voxels to background wherever it is set.

use crate::error::{Error, Result};
use crate::volume::{Volume, VolumeMut};
use crate::voxel::Voxel;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Intensity threshold
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Threshold {
    /// Foreground is `value >= low`
    Single(f64),
    /// Foreground is `low <= value <= high`
    Ranged(f64, f64),
}

impl Threshold {
    /// Create a threshold from a lower bound and an optional upper bound.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] if `upper` is given and `lower >= upper`.
    pub fn new(lower: f64, upper: Option<f64>) -> Result<Self> {
        match upper {
            None => Ok(Threshold::Single(lower)),
            Some(upper) if lower < upper => Ok(Threshold::Ranged(lower, upper)),
            Some(upper) => Err(Error::InvalidRange { lower, upper }),
        }
    }

    /// Re-check the ordering invariant (useful after deserialization).
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRange`] for a ranged threshold with
    /// `lower >= upper`.
    pub fn validate(&self) -> Result<()> {
        match *self {
            Threshold::Ranged(lower, upper) if lower >= upper => {
                Err(Error::InvalidRange { lower, upper })
            }
            _ => Ok(()),
        }
    }

    /// Lower bound.
    pub fn lower(&self) -> f64 {
        match *self {
            Threshold::Single(low) | Threshold::Ranged(low, _) => low,
        }
    }

    /// Upper bound, if any.
    pub fn upper(&self) -> Option<f64> {
        match *self {
            Threshold::Single(_) => None,
            Threshold::Ranged(_, high) => Some(high),
        }
    }

    /// Whether `value` is foreground under this threshold.
    #[inline]
    pub fn contains(&self, value: f64) -> bool {
        match *self {
            Threshold::Single(low) => value >= low,
            Threshold::Ranged(low, high) => value >= low && value <= high,
        }
    }

    /// Name fragment used in output file names: `"{low}_{high}"`, with
    /// `None` for a missing upper bound.
    pub fn label(&self) -> String {
        match *self {
            Threshold::Single(low) => format!("{low}_None"),
            Threshold::Ranged(low, high) => format!("{low}_{high}"),
        }
    }
}

impl fmt::Display for Threshold {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Threshold::Single(low) => write!(f, ">= {low}"),
            Threshold::Ranged(low, high) => write!(f, "[{low}, {high}]"),
        }
    }
}

/// Threshold an intensity volume into a binary mask.
pub fn threshold_volume<T: Voxel>(volume: &Volume<T>, threshold: &Threshold) -> Volume<bool> {
    volume.map(|v| threshold.contains(v.to_f64()))
}

/// Force mask voxels to background wherever `boundary` is set.
///
/// # Errors
///
/// Returns [`Error::ShapeMismatch`] if the shapes differ.
pub fn exclude_boundary(mask: Volume<bool>, boundary: &Volume<bool>) -> Result<Volume<bool>> {
    mask.check_same_shape(boundary)?;
    let mut out: VolumeMut<bool> = match mask.try_into_mut() {
        Ok(m) => m,
        Err(shared) => shared.to_mut(),
    };
    for (m, &b) in out.data_mut().iter_mut().zip(boundary.data()) {
        if b {
            *m = false;
        }
    }
    Ok(out.into())
}

/// Threshold, then apply the optional boundary exclusion.
///
/// # Errors
///
/// Returns [`Error::InvalidRange`] for a malformed threshold or
/// [`Error::ShapeMismatch`] if the boundary has a different shape.
pub fn foreground_mask<T: Voxel>(
    volume: &Volume<T>,
    threshold: &Threshold,
    boundary: Option<&Volume<bool>>,
) -> Result<Volume<bool>> {
    threshold.validate()?;
    let mask = threshold_volume(volume, threshold);
    match boundary {
        Some(boundary) => exclude_boundary(mask, boundary),
        None => Ok(mask),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::volume::Shape;

    #[test]
    fn test_threshold_new() {
        assert_eq!(Threshold::new(3.0, None).unwrap(), Threshold::Single(3.0));
        assert_eq!(
            Threshold::new(3.0, Some(5.0)).unwrap(),
            Threshold::Ranged(3.0, 5.0)
        );
        assert!(matches!(
            Threshold::new(5.0, Some(5.0)),
            Err(Error::InvalidRange { .. })
        ));
        assert!(Threshold::Ranged(9.0, 1.0).validate().is_err());
    }

    #[test]
    fn test_contains_inclusive() {
        let t = Threshold::Ranged(2.0, 4.0);
        assert!(!t.contains(1.0));
        assert!(t.contains(2.0));
        assert!(t.contains(4.0));
        assert!(!t.contains(4.5));
        assert!(Threshold::Single(2.0).contains(1000.0));
    }

    #[test]
    fn test_label() {
        assert_eq!(Threshold::Single(150.0).label(), "150_None");
        assert_eq!(Threshold::Ranged(150.0, 300.0).label(), "150_300");
        assert_eq!(Threshold::Ranged(0.5, 1.5).label(), "0.5_1.5");
    }

    #[test]
    fn test_foreground_mask_with_boundary() {
        let shape = Shape::new_2d(1, 5).unwrap();
        let vol = Volume::from_vec(shape, vec![1u8, 5, 6, 7, 9]).unwrap();
        let boundary =
            Volume::from_vec(shape, vec![false, false, true, false, false]).unwrap();
        let mask =
            foreground_mask(&vol, &Threshold::Ranged(5.0, 7.0), Some(&boundary)).unwrap();
        assert_eq!(mask.data(), &[false, true, false, true, false]);
    }

    #[test]
    fn test_exclude_boundary_shape_mismatch() {
        let mask: Volume<bool> = Volume::new(Shape::new_2d(2, 2).unwrap());
        let boundary: Volume<bool> = Volume::new(Shape::new_2d(2, 3).unwrap());
        assert!(matches!(
            exclude_boundary(mask, &boundary),
            Err(Error::ShapeMismatch { .. })
        ));
    }
}
