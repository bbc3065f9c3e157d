//! Volume - The main voxel container
//!
//! The `Volume` structure is the fundamental array type of the seed
//! generator. It holds a 2D or 3D grid of samples of one [`Voxel`] type.
//!
//! # Voxel layout
//!
//! - Axis order is `(z, y, x)`
//! - Samples are stored row-major with `x` varying fastest
//! - A 2D volume has `depth == 1` and reports `ndim() == 2`
//!
//! # Ownership model
//!
//! `Volume` uses `Arc` for cheap cloning (shared ownership).
//! To modify samples, convert to `VolumeMut` via [`Volume::try_into_mut`]
//! or [`Volume::to_mut`], then convert back with `Into<Volume>`.

mod access;
pub mod mask;

use crate::error::{Error, Result};
use crate::voxel::Voxel;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Extent of a 2D or 3D volume
///
/// A 2D shape is stored with a unit depth so that every algorithm can walk
/// `(z, y, x)` uniformly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    ndim: usize,
    depth: usize,
    height: usize,
    width: usize,
}

impl Shape {
    /// Create a 2D shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if either extent is 0.
    pub fn new_2d(height: usize, width: usize) -> Result<Self> {
        if height == 0 || width == 0 {
            return Err(Error::InvalidDimension {
                depth: 1,
                height,
                width,
            });
        }
        Ok(Self {
            ndim: 2,
            depth: 1,
            height,
            width,
        })
    }

    /// Create a 3D shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidDimension`] if any extent is 0.
    pub fn new_3d(depth: usize, height: usize, width: usize) -> Result<Self> {
        if depth == 0 || height == 0 || width == 0 {
            return Err(Error::InvalidDimension {
                depth,
                height,
                width,
            });
        }
        Ok(Self {
            ndim: 3,
            depth,
            height,
            width,
        })
    }

    /// Create a shape from a dimension list (`[h, w]` or `[d, h, w]`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedDimensionality`] for any other length.
    pub fn from_dims(dims: &[usize]) -> Result<Self> {
        match *dims {
            [h, w] => Self::new_2d(h, w),
            [d, h, w] => Self::new_3d(d, h, w),
            _ => Err(Error::UnsupportedDimensionality(dims.len())),
        }
    }

    /// Number of dimensions (2 or 3).
    #[inline]
    pub fn ndim(&self) -> usize {
        self.ndim
    }

    /// Whether this is a 3D shape.
    #[inline]
    pub fn is_3d(&self) -> bool {
        self.ndim == 3
    }

    /// Extent along z (1 for 2D shapes).
    #[inline]
    pub fn depth(&self) -> usize {
        self.depth
    }

    /// Extent along y.
    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Extent along x.
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Total number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.depth * self.height * self.width
    }

    /// Always false: shapes have non-zero extents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Dimension list in the same form accepted by [`Shape::from_dims`].
    pub fn dims(&self) -> Vec<usize> {
        if self.is_3d() {
            vec![self.depth, self.height, self.width]
        } else {
            vec![self.height, self.width]
        }
    }

    /// Linear index of `(z, y, x)`. Coordinates must be in range.
    #[inline]
    pub fn index(&self, z: usize, y: usize, x: usize) -> usize {
        (z * self.height + y) * self.width + x
    }

    /// Coordinates `(z, y, x)` of a linear index.
    #[inline]
    pub fn coords(&self, index: usize) -> (usize, usize, usize) {
        let plane = self.height * self.width;
        let z = index / plane;
        let rem = index % plane;
        (z, rem / self.width, rem % self.width)
    }

    /// Linear index of `(z, y, x)` displaced by `(dz, dy, dx)`, or `None`
    /// when the displaced position falls outside the volume.
    #[inline]
    pub fn offset(
        &self,
        z: usize,
        y: usize,
        x: usize,
        dz: isize,
        dy: isize,
        dx: isize,
    ) -> Option<usize> {
        let nz = z.checked_add_signed(dz)?;
        let ny = y.checked_add_signed(dy)?;
        let nx = x.checked_add_signed(dx)?;
        if nz < self.depth && ny < self.height && nx < self.width {
            Some(self.index(nz, ny, nx))
        } else {
            None
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_3d() {
            write!(f, "{}x{}x{}", self.depth, self.height, self.width)
        } else {
            write!(f, "{}x{}", self.height, self.width)
        }
    }
}

/// Internal volume data
#[derive(Debug)]
struct VolumeData<T> {
    shape: Shape,
    data: Vec<T>,
}

/// Volume - immutable, shared voxel container
///
/// # Examples
///
/// ```
/// use sprout_core::{Shape, Volume};
///
/// let shape = Shape::new_3d(4, 8, 8).unwrap();
/// let vol: Volume<u16> = Volume::new(shape);
/// assert_eq!(vol.len(), 256);
/// assert_eq!(vol.get(3, 7, 7), Some(0));
/// ```
#[derive(Debug, Clone)]
pub struct Volume<T> {
    inner: Arc<VolumeData<T>>,
}

/// Mutable volume
///
/// Created with [`Volume::try_into_mut`] or [`Volume::to_mut`]; converted
/// back with `Into<Volume>`.
#[derive(Debug)]
pub struct VolumeMut<T> {
    inner: VolumeData<T>,
}

impl<T: Voxel> Volume<T> {
    /// Create a volume filled with the default sample value.
    pub fn new(shape: Shape) -> Self {
        Self::filled(shape, T::default())
    }

    /// Create a volume filled with `value`.
    pub fn filled(shape: Shape, value: T) -> Self {
        Volume {
            inner: Arc::new(VolumeData {
                shape,
                data: vec![value; shape.len()],
            }),
        }
    }

    /// Wrap an existing sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLength`] if `data.len()` does not match `shape`.
    pub fn from_vec(shape: Shape, data: Vec<T>) -> Result<Self> {
        if data.len() != shape.len() {
            return Err(Error::DataLength {
                expected: shape.len(),
                actual: data.len(),
            });
        }
        Ok(Volume {
            inner: Arc::new(VolumeData { shape, data }),
        })
    }

    /// Create a volume by evaluating `f(z, y, x)` at every voxel.
    pub fn from_fn(shape: Shape, mut f: impl FnMut(usize, usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(shape.len());
        for z in 0..shape.depth() {
            for y in 0..shape.height() {
                for x in 0..shape.width() {
                    data.push(f(z, y, x));
                }
            }
        }
        Volume {
            inner: Arc::new(VolumeData { shape, data }),
        }
    }

    /// Get the shape.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.inner.shape
    }

    /// Get the number of dimensions.
    #[inline]
    pub fn ndim(&self) -> usize {
        self.inner.shape.ndim()
    }

    /// Get the number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Always false: volumes have non-zero extents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Get raw access to the samples.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.inner.data
    }

    /// Get the number of strong references to this volume.
    #[inline]
    pub fn ref_count(&self) -> usize {
        Arc::strong_count(&self.inner)
    }

    /// Check that `other` has the same shape.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ShapeMismatch`] otherwise.
    pub fn check_same_shape<U>(&self, other: &Volume<U>) -> Result<()> {
        if self.inner.shape != other.inner.shape {
            return Err(Error::ShapeMismatch {
                expected: self.inner.shape,
                actual: other.inner.shape,
            });
        }
        Ok(())
    }

    /// Create a new volume of another sample type by mapping every sample.
    pub fn map<U: Voxel>(&self, f: impl Fn(T) -> U) -> Volume<U> {
        Volume {
            inner: Arc::new(VolumeData {
                shape: self.inner.shape,
                data: self.inner.data.iter().map(|&v| f(v)).collect(),
            }),
        }
    }

    /// Try to convert into a mutable volume without copying.
    ///
    /// Succeeds only when this is the sole reference; otherwise the volume
    /// is handed back unchanged.
    pub fn try_into_mut(self) -> std::result::Result<VolumeMut<T>, Self> {
        match Arc::try_unwrap(self.inner) {
            Ok(data) => Ok(VolumeMut { inner: data }),
            Err(arc) => Err(Volume { inner: arc }),
        }
    }

    /// Create a mutable copy of this volume.
    pub fn to_mut(&self) -> VolumeMut<T> {
        VolumeMut {
            inner: VolumeData {
                shape: self.inner.shape,
                data: self.inner.data.clone(),
            },
        }
    }
}

impl<T: Voxel> VolumeMut<T> {
    /// Create a mutable volume filled with the default sample value.
    pub fn new(shape: Shape) -> Self {
        VolumeMut {
            inner: VolumeData {
                shape,
                data: vec![T::default(); shape.len()],
            },
        }
    }

    /// Get the shape.
    #[inline]
    pub fn shape(&self) -> Shape {
        self.inner.shape
    }

    /// Get the number of voxels.
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.data.len()
    }

    /// Always false: volumes have non-zero extents.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.data.is_empty()
    }

    /// Get raw access to the samples.
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.inner.data
    }

    /// Get mutable access to the samples.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.inner.data
    }

    /// Set every sample to `value`.
    pub fn fill(&mut self, value: T) {
        self.inner.data.fill(value);
    }
}

impl<T: Voxel> From<VolumeMut<T>> for Volume<T> {
    fn from(volume: VolumeMut<T>) -> Self {
        Volume {
            inner: Arc::new(volume.inner),
        }
    }
}

impl<T: Voxel> PartialEq for Volume<T> {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
            || (self.inner.shape == other.inner.shape && self.inner.data == other.inner.data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shape_2d() {
        let shape = Shape::new_2d(4, 5).unwrap();
        assert_eq!(shape.ndim(), 2);
        assert_eq!(shape.depth(), 1);
        assert_eq!(shape.len(), 20);
        assert_eq!(shape.dims(), vec![4, 5]);
        assert_eq!(shape.to_string(), "4x5");
    }

    #[test]
    fn test_shape_invalid() {
        assert!(Shape::new_3d(0, 2, 2).is_err());
        assert!(Shape::new_2d(3, 0).is_err());
        assert!(matches!(
            Shape::from_dims(&[1, 2, 3, 4]),
            Err(Error::UnsupportedDimensionality(4))
        ));
    }

    #[test]
    fn test_index_coords_inverse() {
        let shape = Shape::new_3d(3, 4, 5).unwrap();
        for index in 0..shape.len() {
            let (z, y, x) = shape.coords(index);
            assert_eq!(shape.index(z, y, x), index);
        }
    }

    #[test]
    fn test_offset_bounds() {
        let shape = Shape::new_3d(2, 2, 2).unwrap();
        assert_eq!(shape.offset(0, 0, 0, 0, 0, -1), None);
        assert_eq!(shape.offset(0, 0, 0, 1, 1, 1), Some(7));
        assert_eq!(shape.offset(1, 1, 1, 1, 0, 0), None);
    }

    #[test]
    fn test_try_into_mut_unique() {
        let vol: Volume<u8> = Volume::new(Shape::new_2d(2, 2).unwrap());
        let mut vm = vol.try_into_mut().unwrap();
        vm.data_mut()[3] = 9;
        let vol: Volume<u8> = vm.into();
        assert_eq!(vol.data(), &[0, 0, 0, 9]);
    }

    #[test]
    fn test_try_into_mut_shared() {
        let vol: Volume<u8> = Volume::new(Shape::new_2d(2, 2).unwrap());
        let other = vol.clone();
        assert_eq!(vol.ref_count(), 2);
        let back = vol.try_into_mut().unwrap_err();
        assert_eq!(back, other);
    }

    #[test]
    fn test_from_vec_length_checked() {
        let shape = Shape::new_2d(2, 3).unwrap();
        assert!(Volume::from_vec(shape, vec![0u16; 5]).is_err());
        assert!(Volume::from_vec(shape, vec![0u16; 6]).is_ok());
    }

    #[test]
    fn test_from_fn_and_map() {
        let shape = Shape::new_3d(2, 2, 2).unwrap();
        let vol = Volume::from_fn(shape, |z, y, x| (z * 4 + y * 2 + x) as u16);
        assert_eq!(vol.data(), &[0, 1, 2, 3, 4, 5, 6, 7]);
        let mask = vol.map(|v| v >= 4);
        assert_eq!(mask.data().iter().filter(|&&b| b).count(), 4);
    }
}
