//! Voxel access functions
//!
//! Coordinate-based getters and setters for [`Volume`] and [`VolumeMut`].
//! Coordinates are always `(z, y, x)`; 2D volumes use `z == 0`.

use super::{Volume, VolumeMut};
use crate::error::{Error, Result};
use crate::voxel::Voxel;

impl<T: Voxel> Volume<T> {
    /// Get a sample at `(z, y, x)`.
    ///
    /// Returns `None` if coordinates are out of bounds.
    pub fn get(&self, z: usize, y: usize, x: usize) -> Option<T> {
        let shape = self.shape();
        if z < shape.depth() && y < shape.height() && x < shape.width() {
            Some(self.data()[shape.index(z, y, x)])
        } else {
            None
        }
    }

    /// Get a sample by linear index.
    #[inline]
    pub fn get_linear(&self, index: usize) -> Option<T> {
        self.data().get(index).copied()
    }
}

impl<T: Voxel> VolumeMut<T> {
    /// Get a sample at `(z, y, x)`.
    pub fn get(&self, z: usize, y: usize, x: usize) -> Option<T> {
        let shape = self.shape();
        if z < shape.depth() && y < shape.height() && x < shape.width() {
            Some(self.data()[shape.index(z, y, x)])
        } else {
            None
        }
    }

    /// Set a sample at `(z, y, x)`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if coordinates are out of bounds.
    pub fn set(&mut self, z: usize, y: usize, x: usize, value: T) -> Result<()> {
        let shape = self.shape();
        if z >= shape.depth() || y >= shape.height() || x >= shape.width() {
            return Err(Error::IndexOutOfBounds {
                index: z * shape.height() * shape.width() + y * shape.width() + x,
                len: shape.len(),
            });
        }
        let index = shape.index(z, y, x);
        self.data_mut()[index] = value;
        Ok(())
    }

    /// Set a sample by linear index.
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] if `index >= len`.
    pub fn set_linear(&mut self, index: usize, value: T) -> Result<()> {
        let len = self.len();
        match self.data_mut().get_mut(index) {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(Error::IndexOutOfBounds { index, len }),
        }
    }
}
