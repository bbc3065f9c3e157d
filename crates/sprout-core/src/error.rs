//! Error types for sprout-core
//!
//! Provides a unified error type for all operations in the core crate.
//! Each variant captures enough context for diagnostics without exposing
//! internal storage details.

use crate::volume::Shape;
use thiserror::Error;

/// Sprout core error type
#[derive(Error, Debug)]
pub enum Error {
    /// A volume extent is zero
    #[error("invalid volume dimensions: {depth}x{height}x{width}")]
    InvalidDimension {
        depth: usize,
        height: usize,
        width: usize,
    },

    /// Only 2D and 3D volumes are supported
    #[error("unsupported dimensionality: {0} (expected 2 or 3)")]
    UnsupportedDimensionality(usize),

    /// Two volumes that must share a shape do not
    #[error("shape mismatch: expected {expected}, got {actual}")]
    ShapeMismatch { expected: Shape, actual: Shape },

    /// Sample buffer length does not match the shape
    #[error("data length mismatch: shape holds {expected} voxels, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// Index out of bounds
    #[error("index out of bounds: {index} >= {len}")]
    IndexOutOfBounds { index: usize, len: usize },

    /// Lower threshold is not strictly below the upper threshold
    #[error("invalid threshold range: lower {lower} must be smaller than upper {upper}")]
    InvalidRange { lower: f64, upper: f64 },

    /// Invalid parameter value
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
}

/// Result type alias for sprout-core operations
pub type Result<T> = std::result::Result<T, Error>;
