//! Error types for sprout-morph

use thiserror::Error;

/// Errors that can occur during morphological operations
#[derive(Debug, Error)]
pub enum MorphError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] sprout_core::Error),

    /// Footprint name not in the supported set
    #[error("unsupported footprint: {0}")]
    UnsupportedFootprint(String),

    /// Footprint dimensionality does not match the mask
    #[error("footprint {footprint} needs a {expected}D mask, got {actual}D")]
    DimensionMismatch {
        footprint: &'static str,
        expected: usize,
        actual: usize,
    },
}

/// Result type for morphological operations
pub type MorphResult<T> = Result<T, MorphError>;
