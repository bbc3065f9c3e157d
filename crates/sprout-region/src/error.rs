//! Error types for sprout-region

use thiserror::Error;

/// Errors that can occur during region processing operations
#[derive(Debug, Error)]
pub enum RegionError {
    /// Core library error
    #[error("core error: {0}")]
    Core(#[from] sprout_core::Error),

    /// Too few points to span a hull of the required dimensionality
    #[error("convex hull needs at least {needed} points, got {got}")]
    InsufficientHullPoints { needed: usize, got: usize },

    /// Invalid parameters
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

/// Result type for region operations
pub type RegionResult<T> = Result<T, RegionError>;
