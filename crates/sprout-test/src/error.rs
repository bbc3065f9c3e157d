//! Error types for the test support crate

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TestError {
    /// A synthetic volume had an invalid shape
    #[error("failed to build synthetic volume: {0}")]
    Build(#[from] sprout_core::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type TestResult<T> = Result<T, TestError>;
