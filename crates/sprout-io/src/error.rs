//! I/O error types
//!
//! Provides a unified error type for all persistence operations. Codec,
//! JSON and filesystem failures are mapped into `IoError` variants so that
//! callers only need to handle one error type.

use sprout_core::DType;
use thiserror::Error;

/// Error type for persistence operations.
#[derive(Error, Debug)]
pub enum IoError {
    /// Standard I/O error (file not found, permission denied, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not a volume container or is structurally invalid
    #[error("invalid volume data: {0}")]
    InvalidData(String),

    /// The stored sample type differs from the requested one
    #[error("sample type mismatch: expected {expected:?}, found {found:?}")]
    DTypeMismatch { expected: DType, found: DType },

    /// The compressed payload could not be decoded
    #[error("decode error: {0}")]
    DecodeError(String),

    /// JSON serialization or parsing failed
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// An error from the core library (e.g. invalid shape)
    #[error("core error: {0}")]
    Core(#[from] sprout_core::Error),
}

/// Convenience alias for I/O results.
pub type IoResult<T> = Result<T, IoError>;
