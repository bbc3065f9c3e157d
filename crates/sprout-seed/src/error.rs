//! Error types for sprout-seed

use thiserror::Error;

/// Errors that can occur while generating seeds
#[derive(Debug, Error)]
pub enum SeedError {
    /// Core library error (includes invalid threshold ranges)
    #[error("core error: {0}")]
    Core(#[from] sprout_core::Error),

    /// Morphology error (includes unsupported footprints)
    #[error("morphology error: {0}")]
    Morph(#[from] sprout_morph::MorphError),

    /// Region processing error
    #[error("region error: {0}")]
    Region(#[from] sprout_region::RegionError),

    /// Persistence error
    #[error("io error: {0}")]
    Io(#[from] sprout_io::IoError),

    /// A per-iteration footprint list has the wrong length
    #[error("footprint list has {actual} entries but {expected} erosion iterations are configured")]
    FootprintLengthMismatch { expected: usize, actual: usize },

    /// A split parent is not tracked under any root
    #[error("identity {parent} is not present in the ancestry map")]
    AncestryLookupFailure { parent: u32 },

    /// Invalid configuration value
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// YAML configuration could not be parsed
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yml::Error),

    /// The worker pool could not be created
    #[error("thread pool error: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    /// The run was driven past its final state
    #[error("run already finalized")]
    Finalized,
}

/// Result type for seed generation
pub type SeedResult<T> = Result<T, SeedError>;
