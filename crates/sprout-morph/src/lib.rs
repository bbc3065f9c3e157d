//! sprout-morph - Binary morphology for volumes
//!
//! This crate provides:
//!
//! - [`Footprint`] selectors for radius-1 structuring elements
//! - Binary erosion of 2D and 3D masks: [`erode`], [`erode_n`],
//!   [`erode_sequence`]

pub mod binary;
mod error;
pub mod footprint;

pub use binary::{erode, erode_n, erode_sequence};
pub use error::{MorphError, MorphResult};
pub use footprint::{Footprint, Offset};
