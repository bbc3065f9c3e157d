//! SPROUT - Split-tracking seed generation for volumetric segmentation
//!
//! Seeds are found by eroding (or re-thresholding) a foreground mask step by
//! step and following each component as it breaks apart. The result is one
//! label per separable object, ready to drive a region-growing pass.
//!
//! # Overview
//!
//! - [`Volume`] storage, thresholds and boundary exclusion (core)
//! - Erosion footprints ([`morph`])
//! - Component labeling, renumbering and hull measures ([`region`])
//! - Compressed volume files and history tables ([`io`])
//! - The adaptive controller and the erosion sweep ([`seed`])
//!
//! # Example
//!
//! ```
//! use sprout::{Shape, Threshold, Volume};
//! use sprout::seed::{NullSink, SeedOptions, make_adaptive_seeds};
//!
//! let shape = Shape::new_2d(9, 17).unwrap();
//! let image = Volume::from_fn(shape, |_, y, x| {
//!     let square = (2..7).contains(&y) && ((1..6).contains(&x) || (11..16).contains(&x));
//!     let bridge = y == 4 && (6..11).contains(&x);
//!     if square || bridge { 50u8 } else { 0 }
//! });
//! let options = SeedOptions::erosion(Threshold::Single(10.0), 1, 5).with_footprint("disk");
//! let run = make_adaptive_seeds(&image, None, options, &mut NullSink).unwrap();
//! assert_eq!(run.final_count, 2);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use sprout_core::*;

// Re-export domain crates as modules to avoid name conflicts
pub use sprout_io as io;
pub use sprout_morph as morph;
pub use sprout_region as region;
pub use sprout_seed as seed;
