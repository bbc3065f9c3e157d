//! sprout-io - Persistence for seed generation runs
//!
//! - [`svol`]: compressed label / intensity volume container
//! - [`table`]: delimited run-history tables
//! - [`params`]: JSON records and timestamped output names

mod error;
pub mod params;
pub mod svol;
pub mod table;

pub use error::{IoError, IoResult};
pub use params::{ensure_dir, read_json, timestamp, timestamped_name, write_json};
pub use svol::{
    AnyVolume, SvolHeader, read_any_file, read_any_from_bytes, read_header, read_volume,
    read_volume_file, read_volume_from_bytes, write_volume, write_volume_file,
    write_volume_to_bytes,
};
pub use table::DelimitedTable;
