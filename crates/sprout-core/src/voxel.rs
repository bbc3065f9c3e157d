//! Scalar sample types
//!
//! A [`Voxel`] is any scalar that can live in a [`Volume`](crate::Volume):
//! it can be compared against thresholds (through `f64`) and serialized as
//! little-endian bytes with a stable [`DType`] tag.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Sample type tag stored in serialized volumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum DType {
    /// Boolean mask, one byte per voxel
    Bool = 0,
    /// Unsigned 8-bit
    U8 = 1,
    /// Unsigned 16-bit
    U16 = 2,
    /// Unsigned 32-bit (label volumes)
    U32 = 3,
    /// Signed 16-bit
    I16 = 4,
    /// Signed 32-bit
    I32 = 5,
    /// 32-bit float
    F32 = 6,
    /// 64-bit float
    F64 = 7,
}

impl DType {
    /// Create a `DType` from its serialized tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameter`] for an unknown tag.
    pub fn from_code(code: u8) -> Result<Self> {
        match code {
            0 => Ok(DType::Bool),
            1 => Ok(DType::U8),
            2 => Ok(DType::U16),
            3 => Ok(DType::U32),
            4 => Ok(DType::I16),
            5 => Ok(DType::I32),
            6 => Ok(DType::F32),
            7 => Ok(DType::F64),
            _ => Err(Error::InvalidParameter(format!(
                "unknown sample type code {code}"
            ))),
        }
    }

    /// Get the serialized tag.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Get the number of bytes per sample.
    pub fn size(self) -> usize {
        match self {
            DType::Bool | DType::U8 => 1,
            DType::U16 | DType::I16 => 2,
            DType::U32 | DType::I32 | DType::F32 => 4,
            DType::F64 => 8,
        }
    }

    /// Get a short lowercase name (`"u16"`, `"f32"`, ...).
    pub fn name(self) -> &'static str {
        match self {
            DType::Bool => "bool",
            DType::U8 => "u8",
            DType::U16 => "u16",
            DType::U32 => "u32",
            DType::I16 => "i16",
            DType::I32 => "i32",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }
}

/// A scalar sample type usable in volumes
pub trait Voxel: Copy + Default + PartialEq + Send + Sync + std::fmt::Debug + 'static {
    /// Serialized sample type tag
    const DTYPE: DType;

    /// Convert to `f64` for threshold comparison.
    fn to_f64(self) -> f64;

    /// Append the little-endian encoding of this sample.
    fn write_le(self, out: &mut Vec<u8>);

    /// Decode a sample from exactly `DTYPE.size()` little-endian bytes.
    ///
    /// # Panics
    ///
    /// Panics if `bytes.len() != DTYPE.size()`.
    fn read_le(bytes: &[u8]) -> Self;
}

macro_rules! impl_voxel {
    ($t:ty, $dtype:expr) => {
        impl Voxel for $t {
            const DTYPE: DType = $dtype;

            #[inline]
            fn to_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn write_le(self, out: &mut Vec<u8>) {
                out.extend_from_slice(&self.to_le_bytes());
            }

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                let mut buf = [0u8; std::mem::size_of::<$t>()];
                buf.copy_from_slice(bytes);
                <$t>::from_le_bytes(buf)
            }
        }
    };
}

impl_voxel!(u8, DType::U8);
impl_voxel!(u16, DType::U16);
impl_voxel!(u32, DType::U32);
impl_voxel!(i16, DType::I16);
impl_voxel!(i32, DType::I32);
impl_voxel!(f32, DType::F32);
impl_voxel!(f64, DType::F64);

impl Voxel for bool {
    const DTYPE: DType = DType::Bool;

    #[inline]
    fn to_f64(self) -> f64 {
        if self { 1.0 } else { 0.0 }
    }

    #[inline]
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(u8::from(self));
    }

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] != 0
    }
}
