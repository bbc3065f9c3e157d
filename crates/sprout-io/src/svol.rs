//! SVOL volume format
//!
//! A small self-describing container for label and intensity volumes. The
//! sample payload is zlib-compressed, so label volumes with long runs of
//! background stay small on disk.
//!
//! # Format layout
//!
//! ```text
//! Offset  Size  Field
//! ------  ----  -----
//! 0       4     "SVOL" magic bytes
//! 4       2     format version (u16, currently 1)
//! 6       1     sample type code (see `DType`)
//! 7       1     ndim (2 or 3)
//! 8       4     depth (u32, 1 for 2D)
//! 12      4     height (u32)
//! 16      4     width (u32)
//! 20      8     compressed payload size (u64)
//! 28      n     zlib stream of little-endian samples
//! ```
//!
//! All header integers are little-endian.

use crate::{IoError, IoResult};
use miniz_oxide::deflate::compress_to_vec_zlib;
use miniz_oxide::inflate::decompress_to_vec_zlib_with_limit;
use sprout_core::{DType, Shape, Volume, Voxel};
use std::fs;
use std::io::{Read, Write};
use std::path::Path;

const MAGIC: &[u8; 4] = b"SVOL";
const VERSION: u16 = 1;
const HEADER_LEN: usize = 28;
const COMPRESSION_LEVEL: u8 = 6;

/// Parsed SVOL header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SvolHeader {
    pub dtype: DType,
    pub shape: Shape,
    pub payload_len: u64,
}

/// A volume of any supported sample type, as read from disk
#[derive(Debug, Clone, PartialEq)]
pub enum AnyVolume {
    Bool(Volume<bool>),
    U8(Volume<u8>),
    U16(Volume<u16>),
    U32(Volume<u32>),
    I16(Volume<i16>),
    I32(Volume<i32>),
    F32(Volume<f32>),
    F64(Volume<f64>),
}

impl AnyVolume {
    /// Get the stored sample type.
    pub fn dtype(&self) -> DType {
        match self {
            AnyVolume::Bool(_) => DType::Bool,
            AnyVolume::U8(_) => DType::U8,
            AnyVolume::U16(_) => DType::U16,
            AnyVolume::U32(_) => DType::U32,
            AnyVolume::I16(_) => DType::I16,
            AnyVolume::I32(_) => DType::I32,
            AnyVolume::F32(_) => DType::F32,
            AnyVolume::F64(_) => DType::F64,
        }
    }

    /// Get the shape.
    pub fn shape(&self) -> Shape {
        match self {
            AnyVolume::Bool(v) => v.shape(),
            AnyVolume::U8(v) => v.shape(),
            AnyVolume::U16(v) => v.shape(),
            AnyVolume::U32(v) => v.shape(),
            AnyVolume::I16(v) => v.shape(),
            AnyVolume::I32(v) => v.shape(),
            AnyVolume::F32(v) => v.shape(),
            AnyVolume::F64(v) => v.shape(),
        }
    }

    /// Convert to a mask: every non-zero sample is foreground.
    pub fn to_mask(&self) -> Volume<bool> {
        match self {
            AnyVolume::Bool(v) => v.clone(),
            AnyVolume::U8(v) => v.map(|s| s != 0),
            AnyVolume::U16(v) => v.map(|s| s != 0),
            AnyVolume::U32(v) => v.map(|s| s != 0),
            AnyVolume::I16(v) => v.map(|s| s != 0),
            AnyVolume::I32(v) => v.map(|s| s != 0),
            AnyVolume::F32(v) => v.map(|s| s != 0.0),
            AnyVolume::F64(v) => v.map(|s| s != 0.0),
        }
    }
}

/// Encode a volume to SVOL bytes.
pub fn write_volume_to_bytes<T: Voxel>(volume: &Volume<T>) -> Vec<u8> {
    let shape = volume.shape();
    let mut raw = Vec::with_capacity(volume.len() * T::DTYPE.size());
    for &v in volume.data() {
        v.write_le(&mut raw);
    }
    let payload = compress_to_vec_zlib(&raw, COMPRESSION_LEVEL);

    let mut out = Vec::with_capacity(HEADER_LEN + payload.len());
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION.to_le_bytes());
    out.push(T::DTYPE.code());
    out.push(shape.ndim() as u8);
    out.extend_from_slice(&(shape.depth() as u32).to_le_bytes());
    out.extend_from_slice(&(shape.height() as u32).to_le_bytes());
    out.extend_from_slice(&(shape.width() as u32).to_le_bytes());
    out.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    out.extend_from_slice(&payload);
    out
}

/// Write a volume as SVOL to any writer.
pub fn write_volume<T: Voxel, W: Write>(volume: &Volume<T>, mut writer: W) -> IoResult<()> {
    writer.write_all(&write_volume_to_bytes(volume))?;
    Ok(())
}

/// Write a volume as an SVOL file.
pub fn write_volume_file<T: Voxel>(volume: &Volume<T>, path: impl AsRef<Path>) -> IoResult<()> {
    fs::write(path.as_ref(), write_volume_to_bytes(volume))?;
    log::debug!("wrote {} ({})", path.as_ref().display(), volume.shape());
    Ok(())
}

/// Parse only the SVOL header.
///
/// # Errors
///
/// Returns [`IoError::InvalidData`] for a short buffer, bad magic, unknown
/// version or invalid dimensions.
pub fn read_header(data: &[u8]) -> IoResult<SvolHeader> {
    if data.len() < HEADER_LEN {
        return Err(IoError::InvalidData(format!(
            "header needs {HEADER_LEN} bytes, got {}",
            data.len()
        )));
    }
    if &data[0..4] != MAGIC {
        return Err(IoError::InvalidData("bad magic".to_string()));
    }
    let version = u16::from_le_bytes([data[4], data[5]]);
    if version != VERSION {
        return Err(IoError::InvalidData(format!(
            "unsupported version {version}"
        )));
    }
    let dtype = DType::from_code(data[6])?;
    let ndim = data[7] as usize;
    let depth = read_u32(&data[8..12]) as usize;
    let height = read_u32(&data[12..16]) as usize;
    let width = read_u32(&data[16..20]) as usize;
    let shape = match ndim {
        2 if depth == 1 => Shape::new_2d(height, width)?,
        3 => Shape::new_3d(depth, height, width)?,
        _ => {
            return Err(IoError::InvalidData(format!(
                "bad dimensionality {ndim} with depth {depth}"
            )));
        }
    };
    let mut len = [0u8; 8];
    len.copy_from_slice(&data[20..28]);
    Ok(SvolHeader {
        dtype,
        shape,
        payload_len: u64::from_le_bytes(len),
    })
}

fn read_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(bytes);
    u32::from_le_bytes(buf)
}

fn decode_samples<T: Voxel>(header: &SvolHeader, data: &[u8]) -> IoResult<Volume<T>> {
    if header.dtype != T::DTYPE {
        return Err(IoError::DTypeMismatch {
            expected: T::DTYPE,
            found: header.dtype,
        });
    }
    let payload_end = HEADER_LEN
        .checked_add(header.payload_len as usize)
        .filter(|&end| end <= data.len())
        .ok_or_else(|| IoError::InvalidData("truncated payload".to_string()))?;

    let sample_size = T::DTYPE.size();
    let expected = header.shape.len() * sample_size;
    let raw = decompress_to_vec_zlib_with_limit(&data[HEADER_LEN..payload_end], expected)
        .map_err(|e| IoError::DecodeError(format!("{e:?}")))?;
    if raw.len() != expected {
        return Err(IoError::InvalidData(format!(
            "payload holds {} bytes, shape {} needs {expected}",
            raw.len(),
            header.shape
        )));
    }
    let samples = raw.chunks_exact(sample_size).map(T::read_le).collect();
    Ok(Volume::from_vec(header.shape, samples)?)
}

/// Decode SVOL bytes into a volume of a known sample type.
///
/// # Errors
///
/// Returns [`IoError::DTypeMismatch`] if the stored type is not `T`.
pub fn read_volume_from_bytes<T: Voxel>(data: &[u8]) -> IoResult<Volume<T>> {
    let header = read_header(data)?;
    decode_samples(&header, data)
}

/// Decode SVOL bytes, dispatching on the stored sample type.
pub fn read_any_from_bytes(data: &[u8]) -> IoResult<AnyVolume> {
    let header = read_header(data)?;
    Ok(match header.dtype {
        DType::Bool => AnyVolume::Bool(decode_samples(&header, data)?),
        DType::U8 => AnyVolume::U8(decode_samples(&header, data)?),
        DType::U16 => AnyVolume::U16(decode_samples(&header, data)?),
        DType::U32 => AnyVolume::U32(decode_samples(&header, data)?),
        DType::I16 => AnyVolume::I16(decode_samples(&header, data)?),
        DType::I32 => AnyVolume::I32(decode_samples(&header, data)?),
        DType::F32 => AnyVolume::F32(decode_samples(&header, data)?),
        DType::F64 => AnyVolume::F64(decode_samples(&header, data)?),
    })
}

/// Read an SVOL volume of a known sample type from any reader.
pub fn read_volume<T: Voxel, R: Read>(mut reader: R) -> IoResult<Volume<T>> {
    let mut data = Vec::new();
    reader.read_to_end(&mut data)?;
    read_volume_from_bytes(&data)
}

/// Read an SVOL file of a known sample type.
pub fn read_volume_file<T: Voxel>(path: impl AsRef<Path>) -> IoResult<Volume<T>> {
    read_volume_from_bytes(&fs::read(path)?)
}

/// Read an SVOL file of any sample type.
pub fn read_any_file(path: impl AsRef<Path>) -> IoResult<AnyVolume> {
    read_any_from_bytes(&fs::read(path)?)
}
