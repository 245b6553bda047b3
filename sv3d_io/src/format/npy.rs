//! NPY array read/write.
//!
//! Arrays are decoded into `f32` regardless of the stored element type so
//! voxel occupancies (`|u1`, `|b1`) and coordinates (`<f4`, `<f8`) share one
//! code path. Writing always produces version 1.0 `<f4` C-ordered arrays.

use std::io::{Read, Write};
use std::path::Path;

use sv3d_core::{points_from_flat, Point3, VoxelGrid};

use super::header::{NpyDtype, NpyHeader, NPY_MAGIC};
use crate::error::{Result, Sv3dIoError};

/// A decoded array.
#[derive(Debug, Clone, PartialEq)]
pub struct NpyArray {
    /// Array shape.
    pub shape: Vec<usize>,
    /// Values in C order.
    pub data: Vec<f32>,
}

impl NpyArray {
    /// Create an array, checking that the data length matches the shape.
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> Result<Self> {
        check_len(&shape, data.len())?;
        Ok(Self { shape, data })
    }

    /// Number of dimensions.
    pub fn ndim(&self) -> usize {
        self.shape.len()
    }
}

/// Read an array from a reader.
pub fn read_npy<R: Read>(reader: &mut R) -> Result<NpyArray> {
    let mut magic = [0u8; 6];
    reader.read_exact(&mut magic)?;
    if magic != NPY_MAGIC {
        return Err(Sv3dIoError::InvalidFormat {
            message: "invalid magic bytes (expected \\x93NUMPY)".to_string(),
        });
    }

    let mut version = [0u8; 2];
    reader.read_exact(&mut version)?;
    let header_len = match NpyHeader::preamble_len(version[0])? {
        10 => {
            let mut len = [0u8; 2];
            reader.read_exact(&mut len)?;
            u16::from_le_bytes(len) as usize
        }
        _ => {
            let mut len = [0u8; 4];
            reader.read_exact(&mut len)?;
            u32::from_le_bytes(len) as usize
        }
    };

    let mut dict = vec![0u8; header_len];
    reader.read_exact(&mut dict)?;
    let dict = std::str::from_utf8(&dict).map_err(|_| Sv3dIoError::InvalidFormat {
        message: "header is not valid text".to_string(),
    })?;
    let header = NpyHeader::parse_dict(dict)?;

    if header.fortran_order && header.shape.iter().filter(|d| **d > 1).count() > 1 {
        return Err(Sv3dIoError::InvalidFormat {
            message: "fortran-ordered arrays are not supported".to_string(),
        });
    }

    let byte_len = header.data_len().ok_or_else(|| Sv3dIoError::InvalidFormat {
        message: format!("shape {:?} is too large", header.shape),
    })?;
    // The declared length is untrusted; grow with the bytes present.
    let mut bytes = Vec::new();
    reader.by_ref().take(byte_len as u64).read_to_end(&mut bytes)?;
    if bytes.len() != byte_len {
        return Err(Sv3dIoError::InvalidFormat {
            message: format!(
                "truncated payload: header declares {} bytes, found {}",
                byte_len,
                bytes.len()
            ),
        });
    }

    let data = decode(header.dtype, &bytes);
    Ok(NpyArray {
        shape: header.shape,
        data,
    })
}

fn check_len(shape: &[usize], len: usize) -> Result<()> {
    let expected = shape
        .iter()
        .try_fold(1usize, |acc, dim| acc.checked_mul(*dim));
    match expected {
        Some(expected) if expected == len => Ok(()),
        Some(expected) => Err(Sv3dIoError::LengthMismatch { expected, got: len }),
        None => Err(Sv3dIoError::InvalidFormat {
            message: format!("shape {:?} is too large", shape),
        }),
    }
}

fn decode(dtype: NpyDtype, bytes: &[u8]) -> Vec<f32> {
    match dtype {
        NpyDtype::U8 => bytes.iter().map(|b| *b as f32).collect(),
        NpyDtype::Bool => bytes.iter().map(|b| if *b != 0 { 1.0 } else { 0.0 }).collect(),
        NpyDtype::F32 => bytes
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        NpyDtype::I32 => bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]) as f32)
            .collect(),
        NpyDtype::F64 => bytes
            .chunks_exact(8)
            .map(|c| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(c);
                f64::from_le_bytes(arr) as f32
            })
            .collect(),
        NpyDtype::I64 => bytes
            .chunks_exact(8)
            .map(|c| {
                let mut arr = [0u8; 8];
                arr.copy_from_slice(c);
                i64::from_le_bytes(arr) as f32
            })
            .collect(),
    }
}

/// Write an `f32` array to a writer.
pub fn write_npy<W: Write>(writer: &mut W, shape: &[usize], data: &[f32]) -> Result<()> {
    check_len(shape, data.len())?;

    let header = NpyHeader::new(NpyDtype::F32, shape.to_vec());
    writer.write_all(&header.to_bytes())?;
    for value in data {
        writer.write_all(&value.to_le_bytes())?;
    }
    Ok(())
}

/// Load an array from a file path.
pub fn load_npy<P: AsRef<Path>>(path: P) -> Result<NpyArray> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(Sv3dIoError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let mut reader = std::io::BufReader::new(std::fs::File::open(path)?);
    read_npy(&mut reader)
}

/// Save an `f32` array to a file path, replacing any existing file.
pub fn save_npy<P: AsRef<Path>>(path: P, shape: &[usize], data: &[f32]) -> Result<()> {
    let mut writer = std::io::BufWriter::new(std::fs::File::create(path)?);
    write_npy(&mut writer, shape, data)?;
    writer.flush()?;
    Ok(())
}

/// Load a cubic `[D, D, D]` occupancy grid.
pub fn load_voxel_grid<P: AsRef<Path>>(path: P) -> Result<VoxelGrid> {
    let array = load_npy(path)?;
    let cubic = matches!(array.shape.as_slice(), [a, b, c] if a == b && b == c);
    if !cubic {
        return Err(Sv3dIoError::ShapeMismatch {
            expected: "[D, D, D]".to_string(),
            got: array.shape,
        });
    }
    let d = array.shape[0];
    Ok(VoxelGrid::new([d, d, d], array.data)?)
}

/// Load an `[N, 3]` point cloud.
pub fn load_point_cloud<P: AsRef<Path>>(path: P) -> Result<Vec<Point3>> {
    let array = load_npy(path)?;
    if !matches!(array.shape.as_slice(), [_, 3]) {
        return Err(Sv3dIoError::ShapeMismatch {
            expected: "[N, 3]".to_string(),
            got: array.shape,
        });
    }
    Ok(points_from_flat(&array.data)?)
}
