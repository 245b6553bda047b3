//! NPY file format support.
//!
//! This module provides reading and writing of numpy `.npy` arrays, the
//! on-disk format for ground-truth voxel grids, point clouds and saved
//! predictions.
//!
//! # Example
//!
//! ```no_run
//! use sv3d_io::format::{load_npy, save_npy};
//!
//! save_npy("prediction.npy", &[2, 3], &[0.0, 1.0, 2.0, 3.0, 4.0, 5.0])?;
//! let array = load_npy("prediction.npy")?;
//! assert_eq!(array.shape, vec![2, 3]);
//! # Ok::<(), sv3d_io::Sv3dIoError>(())
//! ```

pub mod header;
pub mod npy;

pub use header::{NpyDtype, NpyHeader, HEADER_ALIGN, NPY_MAGIC};
pub use npy::{
    load_npy, load_point_cloud, load_voxel_grid, read_npy, save_npy, write_npy, NpyArray,
};
