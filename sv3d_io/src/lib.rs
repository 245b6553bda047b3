//! sv3d_io - file formats and dataset layout for single-view 3D evaluation.
//!
//! This crate turns files on disk into the geometry types of `sv3d_core`:
//!
//! - [`format`]: numpy `.npy` arrays (voxel grids, point clouds, predictions)
//! - [`layout`]: the one-directory-per-object dataset layout
//! - [`view`]: view images decoded to normalized CHW buffers
//!
//! # Example
//!
//! ```no_run
//! use sv3d_io::{index_objects, load_point_cloud, load_view, POINT_FILE, VIEW_FILE};
//!
//! let index = index_objects("data/shapenet", &[VIEW_FILE, POINT_FILE])?;
//! for entry in &index.entries {
//!     let view = load_view(entry.file(VIEW_FILE), 137)?;
//!     let cloud = load_point_cloud(entry.file(POINT_FILE))?;
//!     println!("{}: {:?} view, {} points", entry.id, view.shape(), cloud.len());
//! }
//! # Ok::<(), sv3d_io::Sv3dIoError>(())
//! ```

pub mod error;
pub mod format;
pub mod layout;
pub mod view;

pub use sv3d_core::{Point3, VoxelGrid};

pub use error::{Result, Sv3dIoError};
pub use format::{
    load_npy, load_point_cloud, load_voxel_grid, read_npy, save_npy, write_npy, NpyArray,
    NpyDtype, NpyHeader,
};
pub use layout::{index_objects, DatasetIndex, ObjectEntry, POINT_FILE, VIEW_FILE, VOXEL_FILE};
pub use view::{load_view, view_from_rgb, ViewImage};
