//! # sv3d_core
//!
//! Pure geometry for single-view 3D reconstruction evaluation.
//!
//! This crate holds the math shared by the io and neural layers of the
//! workspace. It has no tensor or file dependencies.
//!
//! ## Modules
//!
//! - [`types`]: `Point3`, the dense `VoxelGrid` and point-buffer helpers
//! - [`chamfer`]: Brute-force nearest neighbour and symmetric chamfer distance
//! - [`view`]: Orthographic projection used when plotting reconstructions
//! - [`error`]: Error types
//!
//! ## Usage
//!
//! ```
//! use sv3d_core::prelude::*;
//!
//! let a = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 0.0, 0.0)];
//! let b = vec![Point3::new(0.0, 0.0, 0.1), Point3::new(1.0, 0.0, 0.1)];
//! let d = chamfer_distance(&a, &b).unwrap();
//! assert!((d - 0.02).abs() < 1e-6);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chamfer;
pub mod error;
pub mod types;
pub mod view;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::chamfer::{chamfer_distance, directed_chamfer, nearest_squared_distance};
    pub use crate::error::CoreError;
    pub use crate::types::{
        bounds, flatten_points, points_from_flat, Point3, VoxelGrid, OCCUPANCY_THRESHOLD,
    };
    pub use crate::view::{OrthoView, Projected};
}

pub use chamfer::{chamfer_distance, directed_chamfer, nearest_squared_distance};
pub use error::CoreError;
pub use types::{bounds, flatten_points, points_from_flat, Point3, VoxelGrid, OCCUPANCY_THRESHOLD};
pub use view::{OrthoView, Projected};
