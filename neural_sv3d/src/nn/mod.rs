//! Neural network modules for single-view reconstruction.
//!
//! This module provides:
//! - Encoder: turns an RGB view into a latent vector
//! - Decoders: map the latent vector to an occupancy grid or a point cloud
//! - MLP building blocks shared by the decoders

pub mod decoder;
pub mod encoder;
pub mod mlp;
pub mod model;
pub mod params;

pub use decoder::{PointDecoder, VoxelDecoder};
pub use encoder::ImageEncoder;
pub use mlp::{Mlp, MlpConfig};
pub use model::SingleViewTo3D;
pub use params::NamedParam;
