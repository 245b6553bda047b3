//! Decoder heads mapping a latent vector to a 3D reconstruction.

mod point;
mod voxel;

pub use point::PointDecoder;
pub use voxel::VoxelDecoder;
