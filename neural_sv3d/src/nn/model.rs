//! Single-view to 3D reconstruction network.

use burn::module::Module;
use burn::prelude::*;

use super::decoder::{PointDecoder, VoxelDecoder};
use super::encoder::ImageEncoder;
use super::params::NamedParam;
use crate::config::{EvalConfig, Representation};
use crate::error::{ConfigError, EvalError, Result};
use crate::reconstruction::Reconstruction;

/// Image encoder followed by exactly one decoder head.
///
/// The head is chosen by the run's representation; the other slot stays
/// empty so checkpoints only hold the weights that are used.
#[derive(Module, Debug)]
pub struct SingleViewTo3D<B: Backend> {
    encoder: ImageEncoder<B>,
    voxel_head: Option<VoxelDecoder<B>>,
    point_head: Option<PointDecoder<B>>,
}

impl<B: Backend> SingleViewTo3D<B> {
    /// Build the network for a run.
    pub fn new(config: &EvalConfig, device: &B::Device) -> Result<Self> {
        let encoder = ImageEncoder::new(&config.model, device);
        let latent_dim = config.model.latent_dim();
        let hidden_dim = config.model.hidden_dim;

        let (voxel_head, point_head) = match config.dtype {
            Representation::Voxel => (
                Some(VoxelDecoder::new(latent_dim, hidden_dim, config.voxel_size, device)),
                None,
            ),
            Representation::Point => (
                None,
                Some(PointDecoder::new(latent_dim, hidden_dim, config.n_points, device)),
            ),
            Representation::Mesh => {
                return Err(ConfigError::Unsupported(Representation::Mesh).into());
            }
        };

        Ok(Self {
            encoder,
            voxel_head,
            point_head,
        })
    }

    /// Representation this network predicts.
    pub fn representation(&self) -> Representation {
        if self.voxel_head.is_some() {
            Representation::Voxel
        } else {
            Representation::Point
        }
    }

    /// Every learnable tensor, named by field path, in a fixed order.
    pub fn parameters(&self) -> Vec<NamedParam<B>> {
        let mut out = Vec::new();
        self.encoder.collect_params("encoder", &mut out);
        if let Some(head) = &self.voxel_head {
            head.collect_params("voxel_head", &mut out);
        }
        if let Some(head) = &self.point_head {
            head.collect_params("point_head", &mut out);
        }
        out
    }

    /// Forward pass.
    ///
    /// Input: images of shape [batch, 3, height, width] with values in [0, 1]
    pub fn forward(&self, images: Tensor<B, 4>) -> Result<Reconstruction<B>> {
        let [_, channels, _, _] = images.dims();
        if channels != 3 {
            return Err(EvalError::ShapeMismatch {
                expected: vec![3],
                got: vec![channels],
            });
        }

        let latent = self.encoder.forward(images);
        match (&self.voxel_head, &self.point_head) {
            (Some(head), _) => Ok(Reconstruction::Voxel(head.forward(latent))),
            (None, Some(head)) => Ok(Reconstruction::Point(head.forward(latent))),
            (None, None) => Err(EvalError::Data("model has no decoder head".to_string())),
        }
    }
}
