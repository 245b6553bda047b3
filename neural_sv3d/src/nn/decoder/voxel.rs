//! Occupancy grid decoder.

use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::sigmoid;

use crate::nn::mlp::{Mlp, MlpConfig};
use crate::nn::params::NamedParam;

/// Decodes a latent vector into `[D, D, D]` occupancy probabilities.
#[derive(Module, Debug)]
pub struct VoxelDecoder<B: Backend> {
    mlp: Mlp<B>,
    #[module(skip)]
    size: usize,
}

impl<B: Backend> VoxelDecoder<B> {
    /// Create a decoder for a grid of side `size`.
    pub fn new(latent_dim: usize, hidden_dim: usize, size: usize, device: &B::Device) -> Self {
        let mlp = MlpConfig::new(latent_dim, size * size * size)
            .with_hidden_dims(vec![hidden_dim])
            .init(device);
        Self { mlp, size }
    }

    /// Grid side length.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Forward pass.
    ///
    /// Input: latent of shape [batch, latent_dim]
    /// Output: probabilities in (0, 1) of shape [batch, D, D, D]
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 4> {
        let [batch, _] = latent.dims();
        let d = self.size;
        sigmoid(self.mlp.forward(latent)).reshape([batch, d, d, d])
    }

    /// Append the parameters under `prefix`.
    pub fn collect_params(&self, prefix: &str, out: &mut Vec<NamedParam<B>>) {
        self.mlp.collect_params(&format!("{}.mlp", prefix), out);
    }
}
