//! Point cloud decoder.

use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::tanh;

use crate::nn::mlp::{Mlp, MlpConfig};
use crate::nn::params::NamedParam;

/// Decodes a latent vector into `N` points inside the unit cube `[-1, 1]^3`.
#[derive(Module, Debug)]
pub struct PointDecoder<B: Backend> {
    mlp: Mlp<B>,
    #[module(skip)]
    n_points: usize,
}

impl<B: Backend> PointDecoder<B> {
    /// Create a decoder producing `n_points` points.
    pub fn new(latent_dim: usize, hidden_dim: usize, n_points: usize, device: &B::Device) -> Self {
        let mlp = MlpConfig::new(latent_dim, n_points * 3)
            .with_hidden_dims(vec![hidden_dim, hidden_dim])
            .init(device);
        Self { mlp, n_points }
    }

    /// Number of points produced per sample.
    pub fn n_points(&self) -> usize {
        self.n_points
    }

    /// Forward pass.
    ///
    /// Input: latent of shape [batch, latent_dim]
    /// Output: coordinates of shape [batch, N, 3]
    pub fn forward(&self, latent: Tensor<B, 2>) -> Tensor<B, 3> {
        let [batch, _] = latent.dims();
        tanh(self.mlp.forward(latent)).reshape([batch, self.n_points, 3])
    }

    /// Append the parameters under `prefix`.
    pub fn collect_params(&self, prefix: &str, out: &mut Vec<NamedParam<B>>) {
        self.mlp.collect_params(&format!("{}.mlp", prefix), out);
    }
}
