//! Convolutional encoder for single RGB views.

use burn::module::Module;
use burn::nn::conv::{Conv2d, Conv2dConfig};
use burn::nn::pool::{AdaptiveAvgPool2d, AdaptiveAvgPool2dConfig};
use burn::nn::{PaddingConfig2d, Relu};
use burn::prelude::*;

use crate::config::ModelConfig;
use crate::nn::params::{push_conv2d, NamedParam};

/// Stack of stride-2 3x3 convolutions followed by global average pooling.
///
/// Each convolution halves the spatial resolution, so any view size works.
#[derive(Module, Debug)]
pub struct ImageEncoder<B: Backend> {
    convs: Vec<Conv2d<B>>,
    pool: AdaptiveAvgPool2d,
    activation: Relu,
}

impl<B: Backend> ImageEncoder<B> {
    /// Create a new encoder from configuration.
    pub fn new(config: &ModelConfig, device: &B::Device) -> Self {
        let mut convs = Vec::with_capacity(config.encoder_channels.len());
        let mut in_channels = 3;

        for &out_channels in &config.encoder_channels {
            convs.push(
                Conv2dConfig::new([in_channels, out_channels], [3, 3])
                    .with_stride([2, 2])
                    .with_padding(PaddingConfig2d::Explicit(1, 1))
                    .init(device),
            );
            in_channels = out_channels;
        }

        Self {
            convs,
            pool: AdaptiveAvgPool2dConfig::new([1, 1]).init(),
            activation: Relu::new(),
        }
    }

    /// Forward pass.
    ///
    /// Input: images of shape [batch, 3, height, width]
    /// Output: latent tensor of shape [batch, latent_dim]
    pub fn forward(&self, images: Tensor<B, 4>) -> Tensor<B, 2> {
        let mut x = images;
        for conv in &self.convs {
            x = self.activation.forward(conv.forward(x));
        }

        let [batch, channels, _, _] = x.dims();
        self.pool.forward(x).reshape([batch, channels])
    }

    /// Append the parameters under `prefix`.
    pub fn collect_params(&self, prefix: &str, out: &mut Vec<NamedParam<B>>) {
        for (idx, conv) in self.convs.iter().enumerate() {
            push_conv2d(out, &format!("{}.convs.{}", prefix, idx), conv);
        }
    }
}
