//! MLP (Multi-Layer Perceptron) building blocks.

use burn::config::Config;
use burn::module::Module;
use burn::nn::{Linear, LinearConfig, Relu};
use burn::prelude::*;

use super::params::{push_linear, NamedParam};

/// Configuration for an MLP.
#[derive(Config, Debug)]
pub struct MlpConfig {
    /// Input dimension.
    pub input_dim: usize,
    /// Output dimension.
    pub output_dim: usize,
    /// Hidden layer dimensions.
    #[config(default = "vec![]")]
    pub hidden_dims: Vec<usize>,
}

impl MlpConfig {
    /// Initialize the MLP.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Mlp<B> {
        let mut layers = Vec::new();
        let mut in_dim = self.input_dim;

        for &out_dim in &self.hidden_dims {
            layers.push(LinearConfig::new(in_dim, out_dim).init(device));
            in_dim = out_dim;
        }

        Mlp {
            layers,
            output: LinearConfig::new(in_dim, self.output_dim).init(device),
            activation: Relu::new(),
        }
    }
}

/// Multi-Layer Perceptron with ReLU between layers and a linear output.
#[derive(Module, Debug)]
pub struct Mlp<B: Backend> {
    layers: Vec<Linear<B>>,
    output: Linear<B>,
    activation: Relu,
}

impl<B: Backend> Mlp<B> {
    /// Forward pass.
    ///
    /// Input shape: [batch, input_dim]
    /// Output shape: [batch, output_dim]
    pub fn forward(&self, mut x: Tensor<B, 2>) -> Tensor<B, 2> {
        for layer in &self.layers {
            x = self.activation.forward(layer.forward(x));
        }
        self.output.forward(x)
    }

    /// Append the parameters under `prefix`.
    pub fn collect_params(&self, prefix: &str, out: &mut Vec<NamedParam<B>>) {
        for (idx, layer) in self.layers.iter().enumerate() {
            push_linear(out, &format!("{}.layers.{}", prefix, idx), layer);
        }
        push_linear(out, &format!("{}.output", prefix), &self.output);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray<f32>;

    #[test]
    fn test_mlp_shapes() {
        let device = Default::default();
        let mlp: Mlp<TestBackend> = MlpConfig::new(8, 5)
            .with_hidden_dims(vec![16, 16])
            .init(&device);

        let x = Tensor::<TestBackend, 2>::zeros([3, 8], &device);
        assert_eq!(mlp.forward(x).dims(), [3, 5]);
    }
}
