//! Occupancy loss.

use burn::prelude::*;

/// Probabilities are clamped to `[EPS, 1 - EPS]` before taking logs.
pub const BCE_EPS: f32 = 1e-6;

/// Binary cross-entropy between occupancy probabilities and a target grid.
///
/// L = -mean(t * ln(p) + (1 - t) * ln(1 - p))
///
/// Inputs: prediction and target of shape [batch, D, D, D]
/// Output: scalar loss of shape [1]
pub fn voxel_loss<B: Backend>(prediction: Tensor<B, 4>, target: Tensor<B, 4>) -> Tensor<B, 1> {
    let p = prediction.clamp(BCE_EPS, 1.0 - BCE_EPS);
    let positive = target.clone() * p.clone().log();
    let negative = target.neg().add_scalar(1.0) * p.neg().add_scalar(1.0).log();
    (positive + negative).neg().mean()
}
