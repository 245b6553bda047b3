//! Point cloud loss.

use burn::prelude::*;

/// Pairwise squared distances between two batched point sets.
///
/// Uses |x|² + |y|² - 2 x·y and clamps the small negatives rounding leaves.
///
/// Inputs: a of shape [batch, N, 3], b of shape [batch, M, 3]
/// Output: distances of shape [batch, N, M]
pub fn pairwise_squared_distances<B: Backend>(a: Tensor<B, 3>, b: Tensor<B, 3>) -> Tensor<B, 3> {
    let [batch, n, _] = a.dims();
    let [_, m, _] = b.dims();

    let a_sq = (a.clone() * a.clone()).sum_dim(2).expand([batch, n, m]);
    let b_sq = (b.clone() * b.clone())
        .sum_dim(2)
        .swap_dims(1, 2)
        .expand([batch, n, m]);
    let cross = a.matmul(b.swap_dims(1, 2));

    (a_sq + b_sq - cross.mul_scalar(2.0)).clamp_min(0.0)
}

/// Symmetric chamfer distance averaged over the batch.
///
/// For each sample: mean over predicted points of the squared distance to
/// the nearest target point, plus the same from target to prediction.
///
/// Inputs: prediction [batch, N, 3], target [batch, M, 3]
/// Output: scalar loss of shape [1]
pub fn chamfer_loss<B: Backend>(prediction: Tensor<B, 3>, target: Tensor<B, 3>) -> Tensor<B, 1> {
    let distances = pairwise_squared_distances(prediction, target);
    let forward = distances.clone().min_dim(2).mean();
    let backward = distances.min_dim(1).mean();
    forward + backward
}
