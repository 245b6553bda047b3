//! Loss functions for reconstruction evaluation.
//!
//! This module provides:
//! - Voxel loss: binary cross-entropy on occupancy probabilities
//! - Chamfer loss: symmetric nearest-neighbour distance between point sets
//! - [`ReconstructionLoss`]: dispatch on the batch representation

mod chamfer;
mod voxel;

use burn::prelude::*;
use burn::tensor::ElementConversion;

pub use chamfer::{chamfer_loss, pairwise_squared_distances};
pub use voxel::{voxel_loss, BCE_EPS};

use crate::config::Representation;
use crate::error::{EvalError, Result};
use crate::reconstruction::Reconstruction;

/// Scalar loss between a prediction and its ground truth.
///
/// Stateless; build one per run and pass it where needed.
#[derive(Debug, Clone, Copy)]
pub struct ReconstructionLoss {
    representation: Representation,
}

impl ReconstructionLoss {
    /// Create a loss evaluator for a representation.
    pub fn new(representation: Representation) -> Self {
        Self { representation }
    }

    /// Representation this evaluator accepts.
    pub fn representation(&self) -> Representation {
        self.representation
    }

    /// Compute the loss as a host scalar.
    ///
    /// Both inputs must match the evaluator's representation and have the
    /// same batch size. Voxel grids must match exactly in shape; point sets
    /// may differ in cardinality.
    pub fn compute<B: Backend>(
        &self,
        prediction: &Reconstruction<B>,
        ground_truth: &Reconstruction<B>,
    ) -> Result<f32> {
        for got in [prediction.representation(), ground_truth.representation()] {
            if got != self.representation {
                return Err(EvalError::RepresentationMismatch {
                    expected: self.representation,
                    got,
                });
            }
        }

        let loss = match (prediction, ground_truth) {
            (Reconstruction::Voxel(p), Reconstruction::Voxel(t)) => {
                if p.dims() != t.dims() {
                    return Err(EvalError::ShapeMismatch {
                        expected: t.dims().to_vec(),
                        got: p.dims().to_vec(),
                    });
                }
                voxel_loss(p.clone(), t.clone())
            }
            (Reconstruction::Point(p), Reconstruction::Point(t)) => {
                let [pb, _, _] = p.dims();
                let [tb, _, _] = t.dims();
                if pb != tb {
                    return Err(EvalError::ShapeMismatch {
                        expected: t.dims().to_vec(),
                        got: p.dims().to_vec(),
                    });
                }
                chamfer_loss(p.clone(), t.clone())
            }
            _ => {
                return Err(EvalError::RepresentationMismatch {
                    expected: prediction.representation(),
                    got: ground_truth.representation(),
                })
            }
        };

        let value: f32 = loss.into_scalar().elem();
        if !value.is_finite() {
            return Err(EvalError::Tensor(format!("non-finite loss {}", value)));
        }
        Ok(value.max(0.0))
    }
}
