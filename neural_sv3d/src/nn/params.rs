//! Named parameter listing.
//!
//! Walks the learnable tensors of a network in a fixed order, naming each by
//! its field path (`encoder.convs.0.weight`). Checkpoint loading compares the
//! listing before and after a load to detect records built for another
//! configuration.

use burn::module::Param;
use burn::nn::conv::Conv2d;
use burn::nn::Linear;
use burn::prelude::*;

use crate::error::{EvalError, Result};

/// One learnable tensor, flattened.
#[derive(Debug, Clone)]
pub struct NamedParam<B: Backend> {
    /// Field path of the tensor.
    pub name: String,
    /// Shape of the tensor.
    pub dims: Vec<usize>,
    /// Values in row-major order.
    pub values: Tensor<B, 1>,
}

impl<B: Backend> NamedParam<B> {
    /// Copy the values to the host.
    pub fn to_vec(&self) -> Result<Vec<f32>> {
        self.values
            .clone()
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| EvalError::Tensor(format!("{:?}", e)))
    }
}

/// Name and shape of every parameter.
pub fn shapes<B: Backend>(params: &[NamedParam<B>]) -> Vec<(String, Vec<usize>)> {
    params
        .iter()
        .map(|p| (p.name.clone(), p.dims.clone()))
        .collect()
}

/// Describe the first difference between two parameter listings.
pub fn first_mismatch(
    expected: &[(String, Vec<usize>)],
    got: &[(String, Vec<usize>)],
) -> Option<String> {
    for (want, have) in expected.iter().zip(got) {
        if want.0 != have.0 {
            return Some(format!("expected parameter {}, found {}", want.0, have.0));
        }
        if want.1 != have.1 {
            return Some(format!(
                "parameter shape mismatch at {}: expected {:?}, got {:?}",
                want.0, want.1, have.1
            ));
        }
    }
    if expected.len() != got.len() {
        return Some(format!(
            "parameter count mismatch: expected {}, got {}",
            expected.len(),
            got.len()
        ));
    }
    None
}

pub(crate) fn push_param<B: Backend, const D: usize>(
    out: &mut Vec<NamedParam<B>>,
    name: String,
    param: &Param<Tensor<B, D>>,
) {
    let tensor = param.val();
    let dims = tensor.dims().to_vec();
    let count = dims.iter().product::<usize>();
    out.push(NamedParam {
        name,
        dims,
        values: tensor.reshape([count]),
    });
}

pub(crate) fn push_linear<B: Backend>(
    out: &mut Vec<NamedParam<B>>,
    prefix: &str,
    linear: &Linear<B>,
) {
    push_param(out, format!("{}.weight", prefix), &linear.weight);
    if let Some(bias) = &linear.bias {
        push_param(out, format!("{}.bias", prefix), bias);
    }
}

pub(crate) fn push_conv2d<B: Backend>(
    out: &mut Vec<NamedParam<B>>,
    prefix: &str,
    conv: &Conv2d<B>,
) {
    push_param(out, format!("{}.weight", prefix), &conv.weight);
    if let Some(bias) = &conv.bias {
        push_param(out, format!("{}.bias", prefix), bias);
    }
}
