use ndarray::{ArrayView2, ArrayViewMut2};

use super::Dense;
use crate::{Result, arch::activations::ActFn};

/// A layer of a `Sequential` model.
#[derive(Debug, Clone)]
pub enum Layer {
    Dense(Dense),
}
use Layer::*;

impl Layer {
    pub fn dense(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        Self::Dense(Dense::new(dim, act_fn))
    }

    /// Returns the amount of parameters this layer has.
    pub fn size(&self) -> usize {
        match self {
            Dense(l) => l.size(),
        }
    }

    /// The amount of inputs this layer takes.
    pub fn input_size(&self) -> usize {
        match self {
            Dense(l) => l.dim().0,
        }
    }

    /// The amount of outputs this layer gives.
    pub fn output_size(&self) -> usize {
        match self {
            Dense(l) => l.dim().1,
        }
    }

    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<ArrayView2<'_, f32>> {
        match self {
            Dense(l) => l.forward(params, x),
        }
    }

    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        d: ArrayViewMut2<f32>,
    ) -> Result<ArrayViewMut2<'_, f32>> {
        match self {
            Dense(l) => l.backward(params, grad, d),
        }
    }
}
