use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::{
    MlErr, Result,
    arch::{Sequential, activations::ActFn, layers::Layer},
};

/// The specification for the `ActFn` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActFnSpec {
    Softplus,
}

/// The specification for the `Layer` enum.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerSpec {
    Dense {
        dim: (usize, usize),
        act_fn: Option<ActFnSpec>,
    },
}

/// The specification for the `Model` trait.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelSpec {
    Sequential { layers: Vec<LayerSpec> },
}

/// The specification for the `Optimizer` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizerSpec {
    Adam {
        learning_rate: f32,
        beta1: f32,
        beta2: f32,
        epsilon: f32,
    },
    GradientDescent {
        learning_rate: f32,
    },
}

/// The specification for the `LossFn` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFnSpec {
    Mse,
}

/// The specification for the `Metric` trait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricSpec {
    Mae,
}

/// The specification for a compiled model: the architecture and how to train it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainerSpec {
    pub model: ModelSpec,
    pub optimizer: OptimizerSpec,
    pub loss: LossFnSpec,
    pub metrics: Vec<MetricSpec>,
    pub batch_size: NonZeroUsize,
    pub seed: Option<u64>,
}

impl ActFnSpec {
    pub fn build(self) -> ActFn {
        match self {
            ActFnSpec::Softplus => ActFn::softplus(),
        }
    }
}

impl LayerSpec {
    /// The amount of parameters of the described layer, `None` if it doesn't fit a `usize`.
    pub fn size(self) -> Option<usize> {
        match self {
            LayerSpec::Dense { dim: (n, m), .. } => n.checked_add(1)?.checked_mul(m),
        }
    }

    /// Builds the layer this spec describes.
    ///
    /// # Returns
    /// An error if the layer is too big to be addressed.
    pub fn build(self) -> Result<Layer> {
        if self.size().is_none() {
            return Err(MlErr::InvalidModel(format!("{self:?} has too many parameters")));
        }

        match self {
            LayerSpec::Dense { dim, act_fn } => {
                Ok(Layer::dense(dim, act_fn.map(ActFnSpec::build)))
            }
        }
    }
}

impl ModelSpec {
    /// Builds the model this spec describes.
    ///
    /// # Returns
    /// An error if the layers don't fit together or have too many parameters.
    pub fn build(&self) -> Result<Sequential> {
        match self {
            ModelSpec::Sequential { layers } => {
                let size = layers
                    .iter()
                    .try_fold(0usize, |total, layer| total.checked_add(layer.size()?));

                if size.is_none() {
                    return Err(MlErr::InvalidModel(
                        "the model has too many parameters".into(),
                    ));
                }

                let layers = layers
                    .iter()
                    .map(|&layer| layer.build())
                    .collect::<Result<Vec<_>>>()?;

                Sequential::new(layers)
            }
        }
    }
}

impl Default for OptimizerSpec {
    fn default() -> Self {
        use crate::optimization::Adam;

        OptimizerSpec::Adam {
            learning_rate: Adam::DEFAULT_LEARNING_RATE,
            beta1: Adam::DEFAULT_BETA1,
            beta2: Adam::DEFAULT_BETA2,
            epsilon: Adam::DEFAULT_EPSILON,
        }
    }
}
