use ndarray::{Array2, ArrayView2};

use crate::{Result, dataset::Dataset};

/// The loss and metrics of a model over a dataset.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub loss: f32,
    pub metrics: Vec<(&'static str, f32)>,
}

impl Evaluation {
    /// Returns the value of the metric called `name`, if it was tracked.
    pub fn metric(&self, name: &str) -> Option<f32> {
        self.metrics
            .iter()
            .find(|(metric, _)| *metric == name)
            .map(|&(_, value)| value)
    }
}

/// A model bundled with everything needed to train it: its parameters, optimizer, loss
/// function and metrics.
pub trait Trainer {
    /// Trains the model for `epochs` passes over `dataset`, shuffling it before each one.
    ///
    /// # Returns
    /// The loss of each epoch.
    fn fit(&mut self, dataset: &mut Dataset, epochs: usize) -> Result<Vec<f32>>;

    /// Measures the loss and the metrics over `dataset` without training.
    fn evaluate(&mut self, dataset: &Dataset) -> Result<Evaluation>;

    /// Computes the model output for a batch, one sample per row.
    fn predict(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>>;

    /// The current parameters of the model.
    fn params(&self) -> &[f32];
}
