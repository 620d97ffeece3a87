use ndarray::{Array2, ArrayView2};

use super::{Evaluation, Trainer, TrainerBuilder};
use crate::{Result, dataset::Dataset, specs::TrainerSpec};

/// A model ready to be trained or queried, together with the spec it was built from.
///
/// Keeping the spec around is what allows the model to be persisted and rebuilt later.
pub struct CompiledModel {
    spec: TrainerSpec,
    trainer: Box<dyn Trainer>,
}

impl CompiledModel {
    /// Compiles the model described by `spec` with the given initial parameters.
    ///
    /// # Returns
    /// An error if the model is malformed or `params` doesn't fit it.
    pub fn new(spec: TrainerSpec, params: Vec<f32>) -> Result<Self> {
        let trainer = TrainerBuilder::new().build(&spec, params)?;
        Ok(Self { spec, trainer })
    }

    pub fn spec(&self) -> &TrainerSpec {
        &self.spec
    }

    pub fn params(&self) -> &[f32] {
        self.trainer.params()
    }

    /// See `Trainer::fit`.
    pub fn fit(&mut self, dataset: &mut Dataset, epochs: usize) -> Result<Vec<f32>> {
        self.trainer.fit(dataset, epochs)
    }

    pub fn evaluate(&mut self, dataset: &Dataset) -> Result<Evaluation> {
        self.trainer.evaluate(dataset)
    }

    pub fn predict(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        self.trainer.predict(x)
    }
}
