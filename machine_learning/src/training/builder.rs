use rand::{SeedableRng, rngs::StdRng};

use super::{ModelTrainer, Trainer};
use crate::{
    Result,
    arch::{
        Model,
        loss::{LossFn, Mse},
        metrics::{Mae, Metric},
    },
    optimization::{Adam, GradientDescent, Optimizer},
    specs::{LossFnSpec, MetricSpec, OptimizerSpec, TrainerSpec},
};

/// Builds `Trainer`s given a specification.
#[derive(Default)]
pub struct TrainerBuilder;

impl TrainerBuilder {
    /// Creates a new `TrainerBuilder`.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `Trainer` following a spec.
    ///
    /// # Arguments
    /// * `spec` - The specification for the trainer.
    /// * `params` - The initial parameters of the model.
    ///
    /// # Returns
    /// An error if the model is malformed or `params` doesn't fit it.
    pub fn build(&self, spec: &TrainerSpec, params: Vec<f32>) -> Result<Box<dyn Trainer>> {
        self.resolve_model(spec, params)
    }

    fn resolve_model(&self, spec: &TrainerSpec, params: Vec<f32>) -> Result<Box<dyn Trainer>> {
        let model = spec.model.build()?;
        self.resolve_optimizer(spec, model, params)
    }

    fn resolve_optimizer<M>(
        &self,
        spec: &TrainerSpec,
        model: M,
        params: Vec<f32>,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
    {
        match spec.optimizer {
            OptimizerSpec::Adam {
                learning_rate,
                beta1,
                beta2,
                epsilon,
            } => {
                let optimizer = Adam::new(model.size(), learning_rate, beta1, beta2, epsilon);
                self.resolve_loss(spec, model, params, optimizer)
            }
            OptimizerSpec::GradientDescent { learning_rate } => {
                let optimizer = GradientDescent::new(learning_rate);
                self.resolve_loss(spec, model, params, optimizer)
            }
        }
    }

    fn resolve_loss<M, O>(
        &self,
        spec: &TrainerSpec,
        model: M,
        params: Vec<f32>,
        optimizer: O,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
    {
        match spec.loss {
            LossFnSpec::Mse => {
                let loss = Mse::new();
                self.terminate_build(spec, model, params, optimizer, loss)
            }
        }
    }

    fn terminate_build<M, O, L>(
        &self,
        spec: &TrainerSpec,
        model: M,
        params: Vec<f32>,
        optimizer: O,
        loss: L,
    ) -> Result<Box<dyn Trainer>>
    where
        M: Model + 'static,
        O: Optimizer + 'static,
        L: LossFn + 'static,
    {
        let metrics = spec.metrics.iter().map(|&m| self.resolve_metric(m)).collect();
        let rng = self.generate_rng(spec.seed);

        let trainer = ModelTrainer::new(
            model,
            params,
            optimizer,
            loss,
            metrics,
            spec.batch_size,
            rng,
        )?;

        Ok(Box::new(trainer))
    }

    fn resolve_metric(&self, spec: MetricSpec) -> Box<dyn Metric> {
        match spec {
            MetricSpec::Mae => Box::new(Mae),
        }
    }

    fn generate_rng(&self, seed: Option<u64>) -> StdRng {
        match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        }
    }
}
