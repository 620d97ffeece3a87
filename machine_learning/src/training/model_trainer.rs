use std::num::NonZeroUsize;

use log::trace;
use ndarray::{Array2, ArrayView2};
use rand::Rng;

use super::{Evaluation, Trainer};
use crate::{
    MlErr, Result,
    arch::{Model, loss::LossFn, metrics::Metric},
    dataset::Dataset,
    optimization::Optimizer,
};

/// A model `Trainer`. Contains the relevant components needed for training a model,
/// including the model itself.
pub struct ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    model: M,
    params: Vec<f32>,
    grad: Vec<f32>,
    optimizer: O,
    loss_fn: L,
    metrics: Vec<Box<dyn Metric>>,
    batch_size: NonZeroUsize,
    rng: R,
}

impl<M, O, L, R> ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    /// Returns a new `ModelTrainer`.
    ///
    /// # Arguments
    /// * `model` - The model that will be trained.
    /// * `params` - The initial parameters of the model.
    /// * `optimizer` - The optimizer that updates the parameters after each batch.
    /// * `loss_fn` - The loss function used to measure the difference between a model's output and the expected one.
    /// * `metrics` - Extra measures reported on evaluation.
    /// * `batch_size` - The maximum amount of samples per gradient step.
    /// * `rng` - A random number generator used for shuffling.
    ///
    /// # Returns
    /// A new `ModelTrainer`, or an error if `params` doesn't fit the model.
    pub fn new(
        model: M,
        params: Vec<f32>,
        optimizer: O,
        loss_fn: L,
        metrics: Vec<Box<dyn Metric>>,
        batch_size: NonZeroUsize,
        rng: R,
    ) -> Result<Self> {
        if params.len() != model.size() {
            return Err(MlErr::SizeMismatch {
                what: "params",
                got: params.len(),
                expected: model.size(),
            });
        }

        Ok(Self {
            grad: vec![0.; params.len()],
            model,
            params,
            optimizer,
            loss_fn,
            metrics,
            batch_size,
            rng,
        })
    }
}

impl<M, O, L, R> Trainer for ModelTrainer<M, O, L, R>
where
    M: Model,
    O: Optimizer,
    L: LossFn,
    R: Rng,
{
    fn fit(&mut self, dataset: &mut Dataset, epochs: usize) -> Result<Vec<f32>> {
        let mut losses = Vec::with_capacity(epochs);

        for epoch in 0..epochs {
            dataset.shuffle(&mut self.rng);
            let batches = dataset.batches(self.batch_size);

            let loss = self.model.backprop(
                &mut self.params,
                &mut self.grad,
                &mut self.optimizer,
                &self.loss_fn,
                batches,
            )?;

            trace!("epoch {epoch}: loss {loss}");
            losses.push(loss);
        }

        Ok(losses)
    }

    fn evaluate(&mut self, dataset: &Dataset) -> Result<Evaluation> {
        let y = dataset.y();
        let y_pred = self.model.forward(&self.params, dataset.x())?;

        if y_pred.dim() != y.dim() {
            return Err(MlErr::SizeMismatch {
                what: "targets",
                got: y.len(),
                expected: y_pred.len(),
            });
        }

        let loss = self.loss_fn.loss(y_pred, y);
        let metrics = self
            .metrics
            .iter()
            .map(|metric| (metric.name(), metric.measure(y_pred, y)))
            .collect();

        Ok(Evaluation { loss, metrics })
    }

    fn predict(&mut self, x: ArrayView2<f32>) -> Result<Array2<f32>> {
        let y_pred = self.model.forward(&self.params, x)?;
        Ok(y_pred.to_owned())
    }

    fn params(&self) -> &[f32] {
        &self.params
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;
    use rand::{SeedableRng, rngs::StdRng};

    use super::*;
    use crate::{
        arch::{Sequential, layers::Layer, loss::Mse, metrics::Mae},
        optimization::{Adam, GradientDescent},
    };

    fn trainer(params: Vec<f32>) -> Result<ModelTrainer<Sequential, GradientDescent, Mse, StdRng>> {
        let model = Sequential::new([Layer::dense((1, 1), None)])?;

        ModelTrainer::new(
            model,
            params,
            GradientDescent::new(0.05),
            Mse,
            vec![Box::new(Mae)],
            NonZeroUsize::new(2).unwrap(),
            StdRng::seed_from_u64(0),
        )
    }

    #[test]
    fn rejects_wrong_param_count() {
        assert!(trainer(vec![0.; 3]).is_err());
    }

    #[test]
    fn evaluate_reports_loss_and_metrics() {
        // y_pred = 2x
        let mut trainer = trainer(vec![2., 0.]).unwrap();
        let dataset = Dataset::new(vec![1., 3., 2., 2.], 1, 1).unwrap();

        let evaluation = trainer.evaluate(&dataset).unwrap();
        // errors: -1 and 2
        assert_eq!(evaluation.loss, 2.5);
        assert_eq!(evaluation.metric("mae"), Some(1.5));
        assert_eq!(evaluation.metric("rmse"), None);
    }

    #[test]
    fn fit_learns_a_line() {
        let mut trainer = trainer(vec![0., 0.]).unwrap();
        let mut dataset = Dataset::new(
            vec![
                0., 1., //
                1., 3., //
                2., 5., //
                3., 7., //
            ],
            1,
            1,
        )
        .unwrap();

        let losses = trainer.fit(&mut dataset, 300).unwrap();

        assert_eq!(losses.len(), 300);
        assert!(losses[299] < losses[0]);

        let y = trainer.predict(array![[10.]].view()).unwrap();
        assert!((y[[0, 0]] - 21.).abs() < 0.5, "got {}", y[[0, 0]]);
    }

    #[test]
    fn consecutive_fits_continue_the_optimizer_state() {
        let trainer = || {
            let model = Sequential::new([Layer::dense((1, 1), None)]).unwrap();
            ModelTrainer::new(
                model,
                vec![0.5, -0.5],
                Adam::new(2, 0.1, 0.9, 0.999, 1e-7),
                Mse,
                Vec::new(),
                NonZeroUsize::new(2).unwrap(),
                StdRng::seed_from_u64(9),
            )
            .unwrap()
        };
        let dataset = || Dataset::new(vec![0., 1., 1., 3., 2., 5.], 1, 1).unwrap();

        let mut once = trainer();
        once.fit(&mut dataset(), 4).unwrap();

        let mut twice = trainer();
        let mut data = dataset();
        twice.fit(&mut data, 2).unwrap();
        twice.fit(&mut data, 2).unwrap();

        assert_ne!(once.params(), [0.5, -0.5]);
        assert_eq!(once.params(), twice.params());
    }

    #[test]
    fn zero_epochs_leave_params_untouched() {
        let mut trainer = trainer(vec![1., 1.]).unwrap();
        let mut dataset = Dataset::new(vec![1., 0.], 1, 1).unwrap();

        assert!(trainer.fit(&mut dataset, 0).unwrap().is_empty());
        assert_eq!(trainer.params(), [1., 1.]);
    }
}
