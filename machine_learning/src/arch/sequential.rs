use ndarray::ArrayView2;

use super::{Model, layers::Layer, loss::LossFn};
use crate::{MlErr, Result, optimization::Optimizer};

/// A sequential model: information flows forward when computing an output and backward when
/// computing the *deltas* of its layers.
#[derive(Debug, Clone)]
pub struct Sequential {
    layers: Vec<Layer>,
}

impl Sequential {
    /// Creates a new `Sequential`.
    ///
    /// # Arguments
    /// * `layers` - The layers the sequential is composed of.
    ///
    /// # Returns
    /// A new `Sequential` instance, or an error if two adjacent layers have incompatible sizes.
    pub fn new<I>(layers: I) -> Result<Self>
    where
        I: IntoIterator<Item = Layer>,
    {
        let layers: Vec<Layer> = layers.into_iter().collect();

        if layers.is_empty() {
            return Err(MlErr::InvalidModel(
                "a sequential needs at least one layer".into(),
            ));
        }

        for (i, pair) in layers.windows(2).enumerate() {
            let (prev, next) = (&pair[0], &pair[1]);

            if prev.output_size() != next.input_size() {
                return Err(MlErr::InvalidModel(format!(
                    "layer {}: input size ({}) does not match previous layer output size ({})",
                    i + 1,
                    next.input_size(),
                    prev.output_size()
                )));
            }
        }

        Ok(Self { layers })
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    fn check_len(&self, what: &'static str, got: usize) -> Result<()> {
        let expected = self.size();

        if got != expected {
            return Err(MlErr::SizeMismatch {
                what,
                got,
                expected,
            });
        }

        Ok(())
    }
}

impl Model for Sequential {
    fn size(&self) -> usize {
        self.layers.iter().map(|layer| layer.size()).sum()
    }

    fn forward<'a>(
        &'a mut self,
        params: &[f32],
        mut x: ArrayView2<'a, f32>,
    ) -> Result<ArrayView2<'a, f32>> {
        self.check_len("params", params.len())?;

        let mut rest = params;

        for layer in self.layers.iter_mut() {
            let (layer_params, tail) = rest.split_at(layer.size());
            rest = tail;
            x = layer.forward(layer_params, x)?;
        }

        Ok(x)
    }

    // NOTE: since getting the actual loss would require forwarding over all batches again at
    // the end of the backprop iterations, we are approximating it by averaging the loss at
    // each batch.
    fn backprop<'a, O, L, I>(
        &mut self,
        params: &mut [f32],
        grad: &mut [f32],
        optimizer: &mut O,
        loss_fn: &L,
        batches: I,
    ) -> Result<f32>
    where
        O: Optimizer,
        L: LossFn,
        I: Iterator<Item = (ArrayView2<'a, f32>, ArrayView2<'a, f32>)>,
    {
        self.check_len("params", params.len())?;
        self.check_len("grad", grad.len())?;

        let mut total_loss = 0.0;
        let mut num_batches = 0;

        for (x, y) in batches {
            let (loss, mut d_last) = {
                let y_pred = self.forward(params, x)?;

                if y_pred.dim() != y.dim() {
                    return Err(MlErr::SizeMismatch {
                        what: "targets",
                        got: y.len(),
                        expected: y_pred.len(),
                    });
                }

                (loss_fn.loss(y_pred, y), loss_fn.loss_prime(y_pred, y))
            };

            total_loss += loss;
            num_batches += 1;

            let mut d = d_last.view_mut();
            let mut end = params.len();

            for layer in self.layers.iter_mut().rev() {
                let start = end - layer.size();
                d = layer.backward(&params[start..end], &mut grad[start..end], d)?;
                end = start;
            }

            optimizer.update_params(grad, params)?;
        }

        if num_batches == 0 {
            return Ok(0.0);
        }

        Ok(total_loss / num_batches as f32)
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;
    use crate::{
        arch::{activations::ActFn, loss::Mse},
        optimization::GradientDescent,
    };

    #[test]
    fn size_is_the_sum_of_layer_sizes() {
        let model = Sequential::new([
            Layer::dense((4, 3), Some(ActFn::softplus())),
            Layer::dense((3, 1), None),
        ])
        .unwrap();

        assert_eq!(model.size(), 5 * 3 + 4);
        assert_eq!(model.layers()[0].input_size(), 4);
        assert_eq!(model.layers()[1].output_size(), 1);
    }

    #[test]
    fn rejects_empty_and_incompatible_layers() {
        assert!(Sequential::new(Vec::new()).is_err());
        assert!(
            Sequential::new([Layer::dense((4, 3), None), Layer::dense((2, 1), None)]).is_err()
        );
    }

    #[test]
    fn forward_chains_layers() {
        let mut model =
            Sequential::new([Layer::dense((1, 1), None), Layer::dense((1, 1), None)]).unwrap();
        // y = 3 * (2x + 1) - 1
        let params = [2., 1., 3., -1.];
        let x = array![[0.], [1.]];

        let y = model.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[2.], [8.]]);
    }

    #[test]
    fn forward_rejects_wrong_param_count() {
        let mut model = Sequential::new([Layer::dense((4, 1), None)]).unwrap();
        let x = ndarray::Array2::<f32>::zeros((1, 4));

        assert!(model.forward(&[0.; 4], x.view()).is_err());
    }

    #[test]
    fn backprop_reduces_loss() {
        let mut model = Sequential::new([Layer::dense((1, 1), None)]).unwrap();
        let mut params = vec![0.; model.size()];
        let mut grad = vec![0.; model.size()];
        let mut optimizer = GradientDescent::new(0.1);

        let x = array![[0.], [1.], [2.], [3.]];
        let y = array![[1.], [3.], [5.], [7.]];

        let first = model
            .backprop(
                &mut params,
                &mut grad,
                &mut optimizer,
                &Mse,
                std::iter::once((x.view(), y.view())),
            )
            .unwrap();

        let mut last = first;
        for _ in 0..200 {
            last = model
                .backprop(
                    &mut params,
                    &mut grad,
                    &mut optimizer,
                    &Mse,
                    std::iter::once((x.view(), y.view())),
                )
                .unwrap();
        }

        assert!(last < first / 100., "first {first}, last {last}");
        assert!((params[0] - 2.).abs() < 0.1, "w = {}", params[0]);
        assert!((params[1] - 1.).abs() < 0.2, "b = {}", params[1]);
    }
}
