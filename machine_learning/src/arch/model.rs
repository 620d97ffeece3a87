use ndarray::ArrayView2;

use crate::{Result, arch::loss::LossFn, optimization::Optimizer};

pub trait Model {
    /// Returns the amount of parameters in the model.
    fn size(&self) -> usize;

    /// Makes a forward pass through the model.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `x` - The input batch, one sample per row.
    ///
    /// # Returns
    /// The prediction for the given input or an error if occurred.
    fn forward<'a>(&'a mut self, params: &[f32], x: ArrayView2<'a, f32>)
    -> Result<ArrayView2<'a, f32>>;

    /// Computes the gradient of the loss function with respect to the parameters of the model over
    /// the provided batches. **`params` gets updated** for each batch according to the
    /// optimization algorithm.
    ///
    /// # Arguments
    /// * `params` - The model's parameters.
    /// * `grad` - A buffer for writing the computed gradient on each batch pass.
    /// * `optimizer` - The optimizer that dictates how to update the weights on each gradient calculation.
    /// * `loss_fn` - The loss function.
    /// * `batches` - The batches of data.
    ///
    /// # Returns
    /// The epoch loss.
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
        I: Iterator<Item = (ArrayView2<'a, f32>, ArrayView2<'a, f32>)>;
}
