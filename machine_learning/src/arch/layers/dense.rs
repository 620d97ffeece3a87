use ndarray::{linalg, prelude::*};

use crate::{MlErr, Result, arch::activations::ActFn};

/// A fully connected layer: `a = act_fn(x · W + b)`.
///
/// The layer doesn't own its parameters, they are handed in on every pass as a raw slice laid
/// out as the `dim.0 * dim.1` weights (row major) followed by the `dim.1` biases.
#[derive(Debug, Clone)]
pub struct Dense {
    dim: (usize, usize),
    act_fn: Option<ActFn>,
    size: usize,

    // Forward metadata
    x: Array2<f32>,
    z: Array2<f32>,
    a: Array2<f32>,

    // Backward metadata
    d: Array2<f32>,
}

impl Dense {
    /// Creates a new `Dense` layer.
    ///
    /// # Arguments
    /// * `dim` - The amount of inputs and outputs of the layer.
    /// * `act_fn` - The activation applied to the weighted sums, `None` for a linear layer.
    pub fn new(dim: (usize, usize), act_fn: Option<ActFn>) -> Self {
        let zeros = Array2::zeros((0, dim.1));

        Self {
            dim,
            size: (dim.0 + 1) * dim.1,
            act_fn,
            x: Array2::zeros((0, dim.0)),
            z: zeros.clone(),
            a: zeros,
            d: Array2::zeros((0, dim.0)),
        }
    }

    /// Returns the size of this layer.
    ///
    /// # Returns
    /// The amount of parameters this layer has.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn dim(&self) -> (usize, usize) {
        self.dim
    }

    pub fn act_fn(&self) -> Option<ActFn> {
        self.act_fn
    }

    /// Computes the output of this layer for a batch of inputs, one sample per row.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `x` - The input batch.
    ///
    /// # Returns
    /// A view of the activations, or an error if the input or parameters have the wrong size.
    pub fn forward(&mut self, params: &[f32], x: ArrayView2<f32>) -> Result<ArrayView2<'_, f32>> {
        if x.ncols() != self.dim.0 {
            return Err(MlErr::SizeMismatch {
                what: "dense input features",
                got: x.ncols(),
                expected: self.dim.0,
            });
        }

        let (w, b) = self.view_params(params)?;
        let shape = (x.nrows(), self.dim.1);

        if self.z.dim() != shape {
            self.z = Array2::zeros(shape);
        }

        linalg::general_mat_mul(1.0, &x, &w, 0.0, &mut self.z);
        self.z += &b;

        self.x = x.to_owned();

        let Some(act_fn) = self.act_fn else {
            return Ok(self.z.view());
        };

        if self.a.dim() != shape {
            self.a = Array2::zeros(shape);
        }

        self.a.zip_mut_with(&self.z, |a, &z| *a = act_fn.f(z));
        Ok(self.a.view())
    }

    /// Writes this layer's gradient and propagates the delta to the previous layer.
    ///
    /// Must be called after `forward`, it relies on the inputs and weighted sums of that pass.
    ///
    /// # Arguments
    /// * `params` - This layer's slice of parameters.
    /// * `grad` - This layer's slice of the gradient, overwritten.
    /// * `d` - The derivative of the loss with respect to this layer's output.
    ///
    /// # Returns
    /// The derivative of the loss with respect to this layer's input.
    pub fn backward(
        &mut self,
        params: &[f32],
        grad: &mut [f32],
        mut d: ArrayViewMut2<f32>,
    ) -> Result<ArrayViewMut2<'_, f32>> {
        if d.dim() != self.z.dim() {
            return Err(MlErr::SizeMismatch {
                what: "dense output delta",
                got: d.len(),
                expected: self.z.len(),
            });
        }

        if let Some(act_fn) = &self.act_fn {
            d.zip_mut_with(&self.z, |d, &z| *d *= act_fn.df(z));
        }

        let (mut dw, mut db) = self.view_grad(grad)?;
        linalg::general_mat_mul(1.0, &self.x.t(), &d, 0.0, &mut dw);
        db.assign(&d.sum_axis(Axis(0)));

        let (w, _) = self.view_params(params)?;
        let shape = (d.nrows(), self.dim.0);

        if self.d.dim() != shape {
            self.d = Array2::zeros(shape);
        }

        linalg::general_mat_mul(1.0, &d, &w.t(), 0.0, &mut self.d);

        Ok(self.d.view_mut())
    }

    /// Gives a view of the raw gradient slice as the delta weights and delta biases of this layer.
    ///
    /// # Arguments
    /// * `grad` - A gradient slice.
    ///
    /// # Returns
    /// A tuple containing the delta weights and delta biases.
    fn view_grad<'a>(
        &self,
        grad: &'a mut [f32],
    ) -> Result<(ArrayViewMut2<'a, f32>, ArrayViewMut1<'a, f32>)> {
        let len = grad.len();
        if len != self.size {
            return Err(MlErr::SizeMismatch {
                what: "dense gradient",
                got: len,
                expected: self.size,
            });
        }

        let w_size = self.size - self.dim.1;
        let (dw_raw, db_raw) = grad.split_at_mut(w_size);
        let dw = ArrayViewMut2::from_shape(self.dim, dw_raw).map_err(|_| self.mismatch(len))?;
        let db = ArrayViewMut1::from_shape(self.dim.1, db_raw).map_err(|_| self.mismatch(len))?;
        Ok((dw, db))
    }

    /// Gives a view of the raw parameter slice as the weights and biases of this layer.
    ///
    /// # Arguments
    /// * `params` - A slice of parameters.
    ///
    /// # Returns
    /// A tuple containing the weights and biases.
    fn view_params<'a>(
        &self,
        params: &'a [f32],
    ) -> Result<(ArrayView2<'a, f32>, ArrayView1<'a, f32>)> {
        if params.len() != self.size {
            return Err(self.mismatch(params.len()));
        }

        let w_size = self.size - self.dim.1;
        let (w_raw, b_raw) = params.split_at(w_size);
        let weights =
            ArrayView2::from_shape(self.dim, w_raw).map_err(|_| self.mismatch(params.len()))?;
        let biases =
            ArrayView1::from_shape(self.dim.1, b_raw).map_err(|_| self.mismatch(params.len()))?;
        Ok((weights, biases))
    }

    fn mismatch(&self, got: usize) -> MlErr {
        MlErr::SizeMismatch {
            what: "dense parameters",
            got,
            expected: self.size,
        }
    }
}

#[cfg(test)]
mod tests {
    use ndarray::array;

    use super::*;

    #[test]
    fn forward_is_affine_without_act_fn() {
        // w = [[1], [2]], b = [0.5]
        let params = [1., 2., 0.5];
        let mut dense = Dense::new((2, 1), None);
        let x = array![[1., 1.], [2., 0.], [0., 0.]];

        let y = dense.forward(&params, x.view()).unwrap();
        assert_eq!(y, array![[3.5], [2.5], [0.5]]);
    }

    #[test]
    fn forward_applies_act_fn() {
        let params = [0., 0., 0.];
        let mut dense = Dense::new((2, 1), Some(ActFn::softplus()));
        let x = array![[3., -7.]];

        let y = dense.forward(&params, x.view()).unwrap();
        assert!((y[[0, 0]] - 2f32.ln()).abs() < 1e-6);
    }

    #[test]
    fn forward_rejects_wrong_sizes() {
        let mut dense = Dense::new((4, 1), None);
        let x = Array2::<f32>::zeros((1, 4));

        assert!(dense.forward(&[0.; 4], x.view()).is_err());

        let x = Array2::<f32>::zeros((1, 3));
        assert!(dense.forward(&[0.; 5], x.view()).is_err());
    }

    #[test]
    fn backward_matches_numeric_gradient() {
        let params = [0.3, -0.2, 0.1];
        let x = array![[1., 2.], [-1., 0.5]];
        let target = array![[1.], [0.]];

        // L = sum((a - target)^2) / 2 so that dL/da = a - target.
        let loss = |params: &[f32]| {
            let mut dense = Dense::new((2, 1), Some(ActFn::softplus()));
            let a = dense.forward(params, x.view()).unwrap().to_owned();
            (&a - &target).mapv(|e| e.powi(2)).sum() / 2.
        };

        let mut dense = Dense::new((2, 1), Some(ActFn::softplus()));
        let a = dense.forward(&params, x.view()).unwrap().to_owned();
        let mut d = &a - &target;
        let mut grad = [0.; 3];
        dense.backward(&params, &mut grad, d.view_mut()).unwrap();

        let h = 1e-2;
        for i in 0..params.len() {
            let mut plus = params;
            let mut minus = params;
            plus[i] += h;
            minus[i] -= h;

            let numeric = (loss(&plus) - loss(&minus)) / (2. * h);
            assert!(
                (grad[i] - numeric).abs() < 1e-2,
                "param {i}: analytic {} vs numeric {numeric}",
                grad[i]
            );
        }
    }

    #[test]
    fn backward_propagates_delta_through_weights() {
        let params = [2., 3., 0.];
        let mut dense = Dense::new((2, 1), None);
        let x = array![[1., 1.]];

        dense.forward(&params, x.view()).unwrap();

        let mut d = array![[1.]];
        let mut grad = [0.; 3];
        let prev = dense.backward(&params, &mut grad, d.view_mut()).unwrap();

        assert_eq!(prev, array![[2., 3.]]);
        assert_eq!(grad, [1., 1., 1.]);
    }
}
