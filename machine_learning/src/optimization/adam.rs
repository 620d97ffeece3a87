use super::Optimizer;
use crate::{MlErr, Result};

/// The adaptive moment estimation optimizer.
///
/// Keeps a running first and second moment estimate per parameter, so an instance is tied to
/// the model it was created for and keeps its state between `update_params` calls.
#[derive(Debug, Clone)]
pub struct Adam {
    learning_rate: f32,
    beta1: f32,
    beta2: f32,
    beta1_t: f32,
    beta2_t: f32,
    v: Box<[f32]>,
    s: Box<[f32]>,
    epsilon: f32,
}

impl Adam {
    pub const DEFAULT_LEARNING_RATE: f32 = 1e-3;
    pub const DEFAULT_BETA1: f32 = 0.9;
    pub const DEFAULT_BETA2: f32 = 0.999;
    pub const DEFAULT_EPSILON: f32 = 1e-7;

    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `len` - The amount of parameters this instance should hold.
    /// * `learning_rate` - The small coefficient that modulates the amount of training per update.
    /// * `beta1`, `beta2`, `epsilon` - Hyperparameters to the optimization algorithm.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(len: usize, learning_rate: f32, beta1: f32, beta2: f32, epsilon: f32) -> Self {
        Self {
            learning_rate,
            beta1,
            beta2,
            beta1_t: 1.,
            beta2_t: 1.,
            v: vec![0.; len].into_boxed_slice(),
            s: vec![0.; len].into_boxed_slice(),
            epsilon,
        }
    }
}

impl Optimizer for Adam {
    fn update_params(&mut self, grad: &[f32], params: &mut [f32]) -> Result<()> {
        if grad.len() != params.len() || params.len() != self.v.len() {
            return Err(MlErr::SizeMismatch {
                what: "adam parameters",
                got: grad.len().max(params.len()),
                expected: self.v.len(),
            });
        }

        let Self {
            learning_rate: lr,
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            ..
        } = *self;

        self.beta1_t *= b1;
        self.beta2_t *= b2;

        let bc1 = 1. - self.beta1_t;
        let bc2 = 1. - self.beta2_t;
        let step_size = lr * (bc2.sqrt() / bc1);

        params
            .iter_mut()
            .zip(grad)
            .zip(self.v.iter_mut())
            .zip(self.s.iter_mut())
            .for_each(|(((p, g), v), s)| {
                *v = b1 * *v + (1. - b1) * g;
                *s = b2 * *s + (1. - b2) * g.powi(2);
                *p -= step_size * *v / (s.sqrt() + eps);
            });

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_defaults(len: usize) -> Adam {
        Adam::new(
            len,
            Adam::DEFAULT_LEARNING_RATE,
            Adam::DEFAULT_BETA1,
            Adam::DEFAULT_BETA2,
            Adam::DEFAULT_EPSILON,
        )
    }

    #[test]
    fn first_step_has_learning_rate_length() {
        let mut adam = with_defaults(2);
        let mut params = [0., 0.];

        adam.update_params(&[5., -0.1], &mut params).unwrap();

        // On the first step the bias corrected update is lr * g / |g|.
        assert!((params[0] + 1e-3).abs() < 1e-6);
        assert!((params[1] - 1e-3).abs() < 1e-6);
    }

    #[test]
    fn minimizes_a_quadratic() {
        let mut adam = Adam::new(1, 0.1, 0.9, 0.999, 1e-7);
        let mut params = [5.];

        for _ in 0..500 {
            let grad = [2. * (params[0] - 1.)];
            adam.update_params(&grad, &mut params).unwrap();
        }

        assert!((params[0] - 1.).abs() < 0.05, "got {}", params[0]);
    }

    #[test]
    fn size_mismatch() {
        let mut adam = with_defaults(2);

        assert!(adam.update_params(&[1.], &mut [1., 2.]).is_err());
        assert!(adam.update_params(&[1., 2., 3.], &mut [1., 2., 3.]).is_err());
    }
}
