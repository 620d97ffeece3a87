use crate::{MlErr, Result};

/// A `ParamGen` generates values for the initial state of the model's parameters.
pub trait ParamGen {
    /// Should sample at most `n` parameters.
    ///
    /// # Arguments
    /// * `n` - The upper limit of samples to generate.
    ///
    /// # Returns
    /// An option whether the generator is exhausted.
    fn sample(&mut self, n: usize) -> Option<Vec<f32>>;
}

/// Draws exactly `n` parameters from `param_gen`.
///
/// # Errors
/// `MlErr::ParamGenExhausted` if the generator runs out before reaching `n`.
pub fn generate<P>(param_gen: &mut P, n: usize) -> Result<Vec<f32>>
where
    P: ParamGen + ?Sized,
{
    let mut params = Vec::with_capacity(n);

    while params.len() < n {
        let Some(sample) = param_gen.sample(n - params.len()) else {
            return Err(MlErr::ParamGenExhausted {
                got: params.len(),
                expected: n,
            });
        };

        params.extend(sample);
    }

    Ok(params)
}
