use std::{cell::RefCell, rc::Rc};

use rand::Rng;
use rand_distr::{Distribution, Normal};

use super::ParamGen;
use crate::{MlErr, Result};

/// The standard deviation of a standard normal truncated at two standard deviations.
const TRUNCATED_STD_DEV: f32 = 0.879_625_66;

/// A normal distribution whose samples are redrawn until they fall within two standard
/// deviations of the mean.
#[derive(Debug, Clone, Copy)]
pub struct TruncatedNormal {
    normal: Normal<f32>,
    mean: f32,
    bound: f32,
}

impl TruncatedNormal {
    /// Creates a new `TruncatedNormal` with the given parameters of the underlying normal.
    ///
    /// # Returns
    /// An error if `std_dev` is negative or not finite.
    pub fn new(mean: f32, std_dev: f32) -> Result<Self> {
        if !std_dev.is_finite() || std_dev < 0. {
            return Err(MlErr::InvalidDistribution(format!(
                "invalid standard deviation {std_dev}"
            )));
        }

        Ok(Self {
            normal: Normal::new(mean, std_dev)?,
            mean,
            bound: 2. * std_dev,
        })
    }
}

impl Distribution<f32> for TruncatedNormal {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        loop {
            let x = self.normal.sample(rng);

            if (x - self.mean).abs() <= self.bound {
                return x;
            }
        }
    }
}

/// A parameter generator that follows a certain probabilistic distribution.
pub struct RandParamGen<R: Rng, D: Distribution<f32>> {
    rng: Rc<RefCell<R>>,
    distribution: D,
    remaining: usize,
}

impl<R: Rng, D: Distribution<f32>> RandParamGen<R, D> {
    /// Creates a new `RandParamGen` parameter generator.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `distribution` - The distribution to sample the random numbers from.
    /// * `limit` - The maximum amount of numbers to generate.
    pub fn new(rng: Rc<RefCell<R>>, distribution: D, limit: usize) -> Self {
        Self {
            rng,
            distribution,
            remaining: limit,
        }
    }
}

impl<R: Rng> RandParamGen<R, TruncatedNormal> {
    /// Creates a new `RandParamGen` parameter generator using He normal initialization: a normal
    /// centered on zero truncated at two standard deviations, scaled so the resulting variance is
    /// `2 / fan_in`.
    ///
    /// # Arguments
    /// * `rng` - A random number generator.
    /// * `limit` - The maximum amount of numbers to generate.
    /// * `fan_in` - The number of input units in the weight tensor.
    ///
    /// # Returns
    /// An error if the calculated standard deviation is not finite (`fan_in` is zero).
    pub fn he_normal(rng: Rc<RefCell<R>>, limit: usize, fan_in: usize) -> Result<Self> {
        let std_dev = (2. / fan_in as f32).sqrt() / TRUNCATED_STD_DEV;
        Ok(Self::new(rng, TruncatedNormal::new(0., std_dev)?, limit))
    }
}

impl<R: Rng, D: Distribution<f32>> ParamGen for RandParamGen<R, D> {
    fn sample(&mut self, mut n: usize) -> Option<Vec<f32>> {
        if self.remaining == 0 {
            return None;
        }

        n = n.min(self.remaining);
        self.remaining -= n;

        let mut rng = self.rng.borrow_mut();
        let sample = (0..n)
            .map(|_| self.distribution.sample(&mut *rng))
            .collect();

        Some(sample)
    }
}
