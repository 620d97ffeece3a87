use super::ParamGen;

/// A parameter generator that yields a single repeated value, a fixed amount of times.
///
/// Mostly used for biases, which start at zero.
#[derive(Debug, Clone, Copy)]
pub struct ConstParamGen {
    value: f32,
    remaining: usize,
}

impl ConstParamGen {
    /// Creates a new `ConstParamGen` that yields `value` up to `limit` times.
    pub fn new(value: f32, limit: usize) -> Self {
        Self {
            value,
            remaining: limit,
        }
    }

    /// A generator of `limit` zeros.
    pub fn zeros(limit: usize) -> Self {
        Self::new(0., limit)
    }
}

impl ParamGen for ConstParamGen {
    fn sample(&mut self, n: usize) -> Option<Vec<f32>> {
        let n = n.min(self.remaining);

        if n == 0 {
            return None;
        }

        self.remaining -= n;
        Some(vec![self.value; n])
    }
}
