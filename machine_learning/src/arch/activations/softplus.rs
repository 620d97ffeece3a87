/// `ln(1 + e^z)`, a smooth approximation of the rectifier whose image is `(0, inf)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Softplus;

impl Softplus {
    pub fn new() -> Self {
        Self
    }

    pub fn f(&self, z: f32) -> f32 {
        // Split as max(z, 0) + ln(1 + e^-|z|) so large inputs don't overflow `exp`.
        z.max(0.) + (-z.abs()).exp().ln_1p()
    }

    /// The derivative of softplus is the logistic function.
    pub fn df(&self, z: f32) -> f32 {
        1. / (1. + (-z).exp())
    }
}
