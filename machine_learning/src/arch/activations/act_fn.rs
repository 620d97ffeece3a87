use super::Softplus;

/// An element-wise activation function applied at the output of a layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActFn {
    Softplus(Softplus),
}

impl ActFn {
    pub fn softplus() -> Self {
        ActFn::Softplus(Softplus::new())
    }

    pub fn f(&self, x: f32) -> f32 {
        match self {
            ActFn::Softplus(a) => a.f(x),
        }
    }

    pub fn df(&self, x: f32) -> f32 {
        match self {
            ActFn::Softplus(a) => a.df(x),
        }
    }
}
