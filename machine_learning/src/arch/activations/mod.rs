mod act_fn;
mod softplus;

pub use act_fn::ActFn;
pub use softplus::Softplus;
