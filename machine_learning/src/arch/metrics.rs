use ndarray::ArrayView2;

/// A non-differentiable measure reported alongside the loss on evaluation.
pub trait Metric {
    fn name(&self) -> &'static str;

    fn measure(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32;
}

/// Mean absolute error.
#[derive(Debug, Default, Clone, Copy)]
pub struct Mae;

impl Metric for Mae {
    fn name(&self) -> &'static str {
        "mae"
    }

    fn measure(&self, y_pred: ArrayView2<f32>, y: ArrayView2<f32>) -> f32 {
        (&y_pred - &y).mapv(f32::abs).mean().unwrap_or_default()
    }
}
