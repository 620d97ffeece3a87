use std::num::NonZeroUsize;

use ndarray::{Array2, ArrayView2, Axis, s};
use rand::{Rng, seq::SliceRandom};

use crate::{MlErr, Result};

/// An in-memory supervised dataset.
///
/// Samples are stored one per row, the first `x_size` columns are the features and the
/// remaining `y_size` columns are the targets.
#[derive(Debug, Clone)]
pub struct Dataset {
    x_size: usize,
    y_size: usize,
    data: Array2<f32>,
}

impl Dataset {
    /// Creates a new `Dataset` from a row major buffer.
    ///
    /// # Arguments
    /// * `data` - The samples, each one `x_size + y_size` values long.
    /// * `x_size` - The amount of features per sample.
    /// * `y_size` - The amount of targets per sample.
    ///
    /// # Returns
    /// An error if a sample would be empty or `data` can't be split into whole samples.
    pub fn new(data: Vec<f32>, x_size: usize, y_size: usize) -> Result<Self> {
        let row_size = x_size + y_size;

        if x_size == 0 || y_size == 0 {
            return Err(MlErr::InvalidDataset(format!(
                "x_size ({x_size}) and y_size ({y_size}) must be greater than 0"
            )));
        }

        if data.len() % row_size != 0 {
            return Err(MlErr::InvalidDataset(format!(
                "dataset length ({}) is not divisible by x_size + y_size ({row_size})",
                data.len()
            )));
        }

        let len = data.len() / row_size;
        let data = Array2::from_shape_vec((len, row_size), data)
            .map_err(|e| MlErr::InvalidDataset(e.to_string()))?;

        Ok(Self {
            x_size,
            y_size,
            data,
        })
    }

    /// The amount of samples.
    pub fn len(&self) -> usize {
        self.data.nrows()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A view of every sample's features.
    pub fn x(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., ..self.x_size])
    }

    /// A view of every sample's targets.
    pub fn y(&self) -> ArrayView2<'_, f32> {
        self.data.slice(s![.., self.x_size..])
    }

    /// Randomly permutes the samples in place.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(rng);

        self.data = self.data.select(Axis(0), &indices);
    }

    /// Splits the samples in consecutive batches of at most `batch_size` samples.
    ///
    /// # Returns
    /// An iterator over `(x, y)` views, the last batch may be smaller.
    pub fn batches(
        &self,
        batch_size: NonZeroUsize,
    ) -> impl Iterator<Item = (ArrayView2<'_, f32>, ArrayView2<'_, f32>)> {
        let x_size = self.x_size;

        self.data
            .axis_chunks_iter(Axis(0), batch_size.get())
            .map(move |batch| batch.split_at(Axis(1), x_size))
    }

    /// Creates a new dataset from the samples at `indices`, in that order.
    ///
    /// # Returns
    /// An error if any index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        if let Some(&index) = indices.iter().find(|&&i| i >= self.len()) {
            return Err(MlErr::InvalidDataset(format!(
                "sample index {index} is out of bounds for {} samples",
                self.len()
            )));
        }

        Ok(Self {
            x_size: self.x_size,
            y_size: self.y_size,
            data: self.data.select(Axis(0), indices),
        })
    }
}
