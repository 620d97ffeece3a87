use std::ops::Range;

/// A single train/test split of a dataset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    /// The index of the held out sample.
    pub test: usize,
    /// The indices of every other sample, in order.
    pub train: Vec<usize>,
}

/// Leave-one-out cross-validation: as many folds as samples, each one holding out a
/// different sample.
#[derive(Debug, Clone)]
pub struct LeaveOneOut {
    len: usize,
    folds: Range<usize>,
}

impl LeaveOneOut {
    /// Creates the folds for a dataset of `len` samples.
    pub fn new(len: usize) -> Self {
        Self { len, folds: 0..len }
    }
}

impl Iterator for LeaveOneOut {
    type Item = Fold;

    fn next(&mut self) -> Option<Self::Item> {
        let test = self.folds.next()?;
        let train = (0..self.len).filter(|&i| i != test).collect();

        Some(Fold { test, train })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.folds.size_hint()
    }
}

impl ExactSizeIterator for LeaveOneOut {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_fold_per_sample() {
        let folds: Vec<_> = LeaveOneOut::new(4).collect();

        assert_eq!(folds.len(), 4);

        for (i, fold) in folds.iter().enumerate() {
            assert_eq!(fold.test, i);
            assert_eq!(fold.train.len(), 3);
            assert!(!fold.train.contains(&i));
        }

        assert_eq!(folds[2].train, [0, 1, 3]);
    }

    #[test]
    fn empty() {
        let mut folds = LeaveOneOut::new(0);

        assert_eq!(folds.len(), 0);
        assert!(folds.next().is_none());
    }

    #[test]
    fn single_sample_has_nothing_to_train_on() {
        let folds: Vec<_> = LeaveOneOut::new(1).collect();
        assert_eq!(folds, [Fold { test: 0, train: vec![] }]);
    }
}
