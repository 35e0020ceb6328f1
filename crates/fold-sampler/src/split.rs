//! Splitter and cross-validation interfaces.

use std::fmt;
use std::sync::Arc;

use ndarray::Array2;

use crate::sampler::TestFoldSource;

/// Positional `(train_rows, test_rows)` for one fold. `test_rows == None`
/// means the fold has no held-out part.
pub type FoldIndices = (Vec<usize>, Option<Vec<usize>>);

/// Produces cross-validation folds from the first two numeric arrays of a
/// frame list (typically features and labels).
///
/// Called once per fold epoch. Implementations that shuffle should reshuffle
/// on every call.
pub trait FoldFunction: Send + Sync {
    fn folds(&self, x: Option<&Array2<f64>>, y: Option<&Array2<f64>>) -> Vec<FoldIndices>;
}

impl<F> FoldFunction for F
where
    F: Fn(Option<&Array2<f64>>, Option<&Array2<f64>>) -> Vec<FoldIndices> + Send + Sync,
{
    fn folds(&self, x: Option<&Array2<f64>>, y: Option<&Array2<f64>>) -> Vec<FoldIndices> {
        self(x, y)
    }
}

/// Cross-validation setting carried by a splitter.
#[derive(Clone, Default)]
pub enum CrossValidation {
    /// Fit once on the full train arrays.
    #[default]
    Disabled,
    /// One epoch of folds.
    Folds(Arc<dyn FoldFunction>),
    /// `n` epochs, calling the fold function anew for each.
    EpochedFolds(usize, Arc<dyn FoldFunction>),
}

impl CrossValidation {
    /// Wrap a fold function for a single epoch.
    pub fn folds(fold_fn: impl FoldFunction + 'static) -> Self {
        Self::Folds(Arc::new(fold_fn))
    }

    /// Wrap a fold function for `epochs` epochs.
    pub fn epoched(epochs: usize, fold_fn: impl FoldFunction + 'static) -> Self {
        Self::EpochedFolds(epochs, Arc::new(fold_fn))
    }

    /// Normalize to `(epochs, fold_fn)`; a bare fold function runs one epoch.
    pub fn resolve(&self) -> Option<(usize, Arc<dyn FoldFunction>)> {
        match self {
            Self::Disabled => None,
            Self::Folds(f) => Some((1, Arc::clone(f))),
            Self::EpochedFolds(epochs, f) => Some((*epochs, Arc::clone(f))),
        }
    }
}

impl fmt::Debug for CrossValidation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => write!(f, "Disabled"),
            Self::Folds(_) => write!(f, "Folds(<fn>)"),
            Self::EpochedFolds(epochs, _) => write!(f, "EpochedFolds({epochs}, <fn>)"),
        }
    }
}

/// Splits a row index into train and test keys and supplies the
/// cross-validation setting used on the train part.
pub trait Splitter<K> {
    fn train_test_split(&self, index: &[K]) -> (Vec<K>, Vec<K>);

    fn cross_validation(&self) -> CrossValidation;

    /// Where samplers built from this splitter cut cross-validation test
    /// folds from.
    fn test_fold_source(&self) -> TestFoldSource {
        TestFoldSource::default()
    }
}

impl<K, S: Splitter<K> + ?Sized> Splitter<K> for Box<S> {
    fn train_test_split(&self, index: &[K]) -> (Vec<K>, Vec<K>) {
        (**self).train_test_split(index)
    }

    fn cross_validation(&self) -> CrossValidation {
        (**self).cross_validation()
    }

    fn test_fold_source(&self) -> TestFoldSource {
        (**self).test_fold_source()
    }
}
