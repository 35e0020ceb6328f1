//! Train/test frame lists and the lazy fold iterator built from them.

use std::fmt;
use std::sync::Arc;

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SamplerError};
use crate::frame::Frame;
use crate::split::{CrossValidation, FoldFunction, FoldIndices};

/// Which arrays a cross-validation fold's test part is cut from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestFoldSource {
    /// Train arrays selected by the fold's *train* rows. The test part then
    /// repeats the train part; kept as the default for compatibility with
    /// models fitted against earlier fold output.
    #[default]
    TrainIndex,
    /// Train arrays selected by the fold's *test* rows (a real held-out part).
    TestIndex,
}

/// Numeric arrays for one fit: `train` and `test` are positionally aligned
/// with the frame lists they came from. `test` is empty when the fold has no
/// held-out part.
#[derive(Debug, Clone, PartialEq)]
pub struct Fold {
    pub train: Vec<Option<Array2<f64>>>,
    pub test: Vec<Option<Array2<f64>>>,
}

/// Ordered train and test frame lists plus the cross-validation plan used to
/// turn them into folds.
#[derive(Clone)]
pub struct Sampler<F: Frame> {
    train: Vec<Option<F>>,
    test: Vec<Option<F>>,
    cross_validation: Option<(usize, Arc<dyn FoldFunction>)>,
    test_fold_source: TestFoldSource,
}

impl<F: Frame> Sampler<F> {
    /// Create a sampler. The cross-validation setting is resolved here, once.
    pub fn new(train: Vec<Option<F>>, test: Vec<Option<F>>, cross_validation: CrossValidation) -> Self {
        Sampler {
            train,
            test,
            cross_validation: cross_validation.resolve(),
            test_fold_source: TestFoldSource::default(),
        }
    }

    /// Choose where cross-validation test folds are cut from.
    pub fn with_test_fold_source(mut self, source: TestFoldSource) -> Self {
        self.test_fold_source = source;
        self
    }

    /// The `(train[i], test[i])` frame pair.
    ///
    /// # Errors
    /// `IndexOutOfRange` if either list is shorter than `i + 1`.
    pub fn get(&self, i: usize) -> Result<(Option<&F>, Option<&F>)> {
        match (self.train.get(i), self.test.get(i)) {
            (Some(train), Some(test)) => Ok((train.as_ref(), test.as_ref())),
            _ => Err(SamplerError::IndexOutOfRange {
                index: i,
                len: self.train.len().min(self.test.len()),
            }),
        }
    }

    /// A sampler over the train frames alone (no test frames, no
    /// cross-validation) and the row index of the first train frame.
    pub fn training(&self) -> Result<(Sampler<F>, Vec<F::Key>)> {
        let index = first_index(&self.train, "train")?;
        Ok((Sampler::new(self.train.clone(), Vec::new(), CrossValidation::Disabled), index))
    }

    /// A sampler over the test frames alone and the row index of the first
    /// test frame.
    pub fn validation(&self) -> Result<(Sampler<F>, Vec<F::Key>)> {
        let index = first_index(&self.test, "test")?;
        Ok((Sampler::new(self.test.clone(), Vec::new(), CrossValidation::Disabled), index))
    }

    /// Lazily yield folds.
    ///
    /// Every frame is converted to its numeric view up front. Without
    /// cross-validation a single fold of the full train/test arrays is
    /// produced. With cross-validation the fold function is called at the
    /// start of each epoch with the first two train arrays, and one fold is
    /// produced per returned index pair, epoch by epoch.
    ///
    /// Call `sample()` again to start over.
    ///
    /// # Errors
    /// The iterator yields `IndexOutOfRange` and then stops if a fold
    /// function returns a row position outside the train arrays.
    pub fn sample(&self) -> Folds {
        Folds {
            train: numeric_views(&self.train),
            test: numeric_views(&self.test),
            plan: self.cross_validation.clone(),
            source: self.test_fold_source,
            epoch: 0,
            fold: 0,
            pending: Vec::new().into_iter(),
            exhausted: false,
        }
    }

    pub fn train(&self) -> &[Option<F>] {
        &self.train
    }

    pub fn test(&self) -> &[Option<F>] {
        &self.test
    }

    pub fn len_train(&self) -> usize {
        self.train.len()
    }

    pub fn len_test(&self) -> usize {
        self.test.len()
    }

    /// Number of fold epochs, or `None` without cross-validation.
    pub fn fold_epochs(&self) -> Option<usize> {
        self.cross_validation.as_ref().map(|(epochs, _)| *epochs)
    }

    pub fn test_fold_source(&self) -> TestFoldSource {
        self.test_fold_source
    }
}

impl<F: Frame + fmt::Debug> fmt::Debug for Sampler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sampler")
            .field("train", &self.train)
            .field("test", &self.test)
            .field("fold_epochs", &self.fold_epochs())
            .field("test_fold_source", &self.test_fold_source)
            .finish()
    }
}

fn first_index<F: Frame>(frames: &[Option<F>], list: &'static str) -> Result<Vec<F::Key>> {
    match frames.first() {
        None => Err(SamplerError::EmptyFrames(list)),
        Some(None) => Err(SamplerError::MissingFrame { list, index: 0 }),
        Some(Some(frame)) => Ok(frame.index().to_vec()),
    }
}

fn numeric_views<F: Frame>(frames: &[Option<F>]) -> Vec<Option<Array2<f64>>> {
    frames.iter().map(|f| f.as_ref().map(Frame::values)).collect()
}

fn select_rows(arrays: &[Option<Array2<f64>>], rows: &[usize]) -> Result<Vec<Option<Array2<f64>>>> {
    arrays
        .iter()
        .map(|a| match a {
            None => Ok(None),
            Some(a) => match rows.iter().find(|&&r| r >= a.nrows()) {
                Some(&index) => Err(SamplerError::IndexOutOfRange { index, len: a.nrows() }),
                None => Ok(Some(a.select(Axis(0), rows))),
            },
        })
        .collect()
}

/// Lazy, finite fold iterator returned by [`Sampler::sample`]. Stops after
/// the first error.
pub struct Folds {
    train: Vec<Option<Array2<f64>>>,
    test: Vec<Option<Array2<f64>>>,
    plan: Option<(usize, Arc<dyn FoldFunction>)>,
    source: TestFoldSource,
    /// Epochs started so far.
    epoch: usize,
    /// Folds emitted in the current epoch.
    fold: usize,
    pending: std::vec::IntoIter<FoldIndices>,
    exhausted: bool,
}

impl Folds {
    fn cut(&self, train_rows: &[usize], test_rows: Option<&[usize]>) -> Result<Fold> {
        let train = select_rows(&self.train, train_rows)?;
        let test = match (test_rows, self.source) {
            (None, _) => Vec::new(),
            (Some(_), TestFoldSource::TrainIndex) => train.clone(),
            (Some(rows), TestFoldSource::TestIndex) => select_rows(&self.train, rows)?,
        };
        Ok(Fold { train, test })
    }
}

impl Iterator for Folds {
    type Item = Result<Fold>;

    fn next(&mut self) -> Option<Result<Fold>> {
        if self.exhausted {
            return None;
        }

        let Some((epochs, fold_fn)) = self.plan.clone() else {
            self.exhausted = true;
            return Some(Ok(Fold {
                train: std::mem::take(&mut self.train),
                test: std::mem::take(&mut self.test),
            }));
        };

        loop {
            if let Some((train_rows, test_rows)) = self.pending.next() {
                tracing::info!(epoch = self.epoch - 1, fold = self.fold, "fit fold");
                self.fold += 1;
                let fold = self.cut(&train_rows, test_rows.as_deref());
                if fold.is_err() {
                    self.exhausted = true;
                }
                return Some(fold);
            }

            if self.epoch >= epochs {
                self.exhausted = true;
                return None;
            }

            let x = self.train.first().and_then(Option::as_ref);
            let y = self.train.get(1).and_then(Option::as_ref);
            let folds = fold_fn.folds(x, y);
            tracing::info!(epoch = self.epoch, epochs, folds = folds.len(), "Starting fold epoch");

            self.pending = folds.into_iter();
            self.epoch += 1;
            self.fold = 0;
        }
    }
}
