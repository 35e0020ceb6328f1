//! Stock splitters and fold functions.

use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::error::{Result, SamplerError};
use crate::sampler::TestFoldSource;
use crate::split::{CrossValidation, FoldFunction, FoldIndices, Splitter};

fn check_fraction(name: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(SamplerError::Config(format!("{name} must be within [0, 1], got {value}")))
    }
}

fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Keeps index order: the first `1 - test_size` share of rows is train, the
/// rest is test. No cross-validation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NaiveSplitter {
    test_size: f64,
}

impl NaiveSplitter {
    /// # Errors
    /// `Config` if `test_size` is outside `[0, 1]`.
    pub fn new(test_size: f64) -> Result<Self> {
        check_fraction("test_size", test_size)?;
        Ok(NaiveSplitter { test_size })
    }

    pub fn test_size(&self) -> f64 {
        self.test_size
    }
}

impl<K: Clone> Splitter<K> for NaiveSplitter {
    fn train_test_split(&self, index: &[K]) -> (Vec<K>, Vec<K>) {
        let end = (index.len() as f64 * (1.0 - self.test_size)) as usize;
        let end = end.min(index.len());
        (index[..end].to_vec(), index[end..].to_vec())
    }

    fn cross_validation(&self) -> CrossValidation {
        CrossValidation::Disabled
    }
}

/// Random train/test split with an optional block of youngest rows always
/// kept for the test set.
///
/// The trailing `youngest_size` share of the index goes to test untouched;
/// `test_size` of the remaining rows is drawn at random for test as well.
/// Both sides come back in original index order.
#[derive(Debug, Clone)]
pub struct RandomSplits {
    test_size: f64,
    youngest_size: Option<f64>,
    seed: Option<u64>,
    cross_validation: CrossValidation,
    test_fold_source: TestFoldSource,
}

impl RandomSplits {
    /// # Errors
    /// `Config` if `test_size` or `youngest_size` is outside `[0, 1]`.
    pub fn new(test_size: f64, youngest_size: Option<f64>, seed: Option<u64>) -> Result<Self> {
        check_fraction("test_size", test_size)?;
        if let Some(youngest) = youngest_size {
            check_fraction("youngest_size", youngest)?;
        }
        Ok(RandomSplits {
            test_size,
            youngest_size,
            seed,
            cross_validation: CrossValidation::Disabled,
            test_fold_source: TestFoldSource::default(),
        })
    }

    /// Attach a cross-validation setting for the train part.
    pub fn with_cross_validation(mut self, cross_validation: CrossValidation) -> Self {
        self.cross_validation = cross_validation;
        self
    }

    /// Choose where samplers built from this splitter cut test folds from.
    pub fn with_test_fold_source(mut self, source: TestFoldSource) -> Self {
        self.test_fold_source = source;
        self
    }

    fn split_positions(&self, n: usize) -> (Vec<usize>, Vec<usize>) {
        let youngest = self
            .youngest_size
            .map(|s| (n as f64 * s).round() as usize)
            .unwrap_or(0)
            .min(n);
        let head = n - youngest;

        let mut candidates: Vec<usize> = (0..head).collect();
        candidates.shuffle(&mut rng_from(self.seed));

        let n_test = ((head as f64 * self.test_size).ceil() as usize).min(head);
        let mut test: Vec<usize> = candidates[..n_test].to_vec();
        test.extend(head..n);
        test.sort_unstable();

        let mut train: Vec<usize> = candidates[n_test..].to_vec();
        train.sort_unstable();

        (train, test)
    }
}

impl<K: Clone> Splitter<K> for RandomSplits {
    fn train_test_split(&self, index: &[K]) -> (Vec<K>, Vec<K>) {
        let (train, test) = self.split_positions(index.len());
        tracing::debug!(
            train = train.len(),
            test = test.len(),
            youngest = ?self.youngest_size,
            "Random train/test split"
        );
        (
            train.iter().map(|&i| index[i].clone()).collect(),
            test.iter().map(|&i| index[i].clone()).collect(),
        )
    }

    fn cross_validation(&self) -> CrossValidation {
        self.cross_validation.clone()
    }

    fn test_fold_source(&self) -> TestFoldSource {
        self.test_fold_source
    }
}

/// K-fold cross-validation over the rows of `x`.
///
/// Fold sizes differ by at most one and every row is held out exactly once.
/// With a seed, rows are shuffled before folding and the seed advances on
/// every call, so each fold epoch sees a different permutation while the
/// whole sequence stays reproducible.
#[derive(Debug)]
pub struct KFold {
    n_splits: usize,
    seed: Option<u64>,
    calls: AtomicU64,
}

impl KFold {
    /// # Errors
    /// `Config` if `n_splits < 2`.
    pub fn new(n_splits: usize, seed: Option<u64>) -> Result<Self> {
        if n_splits < 2 {
            return Err(SamplerError::Config(format!(
                "KFold needs at least 2 splits, got {n_splits}"
            )));
        }
        Ok(KFold {
            n_splits,
            seed,
            calls: AtomicU64::new(0),
        })
    }

    pub fn n_splits(&self) -> usize {
        self.n_splits
    }

    /// Fold index pairs for `n` rows.
    pub fn split(&self, n: usize) -> Vec<FoldIndices> {
        let mut rows: Vec<usize> = (0..n).collect();
        if let Some(seed) = self.seed {
            let call = self.calls.fetch_add(1, Ordering::Relaxed);
            rows.shuffle(&mut StdRng::seed_from_u64(seed.wrapping_add(call)));
        }

        let base = n / self.n_splits;
        let extra = n % self.n_splits;
        let mut folds = Vec::with_capacity(self.n_splits);
        let mut start = 0;
        for f in 0..self.n_splits {
            let size = base + usize::from(f < extra);
            if size == 0 {
                continue;
            }
            let mut test: Vec<usize> = rows[start..start + size].to_vec();
            test.sort_unstable();
            let mut train: Vec<usize> = rows[..start]
                .iter()
                .chain(&rows[start + size..])
                .copied()
                .collect();
            train.sort_unstable();
            folds.push((train, Some(test)));
            start += size;
        }
        folds
    }
}

impl FoldFunction for KFold {
    fn folds(&self, x: Option<&Array2<f64>>, y: Option<&Array2<f64>>) -> Vec<FoldIndices> {
        let n = x.or(y).map(|a| a.nrows()).unwrap_or(0);
        self.split(n)
    }
}
