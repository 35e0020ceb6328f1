//! TOML config loading for splitters.
//!
//! Deserializes a `[splitter]` section such as:
//!
//! ```toml
//! [splitter]
//! kind = "random"
//! test_size = 0.3
//! youngest_size = 0.1
//! seed = 42
//! folds = 5
//! fold_epochs = 2
//! test_fold_source = "train_index"
//! ```

use std::path::Path;

use serde::Deserialize;

use crate::error::Result;
use crate::sampler::TestFoldSource;
use crate::split::{CrossValidation, Splitter};
use crate::splitters::{KFold, NaiveSplitter, RandomSplits};

/// Top-level structure of a sampling config file.
#[derive(Debug, Deserialize)]
pub struct SamplingToml {
    /// Train/test split and cross-validation settings.
    pub splitter: SplitterConfig,
}

/// Splitter selection, tagged by `kind`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SplitterConfig {
    Naive(NaiveSplitterConfig),
    Random(RandomSplitsConfig),
}

#[derive(Debug, Clone, Deserialize)]
pub struct NaiveSplitterConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RandomSplitsConfig {
    /// Share of (non-youngest) rows held out for test.
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    /// Trailing share of rows always assigned to test.
    #[serde(default)]
    pub youngest_size: Option<f64>,
    /// Seed for the split and fold shuffles. Unseeded runs draw from entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of k-fold splits. No cross-validation when absent.
    #[serde(default)]
    pub folds: Option<usize>,
    /// Fold epochs when `folds` is set.
    #[serde(default = "default_fold_epochs")]
    pub fold_epochs: usize,
    /// Where cross-validation test folds are cut from.
    #[serde(default)]
    pub test_fold_source: TestFoldSource,
}

fn default_test_size() -> f64 {
    0.4
}
fn default_fold_epochs() -> usize {
    1
}

impl SplitterConfig {
    /// Log a warning for settings that are valid but probably unintended.
    pub fn validate(&self) {
        match self {
            Self::Naive(c) => {
                if c.test_size == 0.0 || c.test_size == 1.0 {
                    tracing::warn!(test_size = c.test_size, "Naive split leaves one side empty");
                }
            }
            Self::Random(c) => {
                if c.test_size == 0.0 && c.youngest_size.unwrap_or(0.0) == 0.0 {
                    tracing::warn!("Random split holds out no rows");
                }
                if c.folds.is_none() && c.fold_epochs != 1 {
                    tracing::warn!(fold_epochs = c.fold_epochs, "fold_epochs is ignored without folds");
                }
                if c.folds.is_some() && c.fold_epochs == 0 {
                    tracing::warn!("fold_epochs = 0 produces no folds");
                }
            }
        }
    }

    /// Build the configured splitter.
    ///
    /// # Errors
    /// `Config` for out-of-range fractions or fewer than 2 folds.
    pub fn build(&self) -> Result<ConfiguredSplitter> {
        self.validate();
        match self {
            Self::Naive(c) => Ok(ConfiguredSplitter::Naive(NaiveSplitter::new(c.test_size)?)),
            Self::Random(c) => {
                let mut splitter = RandomSplits::new(c.test_size, c.youngest_size, c.seed)?
                    .with_test_fold_source(c.test_fold_source);
                if let Some(folds) = c.folds {
                    let kfold = KFold::new(folds, c.seed)?;
                    splitter = splitter.with_cross_validation(CrossValidation::epoched(c.fold_epochs, kfold));
                }
                Ok(ConfiguredSplitter::Random(splitter))
            }
        }
    }
}

/// A splitter built from [`SplitterConfig`].
#[derive(Debug, Clone)]
pub enum ConfiguredSplitter {
    Naive(NaiveSplitter),
    Random(RandomSplits),
}

impl<K: Clone> Splitter<K> for ConfiguredSplitter {
    fn train_test_split(&self, index: &[K]) -> (Vec<K>, Vec<K>) {
        match self {
            Self::Naive(s) => s.train_test_split(index),
            Self::Random(s) => s.train_test_split(index),
        }
    }

    fn cross_validation(&self) -> CrossValidation {
        match self {
            Self::Naive(s) => Splitter::<K>::cross_validation(s),
            Self::Random(s) => Splitter::<K>::cross_validation(s),
        }
    }

    fn test_fold_source(&self) -> TestFoldSource {
        match self {
            Self::Naive(s) => Splitter::<K>::test_fold_source(s),
            Self::Random(s) => Splitter::<K>::test_fold_source(s),
        }
    }
}

/// Load and deserialize a `SamplingToml` from a TOML file.
pub fn load_sampling_toml(path: &Path) -> anyhow::Result<SamplingToml> {
    let contents = std::fs::read_to_string(path)?;
    let config: SamplingToml = toml::from_str(&contents)?;
    tracing::info!(path = %path.display(), "Loaded sampling config");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_random_splitter() {
        let toml_str = r#"
[splitter]
kind = "random"
test_size = 0.3
youngest_size = 0.1
seed = 42
folds = 5
fold_epochs = 2
test_fold_source = "test_index"
"#;
        let config: SamplingToml = toml::from_str(toml_str).unwrap();
        let SplitterConfig::Random(ref c) = config.splitter else {
            panic!("expected random splitter, got {:?}", config.splitter);
        };
        assert!((c.test_size - 0.3).abs() < 1e-12);
        assert_eq!(c.youngest_size, Some(0.1));
        assert_eq!(c.seed, Some(42));
        assert_eq!(c.folds, Some(5));
        assert_eq!(c.fold_epochs, 2);
        assert_eq!(c.test_fold_source, TestFoldSource::TestIndex);

        let splitter = config.splitter.build().unwrap();
        let cv = Splitter::<i64>::cross_validation(&splitter);
        assert_eq!(cv.resolve().map(|(epochs, _)| epochs), Some(2));
        assert_eq!(Splitter::<i64>::test_fold_source(&splitter), TestFoldSource::TestIndex);
    }

    #[test]
    fn test_defaults() {
        let config: SamplingToml = toml::from_str("[splitter]\nkind = \"random\"\n").unwrap();
        let SplitterConfig::Random(ref c) = config.splitter else {
            panic!("expected random splitter");
        };
        assert!((c.test_size - 0.4).abs() < 1e-12);
        assert_eq!(c.youngest_size, None);
        assert_eq!(c.folds, None);
        assert_eq!(c.fold_epochs, 1);
        assert_eq!(c.test_fold_source, TestFoldSource::TrainIndex);

        let splitter = config.splitter.build().unwrap();
        assert!(Splitter::<i64>::cross_validation(&splitter).resolve().is_none());
        assert_eq!(Splitter::<i64>::test_fold_source(&splitter), TestFoldSource::TrainIndex);
    }

    #[test]
    fn test_naive_splitter_from_toml() {
        let config: SamplingToml = toml::from_str("[splitter]\nkind = \"naive\"\ntest_size = 0.2\n").unwrap();
        let splitter = config.splitter.build().unwrap();
        let index: Vec<i64> = (0..10).collect();
        let (train, test) = splitter.train_test_split(&index);
        assert_eq!(train.len(), 8);
        assert_eq!(test, vec![8, 9]);
    }

    #[test]
    fn test_invalid_values_rejected() {
        let config: SamplingToml =
            toml::from_str("[splitter]\nkind = \"random\"\nfolds = 1\n").unwrap();
        assert!(config.splitter.build().is_err());

        let config: SamplingToml =
            toml::from_str("[splitter]\nkind = \"naive\"\ntest_size = 1.2\n").unwrap();
        assert!(config.splitter.build().is_err());

        assert!(toml::from_str::<SamplingToml>("[splitter]\nkind = \"stratified\"\n").is_err());
    }
}
