//! Train/test splitting and cross-validation fold sampling over labeled frames.
//!
//! A [`DataGenerator`] splits an ordered list of frames (features, targets,
//! weights, ..) that share one row index into train and test parts and wraps
//! them in a [`Sampler`]. The sampler turns frames into positional numeric
//! arrays and yields [`Fold`]s lazily, optionally over several epochs of a
//! cross-validation [`FoldFunction`]. Fitting itself happens in an external
//! training loop.

pub mod config;
pub mod error;
pub mod frame;
pub mod generator;
pub mod sampler;
pub mod split;
pub mod splitters;

pub use config::{load_sampling_toml, ConfiguredSplitter, SamplingToml, SplitterConfig};
pub use error::{Result, SamplerError};
pub use frame::{Frame, LabeledFrame};
pub use generator::DataGenerator;
pub use sampler::{Fold, Folds, Sampler, TestFoldSource};
pub use split::{CrossValidation, FoldFunction, FoldIndices, Splitter};
pub use splitters::{KFold, NaiveSplitter, RandomSplits};
