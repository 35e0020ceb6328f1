//! Split a frame list into train/test samplers.
//!
//! Instead of handing x/y arrays to a fit method, callers hand it a
//! [`Sampler`]; the fit loop then owns cross-validation by iterating
//! [`Sampler::sample`].

use crate::error::{Result, SamplerError};
use crate::frame::{loc_if_present, Frame};
use crate::sampler::Sampler;
use crate::split::Splitter;

/// A splitter plus the frames it splits. All frames must share the first
/// frame's row index.
pub struct DataGenerator<S, F: Frame> {
    splitter: S,
    frames: Vec<Option<F>>,
}

impl<S: Splitter<F::Key>, F: Frame> DataGenerator<S, F> {
    pub fn new(splitter: S, frames: Vec<Option<F>>) -> Self {
        DataGenerator { splitter, frames }
    }

    /// Split the first frame's index and slice every frame by the resulting
    /// train and test keys. Absent frames stay absent on both sides.
    ///
    /// # Errors
    /// `EmptyFrames` / `MissingFrame` when there is no first frame to take the
    /// index from, `UnknownKey` if a frame lacks a key of the split.
    pub fn train_test_sampler(&self) -> Result<Sampler<F>> {
        let anchor = match self.frames.first() {
            None => return Err(SamplerError::EmptyFrames("generator")),
            Some(None) => {
                return Err(SamplerError::MissingFrame {
                    list: "generator",
                    index: 0,
                })
            }
            Some(Some(frame)) => frame,
        };

        let (train_keys, test_keys) = self.splitter.train_test_split(anchor.index());
        tracing::debug!(
            rows = anchor.num_rows(),
            train = train_keys.len(),
            test = test_keys.len(),
            frames = self.frames.len(),
            "Split frames into train/test"
        );

        let train = self
            .frames
            .iter()
            .map(|f| loc_if_present(f.as_ref(), &train_keys))
            .collect::<Result<Vec<_>>>()?;
        let test = self
            .frames
            .iter()
            .map(|f| loc_if_present(f.as_ref(), &test_keys))
            .collect::<Result<Vec<_>>>()?;

        Ok(Sampler::new(train, test, self.splitter.cross_validation())
            .with_test_fold_source(self.splitter.test_fold_source()))
    }

    /// All frames as train with no test frames, still carrying the
    /// splitter's cross-validation setting and test-fold source. For fold
    /// generation over the complete data set.
    pub fn complete_samples(&self) -> Sampler<F> {
        Sampler::new(self.frames.clone(), Vec::new(), self.splitter.cross_validation())
            .with_test_fold_source(self.splitter.test_fold_source())
    }

    pub fn frames(&self) -> &[Option<F>] {
        &self.frames
    }

    pub fn splitter(&self) -> &S {
        &self.splitter
    }
}
