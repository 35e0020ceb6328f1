//! Categorical cross-entropy with a parabolic tail penalty.
//!
//! Built for discretized targets where the outer buckets are rare (returns,
//! for example). Plain cross-entropy lets a predictor hug the middle buckets;
//! the added penalty makes predictions that sit too close to the mean
//! expensive and pushes the model toward the tails.

use std::fmt;

use burn::prelude::*;
use burn::tensor::activation::log_softmax;
use serde::{Deserialize, Serialize};

use crate::penalty::{ParabolicPenaltyLoss, ParabolicPenaltyLossConfig};

/// How per-example losses are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reduction {
    /// Keep one loss per example, shape `(batch,)`.
    #[default]
    None,
    /// Sum over the batch, shape `(1,)`.
    Sum,
    /// Mean over the batch, shape `(1,)`.
    Mean,
}

impl fmt::Display for Reduction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => write!(f, "none"),
            Self::Sum => write!(f, "sum"),
            Self::Mean => write!(f, "mean"),
        }
    }
}

impl Reduction {
    /// Parse from string. Unrecognized names keep the losses un-reduced.
    pub fn from_str_lossy(s: &str) -> Self {
        match s {
            "sum" => Self::Sum,
            "mean" => Self::Mean,
            _ => Self::None,
        }
    }
}

/// Configuration for [`TailedCategoricalCrossentropyLoss`].
#[derive(Config, Debug)]
pub struct TailedCategoricalCrossentropyLossConfig {
    /// Number of categories K (length of the one-hot vectors).
    pub num_categories: usize,
    /// Weight of the parabolic penalty (steepness of the parabola).
    #[config(default = 0.1)]
    pub alpha: f64,
    /// Sharpness of the soft-argmax inside the penalty.
    #[config(default = 1e10)]
    pub beta: f64,
    /// Skew toward the outer buckets. 0 means no skew.
    #[config(default = 1.0)]
    pub delta: f64,
    /// Reduction applied to the per-example losses.
    #[config(default = "Reduction::None")]
    pub reduction: Reduction,
}

/// Tail-penalized categorical cross-entropy.
///
/// `loss_i = alpha * penalty(y_true_i, y_pred_i) + CE(y_pred_i, argmax(y_true_i))`
///
/// The penalty receives `(y_true, y_pred)`, the reverse of its own
/// `(pred, true)` order, so the true distribution's soft index carries the
/// `delta/2` offset and the prediction's carries the `(K + delta) / K` scale.
///
/// `y_true` is expected to be one-hot. Soft targets are accepted, but the
/// cross-entropy term only sees `argmax(y_true)`, so label smoothing or other
/// soft-label information is silently collapsed to a single hard category.
///
/// With [`Reduction::None`] each row carries its own cross-entropy, not the
/// batch-mean cross-entropy added to every row's penalty. `Sum` and `Mean`
/// come out the same either way.
#[derive(Debug, Clone)]
pub struct TailedCategoricalCrossentropyLoss<B: Backend> {
    penalty: ParabolicPenaltyLoss<B>,
    alpha: f64,
    reduction: Reduction,
}

impl TailedCategoricalCrossentropyLossConfig {
    /// Initialize the loss on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> TailedCategoricalCrossentropyLoss<B> {
        if self.alpha < 0.0 {
            tracing::warn!(alpha = self.alpha, "Negative alpha rewards the tail penalty");
        }
        TailedCategoricalCrossentropyLoss {
            penalty: ParabolicPenaltyLossConfig::new(self.num_categories)
                .with_delta(self.delta)
                .with_beta(self.beta)
                .init(device),
            alpha: self.alpha,
            reduction: self.reduction,
        }
    }
}

impl<B: Backend> TailedCategoricalCrossentropyLoss<B> {
    /// Compute the loss.
    ///
    /// # Arguments
    /// - `y_pred`: shape `(batch, K)`, raw logits
    /// - `y_true`: shape `(batch, K)`, one-hot targets
    ///
    /// # Returns
    /// Shape `(batch,)` for [`Reduction::None`], otherwise shape `(1,)`.
    pub fn forward(&self, y_pred: Tensor<B, 2>, y_true: Tensor<B, 2>) -> Tensor<B, 1> {
        let [batch_size, _k] = y_pred.dims();

        let penalty = self
            .penalty
            .forward(y_true.clone(), y_pred.clone())
            .mul_scalar(self.alpha);

        let targets = y_true.argmax(1); // (batch, 1)
        let base_loss = cross_entropy_per_example(y_pred, targets);

        let loss = penalty + base_loss;

        match self.reduction {
            Reduction::Sum => loss.sum(),
            Reduction::Mean => loss.mean(),
            Reduction::None => loss.reshape([batch_size]),
        }
    }

    /// Configured reduction.
    pub fn reduction(&self) -> Reduction {
        self.reduction
    }
}

/// Un-reduced cross-entropy: `-log_softmax(logits)[target]` per row.
///
/// `targets` has shape `(batch, 1)`; the result has shape `(batch,)`.
fn cross_entropy_per_example<B: Backend>(
    logits: Tensor<B, 2>,
    targets: Tensor<B, 2, Int>,
) -> Tensor<B, 1> {
    log_softmax(logits, 1)
        .gather(1, targets)
        .squeeze::<1>(1)
        .neg()
}
