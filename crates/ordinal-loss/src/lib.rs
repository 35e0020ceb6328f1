//! Soft-ordinal losses for classifiers over bucketed targets.
//!
//! Provides a differentiable argmax, a parabolic tail-skew penalty built on
//! top of it, and a categorical cross-entropy loss that adds the penalty to
//! push predictions toward the tails of a discretized distribution (e.g.
//! bucketed returns, where the extreme buckets are rare).
//!
//! All losses are generic over `B: Backend` and stay differentiable under
//! burn's `Autodiff` decorator.

pub mod argmax;
pub mod bridge;
pub mod penalty;
pub mod tailed;

pub use argmax::{DifferentiableArgmax, DifferentiableArgmaxConfig};
pub use penalty::{ParabolicPenaltyLoss, ParabolicPenaltyLossConfig};
pub use tailed::{Reduction, TailedCategoricalCrossentropyLoss, TailedCategoricalCrossentropyLossConfig};
