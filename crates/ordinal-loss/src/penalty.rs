//! Parabolic tail-skew penalty between two category distributions.

use burn::prelude::*;

use crate::argmax::{DifferentiableArgmax, DifferentiableArgmaxConfig};

/// Configuration for [`ParabolicPenaltyLoss`].
#[derive(Config, Debug)]
pub struct ParabolicPenaltyLossConfig {
    /// Number of categories K.
    pub num_categories: usize,
    /// Tail-skew strength. 0 means no skew, larger values push the penalty
    /// minimum further toward the outer buckets.
    #[config(default = 1.0)]
    pub delta: f64,
    /// Sharpness of the underlying soft-argmax.
    #[config(default = 1e10)]
    pub beta: f64,
}

/// Squared distance between the soft bucket of `y_pred` and an offset,
/// rescaled soft bucket of `y_true`:
///
/// ```text
/// (soft_idx(y_pred) + delta/2 - soft_idx(y_true) * (K + delta) / K)^2
/// ```
///
/// The rescaling stretches the true bucket away from the centre, so the
/// penalty is asymmetric and favours predictions toward the tails.
#[derive(Debug, Clone)]
pub struct ParabolicPenaltyLoss<B: Backend> {
    argmax: DifferentiableArgmax<B>,
    offset: f64,
    scale: f64,
}

impl ParabolicPenaltyLossConfig {
    /// Initialize the penalty on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> ParabolicPenaltyLoss<B> {
        let k = self.num_categories;
        ParabolicPenaltyLoss {
            argmax: DifferentiableArgmaxConfig::new(k)
                .with_beta(self.beta)
                .init(device),
            offset: self.delta / 2.0,
            scale: (k as f64 + self.delta) / k as f64,
        }
    }
}

impl<B: Backend> ParabolicPenaltyLoss<B> {
    /// Per-example penalty.
    ///
    /// Input shapes: `(batch, K)` each.
    /// Output shape: `(batch,)`, not reduced.
    pub fn forward(&self, y_pred: Tensor<B, 2>, y_true: Tensor<B, 2>) -> Tensor<B, 1> {
        let pred_idx = self.argmax.forward(y_pred);
        let true_idx = self.argmax.forward(y_true);

        (pred_idx.add_scalar(self.offset) - true_idx.mul_scalar(self.scale)).powf_scalar(2.0)
    }

    /// Number of categories K.
    pub fn num_categories(&self) -> usize {
        self.argmax.num_categories()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{buckets_to_one_hot, loss_values};
    use burn::backend::ndarray::NdArray;
    use burn::backend::Autodiff;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    #[test]
    fn test_identical_inputs_zero_delta() {
        let device = Default::default();
        let penalty = ParabolicPenaltyLossConfig::new(5)
            .with_delta(0.0)
            .init::<TestBackend>(&device);

        let y = buckets_to_one_hot::<TestBackend>(&[0, 1, 2, 3, 4], 5, &device);
        let values = loss_values(penalty.forward(y.clone(), y));
        for (i, v) in values.iter().enumerate() {
            assert!(v.abs() < 1e-6, "row {i}: expected 0, got {v}");
        }
    }

    #[test]
    fn test_known_values() {
        let device = Default::default();
        // K=5, delta=1: offset 0.5, scale 1.2
        let penalty = ParabolicPenaltyLossConfig::new(5).init::<TestBackend>(&device);

        let pred = buckets_to_one_hot::<TestBackend>(&[2, 4, 0], 5, &device);
        let truth = buckets_to_one_hot::<TestBackend>(&[2, 0, 4], 5, &device);
        let values = loss_values(penalty.forward(pred, truth));

        let expected = [
            (2.0 + 0.5 - 2.0 * 1.2_f64).powi(2), // 0.01
            (4.0 + 0.5 - 0.0_f64).powi(2),       // 20.25
            (0.0 + 0.5 - 4.0 * 1.2_f64).powi(2), // 18.49
        ];
        for (v, e) in values.iter().zip(expected) {
            assert!((v - e).abs() < 1e-4, "expected {e}, got {v}");
        }
    }

    #[test]
    fn test_asymmetric_in_arguments() {
        let device = Default::default();
        let penalty = ParabolicPenaltyLossConfig::new(5).init::<TestBackend>(&device);

        let a = buckets_to_one_hot::<TestBackend>(&[1], 5, &device);
        let b = buckets_to_one_hot::<TestBackend>(&[3], 5, &device);
        let ab: f32 = penalty.forward(a.clone(), b.clone()).into_scalar().elem();
        let ba: f32 = penalty.forward(b, a).into_scalar().elem();

        // (1 + 0.5 - 3.6)^2 = 4.41 vs (3 + 0.5 - 1.2)^2 = 5.29
        assert!((ab - 4.41).abs() < 1e-4, "got {ab}");
        assert!((ba - 5.29).abs() < 1e-4, "got {ba}");
    }

    #[test]
    fn test_output_not_reduced() {
        let device = Default::default();
        let penalty = ParabolicPenaltyLossConfig::new(3).init::<TestBackend>(&device);
        let y = buckets_to_one_hot::<TestBackend>(&[0, 1, 2, 1], 3, &device);
        assert_eq!(penalty.forward(y.clone(), y).dims(), [4]);
    }

    #[test]
    fn test_gradient_reaches_prediction() {
        let device = Default::default();
        let penalty = ParabolicPenaltyLossConfig::new(3)
            .with_beta(1.0)
            .init::<TestAutodiffBackend>(&device);

        let pred = Tensor::<TestAutodiffBackend, 2>::from_data(
            TensorData::from([[2.0_f32, 0.0, 0.0]]),
            &device,
        )
        .require_grad();
        let truth = Tensor::<TestAutodiffBackend, 2>::from_data(
            TensorData::from([[0.0_f32, 0.0, 2.0]]),
            &device,
        );

        let grads = penalty.forward(pred.clone(), truth).sum().backward();
        let grad: Vec<f32> = pred.grad(&grads).unwrap().into_data().to_vec().unwrap();

        // Prediction sits below the target, so raising the top bucket's score
        // lowers the penalty.
        assert!(grad[2] < 0.0, "d/dpred_2 should be negative, got {}", grad[2]);
        assert!(grad.iter().all(|g| g.is_finite()));
    }
}
