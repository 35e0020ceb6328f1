//! Soft-argmax: a differentiable stand-in for "index of the largest entry".

use burn::prelude::*;
use burn::tensor::activation::softmax;

/// Configuration for [`DifferentiableArgmax`].
#[derive(Config, Debug)]
pub struct DifferentiableArgmaxConfig {
    /// Number of categories K (length of each distribution row).
    pub num_categories: usize,
    /// Softmax sharpness. Large values approach a hard argmax; the value must
    /// stay finite so the scaled scores remain representable.
    #[config(default = 1e10)]
    pub beta: f64,
}

/// Differentiable argmax over the last axis.
///
/// Computes `sum_k softmax(beta * y)_k * k`, which converges to the index of
/// the maximum entry as `beta → ∞`. Tied maxima average their indices.
#[derive(Debug, Clone)]
pub struct DifferentiableArgmax<B: Backend> {
    /// Bucket indices `[0, 1, .., K-1]` as a `(K, 1)` column.
    y_range: Tensor<B, 2>,
    num_categories: usize,
    beta: f64,
}

impl DifferentiableArgmaxConfig {
    /// Initialize the soft-argmax on `device`.
    pub fn init<B: Backend>(&self, device: &B::Device) -> DifferentiableArgmax<B> {
        assert!(self.num_categories > 0, "num_categories must be > 0");
        if !(self.beta > 0.0 && self.beta.is_finite()) {
            tracing::warn!(beta = self.beta, "Soft-argmax beta should be positive and finite");
        }

        let k = self.num_categories;
        let y_range = Tensor::<B, 1, Int>::arange(0..k as i64, device)
            .float()
            .reshape([k, 1]);

        DifferentiableArgmax {
            y_range,
            num_categories: k,
            beta: self.beta,
        }
    }
}

impl<B: Backend> DifferentiableArgmax<B> {
    /// Soft index of the maximum entry per row.
    ///
    /// Input shape: `(batch, K)`
    /// Output shape: `(batch,)`
    ///
    /// # Panics
    /// Panics if the category axis does not have length K.
    pub fn forward(&self, y: Tensor<B, 2>) -> Tensor<B, 1> {
        let [_batch, k] = y.dims();
        assert_eq!(
            k, self.num_categories,
            "expected {} categories, got {k}",
            self.num_categories
        );

        let weights = softmax(y.mul_scalar(self.beta), 1); // (batch, K)
        weights.matmul(self.y_range.clone()).squeeze::<1>(1)
    }

    /// Number of categories K.
    pub fn num_categories(&self) -> usize {
        self.num_categories
    }

    /// Configured softmax sharpness.
    pub fn beta(&self) -> f64 {
        self.beta
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::ndarray::NdArray;
    use burn::backend::Autodiff;
    use burn::tensor::TensorData;

    type TestBackend = NdArray<f32>;
    type TestAutodiffBackend = Autodiff<NdArray<f32>>;

    fn one_hot(k: usize, hot: usize) -> Vec<f32> {
        (0..k).map(|i| if i == hot { 1.0 } else { 0.0 }).collect()
    }

    #[test]
    fn test_one_hot_recovers_index() {
        let device = Default::default();
        let k = 5;
        let argmax = DifferentiableArgmaxConfig::new(k).init::<TestBackend>(&device);

        let flat: Vec<f32> = (0..k).flat_map(|i| one_hot(k, i)).collect();
        let y = Tensor::<TestBackend, 2>::from_data(TensorData::new(flat, [k, k]), &device);

        let soft: Vec<f32> = argmax.forward(y).into_data().to_vec().unwrap();
        for (i, v) in soft.iter().enumerate() {
            assert!((v - i as f32).abs() < 1e-4, "row {i}: expected {i}, got {v}");
        }
    }

    #[test]
    fn test_logits_recover_index() {
        let device = Default::default();
        let argmax = DifferentiableArgmaxConfig::new(4).init::<TestBackend>(&device);
        let y = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[0.1_f32, -2.0, 0.7, 0.3], [3.0, 1.0, -1.0, 2.9]]),
            &device,
        );

        let soft: Vec<f32> = argmax.forward(y).into_data().to_vec().unwrap();
        assert!((soft[0] - 2.0).abs() < 1e-4, "got {}", soft[0]);
        assert!(soft[1].abs() < 1e-4, "got {}", soft[1]);
    }

    #[test]
    fn test_converges_as_beta_grows() {
        let device = Default::default();
        let y = || {
            Tensor::<TestBackend, 2>::from_data(
                TensorData::from([[0.0_f32, 0.0, 0.0, 1.0, 0.0]]),
                &device,
            )
        };

        let mut prev_err = f32::INFINITY;
        for beta in [1.0, 10.0, 100.0, 1e10] {
            let argmax = DifferentiableArgmaxConfig::new(5)
                .with_beta(beta)
                .init::<TestBackend>(&device);
            let v: f32 = argmax.forward(y()).into_scalar().elem();
            let err = (v - 3.0).abs();
            assert!(err <= prev_err + 1e-6, "beta={beta}: error grew from {prev_err} to {err}");
            prev_err = err;
        }
        assert!(prev_err < 1e-4, "large beta should give a hard argmax, err={prev_err}");
    }

    #[test]
    fn test_ties_average_indices() {
        let device = Default::default();
        let argmax = DifferentiableArgmaxConfig::new(4).init::<TestBackend>(&device);
        let y = Tensor::<TestBackend, 2>::from_data(
            TensorData::from([[1.0_f32, 0.0, 0.0, 1.0]]),
            &device,
        );

        let v: f32 = argmax.forward(y).into_scalar().elem();
        assert!((v - 1.5).abs() < 1e-4, "tied maxima at 0 and 3 should give 1.5, got {v}");
    }

    #[test]
    fn test_uniform_scores_give_mean_index() {
        let device = Default::default();
        let argmax = DifferentiableArgmaxConfig::new(5)
            .with_beta(1.0)
            .init::<TestBackend>(&device);
        let y = Tensor::<TestBackend, 2>::zeros([1, 5], &device);

        let v: f32 = argmax.forward(y).into_scalar().elem();
        assert!((v - 2.0).abs() < 1e-5, "uniform scores should average to 2.0, got {v}");
    }

    #[test]
    #[should_panic(expected = "expected 3 categories")]
    fn test_category_mismatch_panics() {
        let device = Default::default();
        let argmax = DifferentiableArgmaxConfig::new(3).init::<TestBackend>(&device);
        let y = Tensor::<TestBackend, 2>::zeros([2, 4], &device);
        let _ = argmax.forward(y);
    }

    #[test]
    fn test_gradient_flows_with_moderate_beta() {
        let device = Default::default();
        let argmax = DifferentiableArgmaxConfig::new(3)
            .with_beta(1.0)
            .init::<TestAutodiffBackend>(&device);
        let y = Tensor::<TestAutodiffBackend, 2>::from_data(
            TensorData::from([[0.2_f32, 0.5, 0.1]]),
            &device,
        )
        .require_grad();

        let grads = argmax.forward(y.clone()).sum().backward();
        let grad: Vec<f32> = y.grad(&grads).unwrap().into_data().to_vec().unwrap();

        // Raising the score of the last bucket pulls the soft index up,
        // raising the first pulls it down.
        assert!(grad[2] > 0.0, "d/dy_2 should be positive, got {}", grad[2]);
        assert!(grad[0] < 0.0, "d/dy_0 should be negative, got {}", grad[0]);
    }
}
