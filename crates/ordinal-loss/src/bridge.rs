//! Conversions between bucket labels, category tensors and loss values.
//!
//! Callers typically hold bucket labels as `usize`; the losses take
//! `(batch, K)` tensors and return `(batch,)` or `(1,)` loss tensors.

use burn::prelude::*;
use burn::tensor::TensorData;

/// Encode bucket labels as a one-hot `(batch, K)` tensor.
///
/// # Panics
/// Panics if `buckets` is empty or any bucket is `>= num_categories`.
pub fn buckets_to_one_hot<B: Backend>(
    buckets: &[usize],
    num_categories: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    assert!(!buckets.is_empty(), "buckets must not be empty");
    assert!(num_categories > 0, "num_categories must be > 0");

    let mut flat = vec![0.0_f32; buckets.len() * num_categories];
    for (row, &bucket) in buckets.iter().enumerate() {
        assert!(
            bucket < num_categories,
            "bucket {bucket} at row {row} is out of range for {num_categories} categories"
        );
        flat[row * num_categories + bucket] = 1.0;
    }
    Tensor::from_data(TensorData::new(flat, [buckets.len(), num_categories]), device)
}

/// Hard bucket prediction for each row of a `(batch, K)` score tensor.
pub fn predicted_buckets<B: Backend>(scores: Tensor<B, 2>) -> Vec<usize> {
    scores
        .argmax(1)
        .squeeze::<1>(1)
        .into_data()
        .convert::<i64>()
        .to_vec::<i64>()
        .expect("argmax indices should convert to i64")
        .into_iter()
        .map(|b| b as usize)
        .collect()
}

/// Per-example loss values from an unreduced `(batch,)` loss tensor.
pub fn loss_values<B: Backend>(losses: Tensor<B, 1>) -> Vec<f64> {
    losses
        .into_data()
        .convert::<f32>()
        .to_vec::<f32>()
        .expect("loss tensor should convert to f32")
        .into_iter()
        .map(|v| v as f64)
        .collect()
}

/// The scalar of a reduced `(1,)` loss tensor.
///
/// # Panics
/// Panics if the loss was not reduced to a single element.
pub fn loss_value<B: Backend>(loss: Tensor<B, 1>) -> f64 {
    let dims = loss.dims();
    assert_eq!(dims, [1], "expected a reduced loss of shape [1], got {dims:?}");
    let val: f32 = loss.into_scalar().elem();
    val as f64
}
