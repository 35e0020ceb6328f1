//! Labeled frames: a row index plus a positional numeric view.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::Hash;

use ndarray::{Array2, Axis};

use crate::error::{Result, SamplerError};

/// A labeled tabular dataset that can be sliced by row key and viewed as a
/// positional numeric array.
///
/// Implementations must keep `values()` rows in the same order as `index()`.
pub trait Frame: Clone {
    /// Row label type (timestamps, ids, ..).
    type Key: Clone + Eq + Hash + fmt::Debug;

    /// Row keys in row order.
    fn index(&self) -> &[Self::Key];

    /// Select rows by key, in the order of `keys`.
    fn loc(&self, keys: &[Self::Key]) -> Result<Self>;

    /// Positional numeric view of the frame, one array row per index entry.
    fn values(&self) -> Array2<f64>;

    /// Number of rows.
    fn num_rows(&self) -> usize {
        self.index().len()
    }
}

/// Stock [`Frame`]: row keys, column names and an `f64` value matrix.
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledFrame<K> {
    index: Vec<K>,
    columns: Vec<String>,
    values: Array2<f64>,
}

impl<K: Clone + Eq + Hash + fmt::Debug> LabeledFrame<K> {
    /// Build a frame, checking that index, columns and values agree.
    ///
    /// # Errors
    /// `ShapeMismatch` if `index.len() != values.nrows()` or
    /// `columns.len() != values.ncols()`; `DuplicateKey` if a row key repeats.
    pub fn new(index: Vec<K>, columns: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if index.len() != values.nrows() {
            return Err(SamplerError::ShapeMismatch(format!(
                "index has {} rows, values have {}",
                index.len(),
                values.nrows()
            )));
        }
        if columns.len() != values.ncols() {
            return Err(SamplerError::ShapeMismatch(format!(
                "{} column names for {} value columns",
                columns.len(),
                values.ncols()
            )));
        }
        let mut seen = HashSet::with_capacity(index.len());
        for key in &index {
            if !seen.insert(key) {
                return Err(SamplerError::DuplicateKey(format!("{key:?}")));
            }
        }
        Ok(LabeledFrame {
            index,
            columns,
            values,
        })
    }

    /// Single-column frame, e.g. a target or weight series.
    pub fn from_series(index: Vec<K>, column: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        let n = values.len();
        let values = Array2::from_shape_vec((n, 1), values)
            .map_err(|e| SamplerError::ShapeMismatch(e.to_string()))?;
        Self::new(index, vec![column.into()], values)
    }

    /// Column names in column order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    fn positions(&self) -> HashMap<&K, usize> {
        self.index.iter().enumerate().map(|(i, k)| (k, i)).collect()
    }
}

impl<K: Clone + Eq + Hash + fmt::Debug> Frame for LabeledFrame<K> {
    type Key = K;

    fn index(&self) -> &[K] {
        &self.index
    }

    fn loc(&self, keys: &[K]) -> Result<Self> {
        let positions = self.positions();
        let rows = keys
            .iter()
            .map(|k| {
                positions
                    .get(k)
                    .copied()
                    .ok_or_else(|| SamplerError::UnknownKey(format!("{k:?}")))
            })
            .collect::<Result<Vec<usize>>>()?;

        Ok(LabeledFrame {
            index: keys.to_vec(),
            columns: self.columns.clone(),
            values: self.values.select(Axis(0), &rows),
        })
    }

    fn values(&self) -> Array2<f64> {
        self.values.clone()
    }
}

/// `loc` that passes absent frames through.
pub fn loc_if_present<F: Frame>(frame: Option<&F>, keys: &[F::Key]) -> Result<Option<F>> {
    frame.map(|f| f.loc(keys)).transpose()
}
