//! Core data types for decision forest training.
//!
//! An [`Example`] couples a [`FeatureVector`] with its true label and the
//! weighted label (pseudo-residual) that boosting recomputes every round.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Feature index type for identifying features in a feature vector.
pub type FeatureIndex = usize;

/// Feature values of one example.
///
/// Dense vectors are indexed by position. Sparse vectors map feature index to
/// value; absent keys read as `0.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureVector {
    /// Dense ordered sequence of values
    Dense(Vec<f64>),
    /// Sparse mapping from feature index to value
    Sparse(BTreeMap<FeatureIndex, f64>),
}

impl FeatureVector {
    /// Returns the value of `feature`, or `0.0` when it is not stored.
    #[inline]
    pub fn get(&self, feature: FeatureIndex) -> f64 {
        match self {
            FeatureVector::Dense(values) => values.get(feature).copied().unwrap_or(0.0),
            FeatureVector::Sparse(values) => values.get(&feature).copied().unwrap_or(0.0),
        }
    }

    /// Indices of the features holding a nonzero value.
    pub fn nonzero_features(&self) -> Vec<FeatureIndex> {
        match self {
            FeatureVector::Dense(values) => values
                .iter()
                .enumerate()
                .filter(|(_, &v)| v != 0.0)
                .map(|(i, _)| i)
                .collect(),
            FeatureVector::Sparse(values) => values
                .iter()
                .filter(|(_, &v)| v != 0.0)
                .map(|(&i, _)| i)
                .collect(),
        }
    }

    /// Number of stored values.
    pub fn len(&self) -> usize {
        match self {
            FeatureVector::Dense(values) => values.len(),
            FeatureVector::Sparse(values) => values.len(),
        }
    }

    /// Returns true if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns true if every stored value is finite.
    pub fn is_finite(&self) -> bool {
        match self {
            FeatureVector::Dense(values) => values.iter().all(|v| v.is_finite()),
            FeatureVector::Sparse(values) => values.values().all(|v| v.is_finite()),
        }
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        FeatureVector::Dense(Vec::new())
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        FeatureVector::Dense(values)
    }
}

impl From<BTreeMap<FeatureIndex, f64>> for FeatureVector {
    fn from(values: BTreeMap<FeatureIndex, f64>) -> Self {
        FeatureVector::Sparse(values)
    }
}

/// A labelled training example.
///
/// `weighted_label` is the regression target seen by the splitter. It starts
/// out equal to `label` and is rewritten by the boosting generator between
/// rounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Example {
    /// Feature values
    pub features: FeatureVector,
    /// True label; `label > 0` is the positive class for classification metrics
    pub label: f64,
    /// Pseudo-residual used as the regression target
    #[serde(default)]
    pub weighted_label: f64,
}

impl Example {
    /// Creates an example whose weighted label equals its label.
    pub fn new<F: Into<FeatureVector>>(features: F, label: f64) -> Self {
        Example {
            features: features.into(),
            label,
            weighted_label: label,
        }
    }

    /// Returns true if this example belongs to the positive class.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.label > 0.0
    }

    /// Value of `feature` for this example.
    #[inline]
    pub fn feature(&self, feature: FeatureIndex) -> f64 {
        self.features.get(feature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dense_lookup() {
        let features = FeatureVector::from(vec![0.0, 2.5, 0.0, -1.0]);
        assert_eq!(features.get(1), 2.5);
        assert_eq!(features.get(10), 0.0);
        assert_eq!(features.nonzero_features(), vec![1, 3]);
    }

    #[test]
    fn test_sparse_lookup() {
        let mut values = BTreeMap::new();
        values.insert(7, 3.0);
        values.insert(2, 0.0);
        let features = FeatureVector::from(values);
        assert_eq!(features.get(7), 3.0);
        assert_eq!(features.get(3), 0.0);
        assert_eq!(features.nonzero_features(), vec![7]);
    }

    #[test]
    fn test_finite_check() {
        assert!(FeatureVector::from(vec![0.0, -3.0]).is_finite());
        assert!(!FeatureVector::from(vec![1.0, f64::NAN]).is_finite());
        let mut values = BTreeMap::new();
        values.insert(4, f64::INFINITY);
        assert!(!FeatureVector::from(values).is_finite());
    }

    #[test]
    fn test_example_new_copies_label() {
        let example = Example::new(vec![1.0], -1.0);
        assert_eq!(example.weighted_label, -1.0);
        assert!(!example.is_positive());
    }
}
