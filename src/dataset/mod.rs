//! Example-set helpers used by the generators and the cross-validation harness.
//!
//! Examples are owned by the caller; the helpers here only select, resample or
//! partition them. Randomness always comes from a caller-supplied RNG so that
//! training is reproducible from the configured seed.

pub mod statistics;

pub use statistics::LossState;

use crate::core::error::{ForestError, Result};
use crate::core::types::{Example, FeatureIndex};
use ndarray::{ArrayView1, ArrayView2};
use rand::seq::{index, SliceRandom};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Sorted indices of every feature holding a nonzero value in at least one example.
pub fn feature_set<'a, I>(examples: I) -> Vec<FeatureIndex>
where
    I: IntoIterator<Item = &'a Example>,
{
    let mut features = BTreeSet::new();
    for example in examples {
        features.extend(example.features.nonzero_features());
    }
    features.into_iter().collect()
}

/// Fails with a dataset error on the first example holding a non-finite
/// feature value or label.
pub fn validate_examples(examples: &[Example]) -> Result<()> {
    match examples
        .iter()
        .position(|e| !e.features.is_finite() || !e.label.is_finite())
    {
        Some(index) => Err(ForestError::dataset(format!(
            "Example {} has a non-finite feature value or label",
            index
        ))),
        None => Ok(()),
    }
}

/// Shuffles `examples` in place and returns `max(1, floor(n * rate))`, the
/// length of the sampled prefix.
pub fn subsample<R: Rng + ?Sized>(examples: &mut [Example], rate: f64, rng: &mut R) -> usize {
    if examples.is_empty() {
        return 0;
    }
    examples.shuffle(rng);
    ((examples.len() as f64 * rate).floor() as usize).clamp(1, examples.len())
}

/// Draws `max(1, round(n * proportion))` examples with replacement.
///
/// Each drawn copy has its weighted label reset to its label.
pub fn bootstrap<R: Rng + ?Sized>(
    examples: &[Example],
    proportion: f64,
    rng: &mut R,
) -> Vec<Example> {
    if examples.is_empty() {
        return Vec::new();
    }
    let size = ((examples.len() as f64 * proportion).round() as usize).max(1);
    (0..size)
        .map(|_| {
            let mut example = examples[rng.gen_range(0..examples.len())].clone();
            example.weighted_label = example.label;
            example
        })
        .collect()
}

/// Draws `min(size, features.len())` distinct features, returned sorted.
pub fn bootstrap_features<R: Rng + ?Sized>(
    features: &[FeatureIndex],
    size: usize,
    rng: &mut R,
) -> Vec<FeatureIndex> {
    let amount = size.min(features.len());
    let mut chosen: Vec<FeatureIndex> = index::sample(rng, features.len(), amount)
        .into_iter()
        .map(|i| features[i])
        .collect();
    chosen.sort_unstable();
    chosen
}

/// Shuffles a copy of `examples` and deals it round-robin into `folds` partitions.
pub fn partition_folds<R: Rng + ?Sized>(
    examples: &[Example],
    folds: usize,
    rng: &mut R,
) -> Result<Vec<Vec<Example>>> {
    if folds == 0 || folds > examples.len() {
        return Err(ForestError::invalid_parameter(
            "folds",
            folds.to_string(),
            format!("must be in range [1, {}]", examples.len()),
        ));
    }

    let mut shuffled = examples.to_vec();
    shuffled.shuffle(rng);

    let mut partitions: Vec<Vec<Example>> = (0..folds)
        .map(|_| Vec::with_capacity(examples.len() / folds + 1))
        .collect();
    for (i, example) in shuffled.into_iter().enumerate() {
        partitions[i % folds].push(example);
    }
    Ok(partitions)
}

/// Builds dense examples from a feature matrix and a label vector.
pub fn examples_from_arrays(
    features: ArrayView2<'_, f64>,
    labels: ArrayView1<'_, f64>,
) -> Result<Vec<Example>> {
    if features.nrows() != labels.len() {
        return Err(ForestError::dataset(format!(
            "Feature matrix has {} rows but {} labels were given",
            features.nrows(),
            labels.len()
        )));
    }

    let examples: Vec<Example> = features
        .outer_iter()
        .zip(labels.iter())
        .map(|(row, &label)| Example::new(row.to_vec(), label))
        .collect();
    validate_examples(&examples)?;
    Ok(examples)
}

/// Training and held-out examples, as read by the trainer binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingData {
    /// Examples the forest is fitted on
    pub train: Vec<Example>,
    /// Examples used for the learning curve
    #[serde(default)]
    pub test: Vec<Example>,
}

impl TrainingData {
    /// Loads training data from a JSON file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let data: TrainingData = serde_json::from_str(&content)?;
        if data.train.is_empty() {
            return Err(ForestError::dataset("Training set is empty"));
        }
        log::info!(
            "Loaded {} training and {} testing examples from {}",
            data.train.len(),
            data.test.len(),
            path.as_ref().display()
        );
        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn examples(n: usize) -> Vec<Example> {
        (0..n).map(|i| Example::new(vec![i as f64], i as f64)).collect()
    }

    #[test]
    fn test_feature_set_skips_all_zero_features() {
        let data = vec![
            Example::new(vec![0.0, 1.0, 0.0], 1.0),
            Example::new(vec![0.0, 0.0, 0.0, 2.0], 0.0),
        ];
        assert_eq!(feature_set(&data), vec![1, 3]);
    }

    #[test]
    fn test_subsample_keeps_at_least_one() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut data = examples(10);
        assert_eq!(subsample(&mut data, 0.01, &mut rng), 1);
        assert_eq!(subsample(&mut data, 0.55, &mut rng), 5);
        assert_eq!(subsample(&mut data, 1.0, &mut rng), 10);
        assert_eq!(data.len(), 10);
        assert_eq!(subsample(&mut [], 0.5, &mut rng), 0);
    }

    #[test]
    fn test_bootstrap_resets_weighted_labels() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut data = examples(20);
        for example in &mut data {
            example.weighted_label = -100.0;
        }
        let sample = bootstrap(&data, 0.5, &mut rng);
        assert_eq!(sample.len(), 10);
        assert!(sample.iter().all(|e| e.weighted_label == e.label));
    }

    #[test]
    fn test_bootstrap_features_are_distinct() {
        let mut rng = StdRng::seed_from_u64(3);
        let features = vec![2, 4, 6, 8, 10];
        let chosen = bootstrap_features(&features, 3, &mut rng);
        assert_eq!(chosen.len(), 3);
        assert!(chosen.windows(2).all(|w| w[0] < w[1]));
        assert!(chosen.iter().all(|f| features.contains(f)));

        assert_eq!(bootstrap_features(&features, 50, &mut rng), features);
    }

    #[test]
    fn test_partition_folds() {
        let mut rng = StdRng::seed_from_u64(4);
        let folds = partition_folds(&examples(10), 3, &mut rng).unwrap();
        let sizes: Vec<usize> = folds.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![4, 3, 3]);

        assert!(partition_folds(&examples(3), 0, &mut rng).is_err());
        assert!(partition_folds(&examples(3), 4, &mut rng).is_err());
    }

    #[test]
    fn test_examples_from_arrays() {
        let features = array![[1.0, 2.0], [3.0, 4.0]];
        let labels = array![1.0, -1.0];
        let data = examples_from_arrays(features.view(), labels.view()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[1].feature(0), 3.0);
        assert_eq!(data[1].weighted_label, -1.0);

        let short = array![1.0];
        assert!(examples_from_arrays(features.view(), short.view()).is_err());
    }

    #[test]
    fn test_non_finite_values_are_rejected() {
        let features = array![[1.0, 2.0], [f64::NAN, 4.0]];
        let labels = array![1.0, -1.0];
        let err = examples_from_arrays(features.view(), labels.view()).unwrap_err();
        assert!(matches!(err, ForestError::Dataset { .. }));

        let mut data = examples(3);
        assert!(validate_examples(&data).is_ok());
        data[2].label = f64::INFINITY;
        assert!(validate_examples(&data).is_err());
    }
}
