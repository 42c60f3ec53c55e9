//! Best-split search along a single feature.
//!
//! Examples are sorted by the feature's value and swept once, moving one
//! example at a time from the right partition to the left while both sides
//! keep Welford statistics of the weighted labels.

use crate::core::types::{Example, FeatureIndex};
use crate::dataset::LossState;

/// Best partition found for one feature.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplitCandidate {
    /// Feature index for the split
    pub feature: FeatureIndex,
    /// Number of examples routed left (rank of the boundary in sorted order)
    pub index: usize,
    /// Reduction in sum of squared deviations
    pub gain: f64,
    /// Threshold between the bracketing feature values
    pub split_value: f64,
}

impl SplitCandidate {
    /// Returns true if `self` should replace `other` as the best candidate.
    ///
    /// Candidates are compared in ascending feature order, so only a strictly
    /// larger gain wins and ties stay with the lower feature index.
    #[inline]
    pub fn beats(&self, other: Option<&SplitCandidate>) -> bool {
        match other {
            Some(other) => self.gain > other.gain,
            None => true,
        }
    }
}

/// Threshold strictly above `lower` and at most `upper`.
#[inline]
pub fn split_threshold(lower: f64, upper: f64) -> f64 {
    let midpoint = 0.5 * lower + 0.5 * upper;
    if lower < midpoint {
        midpoint
    } else {
        upper
    }
}

/// Finds the positive-gain boundary with maximum gain for `feature`.
///
/// Boundaries only fall between distinct, non-NaN feature values and must
/// leave at least `min_samples` examples on each side. Ties keep the lowest
/// boundary.
pub fn best_split_for_feature(
    examples: &[&Example],
    feature: FeatureIndex,
    min_samples: usize,
) -> Option<SplitCandidate> {
    let mut sorted: Vec<(f64, f64)> = examples
        .iter()
        .map(|example| (example.feature(feature), example.weighted_label))
        .collect();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

    let total = LossState::from_values(sorted.iter().map(|&(_, label)| label));
    let mut left = LossState::new();
    let mut right = total;
    let mut best: Option<SplitCandidate> = None;
    let count = sorted.len();

    for index in 0..count {
        let (value, label) = sorted[index];
        if index > 0 && index >= min_samples && count - index >= min_samples {
            let previous = sorted[index - 1].0;
            // NaN never compares below a threshold, so it cannot bound a partition
            if previous != value && !previous.is_nan() && !value.is_nan() {
                let gain = total.sum_squared_deviations()
                    - left.sum_squared_deviations()
                    - right.sum_squared_deviations();
                if gain > best.map_or(0.0, |b| b.gain) {
                    best = Some(SplitCandidate {
                        feature,
                        index,
                        gain,
                        split_value: split_threshold(previous, value),
                    });
                }
            }
        }
        left.add(label);
        right.remove(label);
    }

    best
}
