//! Ranking and calibration metrics over scored binary examples.
//!
//! Degenerate inputs (no positives, no negatives, or no examples at all)
//! produce `NaN` and a warning rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A predicted score paired with its binary label.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LabelledPrediction {
    /// True for the positive class
    pub label: bool,
    /// Predicted probability of the positive class
    pub prediction: f64,
}

/// A collection of labelled predictions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LabelledPredictions {
    predictions: Vec<LabelledPrediction>,
}

impl From<Vec<LabelledPrediction>> for LabelledPredictions {
    fn from(predictions: Vec<LabelledPrediction>) -> Self {
        LabelledPredictions { predictions }
    }
}

impl FromIterator<LabelledPrediction> for LabelledPredictions {
    fn from_iter<I: IntoIterator<Item = LabelledPrediction>>(iter: I) -> Self {
        LabelledPredictions {
            predictions: iter.into_iter().collect(),
        }
    }
}

impl LabelledPredictions {
    /// Number of predictions.
    pub fn len(&self) -> usize {
        self.predictions.len()
    }

    /// Returns true if there are no predictions.
    pub fn is_empty(&self) -> bool {
        self.predictions.is_empty()
    }

    /// Number of positive labels.
    pub fn num_positives(&self) -> usize {
        self.predictions.iter().filter(|p| p.label).count()
    }

    /// Area under the ROC curve by the rank method.
    ///
    /// Predictions are sorted ascending; each positive is credited with the
    /// negatives ranked below it, and with half of the negatives sharing its
    /// score.
    pub fn roc(&self) -> f64 {
        let positives = self.num_positives();
        let negatives = self.len() - positives;
        if positives == 0 || negatives == 0 {
            log::warn!(
                "ROC undefined with {} positives and {} negatives",
                positives,
                negatives
            );
            return f64::NAN;
        }

        let mut sorted = self.predictions.clone();
        sorted.sort_by(|a, b| a.prediction.total_cmp(&b.prediction));

        let mut negatives_below = 0usize;
        let mut weighted_sum = 0.0;
        let mut start = 0;
        while start < sorted.len() {
            let score = sorted[start].prediction;
            let mut end = start;
            while end < sorted.len() && sorted[end].prediction == score {
                end += 1;
            }
            let group = &sorted[start..end];
            let group_positives = group.iter().filter(|p| p.label).count();
            let group_negatives = group.len() - group_positives;
            weighted_sum += group_positives as f64
                * (negatives_below as f64 + 0.5 * group_negatives as f64);
            negatives_below += group_negatives;
            start = end;
        }

        weighted_sum / (positives as f64 * negatives as f64)
    }

    /// Mean base-2 log-likelihood of the labels under the predictions.
    pub fn log_score(&self) -> f64 {
        if self.is_empty() {
            log::warn!("Log score undefined for an empty prediction set");
            return f64::NAN;
        }
        let total: f64 = self
            .predictions
            .iter()
            .map(|p| {
                if p.label {
                    p.prediction.log2()
                } else {
                    (1.0 - p.prediction).log2()
                }
            })
            .sum();
        total / self.len() as f64
    }

    /// Mean prediction divided by the empirical positive rate.
    pub fn calibration(&self) -> f64 {
        let positives = self.num_positives();
        if positives == 0 {
            log::warn!("Calibration undefined without positive examples");
            return f64::NAN;
        }
        let sum: f64 = self.predictions.iter().map(|p| p.prediction).sum();
        sum / positives as f64
    }

    /// Log score relative to the entropy of the empirical positive rate.
    pub fn normalized_entropy(&self) -> f64 {
        let positives = self.num_positives();
        if positives == 0 || positives == self.len() {
            log::warn!(
                "Normalized entropy undefined with {} positives out of {}",
                positives,
                self.len()
            );
            return f64::NAN;
        }
        let p = positives as f64 / self.len() as f64;
        let baseline = p * p.log2() + (1.0 - p) * (1.0 - p).log2();
        self.log_score() / baseline
    }
}

impl fmt::Display for LabelledPredictions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "size={} roc={:.6} calibration={:.6} normalized_entropy={:.6} positives={}",
            self.len(),
            self.roc(),
            self.calibration(),
            self.normalized_entropy(),
            self.num_positives()
        )
    }
}
