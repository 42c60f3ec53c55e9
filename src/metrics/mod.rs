//! Evaluation metrics for trained forests.
//!
//! [`compute_metrics`] scores labelled examples with any [`Evaluator`] and
//! summarises them as an [`EpochResult`]. [`learning_curve`] does the same
//! for every prefix of a forest, one result per training round.

pub mod classification;

pub use classification::{LabelledPrediction, LabelledPredictions};

use crate::core::error::Result;
use crate::core::types::Example;
use crate::prediction::{Evaluator, FastTreeEvaluator};
use crate::tree::Forest;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Metrics of one forest (or forest prefix) over a set of examples.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EpochResult {
    /// Area under the ROC curve
    pub roc: f64,
    /// Mean base-2 log-likelihood
    pub log_score: f64,
    /// Mean prediction over positive rate
    pub calibration: f64,
    /// Log score over baseline entropy
    pub normalized_entropy: f64,
}

impl EpochResult {
    /// Summarises a set of labelled predictions.
    pub fn from_predictions(predictions: &LabelledPredictions) -> Self {
        EpochResult {
            roc: predictions.roc(),
            log_score: predictions.log_score(),
            calibration: predictions.calibration(),
            normalized_entropy: predictions.normalized_entropy(),
        }
    }
}

impl fmt::Display for EpochResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "roc={:.6} log_score={:.6} calibration={:.6} normalized_entropy={:.6}",
            self.roc, self.log_score, self.calibration, self.normalized_entropy
        )
    }
}

/// Per-round metrics of a trained forest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrainingResults {
    /// Result for the forest prefix of length `i + 1`
    pub epoch_results: Vec<EpochResult>,
}

fn labelled(examples: &[Example], scores: Vec<f64>) -> LabelledPredictions {
    examples
        .iter()
        .zip(scores)
        .map(|(example, prediction)| LabelledPrediction {
            label: example.is_positive(),
            prediction,
        })
        .collect()
}

/// Scores `examples` with `evaluator` and computes the metrics.
pub fn compute_metrics<E: Evaluator + ?Sized>(evaluator: &E, examples: &[Example]) -> EpochResult {
    let scores = evaluator.evaluate_batch(examples);
    EpochResult::from_predictions(&labelled(examples, scores))
}

/// Metrics for each prefix `1..=n` of `forest`, keeping its rescaling.
///
/// Fails with a validation error if any tree is malformed.
pub fn learning_curve(forest: &Forest, examples: &[Example]) -> Result<TrainingResults> {
    let trees = forest
        .trees
        .iter()
        .map(FastTreeEvaluator::new)
        .collect::<Result<Vec<_>>>()?;

    let mut sums = vec![0.0; examples.len()];
    let mut epoch_results = Vec::with_capacity(trees.len());
    for (round, tree) in trees.iter().enumerate() {
        sums.par_iter_mut()
            .zip(examples.par_iter())
            .for_each(|(sum, example)| *sum += tree.evaluate(&example.features));

        let scores = sums
            .iter()
            .map(|&sum| forest.rescaling.apply(sum, round + 1))
            .collect();
        epoch_results.push(EpochResult::from_predictions(&labelled(examples, scores)));
    }

    Ok(TrainingResults { epoch_results })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::FeatureVector;
    use crate::prediction::{build_fast_evaluator, EvaluatorFn};
    use crate::tree::{Rescaling, TreeNode};
    use approx::assert_abs_diff_eq;

    fn examples() -> Vec<Example> {
        vec![
            Example::new(vec![0.0], -1.0),
            Example::new(vec![1.0], -1.0),
            Example::new(vec![2.0], 1.0),
            Example::new(vec![3.0], 1.0),
        ]
    }

    #[test]
    fn test_compute_metrics() {
        let evaluator = EvaluatorFn(|f: &FeatureVector| 0.2 + 0.2 * f.get(0));
        let result = compute_metrics(&evaluator, &examples());
        assert_abs_diff_eq!(result.roc, 1.0);
        // mean prediction 0.5 over positive rate 0.5
        assert_abs_diff_eq!(result.calibration, 1.0, epsilon = 1e-12);
        assert!(result.log_score < 0.0);
    }

    #[test]
    fn test_learning_curve_matches_prefix_evaluation() {
        let forest = Forest::new(
            vec![
                TreeNode::leaf(0.0),
                TreeNode::branch(0, 1.5, TreeNode::leaf(-0.5), TreeNode::leaf(0.5), None),
                TreeNode::branch(0, 0.5, TreeNode::leaf(-0.25), TreeNode::leaf(0.1), None),
            ],
            Rescaling::LogOdds,
        );
        let data = examples();
        let curve = learning_curve(&forest, &data).unwrap();
        assert_eq!(curve.epoch_results.len(), 3);

        for (i, result) in curve.epoch_results.iter().enumerate() {
            let prefix = build_fast_evaluator(&forest.prefix(i + 1)).unwrap();
            let expected = compute_metrics(&prefix, &data);
            assert_abs_diff_eq!(result.log_score, expected.log_score, epsilon = 1e-12);
            assert_abs_diff_eq!(result.calibration, expected.calibration, epsilon = 1e-12);
        }
        // the constant prior cannot rank
        assert_abs_diff_eq!(curve.epoch_results[0].roc, 0.5);
        assert_abs_diff_eq!(curve.epoch_results[1].roc, 1.0);
    }
}
