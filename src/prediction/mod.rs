//! Scoring feature vectors against trees and forests.
//!
//! - [`naive`]: recursive descent over [`TreeNode`](crate::tree::TreeNode)s,
//!   kept as a correctness oracle
//! - [`fast`]: trees flattened into contiguous arrays and walked iteratively
//!
//! Both implement [`Evaluator`], which is also the seam the loss functions
//! use to read the current ensemble's predictions during boosting.

use crate::core::types::{Example, FeatureVector};
use rayon::prelude::*;

pub mod fast;
pub mod naive;

pub use fast::{build_fast_evaluator, FastForestEvaluator, FastTreeEvaluator};
pub use naive::{ForestEvaluator, TreeEvaluator};

/// Anything that maps a feature vector to a score.
pub trait Evaluator: Send + Sync {
    /// Scores one feature vector.
    fn evaluate(&self, features: &FeatureVector) -> f64;

    /// Scores every example in parallel, preserving order.
    fn evaluate_batch(&self, examples: &[Example]) -> Vec<f64> {
        examples
            .par_iter()
            .map(|example| self.evaluate(&example.features))
            .collect()
    }
}

/// Adapts a closure into an [`Evaluator`].
pub struct EvaluatorFn<F>(pub F);

impl<F> Evaluator for EvaluatorFn<F>
where
    F: Fn(&FeatureVector) -> f64 + Send + Sync,
{
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        (self.0)(features)
    }
}

impl<E: Evaluator + ?Sized> Evaluator for Box<E> {
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        (**self).evaluate(features)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_evaluator_fn() {
        let evaluator = EvaluatorFn(|features: &FeatureVector| features.get(0) * 2.0);
        let examples = vec![Example::new(vec![1.0], 0.0), Example::new(vec![3.0], 0.0)];
        assert_eq!(evaluator.evaluate_batch(&examples), vec![2.0, 6.0]);
    }

    #[test]
    fn test_boxed_evaluator() {
        let evaluator: Box<dyn Evaluator> = Box::new(EvaluatorFn(|_: &FeatureVector| 1.5));
        assert_eq!(evaluator.evaluate(&FeatureVector::default()), 1.5);
    }
}
