//! Greedy recursive regression tree construction.
//!
//! Each node scans its candidate features in parallel, keeps the best
//! boundary per feature, and reduces the results in ascending feature order.
//! The two partitions are then grown as a `rayon::join` pair.

use crate::boosting::loss::LeafWeight;
use crate::config::SplittingConstraints;
use crate::core::constants::DEFAULT_SHRINKAGE;
use crate::core::error::{ForestError, Result};
use crate::core::types::{Example, FeatureIndex};
use crate::dataset::feature_set;
use crate::tree::node::{Annotation, TreeNode};
use crate::tree::split::{best_split_for_feature, SplitCandidate};
use rayon::prelude::*;

/// Builds one regression tree with a given leaf rule and constraints.
#[derive(Debug, Clone)]
pub struct RegressionSplitter<L> {
    leaf_weight: L,
    constraints: SplittingConstraints,
    shrinkage: f64,
    feature_subset: Option<Vec<FeatureIndex>>,
}

impl<L: LeafWeight> RegressionSplitter<L> {
    /// Creates a splitter, rejecting shrinkage outside (0, 1].
    pub fn new(
        leaf_weight: L,
        constraints: &SplittingConstraints,
        shrinkage: Option<f64>,
    ) -> Result<Self> {
        let shrinkage = shrinkage.unwrap_or(DEFAULT_SHRINKAGE);
        if !(shrinkage > 0.0 && shrinkage <= 1.0) {
            return Err(ForestError::invalid_parameter(
                "shrinkage",
                shrinkage.to_string(),
                "must be in range (0.0, 1.0]",
            ));
        }
        if let Some(gain) = constraints.minimum_average_gain {
            if gain.is_nan() {
                return Err(ForestError::invalid_parameter(
                    "minimum_average_gain",
                    "NaN",
                    "must be a number",
                ));
            }
        }

        Ok(RegressionSplitter {
            leaf_weight,
            constraints: constraints.clone(),
            shrinkage,
            feature_subset: None,
        })
    }

    /// Restricts the candidate features to `features`.
    pub fn with_feature_subset(mut self, mut features: Vec<FeatureIndex>) -> Self {
        features.sort_unstable();
        features.dedup();
        self.feature_subset = Some(features);
        self
    }

    /// Grows a tree over `examples`, splitting on their weighted labels.
    pub fn generate_tree(&self, examples: &[&Example]) -> TreeNode {
        self.generate(examples, 0)
    }

    fn candidate_features(&self, examples: &[&Example]) -> Vec<FeatureIndex> {
        let present = feature_set(examples.iter().copied());
        match &self.feature_subset {
            Some(subset) => present
                .into_iter()
                .filter(|f| subset.binary_search(f).is_ok())
                .collect(),
            None => present,
        }
    }

    fn best_split(&self, examples: &[&Example]) -> Option<SplitCandidate> {
        let min_samples = self.constraints.minimum_samples_at_leaf.unwrap_or(1);
        let candidates: Vec<Option<SplitCandidate>> = self
            .candidate_features(examples)
            .par_iter()
            .map(|&feature| best_split_for_feature(examples, feature, min_samples))
            .collect();

        candidates
            .into_iter()
            .flatten()
            .fold(None, |best, candidate| {
                if candidate.beats(best.as_ref()) {
                    Some(candidate)
                } else {
                    best
                }
            })
    }

    fn should_split(&self, examples: &[&Example], split: &SplitCandidate, level: usize) -> bool {
        if split.index == 0 || split.index >= examples.len() {
            return false;
        }
        if let Some(maximum) = self.constraints.maximum_levels {
            if level > maximum {
                log::trace!("Maximum levels {} < level {}", maximum, level);
                return false;
            }
        }
        if let Some(minimum) = self.constraints.minimum_average_gain {
            if split.gain / (examples.len() as f64) < minimum {
                return false;
            }
        }
        true
    }

    fn leaf(&self, examples: &[&Example]) -> TreeNode {
        let weight = self.leaf_weight.leaf_weight(examples);
        log::trace!(
            "Leaf over {} examples: weight {}, shrinkage {}",
            examples.len(),
            weight,
            self.shrinkage
        );
        TreeNode::leaf(weight * self.shrinkage)
    }

    fn generate(&self, examples: &[&Example], level: usize) -> TreeNode {
        if examples.len() <= 1 {
            return self.leaf(examples);
        }

        let split = match self.best_split(examples) {
            Some(split) if self.should_split(examples, &split, level) => split,
            _ => {
                log::trace!("Terminating at level {} with {} examples", level, examples.len());
                return self.leaf(examples);
            }
        };

        log::debug!(
            "Splitting {} examples at level {} on feature {} < {} (gain {:.6})",
            examples.len(),
            level,
            split.feature,
            split.split_value,
            split.gain
        );

        let (left, right): (Vec<&Example>, Vec<&Example>) = examples
            .iter()
            .partition(|example| example.feature(split.feature) < split.split_value);
        let annotation = Annotation {
            left_fraction: left.len() as f64 / examples.len() as f64,
        };

        let (left_tree, right_tree) = rayon::join(
            || self.generate(&left, level + 1),
            || self.generate(&right, level + 1),
        );

        TreeNode::branch(
            split.feature,
            split.split_value,
            left_tree,
            right_tree,
            Some(annotation),
        )
    }
}

/// Builds a single tree over `examples`.
pub fn build_tree<L: LeafWeight>(
    examples: &[&Example],
    leaf_weight: L,
    constraints: &SplittingConstraints,
    shrinkage: Option<f64>,
) -> Result<TreeNode> {
    Ok(RegressionSplitter::new(leaf_weight, constraints, shrinkage)?.generate_tree(examples))
}
