//! Array-flattened tree evaluation.
//!
//! A tree is laid out so that the two children of a branch occupy adjacent
//! slots: the branch stores the index of its left child and the right child
//! lives at `left_child + 1`. Leaves carry [`LEAF_FEATURE_ID`] as their
//! feature. Evaluation is a loop over a contiguous slice.

use crate::core::constants::LEAF_FEATURE_ID;
use crate::core::error::{ForestError, Result};
use crate::core::types::FeatureVector;
use crate::prediction::Evaluator;
use crate::tree::{Forest, Rescaling, TreeNode};

/// One slot of a flattened tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlatNode {
    /// Leaf value, or split threshold for a branch
    pub value: f64,
    /// Split feature, or [`LEAF_FEATURE_ID`] for a leaf
    pub feature: i64,
    /// Index of the left child; unused for leaves
    pub left_child: usize,
}

impl FlatNode {
    #[inline]
    fn is_leaf(&self) -> bool {
        self.feature == LEAF_FEATURE_ID
    }
}

/// A single flattened tree.
#[derive(Debug, Clone, PartialEq)]
pub struct FastTreeEvaluator {
    nodes: Vec<FlatNode>,
}

impl FastTreeEvaluator {
    /// Validates and flattens `tree`.
    pub fn new(tree: &TreeNode) -> Result<Self> {
        tree.validate()?;

        let mut nodes = Vec::with_capacity(tree.num_nodes());
        nodes.push(FlatNode {
            value: 0.0,
            feature: LEAF_FEATURE_ID,
            left_child: 0,
        });
        flatten(&mut nodes, tree, 0)?;
        Ok(FastTreeEvaluator { nodes })
    }

    /// Flattened nodes, root first.
    pub fn nodes(&self) -> &[FlatNode] {
        &self.nodes
    }
}

fn flatten(nodes: &mut Vec<FlatNode>, current: &TreeNode, index: usize) -> Result<()> {
    if let Some(value) = current.leaf_value {
        nodes[index] = FlatNode {
            value,
            feature: LEAF_FEATURE_ID,
            left_child: 0,
        };
        return Ok(());
    }

    let (Some(feature), Some(split_value), Some(left), Some(right)) = (
        current.feature,
        current.split_value,
        current.left.as_deref(),
        current.right.as_deref(),
    ) else {
        return Err(ForestError::validation("branch node is incomplete"));
    };

    let left_child = nodes.len();
    let placeholder = FlatNode {
        value: 0.0,
        feature: LEAF_FEATURE_ID,
        left_child: 0,
    };
    nodes.push(placeholder);
    nodes.push(placeholder);

    let feature = i64::try_from(feature)
        .map_err(|_| ForestError::validation(format!("feature index {} out of range", feature)))?;
    nodes[index] = FlatNode {
        value: split_value,
        feature,
        left_child,
    };

    flatten(nodes, left, left_child)?;
    flatten(nodes, right, left_child + 1)
}

impl Evaluator for FastTreeEvaluator {
    #[inline]
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        let mut node = &self.nodes[0];
        while !node.is_leaf() {
            let next = if features.get(node.feature as usize) < node.value {
                node.left_child
            } else {
                node.left_child + 1
            };
            node = &self.nodes[next];
        }
        node.value
    }
}

/// Flattened forest with its rescaling.
#[derive(Debug, Clone, PartialEq)]
pub struct FastForestEvaluator {
    trees: Vec<FastTreeEvaluator>,
    rescaling: Rescaling,
}

impl FastForestEvaluator {
    /// Flattens every tree, failing on the first malformed one.
    pub fn new(forest: &Forest) -> Result<Self> {
        let trees = forest
            .trees
            .iter()
            .map(FastTreeEvaluator::new)
            .collect::<Result<Vec<_>>>()?;
        Ok(FastForestEvaluator {
            trees,
            rescaling: forest.rescaling,
        })
    }

    /// Like [`FastForestEvaluator::new`] but returns the raw sum of tree outputs.
    pub fn raw(forest: &Forest) -> Result<Self> {
        let mut evaluator = Self::new(forest)?;
        evaluator.rescaling = Rescaling::None;
        Ok(evaluator)
    }

    /// Number of trees.
    pub fn num_trees(&self) -> usize {
        self.trees.len()
    }
}

impl Evaluator for FastForestEvaluator {
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.evaluate(features)).sum();
        self.rescaling.apply(sum, self.trees.len())
    }
}

/// Builds the flattened evaluator for `forest`.
pub fn build_fast_evaluator(forest: &Forest) -> Result<FastForestEvaluator> {
    FastForestEvaluator::new(forest)
}
