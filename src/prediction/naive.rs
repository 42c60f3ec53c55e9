//! Recursive tree evaluation.

use crate::core::types::FeatureVector;
use crate::prediction::Evaluator;
use crate::tree::{Forest, TreeNode};

/// Walks a [`TreeNode`] from the root until a leaf is reached.
#[derive(Debug, Clone, Copy)]
pub struct TreeEvaluator<'a> {
    tree: &'a TreeNode,
}

impl<'a> TreeEvaluator<'a> {
    /// Wraps a tree.
    pub fn new(tree: &'a TreeNode) -> Self {
        TreeEvaluator { tree }
    }
}

/// Value of the leaf `features` reaches, or 0.0 for a malformed path.
pub fn evaluate_tree(tree: &TreeNode, features: &FeatureVector) -> f64 {
    let mut node = tree;
    loop {
        if let Some(value) = node.leaf_value {
            return value;
        }
        let (Some(feature), Some(split_value)) = (node.feature, node.split_value) else {
            return 0.0;
        };
        let next = if features.get(feature) < split_value {
            node.left.as_deref()
        } else {
            node.right.as_deref()
        };
        match next {
            Some(child) => node = child,
            None => return 0.0,
        }
    }
}

impl Evaluator for TreeEvaluator<'_> {
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        evaluate_tree(self.tree, features)
    }
}

/// Sums the trees of a [`Forest`] and applies its rescaling.
#[derive(Debug, Clone, Copy)]
pub struct ForestEvaluator<'a> {
    forest: &'a Forest,
}

impl<'a> ForestEvaluator<'a> {
    /// Wraps a forest.
    pub fn new(forest: &'a Forest) -> Self {
        ForestEvaluator { forest }
    }
}

impl Evaluator for ForestEvaluator<'_> {
    fn evaluate(&self, features: &FeatureVector) -> f64 {
        let sum: f64 = self
            .forest
            .trees
            .iter()
            .map(|tree| evaluate_tree(tree, features))
            .sum();
        self.forest.rescaling.apply(sum, self.forest.trees.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::Rescaling;

    fn tree() -> TreeNode {
        TreeNode::branch(
            0,
            1.0,
            TreeNode::leaf(-1.0),
            TreeNode::branch(1, 5.0, TreeNode::leaf(2.0), TreeNode::leaf(3.0), None),
            None,
        )
    }

    #[test]
    fn test_tree_routing() {
        let tree = tree();
        let evaluator = TreeEvaluator::new(&tree);
        assert_eq!(evaluator.evaluate(&vec![0.5, 100.0].into()), -1.0);
        assert_eq!(evaluator.evaluate(&vec![1.0, 4.0].into()), 2.0);
        assert_eq!(evaluator.evaluate(&vec![2.0, 5.0].into()), 3.0);
    }

    #[test]
    fn test_forest_averaging() {
        let forest = Forest::new(vec![tree(), TreeNode::leaf(1.0)], Rescaling::Averaging);
        let evaluator = ForestEvaluator::new(&forest);
        assert_eq!(evaluator.evaluate(&vec![2.0, 6.0].into()), 2.0);
    }
}
