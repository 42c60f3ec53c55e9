//! Cost-complexity (weakest link) pruning.
//!
//! The tree is copied into an arena whose nodes cache the squared deviation
//! of their training examples, the cost of their subtree, and their leaf
//! count. Each step first scans the live branches for the smallest cost
//! increase per removed leaf, then collapses that branch and refreshes the
//! cached values along its ancestor path. The final tree is the stage with
//! the lowest squared error on a held-out set.

use crate::boosting::loss::LeafWeight;
use crate::core::error::Result;
use crate::core::types::{Example, FeatureIndex};
use crate::dataset::LossState;
use crate::prediction::naive::evaluate_tree;
use crate::tree::node::{Annotation, TreeNode};
use rayon::prelude::*;

/// One tree in a pruned sequence, with the alpha that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct PrunedStage {
    /// Cost increase per removed leaf of the collapse that produced this stage
    pub alpha: f64,
    /// The pruned tree
    pub tree: TreeNode,
}

#[derive(Debug, Clone)]
struct ArenaNode {
    leaf_value: Option<f64>,
    feature: FeatureIndex,
    split_value: f64,
    annotation: Option<Annotation>,
    children: Option<(usize, usize)>,
    parent: Option<usize>,
    examples: Vec<usize>,
    leaf_cost: f64,
    subtree_cost: f64,
    leaves: usize,
    live: bool,
}

/// Arena copy of a tree annotated with the training examples reaching each node.
#[derive(Debug, Clone)]
struct PruningArena {
    nodes: Vec<ArenaNode>,
}

impl PruningArena {
    fn build(tree: &TreeNode, examples: &[Example]) -> Self {
        let mut arena = PruningArena { nodes: Vec::new() };
        arena.insert(tree, (0..examples.len()).collect(), None, examples);
        arena
    }

    /// Inserts `node` in preorder and returns its id.
    fn insert(
        &mut self,
        node: &TreeNode,
        reaching: Vec<usize>,
        parent: Option<usize>,
        examples: &[Example],
    ) -> usize {
        let leaf_cost = LossState::from_values(reaching.iter().map(|&i| examples[i].weighted_label))
            .sum_squared_deviations();
        let id = self.nodes.len();
        self.nodes.push(ArenaNode {
            leaf_value: node.leaf_value,
            feature: node.feature.unwrap_or_default(),
            split_value: node.split_value.unwrap_or_default(),
            annotation: node.annotation,
            children: None,
            parent,
            examples: Vec::new(),
            leaf_cost,
            subtree_cost: leaf_cost,
            leaves: 1,
            live: true,
        });

        if let (None, Some(left), Some(right)) = (node.leaf_value, &node.left, &node.right) {
            let feature = self.nodes[id].feature;
            let split_value = self.nodes[id].split_value;
            let (to_left, to_right): (Vec<usize>, Vec<usize>) = reaching
                .iter()
                .partition(|&&i| examples[i].feature(feature) < split_value);
            let left_id = self.insert(left, to_left, Some(id), examples);
            let right_id = self.insert(right, to_right, Some(id), examples);

            let (left_node, right_node) = (&self.nodes[left_id], &self.nodes[right_id]);
            let subtree_cost = left_node.subtree_cost + right_node.subtree_cost;
            let leaves = left_node.leaves + right_node.leaves;
            let current = &mut self.nodes[id];
            current.children = Some((left_id, right_id));
            current.subtree_cost = subtree_cost;
            current.leaves = leaves;
        }
        self.nodes[id].examples = reaching;
        id
    }

    fn is_leaf(&self) -> bool {
        self.nodes[0].children.is_none()
    }

    /// Read-only phase: the live branch with the smallest alpha.
    fn weakest_link(&self) -> Option<(usize, f64)> {
        let mut best: Option<(usize, f64)> = None;
        for (id, node) in self.nodes.iter().enumerate() {
            if !node.live || node.children.is_none() || node.leaves < 2 {
                continue;
            }
            let alpha = (node.leaf_cost - node.subtree_cost) / (node.leaves - 1) as f64;
            if best.map_or(true, |(_, current)| alpha < current) {
                best = Some((id, alpha));
            }
        }
        best
    }

    /// Commit phase: turns `id` into a leaf and refreshes its ancestors.
    fn collapse(&mut self, id: usize, leaf_value: f64) {
        let mut stack: Vec<usize> = self.nodes[id]
            .children
            .map(|(l, r)| vec![l, r])
            .unwrap_or_default();
        while let Some(descendant) = stack.pop() {
            self.nodes[descendant].live = false;
            if let Some((l, r)) = self.nodes[descendant].children {
                stack.push(l);
                stack.push(r);
            }
        }

        let node = &mut self.nodes[id];
        node.children = None;
        node.annotation = None;
        node.leaf_value = Some(leaf_value);
        node.subtree_cost = node.leaf_cost;
        node.leaves = 1;

        let mut ancestor = node.parent;
        while let Some(current) = ancestor {
            if let Some((l, r)) = self.nodes[current].children {
                let subtree_cost = self.nodes[l].subtree_cost + self.nodes[r].subtree_cost;
                let leaves = self.nodes[l].leaves + self.nodes[r].leaves;
                let node = &mut self.nodes[current];
                node.subtree_cost = subtree_cost;
                node.leaves = leaves;
            }
            ancestor = self.nodes[current].parent;
        }
    }

    fn to_tree(&self, id: usize) -> TreeNode {
        let node = &self.nodes[id];
        match node.children {
            Some((left, right)) => TreeNode::branch(
                node.feature,
                node.split_value,
                self.to_tree(left),
                self.to_tree(right),
                node.annotation,
            ),
            None => TreeNode::leaf(node.leaf_value.unwrap_or_default()),
        }
    }
}

/// Builds nested pruned sequences and picks the best stage on held-out data.
///
/// Costs are squared deviations of `weighted_label`, so `leaf_weight` must
/// fit the same target. [`AverageLabel`](crate::boosting::AverageLabel) does.
#[derive(Debug, Clone)]
pub struct Pruner<L> {
    leaf_weight: L,
}

impl<L: LeafWeight> Pruner<L> {
    /// Creates a pruner whose collapsed nodes take their value from `leaf_weight`.
    pub fn new(leaf_weight: L) -> Self {
        Pruner { leaf_weight }
    }

    /// The nested sequence from `tree` down to a single leaf.
    ///
    /// The first stage is `tree` itself with alpha 0. Alphas never decrease
    /// and each stage has fewer nodes than the previous one.
    pub fn pruned_sequence(
        &self,
        tree: &TreeNode,
        training: &[Example],
    ) -> Result<Vec<PrunedStage>> {
        tree.validate()?;

        let mut arena = PruningArena::build(tree, training);
        let mut sequence = vec![PrunedStage {
            alpha: 0.0,
            tree: tree.clone(),
        }];
        let mut last_alpha = 0.0f64;

        while !arena.is_leaf() {
            let Some((id, alpha)) = arena.weakest_link() else {
                break;
            };
            let reaching: Vec<&Example> = arena.nodes[id]
                .examples
                .iter()
                .map(|&i| &training[i])
                .collect();
            let leaf_value = self.leaf_weight.leaf_weight(&reaching);
            arena.collapse(id, leaf_value);

            last_alpha = last_alpha.max(alpha);
            log::debug!("Collapsed node {} with alpha {:.6}", id, last_alpha);
            sequence.push(PrunedStage {
                alpha: last_alpha,
                tree: arena.to_tree(0),
            });
        }

        Ok(sequence)
    }

    /// Prunes `tree` and returns the stage with the lowest testing cost.
    ///
    /// Ties keep the least pruned stage.
    pub fn prune(
        &self,
        tree: &TreeNode,
        training: &[Example],
        testing: &[Example],
    ) -> Result<TreeNode> {
        let sequence = self.pruned_sequence(tree, training)?;
        let costs: Vec<f64> = sequence
            .par_iter()
            .map(|stage| testing_cost(&stage.tree, testing))
            .collect();

        let mut best = 0;
        for (i, &cost) in costs.iter().enumerate() {
            if cost < costs[best] {
                best = i;
            }
        }
        log::info!(
            "Selected pruned stage {} of {} (testing cost {:.6}, {} nodes)",
            best,
            sequence.len(),
            costs[best],
            sequence[best].tree.num_nodes()
        );

        Ok(sequence.into_iter().nth(best).map(|s| s.tree).unwrap_or_else(|| tree.clone()))
    }
}

/// Total squared error between weighted labels and the tree's predictions.
pub fn testing_cost(tree: &TreeNode, testing: &[Example]) -> f64 {
    testing
        .iter()
        .map(|example| {
            let error = example.weighted_label - evaluate_tree(tree, &example.features);
            error * error
        })
        .sum()
}

/// Prunes `tree` with `leaf_weight` as the collapsed-node rule.
pub fn prune<L: LeafWeight>(
    tree: &TreeNode,
    training: &[Example],
    testing: &[Example],
    leaf_weight: L,
) -> Result<TreeNode> {
    Pruner::new(leaf_weight).prune(tree, training, testing)
}
