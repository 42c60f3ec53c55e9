//! Compact preorder layout used for the bincode format.
//!
//! Bincode is not self-describing, so the optional-field [`TreeNode`] record
//! cannot be written directly. Each tree is instead flattened into a preorder
//! list of [`PackedNode`]s and rebuilt on load.

use crate::core::error::{ForestError, Result};
use crate::core::types::FeatureIndex;
use crate::tree::{Annotation, Forest, Rescaling, TreeNode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub(crate) enum PackedNode {
    Leaf(f64),
    Branch {
        feature: FeatureIndex,
        split_value: f64,
        left_fraction: Option<f64>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub(crate) struct PackedForest {
    pub(crate) version: String,
    pub(crate) rescaling: Rescaling,
    pub(crate) trees: Vec<Vec<PackedNode>>,
}

impl PackedForest {
    pub(crate) fn pack(forest: &Forest) -> Result<Self> {
        let trees = forest
            .trees
            .iter()
            .map(|tree| {
                let mut nodes = Vec::with_capacity(tree.num_nodes());
                pack_node(tree, &mut nodes)?;
                Ok(nodes)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(PackedForest {
            version: crate::core::constants::DECISION_FOREST_VERSION.to_string(),
            rescaling: forest.rescaling,
            trees,
        })
    }

    pub(crate) fn unpack(self) -> Result<Forest> {
        let trees = self
            .trees
            .iter()
            .enumerate()
            .map(|(index, nodes)| {
                let mut cursor = 0;
                let tree = unpack_node(nodes, &mut cursor)?;
                if cursor != nodes.len() {
                    return Err(ForestError::serialization(format!(
                        "Tree {} has {} trailing nodes",
                        index,
                        nodes.len() - cursor
                    )));
                }
                Ok(tree)
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Forest::new(trees, self.rescaling))
    }
}

fn pack_node(node: &TreeNode, out: &mut Vec<PackedNode>) -> Result<()> {
    if let Some(value) = node.leaf_value {
        out.push(PackedNode::Leaf(value));
        return Ok(());
    }
    match (node.feature, node.split_value, &node.left, &node.right) {
        (Some(feature), Some(split_value), Some(left), Some(right)) => {
            out.push(PackedNode::Branch {
                feature,
                split_value,
                left_fraction: node.annotation.map(|a| a.left_fraction),
            });
            pack_node(left, out)?;
            pack_node(right, out)
        }
        _ => Err(ForestError::validation("Cannot pack a malformed branch")),
    }
}

fn unpack_node(nodes: &[PackedNode], cursor: &mut usize) -> Result<TreeNode> {
    let node = nodes
        .get(*cursor)
        .copied()
        .ok_or_else(|| ForestError::serialization("Truncated tree in packed forest"))?;
    *cursor += 1;
    match node {
        PackedNode::Leaf(value) => Ok(TreeNode::leaf(value)),
        PackedNode::Branch {
            feature,
            split_value,
            left_fraction,
        } => {
            let left = unpack_node(nodes, cursor)?;
            let right = unpack_node(nodes, cursor)?;
            Ok(TreeNode::branch(
                feature,
                split_value,
                left,
                right,
                left_fraction.map(|left_fraction| Annotation { left_fraction }),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preorder_layout() {
        let tree = TreeNode::branch(
            2,
            0.5,
            TreeNode::leaf(1.0),
            TreeNode::branch(0, 3.0, TreeNode::leaf(2.0), TreeNode::leaf(3.0), None),
            Some(Annotation { left_fraction: 0.25 }),
        );
        let packed = PackedForest::pack(&Forest::new(vec![tree.clone()], Rescaling::None)).unwrap();
        assert_eq!(packed.trees[0].len(), 5);
        assert_eq!(packed.trees[0][1], PackedNode::Leaf(1.0));
        assert_eq!(packed.unpack().unwrap().trees[0], tree);
    }

    #[test]
    fn test_truncated_and_trailing_nodes_are_rejected() {
        let truncated = PackedForest {
            version: String::new(),
            rescaling: Rescaling::None,
            trees: vec![vec![PackedNode::Branch {
                feature: 0,
                split_value: 1.0,
                left_fraction: None,
            }]],
        };
        assert!(truncated.unpack().is_err());

        let trailing = PackedForest {
            version: String::new(),
            rescaling: Rescaling::None,
            trees: vec![vec![PackedNode::Leaf(1.0), PackedNode::Leaf(2.0)]],
        };
        assert!(trailing.unpack().is_err());
    }
}
