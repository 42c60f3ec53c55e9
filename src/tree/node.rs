//! Tree node record.
//!
//! A [`TreeNode`] is either a leaf (only `leaf_value` set) or a branch
//! (`feature`, `split_value`, and both children set). The optional-field
//! layout is also the persisted form, so the same type is used for training,
//! evaluation and serialization.

use crate::core::error::{ForestError, Result};
use crate::core::types::FeatureIndex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Training-time statistics attached to a branch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Fraction of the node's training examples routed left
    pub left_fraction: f64,
}

/// Regression tree node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TreeNode {
    /// Prediction value, set only on leaves
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub leaf_value: Option<f64>,
    /// Split feature, set only on branches
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature: Option<FeatureIndex>,
    /// Split threshold; values below it go left
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub split_value: Option<f64>,
    /// Left subtree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub left: Option<Box<TreeNode>>,
    /// Right subtree
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Box<TreeNode>>,
    /// Optional likelihood annotation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<Annotation>,
}

impl TreeNode {
    /// Creates a leaf.
    pub fn leaf(value: f64) -> Self {
        TreeNode {
            leaf_value: Some(value),
            ..TreeNode::default()
        }
    }

    /// Creates a branch splitting `feature` at `split_value`.
    pub fn branch(
        feature: FeatureIndex,
        split_value: f64,
        left: TreeNode,
        right: TreeNode,
        annotation: Option<Annotation>,
    ) -> Self {
        TreeNode {
            leaf_value: None,
            feature: Some(feature),
            split_value: Some(split_value),
            left: Some(Box::new(left)),
            right: Some(Box::new(right)),
            annotation,
        }
    }

    /// Returns true if this node is a leaf.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.leaf_value.is_some()
    }

    /// Checks the leaf/branch invariant over the whole subtree.
    pub fn validate(&self) -> Result<()> {
        match self.leaf_value {
            Some(_) => {
                if self.left.is_some() || self.right.is_some() {
                    return Err(ForestError::validation("leaf node has children"));
                }
                Ok(())
            }
            None => {
                let (left, right) = match (&self.left, &self.right) {
                    (Some(left), Some(right)) => (left, right),
                    _ => {
                        return Err(ForestError::validation(
                            "branch node must have exactly two children",
                        ))
                    }
                };
                if self.feature.is_none() || self.split_value.is_none() {
                    return Err(ForestError::validation(
                        "branch node is missing its feature or split value",
                    ));
                }
                left.validate()?;
                right.validate()
            }
        }
    }

    /// Total number of nodes in the subtree.
    pub fn num_nodes(&self) -> usize {
        1 + self.left.as_ref().map_or(0, |n| n.num_nodes())
            + self.right.as_ref().map_or(0, |n| n.num_nodes())
    }

    /// Number of leaves in the subtree.
    pub fn num_leaves(&self) -> usize {
        if self.is_leaf() {
            return 1;
        }
        self.left.as_ref().map_or(0, |n| n.num_leaves())
            + self.right.as_ref().map_or(0, |n| n.num_leaves())
    }

    /// Number of edges on the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        let left = self.left.as_ref().map_or(0, |n| n.depth() + 1);
        let right = self.right.as_ref().map_or(0, |n| n.depth() + 1);
        left.max(right)
    }

    fn write_indented(&self, f: &mut fmt::Formatter<'_>, indent: usize) -> fmt::Result {
        let pad = "  ".repeat(indent);
        if let Some(value) = self.leaf_value {
            return writeln!(f, "{}leaf {:.6}", pad, value);
        }
        writeln!(
            f,
            "{}f{} < {:.6}",
            pad,
            self.feature.unwrap_or_default(),
            self.split_value.unwrap_or_default()
        )?;
        if let Some(left) = &self.left {
            left.write_indented(f, indent + 1)?;
        }
        if let Some(right) = &self.right {
            right.write_indented(f, indent + 1)?;
        }
        Ok(())
    }
}

impl fmt::Display for TreeNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_indented(f, 0)
    }
}
