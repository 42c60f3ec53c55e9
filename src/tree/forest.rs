//! Forest record and rescaling policy.

use crate::core::error::Result;
use crate::tree::node::TreeNode;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Transform applied to the raw sum of tree outputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rescaling {
    /// Raw sum
    None,
    /// Sum divided by the tree count
    Averaging,
    /// `1 / (1 + exp(-2 * sum))`, the logit loss convention
    LogOdds,
}

impl Default for Rescaling {
    fn default() -> Self {
        Rescaling::None
    }
}

impl Rescaling {
    /// Applies the rescaling to `sum` over `num_trees` trees.
    #[inline]
    pub fn apply(self, sum: f64, num_trees: usize) -> f64 {
        match self {
            Rescaling::None => sum,
            Rescaling::Averaging => {
                if num_trees == 0 {
                    0.0
                } else {
                    sum / num_trees as f64
                }
            }
            Rescaling::LogOdds => 1.0 / (1.0 + (-2.0 * sum).exp()),
        }
    }
}

impl fmt::Display for Rescaling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rescaling::None => write!(f, "none"),
            Rescaling::Averaging => write!(f, "averaging"),
            Rescaling::LogOdds => write!(f, "log_odds"),
        }
    }
}

/// Ordered trees plus the rescaling fixed at construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Forest {
    /// Trees in training order
    pub trees: Vec<TreeNode>,
    /// Output transform
    pub rescaling: Rescaling,
}

impl Forest {
    /// Creates a forest from trained trees.
    pub fn new(trees: Vec<TreeNode>, rescaling: Rescaling) -> Self {
        Forest { trees, rescaling }
    }

    /// Number of trees.
    pub fn len(&self) -> usize {
        self.trees.len()
    }

    /// Returns true if the forest holds no trees.
    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// Forest made of the first `len` trees with the same rescaling.
    pub fn prefix(&self, len: usize) -> Forest {
        Forest {
            trees: self.trees[..len.min(self.trees.len())].to_vec(),
            rescaling: self.rescaling,
        }
    }

    /// Validates every tree.
    pub fn validate(&self) -> Result<()> {
        self.trees.iter().try_for_each(TreeNode::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_rescaling() {
        assert_eq!(Rescaling::None.apply(1.5, 3), 1.5);
        assert_eq!(Rescaling::Averaging.apply(1.5, 3), 0.5);
        assert_eq!(Rescaling::Averaging.apply(1.5, 0), 0.0);
        assert_abs_diff_eq!(Rescaling::LogOdds.apply(0.0, 3), 0.5);
        assert_abs_diff_eq!(
            Rescaling::LogOdds.apply(0.5, 1),
            1.0 / (1.0 + (-1.0f64).exp()),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_prefix_keeps_rescaling() {
        let forest = Forest::new(
            vec![TreeNode::leaf(1.0), TreeNode::leaf(2.0), TreeNode::leaf(3.0)],
            Rescaling::Averaging,
        );
        let prefix = forest.prefix(2);
        assert_eq!(prefix.len(), 2);
        assert_eq!(prefix.rescaling, Rescaling::Averaging);
        assert_eq!(forest.prefix(10).len(), 3);
    }
}
