//! Regression trees: node and forest records, construction and pruning.
//!
//! - [`node`]: the [`TreeNode`] record shared by training, evaluation and persistence
//! - [`forest`]: [`Forest`] and its [`Rescaling`] policy
//! - [`split`]: per-feature best-split search
//! - [`splitter`]: the recursive [`RegressionSplitter`]
//! - [`pruning`]: weakest-link [`Pruner`]

pub mod forest;
pub mod node;
pub mod pruning;
pub mod split;
pub mod splitter;

pub use forest::{Forest, Rescaling};
pub use node::{Annotation, TreeNode};
pub use pruning::{prune, PrunedStage, Pruner};
pub use split::SplitCandidate;
pub use splitter::{build_tree, RegressionSplitter};
