//! Split search for regression trees.

pub mod finder;

pub use finder::{best_split_for_feature, split_threshold, SplitCandidate};
