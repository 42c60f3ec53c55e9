//! Constants shared by training, evaluation and configuration defaults.

/// Lower clamp for the logit prior, guarding against all-negative labels.
pub const MIN_LOGIT_PRIOR: f64 = -20.0;

/// Upper clamp for the logit prior, guarding against all-positive labels.
pub const MAX_LOGIT_PRIOR: f64 = 20.0;

/// Feature id marking a leaf in a flattened tree.
pub const LEAF_FEATURE_ID: i64 = -1;

/// Default shrinkage when none is configured.
pub const DEFAULT_SHRINKAGE: f64 = 1.0;

/// Default number of weak learners.
pub const DEFAULT_NUM_WEAK_LEARNERS: usize = 10;

/// Default Huber quantile.
pub const DEFAULT_HUBER_ALPHA: f64 = 0.9;

/// Default random seed.
pub const DEFAULT_SEED: u64 = 42;

/// Crate version.
pub const DECISION_FOREST_VERSION: &str = env!("CARGO_PKG_VERSION");
