//! # Decision Forest
//!
//! Regression tree ensembles trained by gradient boosting or as random
//! forests, with a flattened evaluator for fast scoring.
//!
//! ## Features
//!
//! - **Boosting**: logit, least-absolute-deviation and Huber losses with
//!   shrinkage, per-round subsampling and influence trimming.
//! - **Random forests**: bootstrap resampling with per-tree feature subsets,
//!   reproducible from a single seed.
//! - **Pruning**: cost-complexity pruning scored against a held-out set.
//! - **Parallel Processing**: split search, tree growth, batch scoring and
//!   cross-validation folds all run on Rayon.
//! - **Metrics**: ROC area, log score, calibration and normalized entropy,
//!   per forest prefix.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use decision_forest::prelude::*;
//!
//! # fn main() -> decision_forest::Result<()> {
//! let examples: Vec<Example> = (0..100)
//!     .map(|i| Example::new(vec![i as f64], if i < 50 { -1.0 } else { 1.0 }))
//!     .collect();
//!
//! let config = ForestConfigBuilder::new()
//!     .num_weak_learners(20)
//!     .shrinkage(0.1)
//!     .maximum_levels(3)
//!     .build()?;
//!
//! let forest = train_forest(examples.clone(), &config)?;
//! let evaluator = build_fast_evaluator(&forest)?;
//! println!("{}", compute_metrics(&evaluator, &examples));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rust_2018_idioms, non_snake_case, non_upper_case_globals)]

// Core infrastructure module - always available
pub mod core;

// Configuration management module
pub mod config;

// Example sets, resampling and running statistics
pub mod dataset;

// Regression trees, splitting and pruning
pub mod tree;

// Tree and forest evaluators
pub mod prediction;

// Forest generators and loss functions
pub mod boosting;

// Classification metrics and learning curves
pub mod metrics;

// K-fold cross-validation
pub mod cross_validation;

// Forest persistence
pub mod io;

pub use crate::core::{
    constants::*,
    error::{ForestError, Result},
    logging::{init_logging, init_logging_with_level},
    types::*,
};

pub use config::{
    Algorithm, ForestConfig, ForestConfigBuilder, InfluenceTrimmingConfig, LossFunctionConfig,
    LossFunctionKind, SplittingConstraints, StochasticityConfig,
};

pub use dataset::{examples_from_arrays, LossState, TrainingData};

pub use tree::{prune, Annotation, Forest, Pruner, RegressionSplitter, Rescaling, TreeNode};

pub use prediction::{
    build_fast_evaluator, Evaluator, EvaluatorFn, FastForestEvaluator, FastTreeEvaluator,
    ForestEvaluator, TreeEvaluator,
};

pub use boosting::{
    new_forest_generator, train_boosted_forest, train_forest, train_random_forest,
    BoostingGenerator, ForestGenerator, LossFunction, RandomForestGenerator,
};

pub use metrics::{
    compute_metrics, learning_curve, EpochResult, LabelledPredictions, TrainingResults,
};

pub use cross_validation::{cross_validated_results, run_cross_validation};

pub use io::{forest_from_json, forest_to_json, load_forest, save_forest, SerializationFormat};

// Version information
pub use crate::core::constants::DECISION_FOREST_VERSION as VERSION;

/// Commonly used types and functions.
pub mod prelude {
    pub use crate::boosting::{train_forest, ForestGenerator};
    pub use crate::config::{Algorithm, ForestConfig, ForestConfigBuilder, LossFunctionKind};
    pub use crate::core::error::{ForestError, Result};
    pub use crate::core::types::{Example, FeatureVector};
    pub use crate::metrics::{compute_metrics, learning_curve};
    pub use crate::prediction::{build_fast_evaluator, Evaluator};
    pub use crate::tree::{Forest, TreeNode};
}
