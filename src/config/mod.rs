//! Configuration for forest training.
//!
//! [`ForestConfig`] is the explicit record every training entry point takes.
//! There is no process-wide configuration state.

pub mod core;
pub mod objective;

pub use self::core::{
    Algorithm, ForestConfig, ForestConfigBuilder, InfluenceTrimmingConfig, SplittingConstraints,
    StochasticityConfig,
};
pub use objective::{LossFunctionConfig, LossFunctionKind};
