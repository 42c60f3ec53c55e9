//! Forest generators and the loss functions that drive them.
//!
//! - [`loss`]: [`LossFunction`] strategies and the [`LeafWeight`] seam used by the splitter
//! - [`gbdt`]: [`BoostingGenerator`], sequential gradient boosting
//! - [`random_forest`]: [`RandomForestGenerator`], independent bagged trees
//!
//! [`new_forest_generator`] picks the generator named by the configuration and
//! [`train_forest`] runs it inside the configured thread pool.

pub mod gbdt;
pub mod loss;
pub mod random_forest;

pub use gbdt::BoostingGenerator;
pub use loss::{AverageLabel, BoundLoss, LeafWeight, LossFunction};
pub use random_forest::RandomForestGenerator;

use crate::config::{Algorithm, ForestConfig};
use crate::core::error::Result;
use crate::core::types::Example;
use crate::tree::Forest;

/// An algorithm that turns an example set into a forest.
pub trait ForestGenerator: Send + Sync {
    /// Trains a forest, taking ownership of the examples' weighted labels.
    fn generate(&self, examples: Vec<Example>) -> Result<Forest>;
}

/// Returns the generator selected by `config.algorithm`.
pub fn new_forest_generator(config: &ForestConfig) -> Result<Box<dyn ForestGenerator>> {
    Ok(match config.algorithm {
        Algorithm::Boosting => Box::new(BoostingGenerator::new(config)?),
        Algorithm::RandomForest => Box::new(RandomForestGenerator::new(config)?),
    })
}

/// Trains a forest with the configured algorithm and thread count.
pub fn train_forest(examples: Vec<Example>, config: &ForestConfig) -> Result<Forest> {
    let generator = new_forest_generator(config)?;
    let pool = config.thread_pool()?;
    log::info!(
        "Training {} forest with {} weak learners on {} examples ({} threads)",
        config.algorithm,
        config.num_weak_learners,
        examples.len(),
        pool.current_num_threads()
    );
    pool.install(|| generator.generate(examples))
}

/// Trains a gradient boosted forest.
pub fn train_boosted_forest(examples: Vec<Example>, config: &ForestConfig) -> Result<Forest> {
    let pool = config.thread_pool()?;
    let generator = BoostingGenerator::new(config)?;
    pool.install(|| generator.generate(examples))
}

/// Trains a random forest.
pub fn train_random_forest(examples: Vec<Example>, config: &ForestConfig) -> Result<Forest> {
    let pool = config.thread_pool()?;
    let generator = RandomForestGenerator::new(config)?;
    pool.install(|| generator.generate(examples))
}
