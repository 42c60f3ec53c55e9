//! Random forest generator.
//!
//! Every tree is fitted independently on a bootstrap resample restricted to a
//! random feature subset, with the mean weighted label as its leaf rule. Tree `i`
//! draws from an RNG seeded with `seed + i`, so the forest does not depend on
//! how rayon schedules the trees.

use crate::boosting::loss::AverageLabel;
use crate::boosting::ForestGenerator;
use crate::config::{ForestConfig, StochasticityConfig};
use crate::core::error::{ForestError, Result};
use crate::core::types::{Example, FeatureIndex};
use crate::dataset::{bootstrap, bootstrap_features, feature_set, validate_examples};
use crate::tree::{Forest, RegressionSplitter, Rescaling, TreeNode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Trains a bagged forest of independent trees.
#[derive(Debug, Clone)]
pub struct RandomForestGenerator {
    config: ForestConfig,
    stochasticity: StochasticityConfig,
}

impl RandomForestGenerator {
    /// Creates a generator; `config.stochasticity` must be set.
    pub fn new(config: &ForestConfig) -> Result<Self> {
        config.validate()?;
        let stochasticity = config.stochasticity.clone().ok_or_else(|| {
            ForestError::config("Random forests require a stochasticity configuration")
        })?;
        Ok(RandomForestGenerator {
            config: config.clone(),
            stochasticity,
        })
    }

    fn construct_tree(
        &self,
        examples: &[Example],
        features: &[FeatureIndex],
        index: usize,
    ) -> Result<TreeNode> {
        let mut rng = StdRng::seed_from_u64(self.config.seed.wrapping_add(index as u64));
        let stochasticity = &self.stochasticity;
        let sample = bootstrap(examples, stochasticity.example_bootstrap_proportion, &mut rng);
        let subset = bootstrap_features(features, stochasticity.feature_sample_size, &mut rng);
        log::debug!(
            "Tree {}: {} bootstrap examples, features {:?}",
            index,
            sample.len(),
            subset
        );

        let refs: Vec<&Example> = sample.iter().collect();
        let splitter = RegressionSplitter::new(
            AverageLabel,
            &self.config.splitting_constraints,
            self.config.shrinkage,
        )?
        .with_feature_subset(subset);
        Ok(splitter.generate_tree(&refs))
    }
}

impl ForestGenerator for RandomForestGenerator {
    fn generate(&self, examples: Vec<Example>) -> Result<Forest> {
        if examples.is_empty() {
            return Err(ForestError::dataset("Cannot train a forest on an empty example set"));
        }
        validate_examples(&examples)?;

        let features = feature_set(&examples);
        log::info!(
            "Growing {} random trees over {} examples and {} features",
            self.config.num_weak_learners,
            examples.len(),
            features.len()
        );

        let trees = (0..self.config.num_weak_learners)
            .into_par_iter()
            .map(|i| self.construct_tree(&examples, &features, i))
            .collect::<Result<Vec<_>>>()?;

        Ok(Forest::new(trees, Rescaling::Averaging))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfigBuilder;

    #[test]
    fn test_requires_stochasticity() {
        let config = ForestConfig {
            algorithm: crate::config::Algorithm::RandomForest,
            ..ForestConfig::default()
        };
        let err = RandomForestGenerator::new(&config).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_trees_are_reproducible() {
        let examples: Vec<Example> = (0..50)
            .map(|i| {
                let x = i as f64;
                Example::new(vec![x, (i % 7) as f64, 1.0], if x > 20.0 { 1.0 } else { 0.0 })
            })
            .collect();
        let config = ForestConfigBuilder::new()
            .algorithm(crate::config::Algorithm::RandomForest)
            .num_weak_learners(6)
            .stochasticity(StochasticityConfig {
                per_round_sampling_rate: 1.0,
                example_bootstrap_proportion: 0.8,
                feature_sample_size: 2,
            })
            .build()
            .unwrap();

        let generator = RandomForestGenerator::new(&config).unwrap();
        let first = generator.generate(examples.clone()).unwrap();
        let second = generator.generate(examples).unwrap();
        assert_eq!(first, second);
        assert_eq!(first.len(), 6);
        assert_eq!(first.rescaling, Rescaling::Averaging);
    }
}
