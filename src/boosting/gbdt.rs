//! Gradient boosting generator.
//!
//! The forest starts as a single prior leaf. Each later round optionally
//! subsamples the examples, optionally trims low-importance examples,
//! recomputes pseudo-residuals against the whole current forest and fits one
//! more tree. Rounds run strictly in sequence; all parallelism happens inside
//! a round, after the weighted labels have been written.

use crate::boosting::loss::{BoundLoss, LossFunction};
use crate::boosting::ForestGenerator;
use crate::config::ForestConfig;
use crate::core::error::{ForestError, Result};
use crate::core::types::Example;
use crate::dataset::{subsample, validate_examples};
use crate::metrics::compute_metrics;
use crate::prediction::FastForestEvaluator;
use crate::tree::{Forest, RegressionSplitter, TreeNode};
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;
use std::time::Instant;

/// Trains an additive forest by gradient boosting.
#[derive(Debug, Clone)]
pub struct BoostingGenerator {
    config: ForestConfig,
    loss: LossFunction,
}

impl BoostingGenerator {
    /// Creates a generator for `config`.
    pub fn new(config: &ForestConfig) -> Result<Self> {
        config.validate()?;
        Ok(BoostingGenerator {
            config: config.clone(),
            loss: LossFunction::from_config(&config.loss_function),
        })
    }

    fn initialize_forest(&self, examples: &[Example]) -> Forest {
        let refs: Vec<&Example> = examples.iter().collect();
        let prior = self.loss.prior(&refs);
        log::info!(
            "Initializing forest with prior {:.6} over {} examples (shrinkage {})",
            prior,
            examples.len(),
            self.config.effective_shrinkage()
        );

        let mut trees = Vec::with_capacity(self.config.num_weak_learners);
        trees.push(TreeNode::leaf(prior));
        Forest::new(trees, self.loss.rescaling())
    }

    /// Trimming fraction for `round`, if influence trimming is active in it.
    ///
    /// Trimming starts once `round > warmup_rounds`.
    fn trimming_alpha(&self, round: usize) -> Option<f64> {
        self.config
            .influence_trimming
            .as_ref()
            .filter(|trimming| round > trimming.warmup_rounds && trimming.alpha > 0.0)
            .map(|trimming| trimming.alpha)
    }

    /// Drops the lowest-importance prefix whose cumulative importance stays
    /// below `alpha` of the total. Returns the number of examples kept at the
    /// end of `examples`; at least one is always kept.
    fn trim_influence(loss: &BoundLoss<'_>, examples: &mut [Example], alpha: f64) -> usize {
        let importances: Vec<f64> = examples
            .par_iter()
            .map(|example| loss.sample_importance(example))
            .collect();
        let mut ranked: Vec<(f64, Example)> = importances
            .into_iter()
            .zip(examples.iter_mut().map(std::mem::take))
            .collect();
        ranked.sort_by(|a, b| a.0.total_cmp(&b.0));

        let total: f64 = ranked.iter().map(|(importance, _)| importance).sum();
        let cutoff = alpha * total;
        let mut cumulative = 0.0;
        let mut dropped = 0;
        while dropped + 1 < ranked.len() && cumulative + ranked[dropped].0 < cutoff {
            cumulative += ranked[dropped].0;
            dropped += 1;
        }

        for (slot, (_, example)) in examples.iter_mut().zip(ranked) {
            *slot = example;
        }
        examples.len() - dropped
    }

    fn boosting_round(
        &self,
        forest: &mut Forest,
        examples: &mut [Example],
        round: usize,
        rng: &mut StdRng,
    ) -> Result<()> {
        let started = Instant::now();

        // (a) subsample; the kept examples form a prefix of the shuffled set
        let sampled = match &self.config.stochasticity {
            Some(stochasticity) => subsample(examples, stochasticity.per_round_sampling_rate, rng),
            None => examples.len(),
        };

        let evaluator = FastForestEvaluator::raw(forest)?;
        let loss = self.loss.bind(&evaluator);

        // (b) influence trimming once the warm-up rounds are over
        let trimmed = match self.trimming_alpha(round) {
            Some(alpha) => {
                let kept = Self::trim_influence(&loss, &mut examples[..sampled], alpha);
                log::debug!(
                    "Round {}: influence trimming dropped {} examples",
                    round,
                    sampled - kept
                );
                sampled - kept
            }
            None => 0,
        };
        let working = &mut examples[trimmed..sampled];

        // (c) pseudo-residuals against the whole current forest
        loss.update_weighted_labels(working);

        // (d) fit the round's tree on the reweighted examples
        let refs: Vec<&Example> = working.iter().collect();
        let splitter = RegressionSplitter::new(
            loss,
            &self.config.splitting_constraints,
            self.config.shrinkage,
        )?;
        let tree = splitter.generate_tree(&refs);
        log::debug!(
            "Round {}: tree with {} leaves over {} examples",
            round,
            tree.num_leaves(),
            refs.len()
        );

        // (e) append
        forest.trees.push(tree);

        if self.loss == LossFunction::Logit {
            let metrics = compute_metrics(&FastForestEvaluator::new(forest)?, working);
            log::info!("Round {}: {}", round, metrics);
        }
        log::info!("Round {} finished in {:?}", round, started.elapsed());
        Ok(())
    }
}

impl ForestGenerator for BoostingGenerator {
    fn generate(&self, mut examples: Vec<Example>) -> Result<Forest> {
        if examples.is_empty() {
            return Err(ForestError::dataset("Cannot train a forest on an empty example set"));
        }
        validate_examples(&examples)?;

        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut forest = self.initialize_forest(&examples);
        for round in 1..self.config.num_weak_learners {
            self.boosting_round(&mut forest, &mut examples, round, &mut rng)?;
        }
        Ok(forest)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfigBuilder;
    use crate::core::types::FeatureVector;
    use crate::prediction::EvaluatorFn;

    /// Positive examples whose feature 0 is the current raw score.
    ///
    /// A score of 0 gives logit importance 1; a score of 10 gives an
    /// importance of about 8e-9.
    fn scored(scores: &[f64]) -> Vec<Example> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| Example::new(vec![score, i as f64], 1.0))
            .collect()
    }

    fn id(example: &Example) -> usize {
        example.feature(1) as usize
    }

    #[test]
    fn test_trimming_drops_low_importance_prefix() {
        let evaluator = EvaluatorFn(|f: &FeatureVector| f.get(0));
        let loss = LossFunction::Logit.bind(&evaluator);
        let mut examples = scored(&[10.0, 0.0, 10.0, 10.0, 0.0, 10.0]);

        // total is about 2; the four near-zero importances fit under 0.2 of it
        let kept = BoostingGenerator::trim_influence(&loss, &mut examples, 0.1);
        assert_eq!(kept, 2);
        assert_eq!(examples.len(), 6);

        let mut survivors: Vec<usize> = examples[examples.len() - kept..].iter().map(id).collect();
        survivors.sort_unstable();
        assert_eq!(survivors, vec![1, 4]);
    }

    #[test]
    fn test_trimming_cutoff_is_strict() {
        let evaluator = EvaluatorFn(|f: &FeatureVector| f.get(0));
        let loss = LossFunction::Logit.bind(&evaluator);
        let mut examples = scored(&[0.0, 0.0, 0.0, 0.0]);

        // importances 1, 1, 1, 1 with cutoff 2.0: dropping a second would reach it
        let kept = BoostingGenerator::trim_influence(&loss, &mut examples, 0.5);
        assert_eq!(kept, 3);
    }

    #[test]
    fn test_trimming_keeps_at_least_one_example() {
        let evaluator = EvaluatorFn(|f: &FeatureVector| f.get(0));
        let loss = LossFunction::Logit.bind(&evaluator);
        let mut examples = scored(&[0.0, 0.0, 0.0, 0.0]);
        assert_eq!(BoostingGenerator::trim_influence(&loss, &mut examples, 0.99), 1);

        let mut single = scored(&[0.0]);
        assert_eq!(BoostingGenerator::trim_influence(&loss, &mut single, 0.99), 1);
    }

    #[test]
    fn test_constant_importance_losses_keep_everything_below_alpha() {
        let evaluator = EvaluatorFn(|_: &FeatureVector| 0.0);
        let loss = LossFunction::LeastAbsoluteDeviation.bind(&evaluator);
        let mut examples = scored(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);

        // importance 1 each, total 10, cutoff 2.5: two are dropped
        assert_eq!(BoostingGenerator::trim_influence(&loss, &mut examples, 0.25), 8);
    }

    #[test]
    fn test_trimming_waits_for_warmup() {
        let config = ForestConfigBuilder::new()
            .influence_trimming(0.2, 2)
            .build()
            .unwrap();
        let generator = BoostingGenerator::new(&config).unwrap();
        assert_eq!(generator.trimming_alpha(1), None);
        assert_eq!(generator.trimming_alpha(2), None);
        assert_eq!(generator.trimming_alpha(3), Some(0.2));

        let disabled = ForestConfigBuilder::new()
            .influence_trimming(0.0, 0)
            .build()
            .unwrap();
        let generator = BoostingGenerator::new(&disabled).unwrap();
        assert_eq!(generator.trimming_alpha(5), None);

        let generator = BoostingGenerator::new(&ForestConfig::default()).unwrap();
        assert_eq!(generator.trimming_alpha(5), None);
    }

    #[test]
    fn test_rejects_non_finite_examples() {
        let generator = BoostingGenerator::new(&ForestConfig::default()).unwrap();
        let examples = vec![
            Example::new(vec![1.0], 1.0),
            Example::new(vec![f64::NAN], -1.0),
        ];
        let err = generator.generate(examples).unwrap_err();
        assert!(matches!(err, ForestError::Dataset { .. }));
    }
}
