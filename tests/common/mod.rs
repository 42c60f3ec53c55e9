//! Common test utilities for decision forest integration tests.

#![allow(dead_code)]

use decision_forest::*;
use rand::prelude::*;

/// Two-feature examples labelled ±1 by the sign of the first feature.
///
/// The second feature is noise.
pub fn separable_classification(num_samples: usize, seed: u64) -> Vec<Example> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_samples)
        .map(|_| {
            let x: f64 = rng.gen_range(-1.0..1.0);
            let noise: f64 = rng.gen_range(-1.0..1.0);
            Example::new(vec![x, noise], if x > 0.0 { 1.0 } else { -1.0 })
        })
        .collect()
}

/// Examples whose label is `3 * x0 - x1` plus uniform noise of width `noise`.
pub fn linear_regression(num_samples: usize, noise: f64, seed: u64) -> Vec<Example> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_samples)
        .map(|_| {
            let x0: f64 = rng.gen_range(0.0..1.0);
            let x1: f64 = rng.gen_range(0.0..1.0);
            let jitter = if noise > 0.0 { rng.gen_range(-noise..noise) } else { 0.0 };
            Example::new(vec![x0, x1], 3.0 * x0 - x1 + jitter)
        })
        .collect()
}

/// A step at `x0 = 0.5` from 0 to 5, buried in uniform noise of width `noise`.
pub fn noisy_step(num_samples: usize, noise: f64, seed: u64) -> Vec<Example> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..num_samples)
        .map(|_| {
            let x: f64 = rng.gen_range(0.0..1.0);
            let base = if x < 0.5 { 0.0 } else { 5.0 };
            Example::new(vec![x], base + rng.gen_range(-noise..noise))
        })
        .collect()
}

/// Mean absolute error of `evaluator` over `examples`.
pub fn mean_absolute_error<E: Evaluator>(evaluator: &E, examples: &[Example]) -> f64 {
    let scores = evaluator.evaluate_batch(examples);
    scores
        .iter()
        .zip(examples)
        .map(|(score, example)| (score - example.label).abs())
        .sum::<f64>()
        / examples.len() as f64
}

/// A boosting configuration with small trees.
pub fn boosting_config(kind: LossFunctionKind, rounds: usize) -> ForestConfig {
    ForestConfigBuilder::new()
        .algorithm(Algorithm::Boosting)
        .loss_function(kind)
        .num_weak_learners(rounds)
        .shrinkage(0.3)
        .maximum_levels(3)
        .build()
        .expect("valid boosting configuration")
}
