//! K-fold cross-validation harness.
//!
//! The examples are shuffled and dealt into `folds` partitions. Each fold in
//! turn is held out as the testing set while the remaining folds are
//! concatenated into the training set; the caller's evaluation closure scores
//! the pair. Folds are evaluated in parallel and the scores averaged.

use crate::core::error::Result;
use crate::core::types::Example;
use crate::dataset::partition_folds;
use rand::rngs::StdRng;
use rand::SeedableRng;
use rayon::prelude::*;

/// Scores for each fold, in fold order.
pub fn cross_validated_results<F>(
    folds: usize,
    examples: &[Example],
    seed: u64,
    evaluate: F,
) -> Result<Vec<f64>>
where
    F: Fn(Vec<Example>, Vec<Example>) -> Result<f64> + Sync,
{
    let mut rng = StdRng::seed_from_u64(seed);
    let partitions = partition_folds(examples, folds, &mut rng)?;
    log::info!(
        "Cross-validating {} examples over {} folds",
        examples.len(),
        folds
    );

    (0..folds)
        .into_par_iter()
        .map(|held_out| {
            let training: Vec<Example> = partitions
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != held_out)
                .flat_map(|(_, fold)| fold.iter().cloned())
                .collect();
            let testing = partitions[held_out].clone();
            let score = evaluate(training, testing)?;
            log::debug!("Fold {}: score {:.6}", held_out, score);
            Ok(score)
        })
        .collect()
}

/// Mean score over `folds` train/test splits of `examples`.
///
/// Fails with an invalid-parameter error unless `1 <= folds <= examples.len()`,
/// and propagates the first error returned by `evaluate`.
pub fn run_cross_validation<F>(
    folds: usize,
    examples: &[Example],
    seed: u64,
    evaluate: F,
) -> Result<f64>
where
    F: Fn(Vec<Example>, Vec<Example>) -> Result<f64> + Sync,
{
    let scores = cross_validated_results(folds, examples, seed, evaluate)?;
    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    log::info!("Cross-validation mean score {:.6}", mean);
    Ok(mean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ForestError;
    use rand::Rng;

    #[test]
    fn test_mean_of_uniform_labels() {
        let mut rng = StdRng::seed_from_u64(7);
        let examples: Vec<Example> = (0..1000)
            .map(|_| Example::new(vec![1.0], rng.gen::<f64>()))
            .collect();

        let mean = run_cross_validation(10, &examples, 11, |_, testing| {
            Ok(testing.iter().map(|e| e.label).sum::<f64>() / testing.len() as f64)
        })
        .unwrap();
        assert!((mean - 0.5).abs() < 0.02, "mean {}", mean);
    }

    #[test]
    fn test_folds_cover_every_example_once() {
        let examples: Vec<Example> = (0..23)
            .map(|i| Example::new(vec![i as f64], i as f64))
            .collect();
        let scores = cross_validated_results(4, &examples, 3, |training, testing| {
            assert_eq!(training.len() + testing.len(), 23);
            Ok(testing.len() as f64)
        })
        .unwrap();
        assert_eq!(scores.iter().sum::<f64>(), 23.0);
    }

    #[test]
    fn test_invalid_fold_count() {
        let examples = vec![Example::new(vec![1.0], 1.0)];
        assert!(run_cross_validation(0, &examples, 1, |_, _| Ok(0.0)).is_err());
        assert!(run_cross_validation(2, &examples, 1, |_, _| Ok(0.0)).is_err());
    }

    #[test]
    fn test_evaluation_errors_propagate() {
        let examples: Vec<Example> = (0..4).map(|i| Example::new(vec![i as f64], 0.0)).collect();
        let result =
            run_cross_validation(2, &examples, 1, |_, _| Err(ForestError::validation("boom")));
        assert!(result.is_err());
    }
}
