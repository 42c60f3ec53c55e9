//! Cross-validated training of boosted forests.

mod common;

use common::*;
use decision_forest::*;

#[test]
fn test_cross_validated_roc() {
    let examples = separable_classification(300, 41);
    let config = boosting_config(LossFunctionKind::Logit, 5);

    let roc = run_cross_validation(5, &examples, 42, |train, test| {
        let forest = train_forest(train, &config)?;
        Ok(compute_metrics(&build_fast_evaluator(&forest)?, &test).roc)
    })
    .unwrap();
    assert!(roc > 0.9, "roc {}", roc);
}

#[test]
fn test_fold_scores_are_reproducible() {
    let examples = linear_regression(100, 0.1, 43);
    let score = |train: Vec<Example>, test: Vec<Example>| -> Result<f64> {
        let mean = train.iter().map(|e| e.label).sum::<f64>() / train.len() as f64;
        Ok(test.iter().map(|e| (e.label - mean).abs()).sum::<f64>())
    };

    let first = cross_validated_results(4, &examples, 44, score).unwrap();
    let second = cross_validated_results(4, &examples, 44, score).unwrap();
    assert_eq!(first.len(), 4);
    assert_eq!(first, second);
}
