//! Trains a forest from a configuration file and a JSON example set.
//!
//! ```text
//! forest_trainer <config.{json,toml}> <training_data.json> [output.{json,bin}]
//! ```
//!
//! The learning curve over the `test` examples (or `train`, when no test
//! examples are given) is logged per round. The trained forest is written to
//! the output path, or printed as JSON when none is given.

use anyhow::{bail, Context, Result};
use decision_forest::{
    forest_to_json, init_logging, learning_curve, save_forest, train_forest, ForestConfig,
    TrainingData,
};
use std::time::Instant;

fn main() -> Result<()> {
    init_logging();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 3 || args.len() > 4 {
        bail!(
            "usage: {} <config.json|config.toml> <training_data.json> [output.json|output.bin]",
            args.first().map(String::as_str).unwrap_or("forest_trainer")
        );
    }

    let config = ForestConfig::load_from_file(&args[1])
        .with_context(|| format!("failed to load configuration from {}", args[1]))?;
    let data = TrainingData::load_from_file(&args[2])
        .with_context(|| format!("failed to load examples from {}", args[2]))?;

    let evaluation = if data.test.is_empty() {
        log::warn!("No test examples given; the learning curve uses the training set");
        data.train.clone()
    } else {
        data.test
    };

    let started = Instant::now();
    let forest = train_forest(data.train, &config).context("training failed")?;
    log::info!("Trained {} trees in {:?}", forest.len(), started.elapsed());

    let curve = learning_curve(&forest, &evaluation).context("failed to evaluate the forest")?;
    for (round, result) in curve.epoch_results.iter().enumerate() {
        log::info!("Trees {:>4}: {}", round + 1, result);
    }

    match args.get(3) {
        Some(path) => {
            save_forest(&forest, path).with_context(|| format!("failed to write {}", path))?
        }
        None => println!("{}", forest_to_json(&forest)?),
    }
    Ok(())
}
