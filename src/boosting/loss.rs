//! Loss function strategies driving gradient boosting.
//!
//! A [`LossFunction`] is selected once from configuration. Binding it to an
//! [`Evaluator`] over the current ensemble yields a [`BoundLoss`], which
//! computes pseudo-residuals, priors, leaf weights and sample importances.

use crate::config::{LossFunctionConfig, LossFunctionKind};
use crate::core::constants::{MAX_LOGIT_PRIOR, MIN_LOGIT_PRIOR};
use crate::core::types::Example;
use crate::prediction::Evaluator;
use crate::tree::Rescaling;
use rayon::prelude::*;

/// Computes the value of a leaf from the examples routed to it.
pub trait LeafWeight: Sync {
    /// Leaf value before shrinkage.
    fn leaf_weight(&self, examples: &[&Example]) -> f64;
}

/// Mean weighted label of the examples, used by random forests and pruning.
///
/// This is the same target the splitter and the pruning costs are computed
/// on; bootstrap samples carry `weighted_label == label`.
#[derive(Debug, Clone, Copy, Default)]
pub struct AverageLabel;

impl LeafWeight for AverageLabel {
    fn leaf_weight(&self, examples: &[&Example]) -> f64 {
        if examples.is_empty() {
            return 0.0;
        }
        examples.iter().map(|e| e.weighted_label).sum::<f64>() / examples.len() as f64
    }
}

/// Loss function selector with the state each variant needs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LossFunction {
    /// Binary classification on labels in {-1, +1}
    Logit,
    /// L1 regression
    LeastAbsoluteDeviation,
    /// Huber regression
    Huber {
        /// Quantile of |residual| used as the per-round threshold
        alpha: f64,
        /// Carried delta bounding the leaf-weight correction
        last_delta: f64,
    },
}

impl LossFunction {
    /// Selects the loss function described by `config`.
    pub fn from_config(config: &LossFunctionConfig) -> Self {
        match config.kind {
            LossFunctionKind::Logit => LossFunction::Logit,
            LossFunctionKind::LeastAbsoluteDeviation => LossFunction::LeastAbsoluteDeviation,
            LossFunctionKind::Huber => LossFunction::Huber {
                alpha: config.huber_alpha,
                last_delta: config.huber_last_delta,
            },
        }
    }

    /// Forest rescaling matching this loss function's output convention.
    pub fn rescaling(&self) -> Rescaling {
        match self {
            LossFunction::Logit => Rescaling::LogOdds,
            LossFunction::LeastAbsoluteDeviation | LossFunction::Huber { .. } => Rescaling::None,
        }
    }

    /// Initial constant prediction for `examples`.
    pub fn prior(&self, examples: &[&Example]) -> f64 {
        if examples.is_empty() {
            return 0.0;
        }
        match self {
            LossFunction::Logit => {
                let average = examples.iter().map(|e| e.label).sum::<f64>() / examples.len() as f64;
                let prior = 0.5 * ((1.0 + average) / (1.0 - average)).ln();
                if prior.is_nan() {
                    0.0
                } else {
                    prior.clamp(MIN_LOGIT_PRIOR, MAX_LOGIT_PRIOR)
                }
            }
            LossFunction::LeastAbsoluteDeviation | LossFunction::Huber { .. } => {
                upper_median(examples.iter().map(|e| e.label).collect())
            }
        }
    }

    /// Binds the loss function to the current ensemble.
    pub fn bind<'a>(&self, evaluator: &'a dyn Evaluator) -> BoundLoss<'a> {
        BoundLoss {
            loss: *self,
            evaluator,
        }
    }
}

/// A loss function reading predictions from a fixed ensemble.
#[derive(Clone, Copy)]
pub struct BoundLoss<'a> {
    loss: LossFunction,
    evaluator: &'a dyn Evaluator,
}

impl<'a> BoundLoss<'a> {
    fn residual(&self, example: &Example) -> f64 {
        example.label - self.evaluator.evaluate(&example.features)
    }

    fn logit_residual(&self, example: &Example) -> f64 {
        let prediction = self.evaluator.evaluate(&example.features);
        2.0 * example.label / (1.0 + (2.0 * example.label * prediction).exp())
    }

    /// Rewrites every example's weighted label with its pseudo-residual.
    pub fn update_weighted_labels(&self, examples: &mut [Example]) {
        match self.loss {
            LossFunction::Logit => examples.par_iter_mut().for_each(|example| {
                example.weighted_label = self.logit_residual(example);
            }),
            LossFunction::LeastAbsoluteDeviation => examples.par_iter_mut().for_each(|example| {
                example.weighted_label = if self.residual(example) > 0.0 { 1.0 } else { -1.0 };
            }),
            LossFunction::Huber { alpha, .. } => {
                let residuals: Vec<f64> = examples.par_iter().map(|e| self.residual(e)).collect();
                let delta = huber_delta(&residuals, alpha);
                log::debug!("Huber delta for {} examples: {}", residuals.len(), delta);
                for (example, residual) in examples.iter_mut().zip(residuals) {
                    example.weighted_label = if residual.abs() <= delta {
                        residual
                    } else {
                        delta * residual.signum()
                    };
                }
            }
        }
    }

    /// Initial constant prediction for `examples`.
    pub fn prior(&self, examples: &[&Example]) -> f64 {
        self.loss.prior(examples)
    }

    /// Importance of one example for influence trimming.
    pub fn sample_importance(&self, example: &Example) -> f64 {
        match self.loss {
            LossFunction::Logit => {
                let residual = self.logit_residual(example).abs();
                residual * (2.0 - residual)
            }
            LossFunction::LeastAbsoluteDeviation | LossFunction::Huber { .. } => 1.0,
        }
    }
}

impl LeafWeight for BoundLoss<'_> {
    fn leaf_weight(&self, examples: &[&Example]) -> f64 {
        if examples.is_empty() {
            return 0.0;
        }
        match self.loss {
            LossFunction::Logit => {
                let (numerator, denominator) =
                    examples.iter().fold((0.0, 0.0), |(num, den), example| {
                        let residual = example.weighted_label;
                        let magnitude = residual.abs();
                        (num + residual, den + magnitude * (2.0 - magnitude))
                    });
                if denominator == 0.0 {
                    0.0
                } else {
                    numerator / denominator
                }
            }
            LossFunction::LeastAbsoluteDeviation => {
                upper_median(examples.iter().map(|e| self.residual(e)).collect())
            }
            LossFunction::Huber { last_delta, .. } => {
                let residuals: Vec<f64> = examples.iter().map(|e| self.residual(e)).collect();
                let median = upper_median(residuals.clone());
                let correction: f64 = residuals
                    .iter()
                    .map(|r| r - median)
                    .filter(|d| *d != 0.0)
                    .map(|d| d.signum() * last_delta.min(d.abs()))
                    .sum();
                median + correction / residuals.len() as f64
            }
        }
    }
}

/// Element at position `n / 2` of the sorted values, 0.0 when empty.
fn upper_median(mut values: Vec<f64>) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let middle = values.len() / 2;
    let (_, median, _) = values.select_nth_unstable_by(middle, |a, b| a.total_cmp(b));
    *median
}

/// The `alpha`-quantile of the absolute residuals.
fn huber_delta(residuals: &[f64], alpha: f64) -> f64 {
    if residuals.is_empty() {
        return 0.0;
    }
    let mut magnitudes: Vec<f64> = residuals.iter().map(|r| r.abs()).collect();
    let position = ((magnitudes.len() as f64 * alpha).floor() as usize).min(magnitudes.len() - 1);
    let (_, delta, _) = magnitudes.select_nth_unstable_by(position, |a, b| a.total_cmp(b));
    *delta
}
