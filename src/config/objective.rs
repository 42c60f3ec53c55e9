//! Loss function configuration.
//!
//! Selects which loss strategy drives boosting and carries its parameters.

use crate::core::constants::DEFAULT_HUBER_ALPHA;
use crate::core::error::{ForestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Loss function selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LossFunctionKind {
    /// Binary classification with labels in {-1, +1}
    Logit,
    /// L1 regression
    LeastAbsoluteDeviation,
    /// L2 within a per-round quantile, L1 beyond it
    Huber,
}

impl Default for LossFunctionKind {
    fn default() -> Self {
        LossFunctionKind::Logit
    }
}

impl fmt::Display for LossFunctionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LossFunctionKind::Logit => write!(f, "logit"),
            LossFunctionKind::LeastAbsoluteDeviation => write!(f, "least_absolute_deviation"),
            LossFunctionKind::Huber => write!(f, "huber"),
        }
    }
}

impl FromStr for LossFunctionKind {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "logit" => Ok(LossFunctionKind::Logit),
            "least_absolute_deviation" | "lad" => Ok(LossFunctionKind::LeastAbsoluteDeviation),
            "huber" => Ok(LossFunctionKind::Huber),
            _ => Err(ForestError::config(format!("Unknown loss function: {}", s))),
        }
    }
}

/// Loss function configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LossFunctionConfig {
    /// Which loss function to use
    pub kind: LossFunctionKind,
    /// Quantile of |residual| below which Huber behaves like L2
    pub huber_alpha: f64,
    /// Delta carried into the Huber leaf-weight correction
    pub huber_last_delta: f64,
}

impl Default for LossFunctionConfig {
    fn default() -> Self {
        LossFunctionConfig {
            kind: LossFunctionKind::Logit,
            huber_alpha: DEFAULT_HUBER_ALPHA,
            huber_last_delta: 0.0,
        }
    }
}

impl LossFunctionConfig {
    /// Creates a configuration for `kind` with default parameters.
    pub fn new(kind: LossFunctionKind) -> Self {
        LossFunctionConfig {
            kind,
            ..LossFunctionConfig::default()
        }
    }

    /// Huber configuration with the given quantile.
    pub fn huber(alpha: f64) -> Self {
        LossFunctionConfig {
            kind: LossFunctionKind::Huber,
            huber_alpha: alpha,
            huber_last_delta: 0.0,
        }
    }

    /// Validates the loss parameters.
    pub fn validate(&self) -> Result<()> {
        if self.kind == LossFunctionKind::Huber {
            if !(self.huber_alpha > 0.0 && self.huber_alpha <= 1.0) {
                return Err(ForestError::invalid_parameter(
                    "huber_alpha",
                    self.huber_alpha.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
            if !(self.huber_last_delta >= 0.0) {
                return Err(ForestError::invalid_parameter(
                    "huber_last_delta",
                    self.huber_last_delta.to_string(),
                    "must be non-negative",
                ));
            }
        }
        Ok(())
    }
}
