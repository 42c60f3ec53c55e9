//! Forest configuration record and builder.
//!
//! [`ForestConfig`] is read once at training start and passed by reference
//! into every training call. It can be assembled in code through
//! [`ForestConfigBuilder`] or loaded from a JSON/TOML file.

use crate::config::objective::{LossFunctionConfig, LossFunctionKind};
use crate::core::constants::*;
use crate::core::error::{ForestError, Result};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Ensemble algorithm selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Algorithm {
    /// Sequential gradient boosting
    Boosting,
    /// Independent bagged trees
    RandomForest,
}

impl Default for Algorithm {
    fn default() -> Self {
        Algorithm::Boosting
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Boosting => write!(f, "boosting"),
            Algorithm::RandomForest => write!(f, "random_forest"),
        }
    }
}

impl FromStr for Algorithm {
    type Err = ForestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "boosting" => Ok(Algorithm::Boosting),
            "random_forest" => Ok(Algorithm::RandomForest),
            _ => Err(ForestError::config(format!("Unknown algorithm: {}", s))),
        }
    }
}

/// Limits applied while growing a single tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplittingConstraints {
    /// Deepest level that may still split; the root is level 0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_levels: Option<usize>,
    /// Minimum of gain / example count required to split
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_average_gain: Option<f64>,
    /// Minimum number of examples on each side of a split
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum_samples_at_leaf: Option<usize>,
}

/// Sampling parameters for boosting rounds and random forest trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StochasticityConfig {
    /// Fraction of examples kept in each boosting round
    pub per_round_sampling_rate: f64,
    /// Bootstrap size as a fraction of the example count
    pub example_bootstrap_proportion: f64,
    /// Number of features drawn for each random forest tree
    pub feature_sample_size: usize,
}

impl Default for StochasticityConfig {
    fn default() -> Self {
        StochasticityConfig {
            per_round_sampling_rate: 1.0,
            example_bootstrap_proportion: 1.0,
            feature_sample_size: 1,
        }
    }
}

/// Influence trimming parameters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InfluenceTrimmingConfig {
    /// Fraction of total importance that may be dropped
    pub alpha: f64,
    /// Rounds to run before trimming starts
    pub warmup_rounds: usize,
}

/// Main configuration structure for forest training.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    /// Ensemble algorithm
    pub algorithm: Algorithm,
    /// Number of trees in the trained forest, prior included for boosting
    pub num_weak_learners: usize,
    /// Leaf value multiplier, 1.0 when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shrinkage: Option<f64>,
    /// Seed for every random draw made during training
    pub seed: u64,
    /// Worker threads (0 = rayon default)
    pub num_threads: usize,
    /// Loss function driving boosting
    pub loss_function: LossFunctionConfig,
    /// Per-tree growth limits
    pub splitting_constraints: SplittingConstraints,
    /// Sampling parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stochasticity: Option<StochasticityConfig>,
    /// Influence trimming parameters
    #[serde(skip_serializing_if = "Option::is_none")]
    pub influence_trimming: Option<InfluenceTrimmingConfig>,
}

impl Default for ForestConfig {
    fn default() -> Self {
        ForestConfig {
            algorithm: Algorithm::Boosting,
            num_weak_learners: DEFAULT_NUM_WEAK_LEARNERS,
            shrinkage: None,
            seed: DEFAULT_SEED,
            num_threads: 0,
            loss_function: LossFunctionConfig::default(),
            splitting_constraints: SplittingConstraints::default(),
            stochasticity: None,
            influence_trimming: None,
        }
    }
}

impl ForestConfig {
    /// Create a new configuration with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Shrinkage to apply to leaf values.
    pub fn effective_shrinkage(&self) -> f64 {
        self.shrinkage.unwrap_or(DEFAULT_SHRINKAGE)
    }

    /// Validate the configuration parameters
    pub fn validate(&self) -> Result<()> {
        if self.num_weak_learners == 0 {
            return Err(ForestError::invalid_parameter(
                "num_weak_learners",
                "0",
                "must be at least 1",
            ));
        }

        if let Some(shrinkage) = self.shrinkage {
            if !(shrinkage > 0.0 && shrinkage <= 1.0) {
                return Err(ForestError::invalid_parameter(
                    "shrinkage",
                    shrinkage.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
        }

        if let Some(gain) = self.splitting_constraints.minimum_average_gain {
            if gain.is_nan() || gain < 0.0 {
                return Err(ForestError::invalid_parameter(
                    "minimum_average_gain",
                    gain.to_string(),
                    "must be non-negative",
                ));
            }
        }

        if let Some(stochasticity) = &self.stochasticity {
            let rate = stochasticity.per_round_sampling_rate;
            if !(rate > 0.0 && rate <= 1.0) {
                return Err(ForestError::invalid_parameter(
                    "per_round_sampling_rate",
                    rate.to_string(),
                    "must be in range (0.0, 1.0]",
                ));
            }
            let proportion = stochasticity.example_bootstrap_proportion;
            if !(proportion > 0.0 && proportion.is_finite()) {
                return Err(ForestError::invalid_parameter(
                    "example_bootstrap_proportion",
                    proportion.to_string(),
                    "must be positive",
                ));
            }
            if stochasticity.feature_sample_size == 0 {
                return Err(ForestError::invalid_parameter(
                    "feature_sample_size",
                    "0",
                    "must be at least 1",
                ));
            }
        }

        if let Some(trimming) = &self.influence_trimming {
            if !(trimming.alpha >= 0.0 && trimming.alpha < 1.0) {
                return Err(ForestError::invalid_parameter(
                    "influence_trimming.alpha",
                    trimming.alpha.to_string(),
                    "must be in range [0.0, 1.0)",
                ));
            }
        }

        if self.num_threads > num_cpus::get() * 4 {
            log::warn!(
                "num_threads = {} is far above the {} available cores",
                self.num_threads,
                num_cpus::get()
            );
        }

        self.loss_function.validate()
    }

    /// Load configuration from a `.json` or `.toml` file.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ForestError::config(format!("Failed to read config file: {}", e)))?;

        let config: ForestConfig = match extension(path) {
            Some("json") => serde_json::from_str(&content)
                .map_err(|e| ForestError::config(format!("Failed to parse JSON config: {}", e)))?,
            Some("toml") => toml::from_str(&content)
                .map_err(|e| ForestError::config(format!("Failed to parse TOML config: {}", e)))?,
            _ => {
                return Err(ForestError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        config.validate()?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Save configuration to a `.json` or `.toml` file.
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let content = match extension(path) {
            Some("json") => serde_json::to_string_pretty(self)
                .map_err(|e| ForestError::config(format!("Failed to serialize to JSON: {}", e)))?,
            Some("toml") => toml::to_string_pretty(self)
                .map_err(|e| ForestError::config(format!("Failed to serialize to TOML: {}", e)))?,
            _ => {
                return Err(ForestError::config(
                    "Unsupported config file format. Use .json or .toml",
                ))
            }
        };

        std::fs::write(path, content)?;
        Ok(())
    }

    /// Builds the rayon pool that training runs inside.
    pub fn thread_pool(&self) -> Result<rayon::ThreadPool> {
        rayon::ThreadPoolBuilder::new()
            .num_threads(self.num_threads)
            .build()
            .map_err(|e| ForestError::threading(format!("Failed to build thread pool: {}", e)))
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|s| s.to_str())
}

/// Configuration builder for fluent configuration creation
#[derive(Debug, Clone)]
pub struct ForestConfigBuilder {
    config: ForestConfig,
    validation_errors: Vec<String>,
}

impl ForestConfigBuilder {
    /// Create a new configuration builder
    pub fn new() -> Self {
        ForestConfigBuilder {
            config: ForestConfig::default(),
            validation_errors: Vec::new(),
        }
    }

    /// Set the ensemble algorithm
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.config.algorithm = algorithm;
        self
    }

    /// Set the number of weak learners
    pub fn num_weak_learners(mut self, count: usize) -> Self {
        if count == 0 {
            self.validation_errors
                .push("num_weak_learners must be at least 1".to_string());
        }
        self.config.num_weak_learners = count;
        self
    }

    /// Set the loss function with default parameters
    pub fn loss_function(mut self, kind: LossFunctionKind) -> Self {
        self.config.loss_function = LossFunctionConfig::new(kind);
        self
    }

    /// Use Huber loss with the given quantile
    pub fn huber(mut self, alpha: f64, last_delta: f64) -> Self {
        self.config.loss_function = LossFunctionConfig {
            huber_last_delta: last_delta,
            ..LossFunctionConfig::huber(alpha)
        };
        self
    }

    /// Set the shrinkage rate
    pub fn shrinkage(mut self, shrinkage: f64) -> Self {
        if shrinkage <= 0.0 || shrinkage > 1.0 {
            self.validation_errors
                .push("shrinkage must be in range (0.0, 1.0]".to_string());
        }
        self.config.shrinkage = Some(shrinkage);
        self
    }

    /// Set the maximum tree depth
    pub fn maximum_levels(mut self, levels: usize) -> Self {
        self.config.splitting_constraints.maximum_levels = Some(levels);
        self
    }

    /// Set the minimum average gain per split
    pub fn minimum_average_gain(mut self, gain: f64) -> Self {
        self.config.splitting_constraints.minimum_average_gain = Some(gain);
        self
    }

    /// Set the minimum number of samples per leaf
    pub fn minimum_samples_at_leaf(mut self, samples: usize) -> Self {
        self.config.splitting_constraints.minimum_samples_at_leaf = Some(samples);
        self
    }

    /// Set the sampling parameters
    pub fn stochasticity(mut self, stochasticity: StochasticityConfig) -> Self {
        self.config.stochasticity = Some(stochasticity);
        self
    }

    /// Enable influence trimming
    pub fn influence_trimming(mut self, alpha: f64, warmup_rounds: usize) -> Self {
        if !(0.0..1.0).contains(&alpha) {
            self.validation_errors
                .push("influence_trimming.alpha must be in range [0.0, 1.0)".to_string());
        }
        self.config.influence_trimming = Some(InfluenceTrimmingConfig {
            alpha,
            warmup_rounds,
        });
        self
    }

    /// Set the random seed
    pub fn seed(mut self, seed: u64) -> Self {
        self.config.seed = seed;
        self
    }

    /// Set the number of worker threads
    pub fn num_threads(mut self, threads: usize) -> Self {
        self.config.num_threads = threads;
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<ForestConfig> {
        if !self.validation_errors.is_empty() {
            return Err(ForestError::config(format!(
                "Configuration validation failed: {}",
                self.validation_errors.join(", ")
            )));
        }

        self.config.validate()?;
        Ok(self.config)
    }
}

impl Default for ForestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_default() {
        let config = ForestConfig::default();
        assert_eq!(config.algorithm, Algorithm::Boosting);
        assert_eq!(config.num_weak_learners, DEFAULT_NUM_WEAK_LEARNERS);
        assert_eq!(config.effective_shrinkage(), 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ForestConfig::default();
        config.shrinkage = Some(0.0);
        assert!(config.validate().is_err());

        config.shrinkage = Some(0.5);
        config.num_weak_learners = 0;
        assert!(config.validate().is_err());

        config.num_weak_learners = 3;
        config.influence_trimming = Some(InfluenceTrimmingConfig {
            alpha: 1.0,
            warmup_rounds: 0,
        });
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = ForestConfigBuilder::new()
            .algorithm(Algorithm::RandomForest)
            .num_weak_learners(25)
            .shrinkage(0.1)
            .maximum_levels(4)
            .stochasticity(StochasticityConfig {
                per_round_sampling_rate: 0.5,
                example_bootstrap_proportion: 0.8,
                feature_sample_size: 3,
            })
            .build()
            .unwrap();

        assert_eq!(config.algorithm, Algorithm::RandomForest);
        assert_eq!(config.num_weak_learners, 25);
        assert_eq!(config.effective_shrinkage(), 0.1);
        assert_eq!(config.splitting_constraints.maximum_levels, Some(4));
    }

    #[test]
    fn test_config_builder_validation() {
        let result = ForestConfigBuilder::new()
            .shrinkage(-0.1)
            .num_weak_learners(0)
            .build();
        assert!(matches!(result, Err(ForestError::Config { .. })));
    }

    #[test]
    fn test_algorithm_from_str() {
        assert_eq!("boosting".parse::<Algorithm>().unwrap(), Algorithm::Boosting);
        assert_eq!(
            "random_forest".parse::<Algorithm>().unwrap(),
            Algorithm::RandomForest
        );
        assert!("gradient".parse::<Algorithm>().is_err());
    }

    #[test]
    fn test_json_and_toml_round_trip() {
        let dir = tempdir().unwrap();
        let config = ForestConfigBuilder::new()
            .huber(0.8, 0.25)
            .num_weak_learners(7)
            .minimum_samples_at_leaf(3)
            .influence_trimming(0.1, 2)
            .build()
            .unwrap();

        for name in ["config.json", "config.toml"] {
            let path = dir.path().join(name);
            config.save_to_file(&path).unwrap();
            let loaded = ForestConfig::load_from_file(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_unknown_selector_in_file_is_config_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"algorithm": "extra_trees"}"#).unwrap();
        let err = ForestConfig::load_from_file(&path).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_unsupported_extension() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "algorithm: boosting").unwrap();
        assert!(ForestConfig::load_from_file(&path).is_err());
    }

    #[test]
    fn test_thread_pool() {
        let config = ForestConfigBuilder::new().num_threads(2).build().unwrap();
        let pool = config.thread_pool().unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
