//! Error handling and error types for decision forest training and evaluation.
//!
//! Every fallible operation in the crate returns [`Result`], whose error side
//! is the single [`ForestError`] enum. Structural and configuration errors are
//! never recovered inside the crate; they are surfaced to the caller.

use std::io;
use thiserror::Error;

/// Main error type for the decision forest library.
#[derive(Error, Debug)]
pub enum ForestError {
    /// A tree violates the leaf/branch child-count invariant
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Unknown selector or unreadable configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// A configuration value is outside its allowed range
    #[error("Invalid parameter: {parameter} = {value}, {reason}")]
    InvalidParameter {
        parameter: String,
        value: String,
        reason: String,
    },

    /// Empty or inconsistent example sets
    #[error("Dataset error: {message}")]
    Dataset { message: String },

    /// Forest persistence errors
    #[error("Serialization error: {message}")]
    Serialization { message: String },

    /// File I/O errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },

    /// JSON serialization errors
    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },

    /// Bincode serialization errors
    #[error("Bincode error: {source}")]
    Bincode {
        #[from]
        source: bincode::Error,
    },

    /// TOML parsing errors
    #[error("TOML error: {source}")]
    Toml {
        #[from]
        source: toml::de::Error,
    },

    /// Thread pool construction errors
    #[error("Threading error: {message}")]
    Threading { message: String },
}

/// Type alias for Results using ForestError
pub type Result<T> = std::result::Result<T, ForestError>;

impl ForestError {
    /// Create a tree validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        ForestError::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        ForestError::Config {
            message: message.into(),
        }
    }

    /// Create a dataset error
    pub fn dataset<S: Into<String>>(message: S) -> Self {
        ForestError::Dataset {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization<S: Into<String>>(message: S) -> Self {
        ForestError::Serialization {
            message: message.into(),
        }
    }

    /// Create a threading error
    pub fn threading<S: Into<String>>(message: S) -> Self {
        ForestError::Threading {
            message: message.into(),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter<P, V, R>(parameter: P, value: V, reason: R) -> Self
    where
        P: Into<String>,
        V: Into<String>,
        R: Into<String>,
    {
        ForestError::InvalidParameter {
            parameter: parameter.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            ForestError::Validation { .. } => "validation",
            ForestError::Config { .. } => "config",
            ForestError::InvalidParameter { .. } => "invalid_parameter",
            ForestError::Dataset { .. } => "dataset",
            ForestError::Serialization { .. } => "serialization",
            ForestError::Io { .. } => "io",
            ForestError::Json { .. } => "json",
            ForestError::Bincode { .. } => "bincode",
            ForestError::Toml { .. } => "toml",
            ForestError::Threading { .. } => "threading",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = ForestError::validation("leaf has children");
        assert_eq!(err.category(), "validation");

        let err = ForestError::config("unknown algorithm");
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_parameter_errors() {
        let err =
            ForestError::invalid_parameter("shrinkage", "-0.5", "must be in range (0.0, 1.0]");
        assert_eq!(err.category(), "invalid_parameter");
        let message = err.to_string();
        assert!(message.contains("shrinkage"));
        assert!(message.contains("-0.5"));
    }

    #[test]
    fn test_error_display() {
        let err = ForestError::validation("branch missing left child");
        let error_string = format!("{}", err);
        assert!(error_string.contains("Validation error"));
        assert!(error_string.contains("branch missing left child"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: ForestError = io_err.into();
        assert!(matches!(err, ForestError::Io { .. }));
        assert_eq!(err.category(), "io");
    }
}
