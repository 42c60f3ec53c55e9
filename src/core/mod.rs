//! Core infrastructure: types, constants, error handling and logging setup.
//!
//! - [`types`]: examples and feature vectors
//! - [`constants`]: numeric guards and configuration defaults
//! - [`error`]: the crate-wide [`ForestError`]
//! - [`logging`]: `env_logger` initialisation

pub mod constants;
pub mod error;
pub mod logging;
pub mod types;

pub use constants::*;
pub use error::{ForestError, Result};
pub use types::*;
