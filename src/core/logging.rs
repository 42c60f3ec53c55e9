//! Logging setup.
//!
//! The library only emits through the `log` facade. Binaries and tests call
//! one of these helpers to install `env_logger` as the backend.

use log::LevelFilter;

/// Installs `env_logger` with an `info` default, honouring `RUST_LOG`.
///
/// Safe to call more than once; later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init();
}

/// Installs `env_logger` with a fixed level, ignoring `RUST_LOG`.
pub fn init_logging_with_level(level: LevelFilter) {
    let _ = env_logger::Builder::new().filter_level(level).try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_is_idempotent() {
        init_logging_with_level(LevelFilter::Warn);
        init_logging();
        log::debug!("logging initialised twice without panicking");
    }
}
