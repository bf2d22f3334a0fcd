//! Logging utilities
//!
//! The engine logs through the `log` facade; hosts pick the backend. These
//! helpers install `env_logger` for tools and tests that have no logger of
//! their own.

pub use log::{debug, error, info, trace, warn};

/// Initialize logging from `RUST_LOG`
///
/// Safe to call more than once; later calls are ignored.
pub fn init() {
    let _ = env_logger::Builder::from_default_env().try_init();
}

/// Initialize logging with a fixed default level, still overridable by `RUST_LOG`
pub fn init_with_level(level: log::LevelFilter) {
    let _ = env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .try_init();
}

/// Initialize a logger suitable for unit tests (captured output)
pub fn init_for_tests() {
    let _ = env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .is_test(true)
        .try_init();
}
