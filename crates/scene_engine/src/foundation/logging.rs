//! Logging setup
//!
//! The crate logs through the `log` facade; binaries pick the backend.

pub use log::{debug, error, info, trace, warn};

/// Install env_logger as the global logger, filtered by `RUST_LOG`
pub fn init() {
    env_logger::init();
}

/// Install a test-friendly logger; repeated calls are ignored
pub fn init_for_tests() {
    let _ = env_logger::builder().is_test(true).try_init();
}
