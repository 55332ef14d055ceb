//! Logging setup
//!
//! Structured logging via tracing. `RUST_LOG` wins when set; otherwise
//! the configured fallback level applies.

use tracing_subscriber::EnvFilter;

/// Initialize the global logger. Safe to call once per process.
pub fn init_logger(fallback_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .init();
}
