//! Logging setup
//!
//! One `tracing` subscriber for the whole process:
//! - `RUST_LOG` wins when set and valid
//! - otherwise the configured level
//! - output to stderr, compact

use std::panic;

use tracing::error;
use tracing_subscriber::{fmt, EnvFilter};

/// Level used when neither `RUST_LOG` nor configuration provides one
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Exit status after an uncaught panic
pub const PANIC_EXIT_CODE: i32 = 1;

/// Filter from `RUST_LOG`, falling back to `level`
pub fn env_filter(level: &str) -> EnvFilter {
    if std::env::var_os(EnvFilter::DEFAULT_ENV).is_some() {
        if let Ok(filter) = EnvFilter::try_from_default_env() {
            return filter;
        }
    }
    EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_LEVEL))
}

/// Install the global subscriber. Returns false if one was already set.
pub fn init_logging(level: &str) -> bool {
    fmt()
        .with_env_filter(env_filter(level))
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .try_init()
        .is_ok()
}

/// Log panics through `tracing`, run the default hook, then exit.
///
/// Panics inside spawned tasks would otherwise be absorbed by the runtime and
/// leave the server running.
pub fn install_panic_hook() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let location = info
            .location()
            .map(|l| format!("{}:{}", l.file(), l.line()))
            .unwrap_or_else(|| "unknown".to_string());
        error!(%location, "UNCAUGHT PANIC! Shutting down... {}", info);
        default_hook(info);
        std::process::exit(PANIC_EXIT_CODE);
    }));
}
