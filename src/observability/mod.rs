//! Observability
//!
//! Structured logging through `tracing`. Request spans come from the HTTP
//! server's trace layer.

mod logger;

pub use logger::{env_filter, init_logging, install_panic_hook, DEFAULT_LOG_LEVEL, PANIC_EXIT_CODE};
