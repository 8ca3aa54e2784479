//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Boot the tours API and serve until Ctrl-C
//! - explain: Show how a query string is translated

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{explain, run, run_command, seed_store, serve, translate, Config, QueryConfig};
pub use errors::{CliError, CliErrorCode, CliResult};
