//! CLI argument definitions using clap
//!
//! Commands:
//! - tourapi serve --config <path> [--port <port>] [--seed <file>]
//! - tourapi explain --config <path> <query-string>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Tours REST API with query-string filtering, sorting and pagination
#[derive(Parser, Debug)]
#[command(name = "tourapi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./tourapi.json")]
        config: PathBuf,

        /// Port to listen on (overrides the configuration file)
        #[arg(long, env = "PORT")]
        port: Option<u16>,

        /// JSON array of tours to load at startup
        #[arg(long)]
        seed: Option<PathBuf>,
    },

    /// Print the query a query string translates to, without running it
    Explain {
        /// Path to configuration file
        #[arg(long, default_value = "./tourapi.json")]
        config: PathBuf,

        /// Query string, e.g. "difficulty=easy&price[lt]=1500&sort=-price"
        query: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
