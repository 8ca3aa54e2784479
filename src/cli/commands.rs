//! CLI command implementations
//!
//! `serve` boots the HTTP server over an in-memory tour store; `explain`
//! prints the translated form of a query string and exits.

use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::extract::Query;
use axum::http::Uri;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};

use crate::aggregation::PlanBoundary;
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::observability::{init_logging, install_panic_hook, DEFAULT_LOG_LEVEL};
use crate::query::{FeatureOptions, OperatorPolicy, QueryDescriptor, QueryFeatures, RawQuery, MAX_PAGE_SIZE};
use crate::store::InMemoryStore;
use crate::tours::{tour_store, TourHandler};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Configuration file structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// HTTP listener settings
    #[serde(default)]
    pub server: HttpServerConfig,

    /// Query translation settings
    #[serde(default)]
    pub query: QueryConfig,

    /// Log level used when RUST_LOG is not set (default "info")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// JSON array of tours loaded at startup (optional)
    #[serde(default)]
    pub seed_file: Option<PathBuf>,
}

/// Query translation settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryConfig {
    /// Largest accepted `limit` (default 1000)
    #[serde(default = "default_max_page_size")]
    pub max_page_size: usize,

    /// Handling of unsupported filter operators (default "reject")
    #[serde(default)]
    pub operator_policy: OperatorPolicy,

    /// Date window of the monthly plan (default "calendar_year")
    #[serde(default)]
    pub plan_boundary: PlanBoundary,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_max_page_size() -> usize {
    MAX_PAGE_SIZE
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            max_page_size: default_max_page_size(),
            operator_policy: OperatorPolicy::default(),
            plan_boundary: PlanBoundary::default(),
        }
    }
}

impl QueryConfig {
    pub fn feature_options(&self) -> FeatureOptions {
        FeatureOptions {
            max_page_size: self.max_page_size,
            operator_policy: self.operator_policy,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: HttpServerConfig::default(),
            query: QueryConfig::default(),
            log_level: default_log_level(),
            seed_file: None,
        }
    }
}

impl Config {
    /// Load configuration from file. A missing file yields the defaults.
    pub fn load(path: &Path) -> CliResult<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| CliError::config_error(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_json::from_str(&content)
            .map_err(|e| CliError::config_error(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> CliResult<()> {
        if self.query.max_page_size == 0 {
            return Err(CliError::config_error("query.max_page_size must be > 0"));
        }

        if self.log_level.trim().is_empty() {
            return Err(CliError::config_error("log_level must not be empty"));
        }

        Ok(())
    }

    /// Apply command-line overrides
    pub fn with_overrides(mut self, port: Option<u16>, seed: Option<PathBuf>) -> Self {
        if let Some(port) = port {
            self.server.port = port;
        }
        if seed.is_some() {
            self.seed_file = seed;
        }
        self
    }
}

/// Parse CLI arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve { config, port, seed } => serve(&config, port, seed),
        Command::Explain { config, query } => explain(&config, &query),
    }
}

/// Start the HTTP server and block until shutdown
pub fn serve(config_path: &Path, port: Option<u16>, seed: Option<PathBuf>) -> CliResult<()> {
    let config = Config::load(config_path)?.with_overrides(port, seed);

    init_logging(&config.log_level);
    install_panic_hook();

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::boot_failed(format!("Failed to create tokio runtime: {}", e)))?;

    let result = rt.block_on(run_server(config, shutdown_signal()));
    if let Err(e) = &result {
        error!(code = e.code_str(), "Shutting down... {}", e.message());
    }
    result
}

async fn run_server<F>(config: Config, shutdown: F) -> CliResult<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let store = Arc::new(tour_store());

    if let Some(seed_file) = &config.seed_file {
        let loaded = seed_store(&store, seed_file).await?;
        info!(count = loaded, file = %seed_file.display(), "Seed data loaded");
    }

    let handler = Arc::new(TourHandler::with_options(
        store,
        config.query.feature_options(),
        config.query.plan_boundary,
    ));

    HttpServer::new(config.server, handler)
        .start(shutdown)
        .await
        .map_err(|e| CliError::boot_failed(format!("HTTP server failed: {}", e)))
}

/// Load a JSON array of documents into the store
pub async fn seed_store(store: &InMemoryStore, path: &Path) -> CliResult<usize> {
    let content = fs::read_to_string(path)
        .map_err(|e| CliError::seed_error(format!("Failed to read {}: {}", path.display(), e)))?;

    let docs = match serde_json::from_str::<Value>(&content) {
        Ok(Value::Array(docs)) => docs,
        Ok(_) => return Err(CliError::seed_error("Seed file must contain a JSON array")),
        Err(e) => return Err(CliError::seed_error(format!("Invalid seed JSON: {}", e))),
    };

    store
        .insert_many(docs)
        .await
        .map_err(|e| CliError::seed_error(e.to_string()))
}

/// Resolve on Ctrl-C (and SIGTERM on unix)
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

/// Translate a query string into its descriptor
pub fn translate(query: &str, options: FeatureOptions) -> CliResult<QueryDescriptor> {
    let uri: Uri = format!("/?{}", query.trim_start_matches('?'))
        .parse()
        .map_err(|e| CliError::invalid_query(format!("Invalid query string: {}", e)))?;

    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&uri)
        .map_err(|e| CliError::invalid_query(e.body_text()))?;

    let raw = RawQuery::from_pairs(pairs);
    QueryFeatures::standard(&raw, options).map_err(|e| CliError::invalid_query(e.to_string()))
}

/// Print the descriptor for a query string as JSON
pub fn explain(config_path: &Path, query: &str) -> CliResult<()> {
    let config = Config::load(config_path)?;
    let descriptor = translate(query, config.query.feature_options())?;

    println!("{}", serde_json::to_string_pretty(&descriptor)?);
    Ok(())
}
