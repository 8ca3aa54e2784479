//! # HTTP Server Module
//!
//! Axum server for the tours API.
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/api/v1/tours/*` - Tours API
//!
//! Any other path answers 404 with a `fail` envelope.

pub mod config;
pub mod health;
pub mod server;

pub use config::HttpServerConfig;
pub use server::HttpServer;
