//! Health check endpoint

use axum::{http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;

use crate::tours::Status;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: Status,
    pub version: &'static str,
}

/// `GET /health`
pub fn health_routes() -> Router {
    Router::new().route("/health", get(health_handler))
}

async fn health_handler() -> impl IntoResponse {
    let response = HealthResponse {
        status: Status::Success,
        version: env!("CARGO_PKG_VERSION"),
    };

    (StatusCode::OK, Json(response))
}
