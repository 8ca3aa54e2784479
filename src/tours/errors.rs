//! # Tours API Errors
//!
//! Every handler failure maps to one of these, and every one of these maps
//! to an HTTP status plus a `{status, message}` JSON body.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use tracing::error;

use super::response::{ErrorBody, Status};
use crate::query::QueryError;
use crate::store::StoreError;

/// Result type for tour handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Message shown in place of internal failure details
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went very wrong!";

/// Tours API errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    // ==================
    // Client Errors (4xx)
    // ==================
    /// Lookup by id found nothing
    #[error("No tour found with that ID")]
    NotFound,

    /// Request body rejected
    #[error("{0}")]
    InvalidInput(String),

    /// Path parameter rejected
    #[error("{0}")]
    InvalidParam(String),

    /// Query string rejected
    #[error("{0}")]
    Query(#[from] QueryError),

    /// No route for this path
    #[error("Can't find {0} on this server!")]
    RouteNotFound(String),

    // ==================
    // Server Errors (5xx)
    // ==================
    /// Store failed; detail is logged, never returned
    #[error("Store failure: {0}")]
    StoreFailure(String),
}

impl ApiError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            // 400 Bad Request
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidParam(_) => StatusCode::BAD_REQUEST,
            ApiError::Query(_) => StatusCode::BAD_REQUEST,

            // 404 Not Found
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::RouteNotFound(_) => StatusCode::NOT_FOUND,

            // 500 Internal Server Error
            ApiError::StoreFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to send to the client
    pub fn public_message(&self) -> String {
        if self.status_code().is_server_error() {
            GENERIC_FAILURE_MESSAGE.to_string()
        } else {
            self.to_string()
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(_) | StoreError::DuplicateId(_) => {
                ApiError::InvalidInput(err.to_string())
            }
            StoreError::InvalidId(_) => ApiError::InvalidParam(err.to_string()),
            StoreError::Internal(_) => ApiError::StoreFailure(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "Request failed");
        }

        let body = ErrorBody {
            status: Status::for_code(status),
            message: self.public_message(),
        };
        (status, Json(body)).into_response()
    }
}
