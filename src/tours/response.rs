//! # Response Envelope
//!
//! `{status, results?, data}` on success, `{status, message}` on failure.

use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Map, Value};

/// Outcome marker carried in every response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    /// Client error (4xx)
    Fail,
    /// Server error (5xx)
    Error,
}

impl Status {
    pub fn for_code(code: StatusCode) -> Self {
        if code.is_server_error() {
            Status::Error
        } else if code.is_client_error() {
            Status::Fail
        } else {
            Status::Success
        }
    }
}

/// Success envelope
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope {
    pub status: Status,

    /// Item count, present for list responses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<usize>,

    pub data: Map<String, Value>,
}

impl Envelope {
    /// List payload under `key`, with its length in `results`
    pub fn list(key: &str, items: Vec<Value>) -> Self {
        let mut data = Map::new();
        let results = items.len();
        data.insert(key.to_string(), Value::Array(items));
        Self {
            status: Status::Success,
            results: Some(results),
            data,
        }
    }

    /// Single payload under `key`
    pub fn single(key: &str, item: Value) -> Self {
        let mut data = Map::new();
        data.insert(key.to_string(), item);
        Self {
            status: Status::Success,
            results: None,
            data,
        }
    }
}

/// Failure body
#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub status: Status,
    pub message: String,
}
