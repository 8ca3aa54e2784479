//! tourapi - A tours REST API over a document collection
//!
//! Query strings are translated into bounded, structured queries
//! (filter, sort, projection, pagination) before they reach the store.

pub mod aggregation;
pub mod cli;
pub mod executor;
pub mod http_server;
pub mod observability;
pub mod query;
pub mod store;
pub mod tours;
