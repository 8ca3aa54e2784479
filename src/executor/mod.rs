//! Query Executor
//!
//! Drives a [`crate::store::DocumentStore`] with a translated query.
//!
//! # Execution Flow (strict order)
//!
//! 1. Filter
//! 2. Sort
//! 3. Project
//! 4. Skip and limit
//!
//! No retries and no caching: each call goes to the store.

mod executor;

pub use executor::QueryExecutor;
