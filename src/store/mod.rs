//! # Document Store
//!
//! The queryable collection interface driven by the executor and handlers,
//! plus an in-memory implementation.
//!
//! A store hands out chainable [`QueryHandle`]s from [`DocumentStore::find`].
//! Nothing runs until [`QueryHandle::exec`] is awaited.

mod errors;
pub mod eval;
mod memory;
mod schema;

use async_trait::async_trait;
use serde_json::Value;

use crate::aggregation::Pipeline;
use crate::query::{FilterCondition, Projection, SortKey};

pub use errors::{StoreError, StoreResult};
pub use memory::{InMemoryStore, MemoryQuery};
pub use schema::{ElementKind, FieldKind, FieldRule, Schema};

/// Options for [`DocumentStore::find_by_id_and_update`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOptions {
    /// Return the document after the update instead of before
    pub return_new: bool,
    /// Re-check the schema on the merged document
    pub run_validators: bool,
}

impl Default for UpdateOptions {
    fn default() -> Self {
        Self {
            return_new: true,
            run_validators: true,
        }
    }
}

/// A pending query over a collection
#[async_trait]
pub trait QueryHandle: Send + Sized {
    /// Restrict to documents matching every condition
    fn filter(self, conditions: &[FilterCondition]) -> Self;

    /// Order results; ties keep store order
    fn sort(self, keys: &[SortKey]) -> Self;

    /// Choose returned fields
    fn select(self, projection: &Projection) -> Self;

    /// Skip the first `n` matches
    fn skip(self, n: usize) -> Self;

    /// Return at most `n` matches
    fn limit(self, n: usize) -> Self;

    /// Run the query
    async fn exec(self) -> StoreResult<Vec<Value>>;
}

/// A collection of JSON documents
#[async_trait]
pub trait DocumentStore: Send + Sync {
    type Query: QueryHandle;

    /// Start a query over every document
    fn find(&self) -> Self::Query;

    /// Insert a document and return it as stored
    async fn create(&self, doc: Value) -> StoreResult<Value>;

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Merge `patch` into the document. `None` if no such document.
    async fn find_by_id_and_update(
        &self,
        id: &str,
        patch: Value,
        options: UpdateOptions,
    ) -> StoreResult<Option<Value>>;

    /// Remove a document and return it. `None` if no such document.
    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<Value>>;

    /// Evaluate an aggregation pipeline over the collection
    async fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Value>>;

    async fn count(&self) -> StoreResult<usize>;
}
