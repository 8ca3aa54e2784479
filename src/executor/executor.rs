//! Query executor
//!
//! Applies a query descriptor to a store query and materializes the result.
//!
//! Application order (fixed):
//! 1. Filter conditions
//! 2. Sort order (if any keys)
//! 3. Projection (unless `All`)
//! 4. Page window (if present)

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::query::{Projection, QueryDescriptor};
use crate::store::{DocumentStore, QueryHandle, StoreResult};

/// Runs descriptors against a shared store
pub struct QueryExecutor<S: DocumentStore> {
    store: Arc<S>,
}

impl<S: DocumentStore> Clone for QueryExecutor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: DocumentStore> QueryExecutor<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Executes a descriptor and returns the matching documents.
    ///
    /// Store errors are returned unchanged.
    pub async fn execute(&self, descriptor: &QueryDescriptor) -> StoreResult<Vec<Value>> {
        let mut query = self.store.find().filter(&descriptor.conditions);

        if !descriptor.sort.is_empty() {
            query = query.sort(&descriptor.sort);
        }
        if descriptor.projection != Projection::All {
            query = query.select(&descriptor.projection);
        }
        if let Some(window) = descriptor.window {
            query = query.skip(window.skip()).limit(window.limit);
        }

        let documents = query.exec().await?;

        debug!(
            conditions = descriptor.conditions.len(),
            sort_keys = descriptor.sort.len(),
            results = documents.len(),
            "Query executed"
        );

        Ok(documents)
    }
}
