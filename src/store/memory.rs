//! In-memory document store
//!
//! Documents are kept in insertion order behind a lock. Queries snapshot the
//! matching documents under a read lock and finish the work unlocked.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value};
use tracing::debug;
use uuid::Uuid;

use super::errors::{StoreError, StoreResult};
use super::eval::{matches_all, project, sort_documents};
use super::schema::Schema;
use super::{DocumentStore, QueryHandle, UpdateOptions};
use crate::aggregation::{self, Pipeline};
use crate::query::{FilterCondition, Projection, SortKey, CREATED_AT_FIELD, ID_FIELD, VERSION_FIELD};

type Documents = Arc<RwLock<Vec<Value>>>;

fn poisoned<T>(_: T) -> StoreError {
    StoreError::Internal("Lock poisoned".to_string())
}

/// Validate an identifier and return its canonical form
fn parse_id(id: &str) -> StoreResult<String> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| StoreError::InvalidId(id.to_string()))
}

fn id_of(doc: &Value) -> Option<&str> {
    doc.get(ID_FIELD).and_then(Value::as_str)
}

/// In-memory collection
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    documents: Documents,
    schema: Option<Schema>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store that validates every write against `schema`
    pub fn with_schema(schema: Schema) -> Self {
        Self {
            documents: Arc::new(RwLock::new(Vec::new())),
            schema: Some(schema),
        }
    }

    /// Create each document in order, stopping at the first failure
    pub async fn insert_many(&self, docs: Vec<Value>) -> StoreResult<usize> {
        let mut inserted = 0;
        for doc in docs {
            self.create(doc).await?;
            inserted += 1;
        }
        Ok(inserted)
    }

    fn prepare_new(&self, doc: Value) -> StoreResult<Map<String, Value>> {
        let mut doc = match doc {
            Value::Object(map) => map,
            _ => return Err(StoreError::Validation("Document must be a JSON object".to_string())),
        };

        let id = match doc.get(ID_FIELD) {
            None | Some(Value::Null) => Uuid::new_v4().to_string(),
            Some(Value::String(s)) => parse_id(s)?,
            Some(other) => return Err(StoreError::InvalidId(other.to_string())),
        };
        doc.insert(ID_FIELD.to_string(), Value::String(id));
        doc.insert(VERSION_FIELD.to_string(), Value::from(0));
        if !doc.get(CREATED_AT_FIELD).is_some_and(Value::is_string) {
            doc.insert(
                CREATED_AT_FIELD.to_string(),
                Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
            );
        }

        if let Some(schema) = &self.schema {
            doc = schema.prepare(doc);
            schema.validate(&doc)?;
        }
        Ok(doc)
    }

    fn merge_patch(
        &self,
        current: &Value,
        patch: Value,
        run_validators: bool,
    ) -> StoreResult<Value> {
        let patch = match patch {
            Value::Object(map) => map,
            _ => return Err(StoreError::Validation("Update must be a JSON object".to_string())),
        };

        let mut merged = match current {
            Value::Object(map) => map.clone(),
            _ => Map::new(),
        };

        for (key, value) in patch {
            if key == ID_FIELD {
                if value.as_str() != id_of(current) {
                    return Err(StoreError::Validation("_id is immutable".to_string()));
                }
                continue;
            }
            if key == VERSION_FIELD || key == CREATED_AT_FIELD {
                continue;
            }
            merged.insert(key, value);
        }

        if let Some(schema) = &self.schema {
            merged = schema.prepare(merged);
            if run_validators {
                schema.validate(&merged)?;
            }
        }
        Ok(Value::Object(merged))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    type Query = MemoryQuery;

    fn find(&self) -> MemoryQuery {
        MemoryQuery::new(Arc::clone(&self.documents))
    }

    async fn create(&self, doc: Value) -> StoreResult<Value> {
        let doc = Value::Object(self.prepare_new(doc)?);

        let mut documents = self.documents.write().map_err(poisoned)?;
        if let Some(id) = id_of(&doc) {
            if documents.iter().any(|d| id_of(d) == Some(id)) {
                return Err(StoreError::DuplicateId(id.to_string()));
            }
        }
        documents.push(doc.clone());

        debug!(id = ?id_of(&doc), "Document created");
        Ok(doc)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Value>> {
        let id = parse_id(id)?;
        let documents = self.documents.read().map_err(poisoned)?;
        Ok(documents.iter().find(|d| id_of(d) == Some(id.as_str())).cloned())
    }

    async fn find_by_id_and_update(
        &self,
        id: &str,
        patch: Value,
        options: UpdateOptions,
    ) -> StoreResult<Option<Value>> {
        let id = parse_id(id)?;
        let mut documents = self.documents.write().map_err(poisoned)?;

        let slot = match documents.iter_mut().find(|d| id_of(d) == Some(id.as_str())) {
            Some(slot) => slot,
            None => return Ok(None),
        };

        let updated = self.merge_patch(slot, patch, options.run_validators)?;
        let previous = std::mem::replace(slot, updated);

        debug!(id = %id, "Document updated");
        Ok(Some(if options.return_new { slot.clone() } else { previous }))
    }

    async fn find_by_id_and_delete(&self, id: &str) -> StoreResult<Option<Value>> {
        let id = parse_id(id)?;
        let mut documents = self.documents.write().map_err(poisoned)?;

        let removed = documents
            .iter()
            .position(|d| id_of(d) == Some(id.as_str()))
            .map(|index| documents.remove(index));

        if removed.is_some() {
            debug!(id = %id, "Document deleted");
        }
        Ok(removed)
    }

    async fn aggregate(&self, pipeline: &Pipeline) -> StoreResult<Vec<Value>> {
        let snapshot = self.documents.read().map_err(poisoned)?.clone();
        Ok(aggregation::run(snapshot, pipeline))
    }

    async fn count(&self) -> StoreResult<usize> {
        Ok(self.documents.read().map_err(poisoned)?.len())
    }
}

/// Chainable query over an [`InMemoryStore`]
#[derive(Debug)]
pub struct MemoryQuery {
    documents: Documents,
    conditions: Vec<FilterCondition>,
    sort: Vec<SortKey>,
    projection: Projection,
    skip: usize,
    limit: Option<usize>,
}

impl MemoryQuery {
    fn new(documents: Documents) -> Self {
        Self {
            documents,
            conditions: Vec::new(),
            sort: Vec::new(),
            projection: Projection::All,
            skip: 0,
            limit: None,
        }
    }
}

#[async_trait]
impl QueryHandle for MemoryQuery {
    fn filter(mut self, conditions: &[FilterCondition]) -> Self {
        self.conditions.extend_from_slice(conditions);
        self
    }

    fn sort(mut self, keys: &[SortKey]) -> Self {
        self.sort = keys.to_vec();
        self
    }

    fn select(mut self, projection: &Projection) -> Self {
        self.projection = projection.clone();
        self
    }

    fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    fn limit(mut self, n: usize) -> Self {
        self.limit = Some(n);
        self
    }

    async fn exec(self) -> StoreResult<Vec<Value>> {
        let mut matched: Vec<Value> = {
            let documents = self.documents.read().map_err(poisoned)?;
            documents
                .iter()
                .filter(|doc| matches_all(doc, &self.conditions))
                .cloned()
                .collect()
        };

        sort_documents(&mut matched, &self.sort);

        let window = matched.into_iter().skip(self.skip);
        let page: Vec<Value> = match self.limit {
            Some(limit) => window.take(limit).collect(),
            None => window.collect(),
        };

        Ok(page
            .into_iter()
            .map(|doc| project(doc, &self.projection))
            .collect())
    }
}
