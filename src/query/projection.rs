//! # Field Projection
//!
//! `fields=name,price` keeps only those fields plus the identifier. Without
//! `fields`, internal bookkeeping fields are hidden.

use serde::{Deserialize, Serialize};

/// Document identifier field
pub const ID_FIELD: &str = "_id";

/// Schema-version marker maintained by the store
pub const VERSION_FIELD: &str = "__v";

/// Fields hidden from API consumers by default
pub const INTERNAL_FIELDS: [&str; 1] = [VERSION_FIELD];

/// Which fields of a document are returned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "fields", rename_all = "lowercase")]
pub enum Projection {
    /// Every field
    All,
    /// Only these fields
    Include(Vec<String>),
    /// Every field except these
    Exclude(Vec<String>),
}

impl Projection {
    /// Inclusion list from a comma-separated value. `None` when no field
    /// names remain after trimming.
    pub fn parse_fields(value: &str) -> Option<Self> {
        let mut fields: Vec<String> = Vec::new();
        for field in value.split(',').map(str::trim).filter(|f| !f.is_empty()) {
            if !fields.iter().any(|f| f == field) {
                fields.push(field.to_string());
            }
        }

        if fields.is_empty() {
            return None;
        }
        if !fields.iter().any(|f| f == ID_FIELD) {
            fields.push(ID_FIELD.to_string());
        }
        Some(Projection::Include(fields))
    }

    /// Everything except [`INTERNAL_FIELDS`]
    pub fn hide_internal() -> Self {
        Projection::Exclude(INTERNAL_FIELDS.iter().map(|f| f.to_string()).collect())
    }

    /// Check if a top-level field survives this projection
    pub fn retains(&self, field: &str) -> bool {
        match self {
            Projection::All => true,
            Projection::Include(fields) => fields.iter().any(|f| f == field),
            Projection::Exclude(fields) => !fields.iter().any(|f| f == field),
        }
    }
}

impl Default for Projection {
    fn default() -> Self {
        Projection::All
    }
}
