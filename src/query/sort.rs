//! # Sort Specification
//!
//! `sort=-price,name` → price descending, then name ascending.

use serde::{Deserialize, Serialize};

/// Creation timestamp field set by the store
pub const CREATED_AT_FIELD: &str = "createdAt";

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    /// Field to sort by
    pub field: String,
    /// Sort direction
    pub direction: SortDirection,
}

impl SortKey {
    pub fn asc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Asc,
        }
    }

    pub fn desc(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: SortDirection::Desc,
        }
    }
}

/// Ordered sort keys; the first is the primary key
pub type SortSpec = Vec<SortKey>;

/// Newest first
pub fn default_sort() -> SortSpec {
    vec![SortKey::desc(CREATED_AT_FIELD)]
}

/// Parse a comma-separated sort list.
///
/// Empty entries and a bare `-` are skipped.
pub fn parse_sort(value: &str) -> SortSpec {
    value
        .split(',')
        .map(str::trim)
        .filter_map(|part| match part.strip_prefix('-') {
            Some(field) => {
                let field = field.trim();
                (!field.is_empty()).then(|| SortKey::desc(field))
            }
            None => (!part.is_empty()).then(|| SortKey::asc(part)),
        })
        .collect()
}
