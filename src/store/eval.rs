//! Document evaluation helpers
//!
//! Field lookup, value comparison, condition matching, sorting and projection
//! over plain JSON documents. Shared by the in-memory query and the
//! aggregation stages.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::{Map, Value};

use crate::query::{CmpOp, FilterCondition, Projection, SortDirection, SortKey};

/// Look up a field, following dotted paths into sub-documents
pub fn get_field<'a>(doc: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// Parse a date string (RFC 3339, `YYYY-MM-DDTHH:MM:SS` or `YYYY-MM-DD`)
pub fn parse_date(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(Utc.from_utc_datetime(&naive));
    }
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

/// Parse a JSON value as a date
pub fn value_as_date(value: &Value) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_date)
}

/// Total order for sorting.
///
/// Missing < null < bool < number < date string < other string < array <
/// object. Date strings compare chronologically, other strings by text.
pub fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a_val), Some(b_val)) => {
            let a_type = type_rank(a_val);
            let b_type = type_rank(b_val);

            if a_type != b_type {
                return a_type.cmp(&b_type);
            }

            compare_present(a_val, b_val).unwrap_or(Ordering::Equal)
        }
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(s) if parse_date(s).is_some() => 3,
        Value::String(_) => 4,
        Value::Array(_) => 5,
        Value::Object(_) => 6,
    }
}

/// Compare two values of the same kind. `None` when they are not comparable.
pub fn compare_present(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Null, Value::Null) => Some(Ordering::Equal),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        (Value::Number(a), Value::Number(b)) => {
            if let (Some(a), Some(b)) = (a.as_i64(), b.as_i64()) {
                return Some(a.cmp(&b));
            }
            a.as_f64()?.partial_cmp(&b.as_f64()?)
        }
        (Value::String(a), Value::String(b)) => match (parse_date(a), parse_date(b)) {
            (Some(a_date), Some(b_date)) => Some(a_date.cmp(&b_date)),
            _ => Some(a.cmp(b)),
        },
        _ => None,
    }
}

/// Equality as the query layer sees it: numbers by value, dates by instant
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(_), Value::Number(_)) | (Value::String(_), Value::String(_)) => {
            compare_present(a, b) == Some(Ordering::Equal)
        }
        _ => a == b,
    }
}

/// Check a single condition against a document.
///
/// An array field matches when any of its elements matches.
pub fn matches_condition(doc: &Value, condition: &FilterCondition) -> bool {
    let field_value = get_field(doc, &condition.field);

    match condition.op {
        CmpOp::Ne => !field_value.is_some_and(|v| element_matches(v, CmpOp::Eq, &condition.value)),
        op => field_value.is_some_and(|v| element_matches(v, op, &condition.value)),
    }
}

fn element_matches(field_value: &Value, op: CmpOp, target: &Value) -> bool {
    if let Value::Array(items) = field_value {
        if op != CmpOp::Eq || !target.is_array() {
            return items.iter().any(|item| scalar_matches(item, op, target));
        }
    }
    scalar_matches(field_value, op, target)
}

fn scalar_matches(value: &Value, op: CmpOp, target: &Value) -> bool {
    match op {
        CmpOp::Eq => values_equal(value, target),
        CmpOp::Ne => !values_equal(value, target),
        CmpOp::In => target
            .as_array()
            .is_some_and(|candidates| candidates.iter().any(|c| values_equal(value, c))),
        CmpOp::Gt => compare_present(value, target) == Some(Ordering::Greater),
        CmpOp::Gte => matches!(
            compare_present(value, target),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CmpOp::Lt => compare_present(value, target) == Some(Ordering::Less),
        CmpOp::Lte => matches!(
            compare_present(value, target),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

/// All conditions hold (AND)
pub fn matches_all(doc: &Value, conditions: &[FilterCondition]) -> bool {
    conditions.iter().all(|c| matches_condition(doc, c))
}

/// Stable multi-key sort. Ties keep their existing order.
pub fn sort_documents(documents: &mut [Value], keys: &[SortKey]) {
    if keys.is_empty() {
        return;
    }

    documents.sort_by(|a, b| {
        for key in keys {
            let ordering = compare_values(get_field(a, &key.field), get_field(b, &key.field));
            let ordering = match key.direction {
                SortDirection::Asc => ordering,
                SortDirection::Desc => ordering.reverse(),
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    });
}

/// Apply a projection to the top-level fields of a document
pub fn project(doc: Value, projection: &Projection) -> Value {
    if matches!(projection, Projection::All) {
        return doc;
    }

    match doc {
        Value::Object(map) => {
            let kept: Map<String, Value> = map
                .into_iter()
                .filter(|(key, _)| projection.retains(key))
                .collect();
            Value::Object(kept)
        }
        other => other,
    }
}
