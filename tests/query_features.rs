//! Query Translation Tests
//!
//! Properties of the query-string → descriptor translation:
//! - Control parameters never become filter conditions
//! - Defaults apply when control parameters are absent
//! - Only the enumerated operator tokens are accepted
//! - Page size is bounded

use tourapi::query::{
    CmpOp, FeatureOptions, FilterCondition, OperatorPolicy, PageWindow, Projection, QueryError,
    QueryFeatures, RawQuery, SortKey,
};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn raw(pairs: &[(&str, &str)]) -> RawQuery {
    RawQuery::from_pairs(pairs.iter().copied())
}

fn ignore_policy() -> FeatureOptions {
    FeatureOptions {
        operator_policy: OperatorPolicy::Ignore,
        ..Default::default()
    }
}

// =============================================================================
// Defaults
// =============================================================================

/// No `sort` means newest first.
#[test]
fn test_default_sort_is_newest_first() {
    let descriptor = QueryFeatures::standard(&RawQuery::new(), FeatureOptions::default()).unwrap();
    assert_eq!(descriptor.sort, vec![SortKey::desc("createdAt")]);
}

/// No `page`/`limit` means the first page of 100.
#[test]
fn test_default_window() {
    let descriptor = QueryFeatures::standard(&RawQuery::new(), FeatureOptions::default()).unwrap();
    assert_eq!(descriptor.window, Some(PageWindow::new(1, 100)));
    assert_eq!(descriptor.projection, Projection::Exclude(vec!["__v".to_string()]));
    assert!(descriptor.conditions.is_empty());
}

// =============================================================================
// Control Parameters
// =============================================================================

/// Sort keys keep their listed precedence.
#[test]
fn test_sort_list() {
    let raw = raw(&[("sort", "-price,name")]);
    let descriptor = QueryFeatures::new(&raw).sort().build();
    assert_eq!(descriptor.sort, vec![SortKey::desc("price"), SortKey::asc("name")]);
}

/// Field selection always includes the identifier.
#[test]
fn test_fields_include_identifier() {
    let raw = raw(&[("fields", "name,price")]);
    let descriptor = QueryFeatures::new(&raw).limit_fields().build();
    assert_eq!(
        descriptor.projection,
        Projection::Include(vec!["name".into(), "price".into(), "_id".into()])
    );
}

/// Page 2 of 10 skips the first 10.
#[test]
fn test_page_window() {
    let raw = raw(&[("page", "2"), ("limit", "10")]);
    let window = QueryFeatures::new(&raw).paginate().unwrap().build().window.unwrap();
    assert_eq!(window.skip(), 10);
    assert_eq!(window.limit, 10);
}

/// Control parameters never leak into the filter.
#[test]
fn test_reserved_keys_not_filtered() {
    let raw = raw(&[
        ("sort", "x"),
        ("page", "3"),
        ("limit", "7"),
        ("fields", "name"),
        ("price", "10"),
    ]);
    let descriptor = QueryFeatures::standard(&raw, FeatureOptions::default()).unwrap();
    assert_eq!(descriptor.conditions, vec![FilterCondition::eq("price", json!(10))]);
}

// =============================================================================
// Operators
// =============================================================================

/// Bracketed operators map through the fixed table with numeric coercion.
#[test]
fn test_bracketed_operator() {
    let raw = raw(&[("price[gte]", "500")]);
    let descriptor = QueryFeatures::new(&raw).filter().unwrap().build();
    assert_eq!(descriptor.conditions.len(), 1);
    assert_eq!(descriptor.conditions[0].field, "price");
    assert_eq!(descriptor.conditions[0].op, CmpOp::Gte);
    assert_eq!(descriptor.conditions[0].value, json!(500));
}

/// Unknown operators fail the query by default.
#[test]
fn test_unknown_operator_rejected() {
    let raw = raw(&[("price[xx]", "500")]);
    let err = QueryFeatures::standard(&raw, FeatureOptions::default()).unwrap_err();
    assert_eq!(
        err,
        QueryError::OperatorRejected {
            field: "price".to_string(),
            operator: "xx".to_string(),
        }
    );
}

/// Unknown operators are dropped under the ignore policy.
#[test]
fn test_unknown_operator_ignored() {
    let raw = raw(&[("price[xx]", "500")]);
    let descriptor = QueryFeatures::standard(&raw, ignore_policy()).unwrap();
    assert!(descriptor.conditions.is_empty());
}

/// Operator-like tokens with store syntax are not passed through.
#[test]
fn test_store_syntax_never_accepted() {
    for token in ["$gt", "$where", "regex", "ne", "in", "eq"] {
        let key = format!("price[{}]", token);
        let raw = RawQuery::from_pairs([(key.as_str(), "1")]);
        assert!(
            QueryFeatures::new(&raw).filter().is_err(),
            "token {} should be rejected",
            token
        );
    }
}

// =============================================================================
// Bounds
// =============================================================================

/// A limit above the ceiling is an error, not a silent clamp.
#[test]
fn test_limit_ceiling() {
    let raw = raw(&[("limit", "5000")]);
    let err = QueryFeatures::standard(&raw, FeatureOptions::default()).unwrap_err();
    assert_eq!(err, QueryError::LimitExceeded(5000, 1000));
}

/// Translation leaves the input untouched.
#[test]
fn test_translation_is_pure() {
    let raw = raw(&[("difficulty", "easy"), ("sort", "-price"), ("limit", "2")]);
    let before = raw.clone();

    let first = QueryFeatures::standard(&raw, FeatureOptions::default()).unwrap();
    let second = QueryFeatures::standard(&raw, FeatureOptions::default()).unwrap();

    assert_eq!(raw, before);
    assert_eq!(first, second);
}
