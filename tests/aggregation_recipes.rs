//! Aggregation Recipe Tests
//!
//! Grouped statistics and the monthly plan, evaluated by the in-memory store.

use std::sync::Arc;

use serde_json::{json, Value};
use tourapi::aggregation::{grouped_stats, monthly_plan, PlanBoundary};
use tourapi::store::{DocumentStore, InMemoryStore};

// =============================================================================
// Helper Functions
// =============================================================================

async fn store_with(docs: Vec<Value>) -> Arc<InMemoryStore> {
    let store = Arc::new(InMemoryStore::new());
    store.insert_many(docs).await.unwrap();
    store
}

// =============================================================================
// Grouped Stats
// =============================================================================

/// Only tours rated 4.5 and up are counted, grouped by upper-cased difficulty.
#[tokio::test]
async fn test_grouped_stats_threshold() {
    let store = store_with(vec![
        json!({"name": "a", "ratingsAverage": 4.0, "difficulty": "easy", "price": 100, "ratingsQuantity": 3}),
        json!({"name": "b", "ratingsAverage": 4.6, "difficulty": "easy", "price": 200, "ratingsQuantity": 5}),
        json!({"name": "c", "ratingsAverage": 4.8, "difficulty": "hard", "price": 300, "ratingsQuantity": 7}),
    ])
    .await;

    let stats = store.aggregate(&grouped_stats()).await.unwrap();

    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0]["_id"], json!("EASY"));
    assert_eq!(stats[0]["num"], json!(1));
    assert_eq!(stats[0]["numRatings"], json!(5));
    assert_eq!(stats[0]["avgRating"], json!(4.6));
    assert_eq!(stats[0]["avgPrice"], json!(200.0));
    assert_eq!(stats[0]["minPrice"], json!(200));
    assert_eq!(stats[0]["maxPrice"], json!(200));
    assert_eq!(stats[1]["_id"], json!("HARD"));
    assert_eq!(stats[1]["num"], json!(1));
}

/// Groups are ordered by average price, cheapest first.
#[tokio::test]
async fn test_grouped_stats_sorted_by_avg_price() {
    let store = store_with(vec![
        json!({"ratingsAverage": 4.9, "difficulty": "difficult", "price": 900}),
        json!({"ratingsAverage": 4.9, "difficulty": "medium", "price": 500}),
        json!({"ratingsAverage": 4.9, "difficulty": "easy", "price": 100}),
        json!({"ratingsAverage": 4.9, "difficulty": "easy", "price": 300}),
    ])
    .await;

    let stats = store.aggregate(&grouped_stats()).await.unwrap();
    let keys: Vec<&str> = stats.iter().map(|s| s["_id"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["EASY", "MEDIUM", "DIFFICULT"]);
    assert_eq!(stats[0]["num"], json!(2));
}

// =============================================================================
// Monthly Plan
// =============================================================================

/// One tour starting in March and July gives two single-start months,
/// in first-seen order.
#[tokio::test]
async fn test_monthly_plan_two_months() {
    let store = store_with(vec![json!({
        "name": "The Forest Hiker",
        "startDates": ["2024-03-15T09:00:00.000Z", "2024-07-01T09:00:00.000Z"]
    })])
    .await;

    let plan = store
        .aggregate(&monthly_plan(2024, PlanBoundary::CalendarYear))
        .await
        .unwrap();

    assert_eq!(
        plan,
        vec![
            json!({"numTourStarts": 1, "tours": ["The Forest Hiker"], "month": 3}),
            json!({"numTourStarts": 1, "tours": ["The Forest Hiker"], "month": 7}),
        ]
    );
}

/// Busiest month first; other years are excluded.
#[tokio::test]
async fn test_monthly_plan_ordering_and_year_filter() {
    let store = store_with(vec![
        json!({"name": "a", "startDates": ["2024-06-01", "2023-06-01"]}),
        json!({"name": "b", "startDates": ["2024-08-10", "2024-06-20"]}),
        json!({"name": "c", "startDates": ["2025-01-01"]}),
    ])
    .await;

    let plan = store
        .aggregate(&monthly_plan(2024, PlanBoundary::CalendarYear))
        .await
        .unwrap();

    assert_eq!(plan.len(), 2);
    assert_eq!(plan[0]["month"], json!(6));
    assert_eq!(plan[0]["numTourStarts"], json!(2));
    assert_eq!(plan[0]["tours"], json!(["a", "b"]));
    assert_eq!(plan[1]["month"], json!(8));
    assert!(plan.iter().all(|row| row.get("_id").is_none()));
}

/// December starts after the 1st count only with the calendar-year window.
#[tokio::test]
async fn test_monthly_plan_december_boundary() {
    let store = store_with(vec![json!({
        "name": "Winter",
        "startDates": ["2024-12-01T00:00:00.000Z", "2024-12-20T09:00:00.000Z"]
    })])
    .await;

    let calendar = store
        .aggregate(&monthly_plan(2024, PlanBoundary::CalendarYear))
        .await
        .unwrap();
    assert_eq!(calendar[0]["numTourStarts"], json!(2));

    let legacy = store
        .aggregate(&monthly_plan(2024, PlanBoundary::Legacy))
        .await
        .unwrap();
    assert_eq!(legacy[0]["numTourStarts"], json!(1));
}

/// Tours without start dates contribute nothing.
#[tokio::test]
async fn test_monthly_plan_empty() {
    let store = store_with(vec![json!({"name": "a"}), json!({"name": "b", "startDates": []})]).await;
    let plan = store
        .aggregate(&monthly_plan(2024, PlanBoundary::default()))
        .await
        .unwrap();
    assert!(plan.is_empty());
}
