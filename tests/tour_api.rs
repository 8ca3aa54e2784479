//! Tours API End-to-End Tests
//!
//! Drives the full router (health, tours, fallback) with in-process requests:
//! - Response envelopes and status codes
//! - Query-string translation through the HTTP layer
//! - Error mapping for client and not-found failures

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;
use tourapi::http_server::{HttpServer, HttpServerConfig};
use tourapi::store::InMemoryStore;
use tourapi::tours::{tour_store, TourHandler};

// =============================================================================
// Helper Functions
// =============================================================================

async fn seeded_app() -> Router {
    let store = Arc::new(tour_store());
    store
        .insert_many(vec![
            json!({"name": "The Forest Hiker", "price": 397, "ratingsAverage": 4.7, "difficulty": "easy",
                   "duration": 5, "createdAt": "2024-01-01T00:00:00.000Z",
                   "startDates": ["2024-04-25T09:00:00.000Z", "2024-07-20T09:00:00.000Z"]}),
            json!({"name": "The Sea Explorer", "price": 497, "ratingsAverage": 4.8, "difficulty": "medium",
                   "duration": 7, "createdAt": "2024-01-02T00:00:00.000Z",
                   "startDates": ["2024-06-19T09:00:00.000Z"]}),
            json!({"name": "The Snow Adventurer", "price": 997, "ratingsAverage": 4.5, "difficulty": "difficult",
                   "duration": 4, "createdAt": "2024-01-03T00:00:00.000Z",
                   "startDates": ["2025-01-05T10:00:00.000Z"]}),
            json!({"name": "The City Wanderer", "price": 1197, "ratingsAverage": 4.2, "difficulty": "easy",
                   "duration": 9, "createdAt": "2024-01-04T00:00:00.000Z"}),
        ])
        .await
        .unwrap();
    app_for(store)
}

fn app_for(store: Arc<InMemoryStore>) -> Router {
    let handler = Arc::new(TourHandler::new(store));
    HttpServer::new(HttpServerConfig::default(), handler).router()
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = match body {
        Some(body) => Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

fn names(body: &Value) -> Vec<String> {
    body["data"]["tours"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Listing
// =============================================================================

/// Default listing is newest first and hides the version key.
#[tokio::test]
async fn test_list_default() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["results"], 4);
    assert_eq!(
        names(&body),
        vec!["The City Wanderer", "The Snow Adventurer", "The Sea Explorer", "The Forest Hiker"]
    );
    assert!(body["data"]["tours"][0].get("__v").is_none());
    assert!(body["data"]["tours"][0].get("_id").is_some());
}

/// Filter, sort, field selection and pagination combine.
#[tokio::test]
async fn test_list_with_features() {
    let app = seeded_app().await;
    let (status, body) = get(
        &app,
        "/api/v1/tours?price[gte]=400&sort=price&fields=name,price&page=1&limit=2",
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 2);
    assert_eq!(names(&body), vec!["The Sea Explorer", "The Snow Adventurer"]);

    let first = body["data"]["tours"][0].as_object().unwrap();
    let mut keys: Vec<&str> = first.keys().map(String::as_str).collect();
    keys.sort();
    assert_eq!(keys, vec!["_id", "name", "price"]);
}

/// Equality filters coerce numeric strings.
#[tokio::test]
async fn test_list_equality_filter() {
    let app = seeded_app().await;
    let (_, body) = get(&app, "/api/v1/tours?difficulty=easy&duration=5").await;
    assert_eq!(names(&body), vec!["The Forest Hiker"]);
}

/// A page past the end is an empty success.
#[tokio::test]
async fn test_list_page_past_end() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours?page=9&limit=2").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 0);
    assert_eq!(body["data"]["tours"], json!([]));
}

/// The alias ignores caller-supplied sort and limit.
#[tokio::test]
async fn test_top_five_cheap() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours/top-5-cheap?sort=price&limit=1").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["results"], 4);
    assert_eq!(
        names(&body),
        vec!["The Sea Explorer", "The Forest Hiker", "The Snow Adventurer", "The City Wanderer"]
    );
    assert!(body["data"]["tours"][0].get("duration").is_none());
}

/// Unknown operators fail the request.
#[tokio::test]
async fn test_unknown_operator_is_bad_request() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours?price[regex]=4").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

/// Limits above the ceiling are rejected.
#[tokio::test]
async fn test_limit_ceiling() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours?limit=5000").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

// =============================================================================
// Single Resource
// =============================================================================

/// Create, read, update and delete one tour.
#[tokio::test]
async fn test_crud_lifecycle() {
    let app = app_for(Arc::new(tour_store()));

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/tours",
        Some(json!({"name": "The Park Camper", "price": 1497})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "success");
    assert!(body.get("results").is_none());
    let tour = &body["data"]["tour"];
    assert_eq!(tour["ratingsAverage"], json!(4.5));
    let id = tour["_id"].as_str().unwrap().to_string();

    let uri = format!("/api/v1/tours/{}", id);
    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tour"]["name"], "The Park Camper");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"price": 997}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["tour"]["price"], json!(997));
    assert_eq!(body["data"]["tour"]["name"], "The Park Camper");

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, Value::Null);

    let (status, body) = get(&app, &uri).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "No tour found with that ID");
}

/// Schema violations are client errors.
#[tokio::test]
async fn test_create_invalid_body() {
    let app = app_for(Arc::new(tour_store()));
    let (status, body) = send(&app, Method::POST, "/api/v1/tours", Some(json!({"price": "cheap"}))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
    let message = body["message"].as_str().unwrap();
    assert!(message.starts_with("Invalid input data."), "{}", message);
    assert!(message.contains("name is required"), "{}", message);
}

/// Updates are validated too.
#[tokio::test]
async fn test_update_invalid_patch() {
    let app = seeded_app().await;
    let (_, list) = get(&app, "/api/v1/tours?limit=1").await;
    let id = list["data"]["tours"][0]["_id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tours/{}", id),
        Some(json!({"difficulty": "extreme"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

/// Malformed identifiers are 400, well-formed unknown ones are 404.
#[tokio::test]
async fn test_identifier_errors() {
    let app = seeded_app().await;

    let (status, body) = get(&app, "/api/v1/tours/not-an-id").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");

    let (status, _) = get(&app, "/api/v1/tours/6c1f6f2e-8a52-4a39-9d3c-2f0f2b0a9e11").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/api/v1/tours/6c1f6f2e-8a52-4a39-9d3c-2f0f2b0a9e11",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Statistics
// =============================================================================

/// Tours rated below 4.5 are left out of the stats.
#[tokio::test]
async fn test_tour_stats() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours/tour-stats").await;

    assert_eq!(status, StatusCode::OK);
    let stats = body["data"]["stats"].as_array().unwrap();
    let keys: Vec<&str> = stats.iter().map(|s| s["_id"].as_str().unwrap()).collect();
    assert_eq!(keys, vec!["EASY", "MEDIUM", "DIFFICULT"]);
    assert_eq!(stats[0]["num"], 1);
}

/// Monthly plan for 2024 with the busiest month first.
#[tokio::test]
async fn test_monthly_plan() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours/monthly-plan/2024").await;

    assert_eq!(status, StatusCode::OK);
    let plan = body["data"]["plan"].as_array().unwrap();
    assert_eq!(plan.len(), 3);
    let months: Vec<u64> = plan.iter().map(|r| r["month"].as_u64().unwrap()).collect();
    assert_eq!(months, vec![4, 7, 6]);
    assert_eq!(plan[0]["tours"], json!(["The Forest Hiker"]));
}

/// Non-numeric years are rejected.
#[tokio::test]
async fn test_monthly_plan_bad_year() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v1/tours/monthly-plan/soon").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], "fail");
}

// =============================================================================
// Surrounding Routes
// =============================================================================

/// Unknown paths name the requested URL.
#[tokio::test]
async fn test_unknown_route() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/api/v2/x").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], "fail");
    assert_eq!(body["message"], "Can't find /api/v2/x on this server!");
}

#[tokio::test]
async fn test_health() {
    let app = seeded_app().await;
    let (status, body) = get(&app, "/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
}

/// Only configured origins are echoed back.
#[tokio::test]
async fn test_cors_origin_list() {
    let config = HttpServerConfig {
        cors_origins: vec!["http://localhost:5173".to_string()],
        ..Default::default()
    };
    let handler = Arc::new(TourHandler::new(Arc::new(tour_store())));
    let app = HttpServer::new(config, handler).router();

    for (origin, allowed) in [("http://localhost:5173", true), ("http://evil.test", false)] {
        let request = Request::builder()
            .uri("/health")
            .header(header::ORIGIN, origin)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        let echoed = response.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN);
        assert_eq!(echoed.is_some(), allowed, "{}", origin);
    }
}
