//! # Tour Routes
//!
//! Axum wiring for [`TourHandler`]. Mounted under `/api/v1/tours`.

use std::sync::Arc;

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::Value;

use super::errors::{ApiError, ApiResult};
use super::handler::TourHandler;
use super::response::Envelope;
use crate::query::RawQuery;
use crate::store::DocumentStore;

/// Mount point of the tours API
pub const TOURS_PATH: &str = "/api/v1/tours";

type HandlerState<S> = State<Arc<TourHandler<S>>>;
type Pairs = Result<Query<Vec<(String, String)>>, QueryRejection>;
type Body = Result<Json<Value>, JsonRejection>;

/// Build the tours router
pub fn tour_routes<S: DocumentStore + 'static>(handler: Arc<TourHandler<S>>) -> Router {
    Router::new()
        .route("/", get(list_tours::<S>).post(create_tour::<S>))
        .route("/top-5-cheap", get(top_tours::<S>))
        .route("/tour-stats", get(tour_stats::<S>))
        .route("/monthly-plan/:year", get(monthly_plan::<S>))
        .route(
            "/:id",
            get(get_tour::<S>)
                .patch(update_tour::<S>)
                .delete(delete_tour::<S>),
        )
        .with_state(handler)
}

/// Fallback for paths no route matched
pub async fn route_not_found(OriginalUri(uri): OriginalUri) -> ApiError {
    ApiError::RouteNotFound(uri.path().to_string())
}

fn raw_query(pairs: Pairs) -> ApiResult<RawQuery> {
    let Query(pairs) = pairs.map_err(|rejection| ApiError::InvalidParam(rejection.body_text()))?;
    Ok(RawQuery::from_pairs(pairs))
}

fn json_body(body: Body) -> ApiResult<Value> {
    let Json(value) = body.map_err(|rejection| ApiError::InvalidInput(rejection.body_text()))?;
    Ok(value)
}

async fn list_tours<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    pairs: Pairs,
) -> ApiResult<Json<Envelope>> {
    let raw = raw_query(pairs)?;
    Ok(Json(handler.list(&raw).await?))
}

async fn top_tours<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    pairs: Pairs,
) -> ApiResult<Json<Envelope>> {
    let raw = raw_query(pairs)?;
    Ok(Json(handler.top_tours(raw).await?))
}

async fn tour_stats<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
) -> ApiResult<Json<Envelope>> {
    Ok(Json(handler.stats().await?))
}

async fn monthly_plan<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    Path(year): Path<String>,
) -> ApiResult<Json<Envelope>> {
    Ok(Json(handler.monthly_plan(&year).await?))
}

async fn get_tour<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    Path(id): Path<String>,
) -> ApiResult<Json<Envelope>> {
    Ok(Json(handler.get_one(&id).await?))
}

async fn create_tour<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    body: Body,
) -> ApiResult<(StatusCode, Json<Envelope>)> {
    let body = json_body(body)?;
    Ok((StatusCode::CREATED, Json(handler.create(body).await?)))
}

async fn update_tour<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    Path(id): Path<String>,
    body: Body,
) -> ApiResult<Json<Envelope>> {
    let patch = json_body(body)?;
    Ok(Json(handler.update(&id, patch).await?))
}

async fn delete_tour<S: DocumentStore + 'static>(
    State(handler): HandlerState<S>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    handler.delete(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
