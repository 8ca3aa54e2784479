//! # Tour Handlers
//!
//! Request-level operations over the tour collection. Each returns a
//! response envelope or an [`ApiError`]; HTTP wiring lives in
//! [`super::routes`].

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::errors::{ApiError, ApiResult};
use super::model::{TOP_TOURS_FIELDS, TOP_TOURS_LIMIT, TOP_TOURS_SORT};
use super::response::Envelope;
use crate::aggregation::{grouped_stats, monthly_plan, PlanBoundary};
use crate::executor::QueryExecutor;
use crate::query::{FeatureOptions, QueryFeatures, RawQuery};
use crate::store::{DocumentStore, UpdateOptions};

/// Accepted range for the monthly plan year
pub const MIN_PLAN_YEAR: i32 = 1;
pub const MAX_PLAN_YEAR: i32 = 9998;

/// Inject the top-tours parameters, overriding any the client sent
pub fn alias_top_tours(raw: &mut RawQuery) {
    raw.set("limit", TOP_TOURS_LIMIT);
    raw.set("sort", TOP_TOURS_SORT);
    raw.set("fields", TOP_TOURS_FIELDS);
}

/// Parse the `:year` path segment
pub fn parse_year(value: &str) -> ApiResult<i32> {
    value
        .trim()
        .parse::<i32>()
        .ok()
        .filter(|year| (MIN_PLAN_YEAR..=MAX_PLAN_YEAR).contains(year))
        .ok_or_else(|| {
            ApiError::InvalidParam(format!(
                "Invalid year: {} (expected {}-{})",
                value, MIN_PLAN_YEAR, MAX_PLAN_YEAR
            ))
        })
}

/// Tour operations over a shared store
pub struct TourHandler<S: DocumentStore> {
    store: Arc<S>,
    executor: QueryExecutor<S>,
    options: FeatureOptions,
    plan_boundary: PlanBoundary,
}

impl<S: DocumentStore> TourHandler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self::with_options(store, FeatureOptions::default(), PlanBoundary::default())
    }

    pub fn with_options(store: Arc<S>, options: FeatureOptions, plan_boundary: PlanBoundary) -> Self {
        Self {
            executor: QueryExecutor::new(Arc::clone(&store)),
            store,
            options,
            plan_boundary,
        }
    }

    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Filtered, sorted, projected, paginated list
    pub async fn list(&self, raw: &RawQuery) -> ApiResult<Envelope> {
        let descriptor = QueryFeatures::standard(raw, self.options)?;
        let tours = self.executor.execute(&descriptor).await?;
        Ok(Envelope::list("tours", tours))
    }

    /// Five best rated tours, cheapest first among equals
    pub async fn top_tours(&self, mut raw: RawQuery) -> ApiResult<Envelope> {
        alias_top_tours(&mut raw);
        self.list(&raw).await
    }

    pub async fn get_one(&self, id: &str) -> ApiResult<Envelope> {
        let tour = self.store.find_by_id(id).await?.ok_or(ApiError::NotFound)?;
        Ok(Envelope::single("tour", tour))
    }

    pub async fn create(&self, body: Value) -> ApiResult<Envelope> {
        let tour = self.store.create(body).await?;
        info!(id = ?tour.get("_id"), "Tour created");
        Ok(Envelope::single("tour", tour))
    }

    /// Partial update; responds with the updated document
    pub async fn update(&self, id: &str, patch: Value) -> ApiResult<Envelope> {
        let options = UpdateOptions {
            return_new: true,
            run_validators: true,
        };
        let tour = self
            .store
            .find_by_id_and_update(id, patch, options)
            .await?
            .ok_or(ApiError::NotFound)?;
        Ok(Envelope::single("tour", tour))
    }

    pub async fn delete(&self, id: &str) -> ApiResult<()> {
        self.store
            .find_by_id_and_delete(id)
            .await?
            .ok_or(ApiError::NotFound)?;
        info!(id, "Tour deleted");
        Ok(())
    }

    /// Per-difficulty statistics for highly rated tours
    pub async fn stats(&self) -> ApiResult<Envelope> {
        let stats = self.store.aggregate(&grouped_stats()).await?;
        Ok(Envelope::single("stats", Value::Array(stats)))
    }

    /// Tour starts per month of `year`
    pub async fn monthly_plan(&self, year: &str) -> ApiResult<Envelope> {
        let year = parse_year(year)?;
        let plan = self
            .store
            .aggregate(&monthly_plan(year, self.plan_boundary))
            .await?;
        Ok(Envelope::single("plan", Value::Array(plan)))
    }
}
