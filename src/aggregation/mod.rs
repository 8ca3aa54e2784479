//! # Aggregation
//!
//! Pipelines expressed as data, their evaluation, and the fixed recipes
//! behind the statistics endpoints.

mod eval;
mod pipeline;
mod recipes;

pub use eval::{evaluate, run};
pub use pipeline::{Accumulator, Expr, GroupStage, Pipeline, Stage};
pub use recipes::{grouped_stats, monthly_plan, PlanBoundary, MAX_PLAN_ROWS, TOP_RATING_THRESHOLD};
