//! # Aggregation Recipes
//!
//! The two fixed statistics pipelines served by the tours API.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::pipeline::{Accumulator, Expr, GroupStage, Pipeline};
use crate::query::{FilterCondition, SortKey, ID_FIELD};

/// Minimum average rating counted by [`grouped_stats`]
pub const TOP_RATING_THRESHOLD: f64 = 4.5;

/// Maximum rows returned by [`monthly_plan`]
pub const MAX_PLAN_ROWS: usize = 12;

/// Date window used by [`monthly_plan`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanBoundary {
    /// `[year-01-01, (year+1)-01-01)`
    #[default]
    CalendarYear,
    /// `[year-01-01, year-12-01]` inclusive. Starts after December 1st are
    /// not counted.
    Legacy,
}

/// Per-difficulty statistics over highly rated tours, cheapest average first
pub fn grouped_stats() -> Pipeline {
    Pipeline::new()
        .matching(vec![FilterCondition::gte(
            "ratingsAverage",
            json!(TOP_RATING_THRESHOLD),
        )])
        .group(
            GroupStage::by(Expr::to_upper(Expr::field("difficulty")))
                .with("num", Accumulator::count())
                .with("numRatings", Accumulator::Sum(Expr::field("ratingsQuantity")))
                .with("avgRating", Accumulator::Avg(Expr::field("ratingsAverage")))
                .with("avgPrice", Accumulator::Avg(Expr::field("price")))
                .with("minPrice", Accumulator::Min(Expr::field("price")))
                .with("maxPrice", Accumulator::Max(Expr::field("price"))),
        )
        .sort(vec![SortKey::asc("avgPrice")])
}

/// Tour starts per month of `year`, busiest month first
pub fn monthly_plan(year: i32, boundary: PlanBoundary) -> Pipeline {
    let start = FilterCondition::gte("startDates", date_value(year, 1, 1));
    let end = match boundary {
        PlanBoundary::CalendarYear => FilterCondition::lt("startDates", date_value(year + 1, 1, 1)),
        PlanBoundary::Legacy => FilterCondition::lte("startDates", date_value(year, 12, 1)),
    };

    Pipeline::new()
        .unwind("startDates")
        .matching(vec![start, end])
        .group(
            GroupStage::by(Expr::month(Expr::field("startDates")))
                .with("numTourStarts", Accumulator::count())
                .with("tours", Accumulator::Push(Expr::field("name"))),
        )
        .add_field("month", Expr::field(ID_FIELD))
        .project_out(&[ID_FIELD])
        .sort(vec![SortKey::desc("numTourStarts")])
        .limit(MAX_PLAN_ROWS)
}

fn date_value(year: i32, month: u32, day: u32) -> Value {
    Value::String(format!("{:04}-{:02}-{:02}", year, month, day))
}
