//! # Pipeline Definitions
//!
//! Aggregation pipelines are plain data: an ordered list of stages, each
//! with fixed parameters. Evaluation lives in [`super::eval`].

use serde::Serialize;
use serde_json::Value;

use crate::query::{FilterCondition, SortKey};

/// Value expression evaluated against one document
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Expr {
    /// Field value (dotted path)
    Field(String),
    /// Constant
    Literal(Value),
    /// Upper-cased string; non-strings become ""
    ToUpper(Box<Expr>),
    /// Calendar month (1-12) of a date value
    Month(Box<Expr>),
}

impl Expr {
    pub fn field(path: impl Into<String>) -> Self {
        Expr::Field(path.into())
    }

    pub fn to_upper(inner: Expr) -> Self {
        Expr::ToUpper(Box::new(inner))
    }

    pub fn month(inner: Expr) -> Self {
        Expr::Month(Box::new(inner))
    }
}

/// Per-group accumulator
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Accumulator {
    Sum(Expr),
    Avg(Expr),
    Min(Expr),
    Max(Expr),
    /// Collect every value in group order
    Push(Expr),
}

impl Accumulator {
    /// Number of documents in the group
    pub fn count() -> Self {
        Accumulator::Sum(Expr::Literal(Value::from(1)))
    }
}

/// Grouping key plus named accumulators
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStage {
    pub key: Expr,
    pub fields: Vec<(String, Accumulator)>,
}

impl GroupStage {
    pub fn by(key: Expr) -> Self {
        Self {
            key,
            fields: Vec::new(),
        }
    }

    pub fn with(mut self, name: impl Into<String>, accumulator: Accumulator) -> Self {
        self.fields.push((name.into(), accumulator));
        self
    }
}

/// A single pipeline stage
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Stage {
    Match(Vec<FilterCondition>),
    /// One output document per element of an array field
    Unwind(String),
    Group(GroupStage),
    AddFields(Vec<(String, Expr)>),
    /// Remove the listed fields
    Project(Vec<String>),
    Sort(Vec<SortKey>),
    Limit(usize),
}

impl Stage {
    pub fn name(&self) -> &'static str {
        match self {
            Stage::Match(_) => "match",
            Stage::Unwind(_) => "unwind",
            Stage::Group(_) => "group",
            Stage::AddFields(_) => "addFields",
            Stage::Project(_) => "project",
            Stage::Sort(_) => "sort",
            Stage::Limit(_) => "limit",
        }
    }
}

/// Ordered list of stages
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn stage(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    pub fn matching(self, conditions: Vec<FilterCondition>) -> Self {
        self.stage(Stage::Match(conditions))
    }

    pub fn unwind(self, field: impl Into<String>) -> Self {
        self.stage(Stage::Unwind(field.into()))
    }

    pub fn group(self, group: GroupStage) -> Self {
        self.stage(Stage::Group(group))
    }

    pub fn add_field(self, name: impl Into<String>, expr: Expr) -> Self {
        self.stage(Stage::AddFields(vec![(name.into(), expr)]))
    }

    pub fn project_out(self, fields: &[&str]) -> Self {
        self.stage(Stage::Project(fields.iter().map(|f| f.to_string()).collect()))
    }

    pub fn sort(self, keys: Vec<SortKey>) -> Self {
        self.stage(Stage::Sort(keys))
    }

    pub fn limit(self, n: usize) -> Self {
        self.stage(Stage::Limit(n))
    }

    /// Stage names in order
    pub fn describe(&self) -> Vec<&'static str> {
        self.stages.iter().map(Stage::name).collect()
    }
}
