//! # Query Features
//!
//! Translates a [`RawQuery`] into a [`QueryDescriptor`].
//!
//! Each step reads only its own parameters and consumes the builder, so the
//! steps compose in any subset:
//!
//! ```ignore
//! let descriptor = QueryFeatures::new(&raw)
//!     .filter()?
//!     .sort()
//!     .limit_fields()
//!     .paginate()?
//!     .build();
//! ```
//!
//! The executor always applies the parts filter → sort → projection →
//! pagination regardless of the order the steps were called in.

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::errors::{QueryError, QueryResult};
use super::filter::{coerce_value, CmpOp, FilterCondition};
use super::page::{parse_positive, PageWindow, DEFAULT_PAGE, DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};
use super::projection::Projection;
use super::raw::{RawQuery, RawValue};
use super::sort::{default_sort, parse_sort, SortSpec};

/// What to do with an operator token outside the supported table
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperatorPolicy {
    /// Fail the whole query
    #[default]
    Reject,
    /// Drop the condition and continue
    Ignore,
}

/// Tunables for query translation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeatureOptions {
    /// Largest accepted `limit`
    pub max_page_size: usize,
    pub operator_policy: OperatorPolicy,
}

impl Default for FeatureOptions {
    fn default() -> Self {
        Self {
            max_page_size: MAX_PAGE_SIZE,
            operator_policy: OperatorPolicy::Reject,
        }
    }
}

/// The translated query, ready for execution
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryDescriptor {
    /// AND-ed conditions
    pub conditions: Vec<FilterCondition>,

    /// Empty means "not applied"
    pub sort: SortSpec,

    pub projection: Projection,

    /// `None` means "not applied"
    pub window: Option<PageWindow>,
}

impl QueryDescriptor {
    /// Descriptor that selects everything in store order
    pub fn unbounded() -> Self {
        Self {
            conditions: Vec::new(),
            sort: Vec::new(),
            projection: Projection::All,
            window: None,
        }
    }
}

impl Default for QueryDescriptor {
    fn default() -> Self {
        Self::unbounded()
    }
}

/// Step-wise builder over a borrowed [`RawQuery`]
#[derive(Debug, Clone)]
pub struct QueryFeatures<'a> {
    raw: &'a RawQuery,
    options: FeatureOptions,
    descriptor: QueryDescriptor,
}

impl<'a> QueryFeatures<'a> {
    pub fn new(raw: &'a RawQuery) -> Self {
        Self::with_options(raw, FeatureOptions::default())
    }

    pub fn with_options(raw: &'a RawQuery, options: FeatureOptions) -> Self {
        Self {
            raw,
            options,
            descriptor: QueryDescriptor::unbounded(),
        }
    }

    /// Run all four steps in canonical order
    pub fn standard(raw: &'a RawQuery, options: FeatureOptions) -> QueryResult<QueryDescriptor> {
        Ok(Self::with_options(raw, options)
            .filter()?
            .sort()
            .limit_fields()
            .paginate()?
            .build())
    }

    /// Build filter conditions from every non-control parameter
    pub fn filter(mut self) -> QueryResult<Self> {
        let mut conditions = Vec::new();

        for (field, value) in self.raw.filter_candidates() {
            if field.is_empty() {
                continue;
            }

            match value {
                RawValue::Scalar(v) => {
                    conditions.push(FilterCondition::eq(field, coerce_value(v)));
                }
                RawValue::List(items) => {
                    let values = items.iter().map(|v| coerce_value(v)).collect();
                    conditions.push(FilterCondition::in_list(field, values));
                }
                RawValue::Operators(ops) => {
                    for (token, v) in ops {
                        match CmpOp::from_token(token) {
                            Some(op) => {
                                conditions.push(FilterCondition::new(field, op, coerce_value(v)));
                            }
                            None => match self.options.operator_policy {
                                OperatorPolicy::Reject => {
                                    return Err(QueryError::OperatorRejected {
                                        field: field.to_string(),
                                        operator: token.clone(),
                                    });
                                }
                                OperatorPolicy::Ignore => {
                                    debug!(field, operator = %token, "Dropping unsupported filter operator");
                                }
                            },
                        }
                    }
                }
            }
        }

        self.descriptor.conditions = conditions;
        Ok(self)
    }

    /// Sort order from `sort`, newest first when absent
    pub fn sort(mut self) -> Self {
        let spec = self.raw.control("sort").map(parse_sort).unwrap_or_default();
        self.descriptor.sort = if spec.is_empty() { default_sort() } else { spec };
        self
    }

    /// Projection from `fields`, hiding internal fields when absent
    pub fn limit_fields(mut self) -> Self {
        self.descriptor.projection = self
            .raw
            .control("fields")
            .and_then(Projection::parse_fields)
            .unwrap_or_else(Projection::hide_internal);
        self
    }

    /// Page window from `page` and `limit`
    pub fn paginate(mut self) -> QueryResult<Self> {
        let page = parse_positive(self.raw.control("page")).unwrap_or(DEFAULT_PAGE);
        let limit = parse_positive(self.raw.control("limit")).unwrap_or(DEFAULT_PAGE_SIZE);

        if limit > self.options.max_page_size {
            return Err(QueryError::LimitExceeded(limit, self.options.max_page_size));
        }

        self.descriptor.window = Some(PageWindow::new(page, limit));
        Ok(self)
    }

    pub fn build(self) -> QueryDescriptor {
        self.descriptor
    }
}
