//! # Filter Conditions
//!
//! Comparison operators and the conditions built from filter parameters.
//! Conditions on different fields are AND-ed; there is no OR.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CmpOp {
    /// Equals
    Eq,
    /// Not equals
    Ne,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Value in list (repeated bare parameter)
    In,
}

impl CmpOp {
    /// Map a bracketed wire token to its operator.
    ///
    /// This table is the only way a client token becomes an operator. Tokens
    /// must match exactly; `eq` is implied by a bare key and is not accepted
    /// in bracket form.
    pub fn from_token(token: &str) -> Option<Self> {
        match token {
            "gt" => Some(CmpOp::Gt),
            "gte" => Some(CmpOp::Gte),
            "lt" => Some(CmpOp::Lt),
            "lte" => Some(CmpOp::Lte),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CmpOp::Eq => "eq",
            CmpOp::Ne => "ne",
            CmpOp::Gt => "gt",
            CmpOp::Gte => "gte",
            CmpOp::Lt => "lt",
            CmpOp::Lte => "lte",
            CmpOp::In => "in",
        }
    }
}

/// A single field condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    /// Field to filter on (dotted paths reach into sub-documents)
    pub field: String,

    /// Comparison operator
    pub op: CmpOp,

    /// Value to compare against
    pub value: Value,
}

impl FilterCondition {
    pub fn new(field: impl Into<String>, op: CmpOp, value: Value) -> Self {
        Self {
            field: field.into(),
            op,
            value,
        }
    }

    pub fn eq(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Eq, value)
    }

    pub fn ne(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Ne, value)
    }

    pub fn gt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Gt, value)
    }

    pub fn gte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Gte, value)
    }

    pub fn lt(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Lt, value)
    }

    pub fn lte(field: impl Into<String>, value: Value) -> Self {
        Self::new(field, CmpOp::Lte, value)
    }

    pub fn in_list(field: impl Into<String>, values: Vec<Value>) -> Self {
        Self::new(field, CmpOp::In, Value::Array(values))
    }
}

/// Coerce a raw parameter value.
///
/// Numeric-looking strings become JSON numbers; everything else stays a
/// string. No error is raised here: a value of the wrong type just matches
/// nothing at the store.
pub fn coerce_value(raw: &str) -> Value {
    let trimmed = raw.trim();

    if let Ok(n) = trimmed.parse::<i64>() {
        return Value::Number(n.into());
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        if let Some(num) = serde_json::Number::from_f64(n) {
            return Value::Number(num);
        }
    }

    Value::String(raw.to_string())
}
