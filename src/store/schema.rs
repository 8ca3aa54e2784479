//! # Document Schema
//!
//! Field rules checked by the store on create and (optionally) update.
//! Unknown fields are stripped, defaults are filled in, and every violated
//! rule is reported in one message.

use serde_json::{Map, Value};

use super::errors::{StoreError, StoreResult};
use super::eval::value_as_date;
use crate::query::{CREATED_AT_FIELD, ID_FIELD, VERSION_FIELD};

/// Supported field kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    String,
    Number,
    /// Array whose elements are all of the inner kind
    ArrayOf(ElementKind),
}

/// Element kinds allowed inside an array field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementKind {
    String,
    Number,
    Date,
}

impl FieldKind {
    pub fn type_name(&self) -> &'static str {
        match self {
            FieldKind::String => "string",
            FieldKind::Number => "number",
            FieldKind::ArrayOf(_) => "array",
        }
    }
}

impl ElementKind {
    fn accepts(&self, value: &Value) -> bool {
        match self {
            ElementKind::String => value.is_string(),
            ElementKind::Number => value.is_number(),
            ElementKind::Date => value_as_date(value).is_some(),
        }
    }
}

/// Rule for one field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldRule {
    pub name: String,
    pub kind: FieldKind,
    pub required: bool,
    pub default: Option<Value>,
    pub allowed: Option<Vec<String>>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl FieldRule {
    fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            default: None,
            allowed: None,
            min: None,
            max: None,
        }
    }

    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::String)
    }

    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    pub fn array_of(name: impl Into<String>, element: ElementKind) -> Self {
        Self::new(name, FieldKind::ArrayOf(element))
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    /// Restrict a string field to a fixed set of values
    pub fn one_of(mut self, values: &[&str]) -> Self {
        self.allowed = Some(values.iter().map(|v| v.to_string()).collect());
        self
    }

    /// Inclusive numeric range
    pub fn range(mut self, min: f64, max: f64) -> Self {
        self.min = Some(min);
        self.max = Some(max);
        self
    }

    fn check(&self, value: &Value, problems: &mut Vec<String>) {
        let name = &self.name;

        let type_ok = match self.kind {
            FieldKind::String => value.is_string(),
            FieldKind::Number => value.is_number(),
            FieldKind::ArrayOf(element) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| element.accepts(item))),
        };
        if !type_ok {
            problems.push(format!("{} must be of type {}", name, self.kind.type_name()));
            return;
        }

        if let (Some(allowed), Some(s)) = (&self.allowed, value.as_str()) {
            if !allowed.iter().any(|a| a == s) {
                problems.push(format!("{} must be one of: {}", name, allowed.join(", ")));
            }
        }

        if let Some(n) = value.as_f64() {
            if let Some(min) = self.min {
                if n < min {
                    problems.push(format!("{} must be at least {}", name, min));
                }
            }
            if let Some(max) = self.max {
                if n > max {
                    problems.push(format!("{} must be at most {}", name, max));
                }
            }
        }
    }
}

/// Collection schema
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    rules: Vec<FieldRule>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, rule: FieldRule) -> Self {
        self.rules.push(rule);
        self
    }

    fn is_system_field(name: &str) -> bool {
        name == ID_FIELD || name == VERSION_FIELD || name == CREATED_AT_FIELD
    }

    /// Drop unknown fields and fill defaults for absent ones
    pub fn prepare(&self, doc: Map<String, Value>) -> Map<String, Value> {
        let mut prepared: Map<String, Value> = doc
            .into_iter()
            .filter(|(key, _)| {
                Self::is_system_field(key) || self.rules.iter().any(|r| &r.name == key)
            })
            .collect();

        for rule in &self.rules {
            if let Some(default) = &rule.default {
                if !prepared.contains_key(&rule.name) {
                    prepared.insert(rule.name.clone(), default.clone());
                }
            }
        }

        prepared
    }

    /// Check every rule. Null counts as absent.
    pub fn validate(&self, doc: &Map<String, Value>) -> StoreResult<()> {
        let mut problems = Vec::new();

        for rule in &self.rules {
            match doc.get(&rule.name) {
                None | Some(Value::Null) => {
                    if rule.required {
                        problems.push(format!("{} is required", rule.name));
                    }
                }
                Some(value) => rule.check(value, &mut problems),
            }
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(StoreError::Validation(problems.join(". ")))
        }
    }
}
