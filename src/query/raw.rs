//! # Raw Query
//!
//! The untrusted parameter mapping decoded from a request's query string.
//!
//! Wire forms understood by [`RawQuery::push`]:
//! - `field=value` → scalar
//! - `field=a&field=b` → list
//! - `field[op]=value` → operator map (`op` is kept verbatim; validation
//!   happens when filter conditions are built)

use std::collections::BTreeMap;

use serde::Serialize;

/// Control parameters. These never become filter conditions.
pub const RESERVED_KEYS: [&str; 4] = ["page", "sort", "limit", "fields"];

/// A single raw parameter value
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RawValue {
    Scalar(String),
    List(Vec<String>),
    Operators(BTreeMap<String, String>),
}

impl RawValue {
    /// The value a control parameter reads: the scalar itself, or the last
    /// entry of a repeated parameter.
    pub fn last_scalar(&self) -> Option<&str> {
        match self {
            RawValue::Scalar(s) => Some(s),
            RawValue::List(items) => items.last().map(String::as_str),
            RawValue::Operators(_) => None,
        }
    }
}

/// Parameter name → raw value
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RawQuery {
    params: BTreeMap<String, RawValue>,
}

impl RawQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from decoded `(key, value)` pairs in wire order
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut raw = Self::new();
        for (key, value) in pairs {
            raw.push(key.as_ref(), value);
        }
        raw
    }

    /// Add one decoded pair.
    ///
    /// A key seen again with a different shape (bare vs bracketed) replaces
    /// the earlier value.
    pub fn push(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();

        if let Some((field, token)) = split_operator(key) {
            if let Some(RawValue::Operators(ops)) = self.params.get_mut(field) {
                ops.insert(token.to_string(), value);
                return;
            }
            let mut ops = BTreeMap::new();
            ops.insert(token.to_string(), value);
            self.params.insert(field.to_string(), RawValue::Operators(ops));
            return;
        }

        let next = match self.params.remove(key) {
            Some(RawValue::Scalar(prev)) => RawValue::List(vec![prev, value]),
            Some(RawValue::List(mut items)) => {
                items.push(value);
                RawValue::List(items)
            }
            _ => RawValue::Scalar(value),
        };
        self.params.insert(key.to_string(), next);
    }

    /// Overwrite a parameter with a scalar value.
    ///
    /// Used for programmatic injection (route aliases).
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.params.insert(key.into(), RawValue::Scalar(value.into()));
    }

    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.params.get(key)
    }

    /// Read a control parameter, ignoring blank values
    pub fn control(&self, key: &str) -> Option<&str> {
        self.params
            .get(key)
            .and_then(RawValue::last_scalar)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Check if a parameter name is a control parameter
    pub fn is_reserved(key: &str) -> bool {
        RESERVED_KEYS.contains(&key)
    }

    /// All non-control parameters, in key order
    pub fn filter_candidates(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.params
            .iter()
            .filter(|(key, _)| !Self::is_reserved(key))
            .map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for RawQuery {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self::from_pairs(iter)
    }
}

/// Split `field[token]` into its parts
fn split_operator(key: &str) -> Option<(&str, &str)> {
    let open = key.find('[')?;
    let token = key[open + 1..].strip_suffix(']')?;
    Some((&key[..open], token))
}
