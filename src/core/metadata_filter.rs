// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Exact-match metadata filtering for search results
//!
//! A filter is a set of `key -> expected value` conditions. A record matches
//! when it is an object holding every key with an equal value. Keys are
//! looked up at the top level only; nested structures are compared as whole
//! values.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value as JsonValue};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors that can occur during filter parsing
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid filter syntax: {0}")]
    InvalidSyntax(String),
}

/// Conjunction of exact-match conditions on metadata fields.
///
/// An empty filter matches every record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataFilter {
    conditions: BTreeMap<String, JsonValue>,
}

impl MetadataFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a condition requiring `field` to equal `value`.
    ///
    /// ```
    /// use serde_json::json;
    /// use nanovec::core::metadata_filter::MetadataFilter;
    ///
    /// let filter = MetadataFilter::new().with_field("type", "car").with_field("year", 2020);
    /// assert!(filter.matches(&json!({"type": "car", "year": 2020, "color": "red"})));
    /// assert!(!filter.matches(&json!({"type": "car"})));
    /// ```
    pub fn with_field(mut self, field: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.conditions.insert(field.into(), value.into());
        self
    }

    /// Parse a filter from a JSON object of field/value pairs
    ///
    /// ```
    /// use serde_json::json;
    /// use nanovec::core::metadata_filter::MetadataFilter;
    ///
    /// let filter = MetadataFilter::from_json(&json!({"category": "tech"})).unwrap();
    /// assert_eq!(filter.len(), 1);
    /// ```
    pub fn from_json(value: &JsonValue) -> Result<Self, FilterError> {
        match value {
            JsonValue::Object(map) => Ok(map
                .iter()
                .map(|(field, expected)| (field.clone(), expected.clone()))
                .collect()),
            other => Err(FilterError::InvalidSyntax(format!(
                "Filter must be a JSON object, got {}",
                json_type_name(other)
            ))),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn conditions(&self) -> impl Iterator<Item = (&str, &JsonValue)> {
        self.conditions.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Check if a metadata record satisfies every condition
    ///
    /// A missing key, or a record that is not an object, never matches a
    /// non-empty filter.
    pub fn matches(&self, metadata: &JsonValue) -> bool {
        if self.conditions.is_empty() {
            return true;
        }
        match metadata {
            JsonValue::Object(record) => self.matches_record(record),
            _ => false,
        }
    }

    fn matches_record(&self, record: &Map<String, JsonValue>) -> bool {
        self.conditions.iter().all(|(field, expected)| {
            record
                .get(field)
                .map_or(false, |actual| values_equal(actual, expected))
        })
    }
}

impl<K: Into<String>, V: Into<JsonValue>> FromIterator<(K, V)> for MetadataFilter {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            conditions: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Structural equality where numbers compare by value, so `1` equals `1.0`.
///
/// Integer against integer is exact, and an integer only equals a float that
/// holds exactly the same integral value.
pub fn values_equal(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => numbers_equal(x, y),
        (JsonValue::Array(xs), JsonValue::Array(ys)) => {
            xs.len() == ys.len() && xs.iter().zip(ys).all(|(x, y)| values_equal(x, y))
        }
        (JsonValue::Object(xs), JsonValue::Object(ys)) => {
            xs.len() == ys.len()
                && xs
                    .iter()
                    .all(|(k, x)| ys.get(k).map_or(false, |y| values_equal(x, y)))
        }
        _ => a == b,
    }
}

fn numbers_equal(x: &Number, y: &Number) -> bool {
    match (integer_value(x), integer_value(y)) {
        (Some(i), Some(j)) => i == j,
        (Some(i), None) => y.as_f64().map_or(false, |f| float_equals_integer(f, i)),
        (None, Some(j)) => x.as_f64().map_or(false, |f| float_equals_integer(f, j)),
        (None, None) => x.as_f64() == y.as_f64(),
    }
}

fn integer_value(n: &Number) -> Option<i128> {
    n.as_i64()
        .map(i128::from)
        .or_else(|| n.as_u64().map(i128::from))
}

fn float_equals_integer(f: f64, i: i128) -> bool {
    // saturating cast; out-of-range floats never reach a u64/i64 value
    f.fract() == 0.0 && f as i128 == i
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
