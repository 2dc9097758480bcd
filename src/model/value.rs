//! Attribute values carried by each row

use std::borrow::Cow;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, NaiveDateTime};
use indexmap::IndexMap;
use serde_json::Value;

use super::schema::CellType;

/// Textual form timestamps are rewritten to
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// An attribute value: scalar, structured, or a not-yet-normalized timestamp
#[derive(Debug, Clone)]
pub enum AttributeValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    Timestamp(NaiveDateTime),
    Mapping(IndexMap<String, AttributeValue>),
    List(Vec<AttributeValue>),
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Null, AttributeValue::Null) => true,
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a == b,
            (AttributeValue::Int(a), AttributeValue::Int(b)) => a == b,
            (AttributeValue::Float(a), AttributeValue::Float(b)) => {
                // Handle NaN comparison
                if a.is_nan() && b.is_nan() {
                    true
                } else {
                    a == b
                }
            }
            (AttributeValue::String(a), AttributeValue::String(b)) => a == b,
            (AttributeValue::Timestamp(a), AttributeValue::Timestamp(b)) => a == b,
            (AttributeValue::Mapping(a), AttributeValue::Mapping(b)) => a == b,
            (AttributeValue::List(a), AttributeValue::List(b)) => a == b,
            // Cross-type numeric comparison
            (AttributeValue::Int(a), AttributeValue::Float(b)) => int_eq_float(*a, *b),
            (AttributeValue::Float(a), AttributeValue::Int(b)) => int_eq_float(*b, *a),
            _ => false,
        }
    }
}

impl Eq for AttributeValue {}

impl Hash for AttributeValue {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // Int and Float share a tag so that Int(n) and Float(n.0) collide
        match self {
            AttributeValue::Null => 0u8.hash(state),
            AttributeValue::Bool(b) => {
                1u8.hash(state);
                b.hash(state);
            }
            AttributeValue::Int(i) => {
                2u8.hash(state);
                i.hash(state);
            }
            AttributeValue::Float(f) => {
                2u8.hash(state);
                hash_float(*f, state);
            }
            AttributeValue::String(s) => {
                3u8.hash(state);
                s.hash(state);
            }
            AttributeValue::Timestamp(ts) => {
                4u8.hash(state);
                ts.hash(state);
            }
            AttributeValue::Mapping(map) => {
                // IndexMap equality ignores entry order, so the hash must too
                5u8.hash(state);
                map.len().hash(state);
                let mut keys: Vec<&String> = map.keys().collect();
                keys.sort();
                for key in keys {
                    key.hash(state);
                    map[key].hash(state);
                }
            }
            AttributeValue::List(items) => {
                6u8.hash(state);
                items.hash(state);
            }
        }
    }
}

/// Integral floats inside the i64 range that convert back to exactly `i`
fn int_eq_float(i: i64, f: f64) -> bool {
    is_integral_i64(f) && f as i64 == i
}

fn is_integral_i64(f: f64) -> bool {
    f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64
}

fn hash_float<H: Hasher>(f: f64, state: &mut H) {
    if f.is_nan() {
        u64::MAX.hash(state);
    } else if is_integral_i64(f) {
        (f as i64).hash(state);
    } else {
        f.to_bits().hash(state);
    }
}

impl AttributeValue {
    /// Check if the value is null
    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// Check if the value is a timestamp
    pub fn is_timestamp(&self) -> bool {
        matches!(self, AttributeValue::Timestamp(_))
    }

    /// Semantic type of this single value
    pub fn cell_type(&self) -> CellType {
        match self {
            AttributeValue::Null => CellType::Null,
            AttributeValue::Bool(_) => CellType::Bool,
            AttributeValue::Int(_) => CellType::Int,
            AttributeValue::Float(_) => CellType::Float,
            AttributeValue::String(_) => CellType::String,
            AttributeValue::Timestamp(_) => CellType::Timestamp,
            AttributeValue::Mapping(_) => CellType::Mapping,
            AttributeValue::List(_) => CellType::List,
        }
    }

    /// Convert to a display string
    pub fn display(&self) -> Cow<'_, str> {
        match self {
            AttributeValue::Null => Cow::Borrowed("null"),
            AttributeValue::Bool(b) => Cow::Owned(b.to_string()),
            AttributeValue::Int(i) => Cow::Owned(i.to_string()),
            AttributeValue::Float(f) => Cow::Owned(f.to_string()),
            AttributeValue::String(s) => Cow::Borrowed(s.as_str()),
            AttributeValue::Timestamp(ts) => {
                Cow::Owned(ts.format(TIMESTAMP_FORMAT).to_string())
            }
            AttributeValue::Mapping(_) | AttributeValue::List(_) => {
                Cow::Owned(self.to_json().to_string())
            }
        }
    }

    /// Rebuild the value, replacing every leaf for which `f` returns `Some`.
    ///
    /// Mappings and lists are walked to any depth; `f` is only offered
    /// non-container values.
    pub fn map_leaves<F>(&self, f: &F) -> AttributeValue
    where
        F: Fn(&AttributeValue) -> Option<AttributeValue>,
    {
        match self {
            AttributeValue::Mapping(map) => AttributeValue::Mapping(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.map_leaves(f)))
                    .collect(),
            ),
            AttributeValue::List(items) => {
                AttributeValue::List(items.iter().map(|v| v.map_leaves(f)).collect())
            }
            leaf => f(leaf).unwrap_or_else(|| leaf.clone()),
        }
    }

    /// Whether any leaf, at any depth, satisfies `pred`
    pub fn any_leaf<F>(&self, pred: &F) -> bool
    where
        F: Fn(&AttributeValue) -> bool,
    {
        match self {
            AttributeValue::Mapping(map) => map.values().any(|v| v.any_leaf(pred)),
            AttributeValue::List(items) => items.iter().any(|v| v.any_leaf(pred)),
            leaf => pred(leaf),
        }
    }

    /// Convert to a JSON value for GeoJSON properties.
    ///
    /// Non-finite floats become `null`; timestamps use [`TIMESTAMP_FORMAT`].
    pub fn to_json(&self) -> Value {
        match self {
            AttributeValue::Null => Value::Null,
            AttributeValue::Bool(b) => Value::Bool(*b),
            AttributeValue::Int(i) => Value::from(*i),
            AttributeValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            AttributeValue::String(s) => Value::String(s.clone()),
            AttributeValue::Timestamp(ts) => Value::String(ts.format(TIMESTAMP_FORMAT).to_string()),
            AttributeValue::Mapping(map) => Value::Object(
                map.iter()
                    .map(|(k, v)| (k.clone(), v.to_json()))
                    .collect(),
            ),
            AttributeValue::List(items) => {
                Value::Array(items.iter().map(|v| v.to_json()).collect())
            }
        }
    }

    /// Convert a JSON value, recognizing date-time strings at any depth
    pub fn from_json(value: &Value) -> AttributeValue {
        match value {
            Value::Null => AttributeValue::Null,
            Value::Bool(b) => AttributeValue::Bool(*b),
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    AttributeValue::Int(i)
                } else if let Some(f) = n.as_f64() {
                    AttributeValue::Float(f)
                } else {
                    AttributeValue::String(n.to_string())
                }
            }
            Value::String(s) => match parse_timestamp(s) {
                Some(ts) => AttributeValue::Timestamp(ts),
                None => AttributeValue::String(s.clone()),
            },
            Value::Array(items) => {
                AttributeValue::List(items.iter().map(AttributeValue::from_json).collect())
            }
            Value::Object(obj) => AttributeValue::Mapping(
                obj.iter()
                    .map(|(k, v)| (k.clone(), AttributeValue::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Infer a value from delimited-text input.
    ///
    /// Text is never promoted to a timestamp.
    pub fn infer_text(s: &str) -> AttributeValue {
        let trimmed = s.trim();

        // Check for empty/null
        if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") || trimmed == "NA" {
            return AttributeValue::Null;
        }

        if trimmed.eq_ignore_ascii_case("true") {
            return AttributeValue::Bool(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return AttributeValue::Bool(false);
        }

        if let Ok(i) = trimmed.parse::<i64>() {
            return AttributeValue::Int(i);
        }

        if let Ok(f) = trimmed.parse::<f64>() {
            return AttributeValue::Float(f);
        }

        AttributeValue::String(trimmed.to_string())
    }
}

/// Parse a full date-time string; date-only strings are not timestamps
pub fn parse_timestamp(s: &str) -> Option<NaiveDateTime> {
    // Shortest accepted form is `YYYY-MM-DDTHH:MM:SS`
    if s.len() < 19 || !s.as_bytes()[0].is_ascii_digit() {
        return None;
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Some(dt);
    }
    DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.naive_local())
}

impl std::fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

impl From<&str> for AttributeValue {
    fn from(s: &str) -> Self {
        AttributeValue::String(s.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(s: String) -> Self {
        AttributeValue::String(s)
    }
}

impl From<i64> for AttributeValue {
    fn from(i: i64) -> Self {
        AttributeValue::Int(i)
    }
}

impl From<f64> for AttributeValue {
    fn from(f: f64) -> Self {
        AttributeValue::Float(f)
    }
}

impl From<bool> for AttributeValue {
    fn from(b: bool) -> Self {
        AttributeValue::Bool(b)
    }
}

impl From<NaiveDateTime> for AttributeValue {
    fn from(ts: NaiveDateTime) -> Self {
        AttributeValue::Timestamp(ts)
    }
}
