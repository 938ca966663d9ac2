//! Dynamic Values
//!
//! A `DynamicValue` is either a literal JSON value or a reference into the
//! data model written as `{ "path": "/some/path" }`. Resolution of a
//! reference yields the value at that path or `None` (absent).
//!
//! This module also owns the value semantics shared by every evaluator:
//! truthiness, strict (non-coercing) equality, ordering and the string form
//! used for interpolation.

use crate::data::get_by_path;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;

/// A literal value or a `{ "path": ... }` reference into the data model
///
/// # Example
///
/// ```rust
/// use dynui_core::models::DynamicValue;
/// use serde_json::json;
///
/// let model = json!({"user": {"name": "Ada"}});
/// let reference = DynamicValue::from(json!({"path": "/user/name"}));
/// assert_eq!(reference.resolve(&model), Some(&json!("Ada")));
///
/// let literal = DynamicValue::from(json!(42));
/// assert_eq!(literal.resolve(&model), Some(&json!(42)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum DynamicValue {
    /// Passed through unchanged
    Literal(Value),
    /// Resolved against the data model
    Path(String),
}

impl DynamicValue {
    /// Create a literal value
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Literal(value.into())
    }

    /// Create a path reference
    pub fn path(path: impl Into<String>) -> Self {
        Self::Path(path.into())
    }

    /// Returns the referenced path, if this is a reference
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(path) => Some(path),
            Self::Literal(_) => None,
        }
    }

    /// Resolve against `model`
    ///
    /// Literals (including objects and arrays) are returned by reference,
    /// never deep-copied.
    pub fn resolve<'a>(&'a self, model: &'a Value) -> Option<&'a Value> {
        match self {
            Self::Literal(value) => Some(value),
            Self::Path(path) => get_by_path(model, path),
        }
    }
}

/// Resolve a dynamic value against the data model
pub fn resolve_dynamic_value<'a>(value: &'a DynamicValue, model: &'a Value) -> Option<&'a Value> {
    value.resolve(model)
}

/// Returns the path when `map` is exactly `{ "path": "<string>" }`
pub(crate) fn reference_path(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    map.get("path").and_then(Value::as_str)
}

impl From<Value> for DynamicValue {
    fn from(value: Value) -> Self {
        if let Value::Object(map) = &value {
            if let Some(path) = reference_path(map) {
                return Self::Path(path.to_string());
            }
        }
        Self::Literal(value)
    }
}

impl From<DynamicValue> for Value {
    fn from(value: DynamicValue) -> Self {
        match value {
            DynamicValue::Literal(value) => value,
            DynamicValue::Path(path) => {
                let mut map = Map::new();
                map.insert("path".to_string(), Value::String(path));
                Value::Object(map)
            }
        }
    }
}

// ============================================================================
// Value semantics
// ============================================================================

/// Truthiness of a resolved value
///
/// Absent, `null`, `false`, `0` and `""` are falsy. Everything else is
/// truthy, including empty arrays and empty objects.
pub fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

/// Strict equality with no type coercion
///
/// - Absent equals only absent; it never equals `null`.
/// - Numbers compare by numeric value (`1` equals `1.0`).
/// - Values of different JSON types are never equal (`"100"` is not `100`).
/// - Arrays and objects compare structurally.
pub fn strict_equals(left: Option<&Value>, right: Option<&Value>) -> bool {
    match (left, right) {
        (None, None) => true,
        (Some(l), Some(r)) => json_equals(l, r),
        _ => false,
    }
}

fn json_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => match (l.as_f64(), r.as_f64()) {
            (Some(l), Some(r)) => l == r,
            _ => l == r,
        },
        (Value::Array(l), Value::Array(r)) => {
            l.len() == r.len() && l.iter().zip(r).all(|(l, r)| json_equals(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter()
                    .all(|(key, l)| r.get(key).is_some_and(|r| json_equals(l, r)))
        }
        _ => left == right,
    }
}

/// Ordering between two resolved values
///
/// Defined for number/number and string/string pairs only. Every other
/// pairing, including absent operands, is unordered and returns `None`, so
/// all of `gt/gte/lt/lte` evaluate to `false` for it.
pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Option<Ordering> {
    match (left?, right?) {
        (Value::Number(l), Value::Number(r)) => l.as_f64()?.partial_cmp(&r.as_f64()?),
        (Value::String(l), Value::String(r)) => Some(l.cmp(r)),
        _ => None,
    }
}

/// String form of a resolved value for template interpolation
///
/// Strings are inserted raw, numbers without a trailing `.0`, `null` and
/// absent as the empty string, containers as compact JSON.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => {
            if let Some(i) = n.as_i64() {
                i.to_string()
            } else if let Some(u) = n.as_u64() {
                u.to_string()
            } else {
                n.as_f64().map(|f| f.to_string()).unwrap_or_default()
            }
        }
        Some(other) => other.to_string(),
    }
}
