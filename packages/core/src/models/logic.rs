//! Logic Expressions
//!
//! Nested boolean/comparison trees used for conditional visibility and for
//! enabling validation rules. Wire format:
//!
//! ```json
//! { "and": [ { "path": "/form/agreed" }, { "gte": [ { "path": "/age" }, 18 ] } ] }
//! ```
//!
//! Operators: `and`, `or`, `not`, `eq`, `neq`, `gt`, `gte`, `lt`, `lte`.
//! Anything that is not an operator object is a truthiness leaf: a bare
//! `{ "path": ... }` reference or a literal value.

use crate::models::dynamic_value::{reference_path, DynamicValue};
use crate::models::error::ExpressionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Eq,
    Neq,
    Gt,
    Gte,
    Lt,
    Lte,
}

impl Comparison {
    /// All comparison operators in wire order
    pub const ALL: [Comparison; 6] = [
        Comparison::Eq,
        Comparison::Neq,
        Comparison::Gt,
        Comparison::Gte,
        Comparison::Lt,
        Comparison::Lte,
    ];

    /// Wire key for this operator
    pub fn key(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Neq => "neq",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
        }
    }

    /// Parse a wire key
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.key() == key)
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One side of a comparison
///
/// Either a dynamic value or a nested expression, which contributes its
/// boolean result.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Value(DynamicValue),
    Expression(Box<LogicExpression>),
}

impl From<DynamicValue> for Operand {
    fn from(value: DynamicValue) -> Self {
        Self::Value(value)
    }
}

impl From<LogicExpression> for Operand {
    fn from(expr: LogicExpression) -> Self {
        Self::Expression(Box::new(expr))
    }
}

impl TryFrom<Value> for Operand {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Value::Object(map) = &value {
            if operator_key(map).is_some() || map.contains_key("auth") {
                return LogicExpression::try_from(value).map(Operand::from);
            }
        }
        Ok(Self::Value(DynamicValue::from(value)))
    }
}

impl From<Operand> for Value {
    fn from(operand: Operand) -> Self {
        match operand {
            Operand::Value(value) => value.into(),
            Operand::Expression(expr) => (*expr).into(),
        }
    }
}

/// A nested boolean/comparison expression
///
/// # Example
///
/// ```rust
/// use dynui_core::models::LogicExpression;
/// use serde_json::json;
///
/// let expr: LogicExpression = serde_json::from_value(json!({
///     "or": [{ "path": "/user/isAdmin" }, { "eq": [{ "path": "/user/role" }, "owner"] }]
/// })).unwrap();
///
/// assert!(matches!(expr, LogicExpression::Or(_)));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum LogicExpression {
    /// True when every operand is true; stops at the first false
    And(Vec<LogicExpression>),
    /// True when any operand is true; stops at the first true
    Or(Vec<LogicExpression>),
    /// Negation
    Not(Box<LogicExpression>),
    /// Strict comparison of two resolved operands
    Compare {
        op: Comparison,
        left: Operand,
        right: Operand,
    },
    /// Truthiness of a resolved value
    Value(DynamicValue),
}

impl LogicExpression {
    pub fn and(operands: impl IntoIterator<Item = LogicExpression>) -> Self {
        Self::And(operands.into_iter().collect())
    }

    pub fn or(operands: impl IntoIterator<Item = LogicExpression>) -> Self {
        Self::Or(operands.into_iter().collect())
    }

    #[allow(clippy::should_implement_trait)]
    pub fn not(operand: LogicExpression) -> Self {
        Self::Not(Box::new(operand))
    }

    pub fn compare(op: Comparison, left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::Compare {
            op,
            left: left.into(),
            right: right.into(),
        }
    }

    pub fn eq(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Eq, left, right)
    }

    pub fn neq(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Neq, left, right)
    }

    pub fn gt(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Gt, left, right)
    }

    pub fn gte(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Gte, left, right)
    }

    pub fn lt(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Lt, left, right)
    }

    pub fn lte(left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self::compare(Comparison::Lte, left, right)
    }

    /// Truthiness leaf for the value at `path`
    pub fn path(path: impl Into<String>) -> Self {
        Self::Value(DynamicValue::path(path))
    }

    /// Truthiness leaf for a literal
    pub fn literal(value: impl Into<Value>) -> Self {
        Self::Value(DynamicValue::literal(value))
    }
}

const LOGIC_KEYS: [&str; 3] = ["and", "or", "not"];

/// The operator key of `map`, when it is a single-key operator object
fn operator_key(map: &Map<String, Value>) -> Option<&str> {
    if map.len() != 1 {
        return None;
    }
    let key = map.keys().next()?.as_str();
    (LOGIC_KEYS.contains(&key) || Comparison::from_key(key).is_some()).then_some(key)
}

fn parse_operands(operator: &str, value: Value) -> Result<Vec<LogicExpression>, ExpressionError> {
    match value {
        Value::Array(items) => items.into_iter().map(LogicExpression::try_from).collect(),
        other => Err(ExpressionError::invalid_shape(
            operator,
            format!("expected an array of expressions, got {}", other),
        )),
    }
}

fn parse_comparison(op: Comparison, value: Value) -> Result<LogicExpression, ExpressionError> {
    let items = match value {
        Value::Array(items) => items,
        other => {
            return Err(ExpressionError::invalid_shape(
                op.key(),
                format!("expected [left, right], got {}", other),
            ))
        }
    };
    let actual = items.len();
    let [left, right]: [Value; 2] = items
        .try_into()
        .map_err(|_| ExpressionError::wrong_arity(op.key(), actual))?;
    Ok(LogicExpression::Compare {
        op,
        left: Operand::try_from(left)?,
        right: Operand::try_from(right)?,
    })
}

impl TryFrom<Value> for LogicExpression {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let map = match value {
            Value::Object(map) => map,
            literal => return Ok(Self::Value(DynamicValue::Literal(literal))),
        };

        if map.len() == 1 {
            if let Some(auth) = map.get("auth") {
                return Err(ExpressionError::auth_not_nestable(
                    auth.as_str().map(str::to_string).unwrap_or_else(|| auth.to_string()),
                ));
            }
        }
        if reference_path(&map).is_some() || operator_key(&map).is_none() {
            return Ok(Self::Value(DynamicValue::from(Value::Object(map))));
        }

        let Some((key, operand)) = map.into_iter().next() else {
            return Ok(Self::Value(DynamicValue::Literal(Value::Object(Map::new()))));
        };
        match key.as_str() {
            "and" => parse_operands(&key, operand).map(Self::And),
            "or" => parse_operands(&key, operand).map(Self::Or),
            "not" => Ok(Self::not(Self::try_from(operand)?)),
            other => match Comparison::from_key(other) {
                Some(op) => parse_comparison(op, operand),
                None => Err(ExpressionError::invalid_shape(other, "unknown operator")),
            },
        }
    }
}

impl From<LogicExpression> for Value {
    fn from(expr: LogicExpression) -> Self {
        let (key, operand) = match expr {
            LogicExpression::Value(value) => return value.into(),
            LogicExpression::And(items) => (
                "and".to_string(),
                Value::Array(items.into_iter().map(Value::from).collect()),
            ),
            LogicExpression::Or(items) => (
                "or".to_string(),
                Value::Array(items.into_iter().map(Value::from).collect()),
            ),
            LogicExpression::Not(inner) => ("not".to_string(), Value::from(*inner)),
            LogicExpression::Compare { op, left, right } => (
                op.key().to_string(),
                Value::Array(vec![left.into(), right.into()]),
            ),
        };
        let mut map = Map::new();
        map.insert(key, operand);
        Value::Object(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: Value) -> Result<LogicExpression, ExpressionError> {
        LogicExpression::try_from(value)
    }

    #[test]
    fn test_parse_nested_expression() {
        let expr = parse(json!({
            "and": [true, {"not": {"path": "/disabled"}}, {"gte": [{"path": "/age"}, 18]}]
        }))
        .unwrap();

        assert_eq!(
            expr,
            LogicExpression::and([
                LogicExpression::literal(true),
                LogicExpression::not(LogicExpression::path("/disabled")),
                LogicExpression::gte(DynamicValue::path("/age"), DynamicValue::literal(18)),
            ])
        );
    }

    #[test]
    fn test_comparison_operand_may_be_expression() {
        let expr = parse(json!({"eq": [{"or": [{"path": "/a"}]}, true]})).unwrap();
        let LogicExpression::Compare { left, .. } = expr else {
            panic!("expected comparison");
        };
        assert!(matches!(left, Operand::Expression(_)));
    }

    #[test]
    fn test_comparison_arity_is_checked() {
        assert_eq!(
            parse(json!({"eq": [1]})),
            Err(ExpressionError::wrong_arity("eq", 1))
        );
        assert!(matches!(
            parse(json!({"lt": 5})),
            Err(ExpressionError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_and_requires_array() {
        assert!(matches!(
            parse(json!({"and": {"path": "/a"}})),
            Err(ExpressionError::InvalidShape { .. })
        ));
    }

    #[test]
    fn test_auth_is_not_nestable() {
        assert_eq!(
            parse(json!({"and": [{"auth": "signedIn"}]})),
            Err(ExpressionError::auth_not_nestable("signedIn"))
        );
        assert!(parse(json!({"eq": [{"auth": "signedIn"}, true]})).is_err());
    }

    #[test]
    fn test_non_operator_objects_are_literals() {
        assert_eq!(
            parse(json!({"name": "x", "and": []})).unwrap(),
            LogicExpression::literal(json!({"name": "x", "and": []}))
        );
    }

    #[test]
    fn test_serialize_wire_format() {
        let expr = LogicExpression::or([
            LogicExpression::path("/a"),
            LogicExpression::neq(DynamicValue::path("/b"), DynamicValue::literal("x")),
        ]);
        assert_eq!(
            serde_json::to_value(&expr).unwrap(),
            json!({"or": [{"path": "/a"}, {"neq": [{"path": "/b"}, "x"]}]})
        );
    }
}
