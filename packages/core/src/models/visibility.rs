//! Visibility Conditions
//!
//! A visibility condition decides whether an element is shown. The full form
//! combines a list of entries:
//!
//! ```json
//! { "conditions": [ { "auth": "signedIn" }, { "path": "/cart/hasItems" } ], "logic": "and" }
//! ```
//!
//! Shorthands normalize to a one-entry `and` condition: a bare boolean, a
//! bare `{ "path": ... }`, a bare `{ "auth": ... }` leaf or a bare logic
//! expression.
//!
//! ## Auth leaves
//!
//! `{ "auth": "signedIn" }`, `{ "auth": "signedOut" }` and
//! `{ "auth": "<fact>" }` are opaque facts supplied by the caller's
//! [`AuthContext`]. They are only valid as direct entries of the top-level
//! list; nesting one inside `and`/`or`/`not` is a parse error.

use crate::models::error::ExpressionError;
use crate::models::logic::LogicExpression;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Auth-state fact checked by a top-level visibility entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AuthCondition {
    SignedIn,
    SignedOut,
    /// Any other caller-defined fact (e.g. `"admin"`)
    Fact(String),
}

impl AuthCondition {
    pub fn as_str(&self) -> &str {
        match self {
            Self::SignedIn => "signedIn",
            Self::SignedOut => "signedOut",
            Self::Fact(name) => name,
        }
    }
}

impl From<&str> for AuthCondition {
    fn from(name: &str) -> Self {
        match name {
            "signedIn" => Self::SignedIn,
            "signedOut" => Self::SignedOut,
            other => Self::Fact(other.to_string()),
        }
    }
}

/// Auth facts supplied by the caller
///
/// When no context is supplied at evaluation time the caller is treated as
/// signed out with no facts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthContext {
    pub signed_in: bool,
    #[serde(default)]
    pub facts: HashSet<String>,
}

impl AuthContext {
    pub fn signed_in() -> Self {
        Self {
            signed_in: true,
            facts: HashSet::new(),
        }
    }

    pub fn signed_out() -> Self {
        Self::default()
    }

    pub fn with_fact(mut self, fact: impl Into<String>) -> Self {
        self.facts.insert(fact.into());
        self
    }

    /// Whether `condition` holds for this context
    pub fn holds(&self, condition: &AuthCondition) -> bool {
        match condition {
            AuthCondition::SignedIn => self.signed_in,
            AuthCondition::SignedOut => !self.signed_in,
            AuthCondition::Fact(name) => self.facts.contains(name),
        }
    }
}

/// How the entries of a visibility condition combine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConditionLogic {
    #[default]
    And,
    Or,
}

/// One entry of a visibility condition's top-level list
#[derive(Debug, Clone, PartialEq)]
pub enum ConditionEntry {
    Auth(AuthCondition),
    Expression(LogicExpression),
}

impl TryFrom<Value> for ConditionEntry {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        if let Some(auth) = auth_leaf(&value)? {
            return Ok(Self::Auth(auth));
        }
        LogicExpression::try_from(value).map(Self::Expression)
    }
}

impl From<ConditionEntry> for Value {
    fn from(entry: ConditionEntry) -> Self {
        match entry {
            ConditionEntry::Auth(auth) => {
                let mut map = Map::new();
                map.insert("auth".to_string(), Value::String(auth.as_str().to_string()));
                Value::Object(map)
            }
            ConditionEntry::Expression(expr) => expr.into(),
        }
    }
}

/// Returns the auth condition when `value` is exactly `{ "auth": "<name>" }`
fn auth_leaf(value: &Value) -> Result<Option<AuthCondition>, ExpressionError> {
    let Value::Object(map) = value else {
        return Ok(None);
    };
    if map.len() != 1 {
        return Ok(None);
    }
    match map.get("auth") {
        None => Ok(None),
        Some(Value::String(name)) => Ok(Some(AuthCondition::from(name.as_str()))),
        Some(other) => Err(ExpressionError::invalid_shape(
            "auth",
            format!("expected a string, got {}", other),
        )),
    }
}

/// Show/hide decision for an element
///
/// # Example
///
/// ```rust
/// use dynui_core::models::{ConditionLogic, VisibilityCondition};
/// use serde_json::json;
///
/// let condition: VisibilityCondition = serde_json::from_value(json!({
///     "conditions": [{ "auth": "signedIn" }, { "path": "/cart/hasItems" }],
///     "logic": "or"
/// })).unwrap();
///
/// assert_eq!(condition.logic, ConditionLogic::Or);
/// assert_eq!(condition.conditions.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct VisibilityCondition {
    pub conditions: Vec<ConditionEntry>,
    pub logic: ConditionLogic,
}

impl VisibilityCondition {
    pub fn new(conditions: Vec<ConditionEntry>, logic: ConditionLogic) -> Self {
        Self { conditions, logic }
    }

    /// Always shown
    pub fn always() -> Self {
        Self::from_expression(LogicExpression::literal(true))
    }

    /// Never shown
    pub fn never() -> Self {
        Self::from_expression(LogicExpression::literal(false))
    }

    /// Shown when the value at `path` is truthy
    pub fn when(path: impl Into<String>) -> Self {
        Self::from_expression(LogicExpression::path(path))
    }

    pub fn signed_in() -> Self {
        Self::new(
            vec![ConditionEntry::Auth(AuthCondition::SignedIn)],
            ConditionLogic::And,
        )
    }

    pub fn signed_out() -> Self {
        Self::new(
            vec![ConditionEntry::Auth(AuthCondition::SignedOut)],
            ConditionLogic::And,
        )
    }

    /// Shown when every entry holds
    pub fn all(conditions: impl IntoIterator<Item = ConditionEntry>) -> Self {
        Self::new(conditions.into_iter().collect(), ConditionLogic::And)
    }

    /// Shown when any entry holds
    pub fn any(conditions: impl IntoIterator<Item = ConditionEntry>) -> Self {
        Self::new(conditions.into_iter().collect(), ConditionLogic::Or)
    }

    pub fn from_expression(expr: LogicExpression) -> Self {
        Self::new(vec![ConditionEntry::Expression(expr)], ConditionLogic::And)
    }
}

fn parse_logic(value: Option<Value>) -> Result<ConditionLogic, ExpressionError> {
    match value {
        None => Ok(ConditionLogic::And),
        Some(Value::String(s)) if s == "and" => Ok(ConditionLogic::And),
        Some(Value::String(s)) if s == "or" => Ok(ConditionLogic::Or),
        Some(other) => Err(ExpressionError::InvalidLogic(
            other.as_str().map(str::to_string).unwrap_or_else(|| other.to_string()),
        )),
    }
}

impl TryFrom<Value> for VisibilityCondition {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(mut map) if map.contains_key("conditions") => {
                let logic = parse_logic(map.remove("logic"))?;
                let conditions = match map.remove("conditions") {
                    Some(Value::Array(items)) => items
                        .into_iter()
                        .map(ConditionEntry::try_from)
                        .collect::<Result<Vec<_>, _>>()?,
                    other => {
                        return Err(ExpressionError::invalid_shape(
                            "conditions",
                            format!("expected an array, got {}", other.unwrap_or(Value::Null)),
                        ))
                    }
                };
                Ok(Self::new(conditions, logic))
            }
            shorthand => Ok(Self::new(
                vec![ConditionEntry::try_from(shorthand)?],
                ConditionLogic::And,
            )),
        }
    }
}

impl From<VisibilityCondition> for Value {
    fn from(condition: VisibilityCondition) -> Self {
        let mut map = Map::new();
        map.insert(
            "conditions".to_string(),
            Value::Array(condition.conditions.into_iter().map(Value::from).collect()),
        );
        let logic = match condition.logic {
            ConditionLogic::And => "and",
            ConditionLogic::Or => "or",
        };
        map.insert("logic".to_string(), Value::String(logic.to_string()));
        Value::Object(map)
    }
}
