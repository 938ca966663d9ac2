//! Action Types
//!
//! An action is a named, confirmable, chainable unit of caller-defined work:
//!
//! ```json
//! {
//!   "name": "deleteItem",
//!   "params": { "id": { "path": "/selection/id" } },
//!   "confirm": { "title": "Delete ${/selection/name}?", "message": "This cannot be undone", "variant": "danger" },
//!   "onSuccess": { "set": { "/selection/id": null } },
//!   "onError": { "set": { "/ui/error": "$error.message" } }
//! }
//! ```
//!
//! Effects are a sum type. When a wire object names more than one effect the
//! priority `navigate` > `set` > `action` decides which one is kept; the
//! others are discarded at parse time.

use crate::models::dynamic_value::DynamicValue;
use crate::models::error::ExpressionError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Visual emphasis of a confirmation dialog
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfirmVariant {
    #[default]
    Default,
    Danger,
}

/// Confirmation dialog content
///
/// `title` and `message` support `${/path}` placeholders, filled in when the
/// action is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmSpec {
    pub title: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancel_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variant: Option<ConfirmVariant>,
}

impl ConfirmSpec {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            confirm_label: None,
            cancel_label: None,
            variant: None,
        }
    }

    pub fn danger(mut self) -> Self {
        self.variant = Some(ConfirmVariant::Danger);
        self
    }

    pub fn with_labels(mut self, confirm: impl Into<String>, cancel: impl Into<String>) -> Self {
        self.confirm_label = Some(confirm.into());
        self.cancel_label = Some(cancel.into());
        self
    }
}

/// Continuation run after an action's handler settles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub enum Effect {
    /// Navigate to the resolved URL
    Navigate(DynamicValue),
    /// Write each value literally at its path key
    Set(BTreeMap<String, Value>),
    /// Run another action by name
    Chain(String),
}

impl Effect {
    pub fn navigate(target: DynamicValue) -> Self {
        Self::Navigate(target)
    }

    pub fn set<K, I>(entries: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        Self::Set(entries.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }

    pub fn chain(action: impl Into<String>) -> Self {
        Self::Chain(action.into())
    }
}

impl TryFrom<Value> for Effect {
    type Error = ExpressionError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let mut map = match value {
            Value::Object(map) => map,
            other => {
                return Err(ExpressionError::invalid_shape(
                    "effect",
                    format!("expected an object, got {}", other),
                ))
            }
        };

        if map.len() > 1 {
            tracing::debug!(
                "Effect names several continuations ({:?}); keeping the highest priority",
                map.keys().collect::<Vec<_>>()
            );
        }

        if let Some(target) = map.remove("navigate") {
            return Ok(Self::Navigate(DynamicValue::from(target)));
        }
        if let Some(set) = map.remove("set") {
            return match set {
                Value::Object(entries) => Ok(Self::Set(entries.into_iter().collect())),
                other => Err(ExpressionError::invalid_shape(
                    "set",
                    format!("expected an object of path -> value, got {}", other),
                )),
            };
        }
        match map.remove("action") {
            Some(Value::String(name)) => Ok(Self::Chain(name)),
            Some(other) => Err(ExpressionError::invalid_shape(
                "action",
                format!("expected an action name, got {}", other),
            )),
            None => Err(ExpressionError::invalid_shape(
                "effect",
                "expected one of 'navigate', 'set' or 'action'",
            )),
        }
    }
}

impl From<Effect> for Value {
    fn from(effect: Effect) -> Self {
        let (key, value) = match effect {
            Effect::Navigate(target) => ("navigate", target.into()),
            Effect::Set(entries) => ("set", Value::Object(entries.into_iter().collect())),
            Effect::Chain(name) => ("action", Value::String(name)),
        };
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        Value::Object(map)
    }
}

/// Declarative action definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Action {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, DynamicValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ConfirmSpec>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Effect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Effect>,
}

impl Action {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: BTreeMap::new(),
            confirm: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn with_param(mut self, name: impl Into<String>, value: DynamicValue) -> Self {
        self.params.insert(name.into(), value);
        self
    }

    pub fn with_confirm(mut self, confirm: ConfirmSpec) -> Self {
        self.confirm = Some(confirm);
        self
    }

    pub fn on_success(mut self, effect: Effect) -> Self {
        self.on_success = Some(effect);
        self
    }

    pub fn on_error(mut self, effect: Effect) -> Self {
        self.on_error = Some(effect);
        self
    }
}

/// An action with params resolved and confirmation text interpolated
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedAction {
    pub name: String,
    /// Resolved params; keys whose reference was absent are omitted
    pub params: Map<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<ConfirmSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_success: Option<Effect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_error: Option<Effect>,
}
