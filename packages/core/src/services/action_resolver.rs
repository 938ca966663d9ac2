//! Action Resolution
//!
//! Turns a declarative [`Action`] into a [`ResolvedAction`] against a data
//! model snapshot:
//!
//! - every param is resolved as a dynamic value (absent references are
//!   dropped from the resolved map; nested literals keep their shape);
//! - `${/path}` placeholders in the confirmation title and message are
//!   replaced with the stringified value at that path (absent or `null`
//!   becomes the empty string).

use crate::data::get_by_path;
use crate::models::{display_value, Action, ConfirmSpec, DynamicValue, ResolvedAction};
use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const PLACEHOLDER_PATTERN: &str = r"\$\{([^}]+)\}";

fn placeholder_regex() -> &'static Regex {
    static PLACEHOLDER_REGEX: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER_REGEX.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).unwrap())
}

/// Resolve `action` against `data`
///
/// # Example
///
/// ```rust
/// use dynui_core::models::{Action, ConfirmSpec, DynamicValue};
/// use dynui_core::services::resolve_action;
/// use serde_json::json;
///
/// let data = json!({"item": {"id": 7, "name": "Lamp"}});
/// let action = Action::new("delete")
///     .with_param("id", DynamicValue::path("/item/id"))
///     .with_confirm(ConfirmSpec::new("Delete ${/item/name}?", "Really?"));
///
/// let resolved = resolve_action(&action, &data);
/// assert_eq!(resolved.params["id"], json!(7));
/// assert_eq!(resolved.confirm.unwrap().title, "Delete Lamp?");
/// ```
pub fn resolve_action(action: &Action, data: &Value) -> ResolvedAction {
    ResolvedAction {
        name: action.name.clone(),
        params: resolve_params(&action.params, data),
        confirm: action
            .confirm
            .as_ref()
            .map(|confirm| interpolate_confirm(confirm, data)),
        on_success: action.on_success.clone(),
        on_error: action.on_error.clone(),
    }
}

/// Resolve every param; keys whose reference is absent are omitted
pub fn resolve_params(params: &BTreeMap<String, DynamicValue>, data: &Value) -> Map<String, Value> {
    params
        .iter()
        .filter_map(|(name, value)| value.resolve(data).map(|v| (name.clone(), v.clone())))
        .collect()
}

/// Replace each `${/path}` placeholder in `template`
pub fn interpolate_string(template: &str, data: &Value) -> String {
    placeholder_regex()
        .replace_all(template, |caps: &Captures<'_>| {
            display_value(get_by_path(data, caps[1].trim()))
        })
        .into_owned()
}

fn interpolate_confirm(confirm: &ConfirmSpec, data: &Value) -> ConfirmSpec {
    ConfirmSpec {
        title: interpolate_string(&confirm.title, data),
        message: interpolate_string(&confirm.message, data),
        ..confirm.clone()
    }
}
