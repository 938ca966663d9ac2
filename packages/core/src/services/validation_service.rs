//! Validation Engine
//!
//! Runs a [`ValidationRule`] against an input value:
//!
//! 1. If the rule has an `enabled` expression and it evaluates to false, the
//!    rule is skipped and the result is valid with no errors.
//! 2. Otherwise every check runs in declared order. There is no
//!    short-circuit; each failing check contributes its message.
//!
//! A check's function is looked up first among the caller's custom functions
//! and then in the built-in catalog (`required`, `email`, `minLength`,
//! `maxLength`, `pattern`, `numeric`, `matches`). Check arguments are dynamic
//! values resolved against the data model before the function runs.
//!
//! Custom function errors are returned to the caller as
//! [`ValidationError::CustomFunction`]; the engine never swallows them.

use crate::models::{
    strict_equals, BuiltinCheck, CheckFunction, CheckResult, ValidationCheck, ValidationResult,
    ValidationRule,
};
use crate::services::error::ValidationError;
use crate::services::logic_evaluator::{evaluate_logic, EvaluationContext};
use regex::Regex;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

const EMAIL_PATTERN: &str = r"^[^\s@]+@[^\s@]+\.[^\s@]+$";
const LEADING_FLOAT_PATTERN: &str =
    r"^[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)";

/// A caller-supplied validation function
///
/// Receives the (possibly absent) input value and the resolved arguments.
/// Returning `Err` aborts the whole validation run.
pub trait CustomValidator: Send + Sync {
    fn validate(&self, value: Option<&Value>, args: &Map<String, Value>) -> anyhow::Result<bool>;
}

impl<F> CustomValidator for F
where
    F: Fn(Option<&Value>, &Map<String, Value>) -> anyhow::Result<bool> + Send + Sync,
{
    fn validate(&self, value: Option<&Value>, args: &Map<String, Value>) -> anyhow::Result<bool> {
        (self)(value, args)
    }
}

/// Runs validation rules with an optional set of custom functions
///
/// # Example
///
/// ```rust
/// use dynui_core::models::{ValidationCheck, ValidationRule};
/// use dynui_core::services::ValidationEngine;
/// use serde_json::json;
///
/// let engine = ValidationEngine::new();
/// let rule = ValidationRule::new(vec![
///     ValidationCheck::required("Name is required"),
///     ValidationCheck::min_length(3, "Name is too short"),
/// ]);
///
/// let result = engine.run_validation(&rule, Some(&json!("Al")), &json!({})).unwrap();
/// assert!(!result.valid);
/// assert_eq!(result.errors, vec!["Name is too short"]);
/// ```
#[derive(Clone, Default)]
pub struct ValidationEngine {
    custom: HashMap<String, Arc<dyn CustomValidator>>,
}

impl std::fmt::Debug for ValidationEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.custom.keys().collect();
        names.sort();
        f.debug_struct("ValidationEngine")
            .field("custom", &names)
            .finish()
    }
}

impl ValidationEngine {
    /// Engine with only the built-in catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a custom function (builder form)
    pub fn with_function<F>(mut self, name: impl Into<String>, function: F) -> Self
    where
        F: Fn(Option<&Value>, &Map<String, Value>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.register(name, function);
        self
    }

    /// Register a custom function, replacing any previous one with that name
    pub fn register<F>(&mut self, name: impl Into<String>, function: F)
    where
        F: Fn(Option<&Value>, &Map<String, Value>) -> anyhow::Result<bool> + Send + Sync + 'static,
    {
        self.register_validator(name, function);
    }

    /// Register a [`CustomValidator`] implementation
    pub fn register_validator(
        &mut self,
        name: impl Into<String>,
        validator: impl CustomValidator + 'static,
    ) {
        self.custom.insert(name.into(), Arc::new(validator));
    }

    /// Whether `name` resolves to a custom or built-in function
    pub fn knows(&self, name: &str) -> bool {
        self.custom.contains_key(name) || BuiltinCheck::from_name(name).is_some()
    }

    /// Construction-time check that every function in `rule` is known
    pub fn check_rule(&self, rule: &ValidationRule) -> Result<(), ValidationError> {
        match rule
            .checks
            .iter()
            .find(|check| !self.knows(check.function.name()))
        {
            Some(check) => Err(ValidationError::unknown_function(check.function.name())),
            None => Ok(()),
        }
    }

    /// Run `rule` against `value`
    ///
    /// `data` is the data model used to evaluate `enabled` and to resolve
    /// check arguments.
    pub fn run_validation(
        &self,
        rule: &ValidationRule,
        value: Option<&Value>,
        data: &Value,
    ) -> Result<ValidationResult, ValidationError> {
        if let Some(enabled) = &rule.enabled {
            if !evaluate_logic(enabled, &EvaluationContext::new(data)) {
                return Ok(ValidationResult::skipped());
            }
        }

        let checks = rule
            .checks
            .iter()
            .map(|check| self.run_check(check, value, data))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(ValidationResult::from_checks(checks))
    }

    /// Run a single check
    pub fn run_check(
        &self,
        check: &ValidationCheck,
        value: Option<&Value>,
        data: &Value,
    ) -> Result<CheckResult, ValidationError> {
        let name = check.function.name();
        let args = resolve_args(check, data);

        let valid = if let Some(custom) = self.custom.get(name) {
            custom
                .validate(value, &args)
                .map_err(|e| ValidationError::custom_function(name, e))?
        } else if let CheckFunction::Builtin(builtin) = &check.function {
            run_builtin(*builtin, value, &args)
        } else {
            tracing::warn!("Unknown validation function: {}", name);
            true
        };

        Ok(CheckResult {
            function: name.to_string(),
            valid,
            message: check.message.clone(),
        })
    }
}

/// Resolve a check's arguments; absent references are omitted
fn resolve_args(check: &ValidationCheck, data: &Value) -> Map<String, Value> {
    check
        .args
        .iter()
        .filter_map(|(name, arg)| arg.resolve(data).map(|value| (name.clone(), value.clone())))
        .collect()
}

/// Run a built-in check against already-resolved arguments
pub fn run_builtin(check: BuiltinCheck, value: Option<&Value>, args: &Map<String, Value>) -> bool {
    match check {
        BuiltinCheck::Required => is_present(value),
        BuiltinCheck::Email => value
            .and_then(Value::as_str)
            .is_some_and(|s| email_regex().is_match(s)),
        BuiltinCheck::MinLength => match (value.and_then(Value::as_str), length_arg(args, "min")) {
            (Some(s), Some(min)) => (s.chars().count() as f64) >= min,
            _ => false,
        },
        BuiltinCheck::MaxLength => match (value.and_then(Value::as_str), length_arg(args, "max")) {
            (Some(s), Some(max)) => (s.chars().count() as f64) <= max,
            _ => false,
        },
        BuiltinCheck::Pattern => match (
            value.and_then(Value::as_str),
            args.get("pattern").and_then(Value::as_str),
        ) {
            (Some(s), Some(pattern)) => match Regex::new(pattern) {
                Ok(re) => re.is_match(s),
                Err(e) => {
                    tracing::debug!("Invalid validation pattern '{}': {}", pattern, e);
                    false
                }
            },
            _ => false,
        },
        BuiltinCheck::Numeric => is_numeric(value),
        BuiltinCheck::Matches => match args.get("other") {
            Some(other) => strict_equals(value, Some(other)),
            None => false,
        },
    }
}

/// `required`: only absent, `null`, blank strings and empty arrays are missing
fn is_present(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(_) => true,
    }
}

/// `numeric`: any JSON number, or a string starting with a parseable float
///
/// `"Infinity"` and `"-Infinity"` are accepted; `"NaN"` is not.
fn is_numeric(value: Option<&Value>) -> bool {
    match value {
        Some(Value::Number(_)) => true,
        Some(Value::String(s)) => leading_float_regex()
            .find(s.trim_start())
            .and_then(|m| {
                let literal = m.as_str().replace("Infinity", "inf");
                literal.parse::<f64>().ok()
            })
            .is_some_and(|f| !f.is_nan()),
        _ => false,
    }
}

fn length_arg(args: &Map<String, Value>, name: &str) -> Option<f64> {
    args.get(name).and_then(Value::as_f64)
}

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    EMAIL_REGEX.get_or_init(|| Regex::new(EMAIL_PATTERN).unwrap())
}

fn leading_float_regex() -> &'static Regex {
    static FLOAT_REGEX: OnceLock<Regex> = OnceLock::new();
    FLOAT_REGEX.get_or_init(|| Regex::new(LEADING_FLOAT_PATTERN).unwrap())
}

#[cfg(test)]
#[path = "validation_service_test.rs"]
mod validation_service_test;
