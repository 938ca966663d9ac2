//! Validation Rule Types
//!
//! A validation rule is an ordered list of checks plus an optional
//! activation expression:
//!
//! ```json
//! {
//!   "checks": [
//!     { "fn": "required", "message": "Email is required" },
//!     { "fn": "minLength", "args": { "min": { "path": "/config/minEmail" } }, "message": "Too short" }
//!   ],
//!   "enabled": { "path": "/form/emailEnabled" },
//!   "validateOn": "blur"
//! }
//! ```
//!
//! Check arguments are dynamic values, resolved against the data model before
//! the check runs.

use crate::models::dynamic_value::DynamicValue;
use crate::models::logic::LogicExpression;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Built-in validation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuiltinCheck {
    Required,
    Email,
    MinLength,
    MaxLength,
    Pattern,
    Numeric,
    Matches,
}

impl BuiltinCheck {
    /// The fixed built-in catalog
    pub const ALL: [BuiltinCheck; 7] = [
        BuiltinCheck::Required,
        BuiltinCheck::Email,
        BuiltinCheck::MinLength,
        BuiltinCheck::MaxLength,
        BuiltinCheck::Pattern,
        BuiltinCheck::Numeric,
        BuiltinCheck::Matches,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Email => "email",
            Self::MinLength => "minLength",
            Self::MaxLength => "maxLength",
            Self::Pattern => "pattern",
            Self::Numeric => "numeric",
            Self::Matches => "matches",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|check| check.name() == name)
    }
}

/// The `fn` of a check: a built-in or a caller-registered function name
///
/// Custom functions registered under a built-in name take precedence over the
/// built-in at run time.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CheckFunction {
    Builtin(BuiltinCheck),
    Custom(String),
}

impl CheckFunction {
    pub fn name(&self) -> &str {
        match self {
            Self::Builtin(check) => check.name(),
            Self::Custom(name) => name,
        }
    }
}

impl From<String> for CheckFunction {
    fn from(name: String) -> Self {
        match BuiltinCheck::from_name(&name) {
            Some(check) => Self::Builtin(check),
            None => Self::Custom(name),
        }
    }
}

impl From<&str> for CheckFunction {
    fn from(name: &str) -> Self {
        Self::from(name.to_string())
    }
}

impl From<CheckFunction> for String {
    fn from(function: CheckFunction) -> Self {
        function.name().to_string()
    }
}

impl fmt::Display for CheckFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single check of a validation rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationCheck {
    #[serde(rename = "fn")]
    pub function: CheckFunction,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub args: BTreeMap<String, DynamicValue>,
    pub message: String,
}

impl ValidationCheck {
    pub fn new(function: impl Into<CheckFunction>, message: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            args: BTreeMap::new(),
            message: message.into(),
        }
    }

    pub fn with_arg(mut self, name: impl Into<String>, value: DynamicValue) -> Self {
        self.args.insert(name.into(), value);
        self
    }

    pub fn required(message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::Required), message)
    }

    pub fn email(message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::Email), message)
    }

    pub fn min_length(min: usize, message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::MinLength), message)
            .with_arg("min", DynamicValue::literal(min))
    }

    pub fn max_length(max: usize, message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::MaxLength), message)
            .with_arg("max", DynamicValue::literal(max))
    }

    pub fn pattern(pattern: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::Pattern), message)
            .with_arg("pattern", DynamicValue::literal(pattern.into()))
    }

    pub fn numeric(message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::Numeric), message)
    }

    /// Equality against the value at `other_path` (e.g. password confirmation)
    pub fn matches(other_path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(CheckFunction::Builtin(BuiltinCheck::Matches), message)
            .with_arg("other", DynamicValue::path(other_path))
    }

    pub fn custom(
        name: impl Into<String>,
        args: BTreeMap<String, DynamicValue>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            function: CheckFunction::Custom(name.into()),
            args,
            message: message.into(),
        }
    }
}

/// When a rule should run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationTrigger {
    Change,
    Blur,
    #[default]
    Submit,
}

/// Ordered checks for one input plus an optional activation expression
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationRule {
    pub checks: Vec<ValidationCheck>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<LogicExpression>,
    #[serde(default)]
    pub validate_on: ValidationTrigger,
}

impl ValidationRule {
    pub fn new(checks: Vec<ValidationCheck>) -> Self {
        Self {
            checks,
            enabled: None,
            validate_on: ValidationTrigger::default(),
        }
    }

    pub fn enabled_when(mut self, expr: LogicExpression) -> Self {
        self.enabled = Some(expr);
        self
    }

    pub fn validate_on(mut self, trigger: ValidationTrigger) -> Self {
        self.validate_on = trigger;
        self
    }

    /// Whether this rule should run for `event`
    ///
    /// A submit always validates. A blur validates `blur` and `change`
    /// rules. A change validates only `change` rules.
    pub fn runs_on(&self, event: ValidationTrigger) -> bool {
        match event {
            ValidationTrigger::Submit => true,
            ValidationTrigger::Blur => self.validate_on != ValidationTrigger::Submit,
            ValidationTrigger::Change => self.validate_on == ValidationTrigger::Change,
        }
    }
}

/// Outcome of one check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(rename = "fn")]
    pub function: String,
    pub valid: bool,
    pub message: String,
}

/// Aggregate outcome of a rule
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub valid: bool,
    pub errors: Vec<String>,
    #[serde(default)]
    pub checks: Vec<CheckResult>,
}

impl ValidationResult {
    /// Result for a rule whose activation expression was false
    pub fn skipped() -> Self {
        Self {
            valid: true,
            errors: Vec::new(),
            checks: Vec::new(),
        }
    }

    /// Build the aggregate from per-check outcomes in declared order
    pub fn from_checks(checks: Vec<CheckResult>) -> Self {
        let errors: Vec<String> = checks
            .iter()
            .filter(|check| !check.valid)
            .map(|check| check.message.clone())
            .collect();
        Self {
            valid: errors.is_empty(),
            errors,
            checks,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_rule_wire_format() {
        let rule: ValidationRule = serde_json::from_value(json!({
            "checks": [
                {"fn": "required", "message": "Required"},
                {"fn": "minLength", "args": {"min": {"path": "/config/min"}}, "message": "Short"},
                {"fn": "isSlug", "message": "Bad slug"}
            ],
            "enabled": {"path": "/enabled"},
            "validateOn": "change"
        }))
        .unwrap();

        assert_eq!(rule.checks.len(), 3);
        assert_eq!(
            rule.checks[0].function,
            CheckFunction::Builtin(BuiltinCheck::Required)
        );
        assert_eq!(
            rule.checks[1].args.get("min"),
            Some(&DynamicValue::path("/config/min"))
        );
        assert_eq!(
            rule.checks[2].function,
            CheckFunction::Custom("isSlug".to_string())
        );
        assert_eq!(rule.enabled, Some(LogicExpression::path("/enabled")));
        assert_eq!(rule.validate_on, ValidationTrigger::Change);
    }

    #[test]
    fn test_validate_on_defaults_to_submit() {
        let rule: ValidationRule = serde_json::from_value(json!({"checks": []})).unwrap();
        assert_eq!(rule.validate_on, ValidationTrigger::Submit);
        assert!(rule.runs_on(ValidationTrigger::Submit));
        assert!(!rule.runs_on(ValidationTrigger::Blur));
        assert!(!rule.runs_on(ValidationTrigger::Change));
    }

    #[test]
    fn test_change_rules_run_on_every_event() {
        let rule = ValidationRule::new(vec![]).validate_on(ValidationTrigger::Change);
        assert!(rule.runs_on(ValidationTrigger::Change));
        assert!(rule.runs_on(ValidationTrigger::Blur));
        assert!(rule.runs_on(ValidationTrigger::Submit));
    }

    #[test]
    fn test_builders_serialize_like_wire_format() {
        let check = ValidationCheck::matches("/form/password", "Passwords must match");
        assert_eq!(
            serde_json::to_value(&check).unwrap(),
            json!({"fn": "matches", "args": {"other": {"path": "/form/password"}}, "message": "Passwords must match"})
        );
    }

    #[test]
    fn test_from_checks_collects_errors_in_order() {
        let result = ValidationResult::from_checks(vec![
            CheckResult { function: "required".into(), valid: false, message: "a".into() },
            CheckResult { function: "email".into(), valid: true, message: "b".into() },
            CheckResult { function: "minLength".into(), valid: false, message: "c".into() },
        ]);
        assert!(!result.valid);
        assert_eq!(result.errors, vec!["a", "c"]);
    }
}
