//! Visibility Evaluator
//!
//! Combines a visibility condition's entries into a show/hide decision.
//! Each call is independent and pure; nothing is cached.

use crate::models::{AuthCondition, ConditionEntry, ConditionLogic, VisibilityCondition};
use crate::services::logic_evaluator::{evaluate_logic, EvaluationContext};

/// Whether an element with `condition` is shown
///
/// An element without a condition is visible.
///
/// # Example
///
/// ```rust
/// use dynui_core::models::{AuthContext, VisibilityCondition};
/// use dynui_core::services::{is_visible, EvaluationContext};
/// use serde_json::json;
///
/// let data = json!({"cart": {"hasItems": true}});
/// let auth = AuthContext::signed_in();
/// let condition: VisibilityCondition = serde_json::from_value(json!({
///     "conditions": [{"auth": "signedIn"}, {"path": "/cart/hasItems"}],
///     "logic": "and"
/// })).unwrap();
///
/// let ctx = EvaluationContext::new(&data).with_auth(&auth);
/// assert!(is_visible(Some(&condition), &ctx));
/// assert!(is_visible(None, &ctx));
/// ```
pub fn is_visible(condition: Option<&VisibilityCondition>, ctx: &EvaluationContext<'_>) -> bool {
    let Some(condition) = condition else {
        return true;
    };
    let mut entries = condition
        .conditions
        .iter()
        .map(|entry| evaluate_condition_entry(entry, ctx));
    match condition.logic {
        ConditionLogic::And => entries.all(|holds| holds),
        ConditionLogic::Or => entries.any(|holds| holds),
    }
}

/// Evaluate a single top-level entry
pub fn evaluate_condition_entry(entry: &ConditionEntry, ctx: &EvaluationContext<'_>) -> bool {
    match entry {
        ConditionEntry::Auth(auth) => evaluate_auth(auth, ctx),
        ConditionEntry::Expression(expr) => evaluate_logic(expr, ctx),
    }
}

/// Evaluate an auth leaf; no auth context means signed out with no facts
pub fn evaluate_auth(condition: &AuthCondition, ctx: &EvaluationContext<'_>) -> bool {
    match ctx.auth {
        Some(auth) => auth.holds(condition),
        None => matches!(condition, AuthCondition::SignedOut),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuthContext, LogicExpression};
    use serde_json::{json, Value};

    fn condition(value: Value) -> VisibilityCondition {
        VisibilityCondition::try_from(value).expect("valid condition")
    }

    #[test]
    fn test_no_condition_is_visible() {
        let data = json!({});
        assert!(is_visible(None, &EvaluationContext::new(&data)));
    }

    #[test]
    fn test_boolean_shorthands() {
        let data = json!({});
        let ctx = EvaluationContext::new(&data);
        assert!(is_visible(Some(&VisibilityCondition::always()), &ctx));
        assert!(!is_visible(Some(&VisibilityCondition::never()), &ctx));
    }

    #[test]
    fn test_and_requires_all_entries() {
        let data = json!({"a": true, "b": false});
        let ctx = EvaluationContext::new(&data);
        assert!(!is_visible(
            Some(&condition(json!({"conditions": [{"path": "/a"}, {"path": "/b"}], "logic": "and"}))),
            &ctx
        ));
        assert!(is_visible(
            Some(&condition(json!({"conditions": [{"path": "/a"}, {"path": "/b"}], "logic": "or"}))),
            &ctx
        ));
    }

    #[test]
    fn test_empty_condition_lists() {
        let data = json!({});
        let ctx = EvaluationContext::new(&data);
        assert!(is_visible(Some(&VisibilityCondition::all([])), &ctx));
        assert!(!is_visible(Some(&VisibilityCondition::any([])), &ctx));
    }

    #[test]
    fn test_auth_leaves() {
        let data = json!({});
        let signed_in = AuthContext::signed_in().with_fact("admin");
        let in_ctx = EvaluationContext::new(&data).with_auth(&signed_in);
        let anon_ctx = EvaluationContext::new(&data);

        assert!(is_visible(Some(&VisibilityCondition::signed_in()), &in_ctx));
        assert!(!is_visible(Some(&VisibilityCondition::signed_out()), &in_ctx));
        assert!(!is_visible(Some(&VisibilityCondition::signed_in()), &anon_ctx));
        assert!(is_visible(Some(&VisibilityCondition::signed_out()), &anon_ctx));

        let admin_only = condition(json!({"auth": "admin"}));
        assert!(is_visible(Some(&admin_only), &in_ctx));
        assert!(!is_visible(Some(&admin_only), &anon_ctx));
    }

    #[test]
    fn test_mixed_auth_and_expression() {
        let data = json!({"user": {"role": "editor"}});
        let auth = AuthContext::signed_in();
        let ctx = EvaluationContext::new(&data).with_auth(&auth);
        let cond = VisibilityCondition::all([
            ConditionEntry::Auth(AuthCondition::SignedIn),
            ConditionEntry::Expression(LogicExpression::eq(
                crate::models::DynamicValue::path("/user/role"),
                crate::models::DynamicValue::literal("editor"),
            )),
        ]);
        assert!(is_visible(Some(&cond), &ctx));
    }

    #[test]
    fn test_when_path_truthiness() {
        let cond = VisibilityCondition::when("/show");
        let shown = json!({"show": "yes"});
        let hidden = json!({"show": ""});
        assert!(is_visible(Some(&cond), &EvaluationContext::new(&shown)));
        assert!(!is_visible(Some(&cond), &EvaluationContext::new(&hidden)));
    }
}
