//! Logic Expression Evaluator
//!
//! Evaluates [`LogicExpression`] trees against a data model snapshot.
//! Evaluation is synchronous, never mutates the model and never fails:
//! absent values simply take part in comparisons as absent.
//!
//! - `and` / `or` evaluate left-to-right and short-circuit.
//! - Comparisons resolve both operands first, then compare with strict,
//!   non-coercing semantics (see [`strict_equals`] and [`compare_values`]).
//! - A bare value is a truthiness test (see [`is_truthy`]).

use crate::models::{
    compare_values, is_truthy, strict_equals, AuthContext, Comparison, LogicExpression, Operand,
};
use serde_json::Value;
use std::borrow::Cow;
use std::cmp::Ordering;

/// Inputs shared by every evaluation call
#[derive(Debug, Clone, Copy)]
pub struct EvaluationContext<'a> {
    pub data: &'a Value,
    pub auth: Option<&'a AuthContext>,
}

impl<'a> EvaluationContext<'a> {
    pub fn new(data: &'a Value) -> Self {
        Self { data, auth: None }
    }

    pub fn with_auth(mut self, auth: &'a AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }
}

/// Evaluate `expr` to a boolean
///
/// # Example
///
/// ```rust
/// use dynui_core::models::LogicExpression;
/// use dynui_core::services::{evaluate_logic, EvaluationContext};
/// use serde_json::json;
///
/// let data = json!({"price": "100"});
/// let expr: LogicExpression = serde_json::from_value(json!({"eq": [{"path": "/price"}, 100]})).unwrap();
///
/// // No coercion: the string "100" is not the number 100
/// assert!(!evaluate_logic(&expr, &EvaluationContext::new(&data)));
/// ```
pub fn evaluate_logic(expr: &LogicExpression, ctx: &EvaluationContext<'_>) -> bool {
    match expr {
        LogicExpression::And(operands) => operands.iter().all(|op| evaluate_logic(op, ctx)),
        LogicExpression::Or(operands) => operands.iter().any(|op| evaluate_logic(op, ctx)),
        LogicExpression::Not(inner) => !evaluate_logic(inner, ctx),
        LogicExpression::Compare { op, left, right } => {
            let left = resolve_operand(left, ctx);
            let right = resolve_operand(right, ctx);
            compare(*op, left.as_deref(), right.as_deref())
        }
        LogicExpression::Value(value) => is_truthy(value.resolve(ctx.data)),
    }
}

fn resolve_operand<'a>(operand: &'a Operand, ctx: &EvaluationContext<'a>) -> Option<Cow<'a, Value>> {
    match operand {
        Operand::Value(value) => value.resolve(ctx.data).map(Cow::Borrowed),
        Operand::Expression(expr) => Some(Cow::Owned(Value::Bool(evaluate_logic(expr, ctx)))),
    }
}

fn compare(op: Comparison, left: Option<&Value>, right: Option<&Value>) -> bool {
    match op {
        Comparison::Eq => strict_equals(left, right),
        Comparison::Neq => !strict_equals(left, right),
        Comparison::Gt => compare_values(left, right) == Some(Ordering::Greater),
        Comparison::Gte => matches!(
            compare_values(left, right),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        Comparison::Lt => compare_values(left, right) == Some(Ordering::Less),
        Comparison::Lte => matches!(
            compare_values(left, right),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

#[cfg(test)]
#[path = "logic_evaluator_test.rs"]
mod logic_evaluator_test;
