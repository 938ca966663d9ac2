//! Data Models
//!
//! Declarative structures evaluated by the runtime. Each type parses from the
//! JSON wire format and serializes back to it.
//!
//! - [`DynamicValue`] - literal or `{ "path": ... }` reference
//! - [`LogicExpression`] - nested boolean/comparison tree
//! - [`VisibilityCondition`] - show/hide decision with auth leaves
//! - [`ValidationRule`] - ordered checks with optional activation
//! - [`Action`] / [`Effect`] - confirmable, chainable work units

pub mod action;
pub mod dynamic_value;
pub mod error;
pub mod logic;
pub mod validation;
pub mod visibility;

pub use action::{Action, ConfirmSpec, ConfirmVariant, Effect, ResolvedAction};
pub use dynamic_value::{
    compare_values, display_value, is_truthy, resolve_dynamic_value, strict_equals, DynamicValue,
};
pub use error::ExpressionError;
pub use logic::{Comparison, LogicExpression, Operand};
pub use validation::{
    BuiltinCheck, CheckFunction, CheckResult, ValidationCheck, ValidationResult, ValidationRule,
    ValidationTrigger,
};
pub use visibility::{
    AuthCondition, AuthContext, ConditionEntry, ConditionLogic, VisibilityCondition,
};
