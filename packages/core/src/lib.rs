//! DynUI Core Evaluation Runtime
//!
//! This crate evaluates the declarative parts of a JSON-described user
//! interface against a shared data model: conditional visibility, logic
//! expressions, field validation and user-triggered actions.
//!
//! # Architecture
//!
//! - **JSON data model**: one `serde_json::Value` tree addressed by
//!   pointer-style paths (`/form/email`, `/items/0/name`)
//! - **Dynamic values**: any literal may instead be `{ "path": "/x" }`,
//!   resolved at evaluation time
//! - **Pure evaluation**: logic, visibility and validation never mutate data
//! - **Async actions**: handlers are caller-supplied; the executor owns
//!   confirmation, loading state and success/error continuations
//!
//! # Modules
//!
//! - [`data`] - Path resolution and the shared `DataModel`
//! - [`models`] - Wire-format structures (expressions, rules, actions)
//! - [`services`] - Synchronous evaluators (logic, visibility, validation, resolution)
//! - [`operations`] - `ActionExecutor` and handler registry
//! - [`config`] - Executor configuration

pub mod config;
pub mod data;
pub mod models;
pub mod operations;
pub mod services;

// Re-export commonly used types
pub use config::ExecutorConfig;
pub use data::DataModel;
pub use models::{
    Action, AuthCondition, AuthContext, ConfirmSpec, DynamicValue, Effect, ExpressionError,
    LogicExpression, ValidationCheck, ValidationResult, ValidationRule, VisibilityCondition,
};
pub use operations::{
    handler_fn, ActionError, ActionExecutor, ActionHandler, ActionHost, ActionOutcome,
    ActionRegistry, ConfirmationRequest, ModelHost,
};
pub use services::{
    evaluate_logic, is_visible, resolve_action, EvaluationContext, ValidationEngine,
    ValidationError,
};
