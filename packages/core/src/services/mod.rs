//! Evaluation Services
//!
//! Synchronous evaluators built on the data layer and the models:
//!
//! - [`logic_evaluator`] - nested boolean/comparison expressions
//! - [`visibility_service`] - show/hide decisions with auth leaves
//! - [`validation_service`] - rule execution with custom functions
//! - [`action_resolver`] - param resolution and confirmation interpolation
//!
//! None of these mutate the data model.

pub mod action_resolver;
pub mod error;
pub mod logic_evaluator;
pub mod validation_service;
pub mod visibility_service;

pub use action_resolver::{interpolate_string, resolve_action, resolve_params};
pub use error::ValidationError;
pub use logic_evaluator::{evaluate_logic, EvaluationContext};
pub use validation_service::{run_builtin, CustomValidator, ValidationEngine};
pub use visibility_service::{evaluate_auth, evaluate_condition_entry, is_visible};
