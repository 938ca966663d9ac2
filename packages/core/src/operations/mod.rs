//! Action Operations
//!
//! The stateful half of the runtime: running actions against caller-supplied
//! handlers, gating them on confirmation and applying their continuations.
//!
//! - [`action_executor`] - `ActionExecutor` state machine, handler registry and host seam
//! - [`error`] - errors that stop an action from running

pub mod action_executor;
pub mod error;

// Re-export types for convenience
pub use action_executor::{
    handler_fn, ActionExecutor, ActionHandler, ActionHost, ActionOutcome, ActionRegistry,
    ConfirmationRequest, FnHandler, ModelHost,
};
pub use error::ActionError;
