//! Error types for action execution
//!
//! Handler failures are not represented here: they are routed into the
//! action's error continuation and reported as `ActionOutcome::Failed`.
//! These errors cover conditions the executor itself cannot proceed from.

use thiserror::Error;

/// Errors that stop an action before or instead of running its handler
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ActionError {
    /// No handler is registered under the action's name
    #[error("No handler registered for action '{name}'")]
    UnknownAction { name: String },

    /// A success/error continuation chained too deeply
    ///
    /// Usually indicates a cycle (`a` chains to `b`, `b` chains to `a`).
    #[error("Action chain exceeded maximum depth {depth} at action '{name}'")]
    ChainDepthExceeded { name: String, depth: usize },

    /// Executor configuration failed validation
    #[error("Invalid executor configuration: {0}")]
    InvalidConfig(String),
}

impl ActionError {
    /// Create an UnknownAction error
    pub fn unknown_action(name: impl Into<String>) -> Self {
        Self::UnknownAction { name: name.into() }
    }

    /// Create a ChainDepthExceeded error
    pub fn chain_depth_exceeded(name: impl Into<String>, depth: usize) -> Self {
        Self::ChainDepthExceeded {
            name: name.into(),
            depth,
        }
    }
}
