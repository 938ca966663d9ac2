//! Error types for parsing declarative wire shapes
//!
//! These errors are raised only when JSON is converted into the typed model
//! (expressions, conditions, effects). Evaluation itself never fails: a path
//! that does not resolve is simply absent.

use thiserror::Error;

/// Errors produced while parsing declarative JSON into typed structures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExpressionError {
    /// An operator key carried a value of the wrong JSON type
    #[error("Invalid '{operator}' expression: {reason}")]
    InvalidShape { operator: String, reason: String },

    /// A comparison did not carry exactly two operands
    #[error("Comparison '{operator}' expects 2 operands, got {actual}")]
    WrongArity { operator: String, actual: usize },

    /// An auth leaf appeared inside a logic expression
    ///
    /// Auth leaves are only valid as direct entries of a visibility
    /// condition's top-level list.
    #[error("Auth condition '{condition}' cannot be nested inside a logic expression")]
    AuthNotNestable { condition: String },

    /// A visibility condition named an unknown combinator
    #[error("Invalid condition logic '{0}': expected \"and\" or \"or\"")]
    InvalidLogic(String),
}

impl ExpressionError {
    /// Create an InvalidShape error
    pub fn invalid_shape(operator: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidShape {
            operator: operator.into(),
            reason: reason.into(),
        }
    }

    /// Create a WrongArity error
    pub fn wrong_arity(operator: impl Into<String>, actual: usize) -> Self {
        Self::WrongArity {
            operator: operator.into(),
            actual,
        }
    }

    /// Create an AuthNotNestable error
    pub fn auth_not_nestable(condition: impl Into<String>) -> Self {
        Self::AuthNotNestable {
            condition: condition.into(),
        }
    }
}
