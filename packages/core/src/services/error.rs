//! Service Layer Error Types
//!
//! Validation *failures* are not errors: they are reported as
//! `ValidationResult { valid: false, .. }`. The errors here cover the two
//! cases that are: a rule naming a function nobody registered (reported by
//! the construction-time lint) and a custom function that failed.

use thiserror::Error;

/// Validation engine errors
#[derive(Error, Debug)]
pub enum ValidationError {
    /// A check names a function that is neither custom nor built-in
    #[error("Unknown validation function: {name}")]
    UnknownFunction { name: String },

    /// A caller-supplied validation function returned an error
    ///
    /// The engine does not recover from these; the original error is kept as
    /// the source.
    #[error("Custom validation function '{function}' failed: {source}")]
    CustomFunction {
        function: String,
        #[source]
        source: anyhow::Error,
    },
}

impl ValidationError {
    /// Create an unknown function error
    pub fn unknown_function(name: impl Into<String>) -> Self {
        Self::UnknownFunction { name: name.into() }
    }

    /// Wrap a custom function failure
    pub fn custom_function(function: impl Into<String>, source: anyhow::Error) -> Self {
        Self::CustomFunction {
            function: function.into(),
            source,
        }
    }
}
