//! Configuration for action execution
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Upper bound accepted for `max_chain_depth`
const MAX_SUPPORTED_CHAIN_DEPTH: usize = 1024;

/// Configuration for the action executor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Literal value in an `onError.set` map replaced by the error message
    pub error_message_sentinel: String,

    /// Maximum depth of `onSuccess`/`onError` action chains
    pub max_chain_depth: usize,

    /// Optional handler timeout in milliseconds (`None` waits forever)
    pub handler_timeout_ms: Option<u64>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            error_message_sentinel: "$error.message".to_string(),
            max_chain_depth: 16,
            handler_timeout_ms: None,
        }
    }
}

impl ExecutorConfig {
    /// Handler timeout as a `Duration`
    pub fn handler_timeout(&self) -> Option<Duration> {
        self.handler_timeout_ms.map(Duration::from_millis)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.error_message_sentinel.is_empty() {
            return Err("error_message_sentinel cannot be empty".to_string());
        }

        if self.max_chain_depth == 0 {
            return Err("max_chain_depth must be greater than 0".to_string());
        }

        if self.max_chain_depth > MAX_SUPPORTED_CHAIN_DEPTH {
            return Err(format!(
                "max_chain_depth cannot exceed {}",
                MAX_SUPPORTED_CHAIN_DEPTH
            ));
        }

        if self.handler_timeout_ms == Some(0) {
            return Err("handler_timeout_ms must be greater than 0 when set".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_config_is_valid() {
        let config = ExecutorConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.error_message_sentinel, "$error.message");
        assert_eq!(config.handler_timeout(), None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ExecutorConfig =
            serde_json::from_value(json!({"handler_timeout_ms": 250})).unwrap();
        assert_eq!(config.handler_timeout(), Some(Duration::from_millis(250)));
        assert_eq!(config.max_chain_depth, 16);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero_depth = ExecutorConfig {
            max_chain_depth: 0,
            ..Default::default()
        };
        assert!(zero_depth.validate().is_err());

        let huge_depth = ExecutorConfig {
            max_chain_depth: MAX_SUPPORTED_CHAIN_DEPTH + 1,
            ..Default::default()
        };
        assert!(huge_depth.validate().is_err());

        let zero_timeout = ExecutorConfig {
            handler_timeout_ms: Some(0),
            ..Default::default()
        };
        assert!(zero_timeout.validate().is_err());

        let empty_sentinel = ExecutorConfig {
            error_message_sentinel: String::new(),
            ..Default::default()
        };
        assert!(empty_sentinel.validate().is_err());
    }
}
