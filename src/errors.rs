//! Error handling module

use thiserror::Error;

/// Errors raised while loading configuration or exporting metrics
#[derive(Debug, Error)]
pub enum SelfHealError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("invalid value '{value}' for {key}")]
    InvalidOverride { key: String, value: String },

    #[error("failed to encode metrics: {0}")]
    Metrics(String),
}

/// Failure reported by an automation action run through a healing session
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    /// The locator matched nothing; the only failure that triggers healing
    #[error("element not found: {locator}")]
    ElementNotFound { locator: String },

    #[error("action timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("action failed: {0}")]
    Failed(String),
}

impl ActionError {
    pub fn element_not_found(locator: impl Into<String>) -> Self {
        ActionError::ElementNotFound {
            locator: locator.into(),
        }
    }

    pub fn is_element_not_found(&self) -> bool {
        matches!(self, ActionError::ElementNotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_missing_elements_are_healable() {
        assert!(ActionError::element_not_found("#go").is_element_not_found());
        assert!(!ActionError::Timeout { timeout_ms: 5 }.is_element_not_found());
        assert!(!ActionError::Failed("detached".into()).is_element_not_found());
        assert_eq!(
            ActionError::element_not_found("#go").to_string(),
            "element not found: #go"
        );
    }
}
