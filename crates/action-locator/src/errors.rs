//! Error types for the healing strategies

use perceiver_visual::VisualError;
use selfheal_core_types::DocumentError;
use thiserror::Error;

/// Failure inside one strategy. The resolver never surfaces these to callers;
/// they are logged and the strategy is treated as having abstained.
#[derive(Debug, Error, Clone)]
pub enum LocatorError {
    /// Live document query, screenshot or probe failed
    #[error("Document error: {0}")]
    Document(#[from] DocumentError),

    /// Vision backend failed
    #[error("Vision error: {0}")]
    Visual(String),
}

impl From<VisualError> for LocatorError {
    fn from(err: VisualError) -> Self {
        LocatorError::Visual(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_errors_convert() {
        let err: LocatorError = DocumentError::Closed.into();
        assert!(matches!(err, LocatorError::Document(DocumentError::Closed)));
    }

    #[test]
    fn visual_errors_keep_message() {
        let err: LocatorError = VisualError::InvalidInput("empty template".into()).into();
        assert!(err.to_string().contains("empty template"));
    }
}
