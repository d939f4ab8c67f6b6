//! Error types for visual matching operations
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub enum VisualError {
    /// Image bytes could not be decoded
    Decode(String),

    /// Image processing error
    ImageProcessing(String),

    /// Template matching failed
    MatchFailed(String),

    /// Invalid input parameters
    InvalidInput(String),
}

impl fmt::Display for VisualError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Decode(msg) => write!(f, "Image decode failed: {}", msg),
            Self::ImageProcessing(msg) => write!(f, "Image processing error: {}", msg),
            Self::MatchFailed(msg) => write!(f, "Template match failed: {}", msg),
            Self::InvalidInput(msg) => write!(f, "Invalid input: {}", msg),
        }
    }
}

impl std::error::Error for VisualError {}

impl From<image::ImageError> for VisualError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageProcessing(err.to_string())
    }
}
