//! Visual Perceiver - template matching for selector self-healing
//!
//! This crate provides the optional vision capability used by the visual
//! healing strategy:
//! - PNG decode/encode/crop helpers shared with document backends
//! - Template matching of a captured element image against a fresh screenshot

pub mod codec;
pub mod errors;
pub mod matcher;
pub mod models;

// Re-exports
pub use errors::VisualError;
pub use matcher::{TemplateMatcher, VisionBackend};
pub use models::*;
