//! Shared primitives for the selfheal workspace.
//!
//! Everything the element repository and the self-healing resolver exchange
//! with a live document lives here: geometry, element descriptions, the typed
//! DOM probes and the [`LiveDocument`] trait itself.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod document;
pub mod geometry;
pub mod locator;

pub use document::*;
pub use geometry::BoundingBox;

/// Identifier of one automation session.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_unique() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert_eq!(a.to_string(), a.0);
    }
}
