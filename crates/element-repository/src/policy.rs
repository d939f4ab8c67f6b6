use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Capture and retention settings for the repository.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RepositoryPolicy {
    /// Bundles older than this are dropped by [`crate::ElementRepository::evict_expired`].
    pub max_age_ms: u64,
    /// Maximum characters of nearby text kept per bundle.
    pub max_text_len: usize,
    /// Take an element screenshot during capture.
    pub capture_snapshot: bool,
}

impl Default for RepositoryPolicy {
    fn default() -> Self {
        Self {
            max_age_ms: 60 * 60 * 1000,
            max_text_len: 100,
            capture_snapshot: true,
        }
    }
}

impl RepositoryPolicy {
    pub fn max_age(&self) -> Duration {
        Duration::from_millis(self.max_age_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_one_hour_retention() {
        let policy = RepositoryPolicy::default();
        assert_eq!(policy.max_age(), Duration::from_secs(3600));
        assert_eq!(policy.max_text_len, 100);
        assert!(policy.capture_snapshot);
    }

    #[test]
    fn partial_documents_fill_defaults() {
        let policy: RepositoryPolicy = serde_json::from_str(r#"{"max_age_ms": 1000}"#).unwrap();
        assert_eq!(policy.max_age_ms, 1000);
        assert_eq!(policy.max_text_len, 100);
    }
}
