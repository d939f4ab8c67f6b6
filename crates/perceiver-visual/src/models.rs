//! Data models for visual matching
use selfheal_core_types::BoundingBox;
use serde::{Deserialize, Serialize};

/// Best location of a template inside a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VisualMatch {
    /// Matched region in screenshot coordinates
    pub bounding_box: BoundingBox,

    /// Normalized match confidence (0.0-1.0)
    pub confidence: f64,
}

impl VisualMatch {
    /// Centre of the matched region
    pub fn center(&self) -> (f64, f64) {
        self.bounding_box.center()
    }

    /// Strictly above the acceptance threshold
    pub fn exceeds(&self, threshold: f64) -> bool {
        self.confidence > threshold
    }
}

/// Options for the template matcher
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatcherOptions {
    /// Integer downscale factor applied to both images before matching (1 = none)
    pub downscale: u32,
}

impl Default for MatcherOptions {
    fn default() -> Self {
        Self { downscale: 1 }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn threshold_is_strict() {
        let m = VisualMatch {
            bounding_box: BoundingBox::new(10.0, 10.0, 20.0, 10.0),
            confidence: 0.8,
        };
        assert!(!m.exceeds(0.8));
        assert!(m.exceeds(0.79));
        assert_eq!(m.center(), (20.0, 15.0));
    }
}
