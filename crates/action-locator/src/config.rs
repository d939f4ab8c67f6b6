//! Resolver tuning

use crate::types::HealStrategy;
use serde::{Deserialize, Serialize};

/// Knobs for the healing cascade. Every field has a default so partial YAML works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Minimum vision confidence; a match must be strictly above it
    pub visual_threshold: f64,
    /// Relative width/height deviation accepted by the size heuristic
    pub size_tolerance: f64,
    /// Roles tried by the role-name strategy, in order
    pub roles: Vec<String>,
    /// Prefix length for the partial role-name retry
    pub partial_name_len: usize,
    /// Prefix length of nearby text used in text queries
    pub text_query_len: usize,
    /// Base selectors combined with `:has-text(...)`
    pub text_tags: Vec<String>,
    /// Elements considered by the size heuristic
    pub visual_scan_tags: Vec<String>,
    /// Tags treated as interactive by the text-anchor walk
    pub interactive_tags: Vec<String>,
    pub disabled_strategies: Vec<HealStrategy>,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            visual_threshold: 0.8,
            size_tolerance: 0.2,
            roles: strings(&[
                "button",
                "link",
                "textbox",
                "checkbox",
                "radiogroup",
                "combobox",
                "tab",
                "tabpanel",
            ]),
            partial_name_len: 10,
            text_query_len: 30,
            text_tags: strings(&["button", "a", "input", "select", "[role=\"button\"]"]),
            visual_scan_tags: strings(&["button", "a", "input", "select", "div", "span", "img"]),
            interactive_tags: strings(&["button", "a", "input", "select", "textarea"]),
            disabled_strategies: Vec::new(),
        }
    }
}

impl ResolverConfig {
    pub fn is_enabled(&self, strategy: HealStrategy) -> bool {
        !self.disabled_strategies.contains(&strategy)
    }

    /// Enabled strategies, always in fallback order
    pub fn enabled_strategies(&self) -> Vec<HealStrategy> {
        HealStrategy::fallback_chain()
            .into_iter()
            .filter(|s| self.is_enabled(*s))
            .collect()
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(self.visual_threshold > 0.0 && self.visual_threshold <= 1.0) {
            return Err(format!(
                "visual_threshold must be within (0, 1], got {}",
                self.visual_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.size_tolerance) {
            return Err(format!(
                "size_tolerance must be within [0, 1], got {}",
                self.size_tolerance
            ));
        }
        if self.partial_name_len == 0 || self.text_query_len == 0 {
            return Err("text prefix lengths must be > 0".to_string());
        }
        Ok(())
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}
