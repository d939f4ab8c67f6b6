//! Core types for the healing cascade

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Recovery strategy enumeration
///
/// The cascade always runs in [`HealStrategy::fallback_chain`] order and stops
/// at the first strategy that yields a locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HealStrategy {
    /// First stored alternative locator for the broken one
    RepositoryAlternative,

    /// Accessible role plus the stored nearby text as name
    RoleName,

    /// Progressively less specific variants of the broken CSS
    LooserCss,

    /// Template match of the stored element image, or a size heuristic
    Visual,

    /// Interactive element carrying the stored nearby text
    NearbyText,
}

impl HealStrategy {
    /// Get strategy name as string
    pub fn name(&self) -> &'static str {
        match self {
            HealStrategy::RepositoryAlternative => "repository-alternative",
            HealStrategy::RoleName => "role-name",
            HealStrategy::LooserCss => "looser-css",
            HealStrategy::Visual => "visual",
            HealStrategy::NearbyText => "nearby-text",
        }
    }

    /// Get all strategies in fallback order
    pub fn fallback_chain() -> Vec<HealStrategy> {
        vec![
            HealStrategy::RepositoryAlternative,
            HealStrategy::RoleName,
            HealStrategy::LooserCss,
            HealStrategy::Visual,
            HealStrategy::NearbyText,
        ]
    }
}

impl fmt::Display for HealStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// What one strategy did during a heal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "verdict", content = "detail", rename_all = "snake_case")]
pub enum AttemptVerdict {
    /// Produced a locator that matches the live document
    Matched(String),

    /// Had nothing to offer
    Abstained,

    /// Errored; the error was logged and the cascade moved on
    Failed(String),
}

/// Per-strategy entry of a [`HealReport`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyAttempt {
    pub strategy: HealStrategy,
    pub verdict: AttemptVerdict,
    #[serde(with = "duration_ms")]
    pub elapsed: Duration,
}

/// Heal outcome
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum HealOutcome {
    /// Replacement locator found
    Healed {
        locator: String,
        strategy: HealStrategy,
    },

    /// Every strategy abstained or failed
    Exhausted,
}

impl HealOutcome {
    /// Check if heal was successful
    pub fn is_success(&self) -> bool {
        matches!(self, HealOutcome::Healed { .. })
    }

    /// Get healed locator if successful
    pub fn locator(&self) -> Option<&str> {
        match self {
            HealOutcome::Healed { locator, .. } => Some(locator),
            HealOutcome::Exhausted => None,
        }
    }

    /// Get the winning strategy if successful
    pub fn strategy(&self) -> Option<HealStrategy> {
        match self {
            HealOutcome::Healed { strategy, .. } => Some(*strategy),
            HealOutcome::Exhausted => None,
        }
    }
}

/// Full record of one heal: the decision plus the trail that led to it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealReport {
    pub broken_locator: String,
    /// Whether the repository held a bundle for the broken locator
    pub had_bundle: bool,
    pub attempts: Vec<StrategyAttempt>,
    pub outcome: HealOutcome,
}

impl HealReport {
    pub fn is_success(&self) -> bool {
        self.outcome.is_success()
    }

    pub fn into_locator(self) -> Option<String> {
        match self.outcome {
            HealOutcome::Healed { locator, .. } => Some(locator),
            HealOutcome::Exhausted => None,
        }
    }

    /// Total time spent across attempted strategies
    pub fn elapsed(&self) -> Duration {
        self.attempts.iter().map(|a| a.elapsed).sum()
    }
}

mod duration_ms {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_millis().min(u64::MAX as u128) as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}
