//! Self-healing resolver: runs the strategy cascade for one broken locator

use crate::{
    config::ResolverConfig,
    metrics,
    strategies::{build_chain, HealContext, Strategy},
    types::*,
};
use async_trait::async_trait;
use element_repository::ElementRepository;
use perceiver_visual::VisionBackend;
use selfheal_core_types::LiveDocument;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Self-healer trait
#[async_trait]
pub trait SelfHealer: Send + Sync {
    /// Run the cascade and report every strategy's verdict
    async fn heal_report(&self, broken: &str, document: &dyn LiveDocument) -> HealReport;

    /// Replacement locator for `broken`, or `None` when nothing worked
    async fn heal(&self, broken: &str, document: &dyn LiveDocument) -> Option<String> {
        self.heal_report(broken, document).await.into_locator()
    }
}

/// Default resolver over an [`ElementRepository`]
///
/// Strategies are tried in [`HealStrategy::fallback_chain`] order and the
/// first locator produced wins. Nothing here ever returns an error: strategy
/// failures are logged and counted as abstentions.
pub struct SelfHealingResolver {
    repository: Arc<ElementRepository>,
    config: ResolverConfig,
    vision: Option<Arc<dyn VisionBackend>>,
    strategies: Vec<Arc<dyn Strategy>>,
}

impl SelfHealingResolver {
    /// Create a resolver without vision; the visual strategy falls back to
    /// its size heuristic.
    pub fn new(repository: Arc<ElementRepository>, config: ResolverConfig) -> Self {
        let strategies = build_chain(&config, None);
        Self {
            repository,
            config,
            vision: None,
            strategies,
        }
    }

    /// Inject a vision backend
    pub fn with_vision(mut self, vision: Arc<dyn VisionBackend>) -> Self {
        self.strategies = build_chain(&self.config, Some(vision.clone()));
        self.vision = Some(vision);
        self
    }

    pub fn repository(&self) -> &Arc<ElementRepository> {
        &self.repository
    }

    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    pub fn has_vision(&self) -> bool {
        self.vision.is_some()
    }

    /// Names of the active strategies, in trial order
    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

#[async_trait]
impl SelfHealer for SelfHealingResolver {
    async fn heal_report(&self, broken: &str, document: &dyn LiveDocument) -> HealReport {
        metrics::record_attempt();
        let started = Instant::now();
        let ctx = HealContext::new(broken, document, &self.repository);
        let had_bundle = ctx.bundle.is_some();

        info!(
            "Attempting self-heal for locator: {} (bundle: {})",
            broken, had_bundle
        );

        let mut attempts = Vec::with_capacity(self.strategies.len());
        for strategy in &self.strategies {
            let name = strategy.name();
            let attempt_started = Instant::now();
            debug!("Trying strategy: {}", name);

            let verdict = match strategy.attempt(&ctx).await {
                Ok(Some(locator)) => AttemptVerdict::Matched(locator),
                Ok(None) => AttemptVerdict::Abstained,
                Err(err) => {
                    error!("Strategy {} failed for {}: {}", name, broken, err);
                    metrics::record_strategy_failure(name);
                    AttemptVerdict::Failed(err.to_string())
                }
            };

            attempts.push(StrategyAttempt {
                strategy: strategy.strategy_type(),
                verdict: verdict.clone(),
                elapsed: attempt_started.elapsed(),
            });

            if let AttemptVerdict::Matched(locator) = verdict {
                info!("Healed {} -> {} via {}", broken, locator, name);
                metrics::record_success(name, started.elapsed());
                return HealReport {
                    broken_locator: broken.to_string(),
                    had_bundle,
                    attempts,
                    outcome: HealOutcome::Healed {
                        locator,
                        strategy: strategy.strategy_type(),
                    },
                };
            }
        }

        warn!("Self-heal exhausted all strategies for locator: {}", broken);
        metrics::record_exhausted(started.elapsed());
        HealReport {
            broken_locator: broken.to_string(),
            had_bundle,
            attempts,
            outcome: HealOutcome::Exhausted,
        }
    }
}
