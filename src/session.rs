//! Healing session: act, heal on a missing element, retry, re-capture.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use action_locator::{HealReport, HealStrategy, SelfHealer, SelfHealingResolver};
use chrono::{DateTime, Utc};
use element_repository::ElementRepository;
use parking_lot::RwLock;
use perceiver_visual::{TemplateMatcher, VisionBackend};
use selfheal_core_types::{LiveDocument, SessionId};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::errors::ActionError;

const MAX_EVENTS: usize = 200;

/// One heal attempt as remembered by the session
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HealEvent {
    pub timestamp: DateTime<Utc>,
    pub broken: String,
    pub healed: Option<String>,
    pub strategy: Option<HealStrategy>,
}

/// Successful action result
#[derive(Clone, Debug, PartialEq)]
pub struct Performed<T> {
    /// Locator the action finally succeeded with
    pub locator: String,
    /// Whether `locator` came from healing
    pub healed: bool,
    pub output: T,
}

pub struct HealingSession {
    id: SessionId,
    repository: Arc<ElementRepository>,
    healer: Arc<dyn SelfHealer>,
    events: RwLock<VecDeque<HealEvent>>,
}

impl HealingSession {
    pub fn new(repository: Arc<ElementRepository>, healer: Arc<dyn SelfHealer>) -> Self {
        Self {
            id: SessionId::new(),
            repository,
            healer,
            events: RwLock::new(VecDeque::new()),
        }
    }

    /// Repository and resolver built from configuration, with the template
    /// matcher attached when vision is enabled.
    pub fn from_config(config: &Config) -> Self {
        let repository = Arc::new(ElementRepository::new(config.repository.clone()));
        let mut resolver = SelfHealingResolver::new(repository.clone(), config.resolver.clone());
        if config.enable_vision {
            let vision: Arc<dyn VisionBackend> = Arc::new(TemplateMatcher::default());
            resolver = resolver.with_vision(vision);
        }
        Self::new(repository, Arc::new(resolver))
    }

    pub fn with_id(mut self, id: SessionId) -> Self {
        self.id = id;
        self
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn repository(&self) -> &Arc<ElementRepository> {
        &self.repository
    }

    /// Run `action` against `locator`, healing once if the element is missing.
    ///
    /// Success captures recovery data for the locator that worked. When no
    /// replacement is found the original error is returned unchanged; when
    /// the replacement also fails, that retry error is returned.
    pub async fn perform<T, F, Fut>(
        &self,
        locator: &str,
        document: &dyn LiveDocument,
        mut action: F,
    ) -> Result<Performed<T>, ActionError>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<T, ActionError>>,
    {
        let err = match action(locator.to_string()).await {
            Ok(output) => {
                self.repository.capture(locator, document).await;
                return Ok(Performed {
                    locator: locator.to_string(),
                    healed: false,
                    output,
                });
            }
            Err(err) if err.is_element_not_found() => err,
            Err(err) => {
                debug!(session = %self.id, "Action on {} failed without healing: {}", locator, err);
                return Err(err);
            }
        };

        let report = self.healer.heal_report(locator, document).await;
        self.record(&report);

        let Some(healed) = report.into_locator() else {
            warn!(
                session = %self.id,
                "Self-heal attempted for {} and exhausted; returning original error",
                locator
            );
            return Err(err);
        };

        info!(session = %self.id, "Retrying {} as {}", locator, healed);
        let output = action(healed.clone()).await?;
        self.repository.capture(&healed, document).await;
        Ok(Performed {
            locator: healed,
            healed: true,
            output,
        })
    }

    fn record(&self, report: &HealReport) {
        let event = HealEvent {
            timestamp: Utc::now(),
            broken: report.broken_locator.clone(),
            healed: report.outcome.locator().map(str::to_string),
            strategy: report.outcome.strategy(),
        };
        let mut events = self.events.write();
        events.push_back(event);
        while events.len() > MAX_EVENTS {
            events.pop_front();
        }
    }

    /// Heal events, oldest first (at most the last 200)
    pub fn events(&self) -> Vec<HealEvent> {
        self.events.read().iter().cloned().collect()
    }

    /// Evict bundles older than the repository policy's max age
    pub fn sweep(&self) -> usize {
        let removed = self.repository.evict_expired();
        if removed > 0 {
            debug!(session = %self.id, "Evicted {} stale bundles", removed);
        }
        removed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use action_locator::{HealOutcome, HealReport};
    use async_trait::async_trait;
    use dom_snapshot::SnapshotDocument;

    struct CannedHealer(Option<String>);

    #[async_trait]
    impl SelfHealer for CannedHealer {
        async fn heal_report(&self, broken: &str, _document: &dyn LiveDocument) -> HealReport {
            HealReport {
                broken_locator: broken.to_string(),
                had_bundle: false,
                attempts: Vec::new(),
                outcome: match &self.0 {
                    Some(locator) => HealOutcome::Healed {
                        locator: locator.clone(),
                        strategy: HealStrategy::LooserCss,
                    },
                    None => HealOutcome::Exhausted,
                },
            }
        }
    }

    fn session(healed: Option<&str>) -> HealingSession {
        HealingSession::new(
            Arc::new(ElementRepository::default()),
            Arc::new(CannedHealer(healed.map(str::to_string))),
        )
    }

    const PAGE: &str = r#"<html><body><button class="go" data-box="0,0,40,20">Go</button></body></html>"#;

    #[tokio::test]
    async fn other_errors_skip_healing() {
        let session = session(Some("button.go"));
        let doc = SnapshotDocument::new(PAGE);
        let result: Result<Performed<()>, _> = session
            .perform("#go", &doc, |_| async { Err(ActionError::Failed("detached".into())) })
            .await;
        assert_eq!(result.unwrap_err(), ActionError::Failed("detached".into()));
        assert!(session.events().is_empty());
    }

    #[tokio::test]
    async fn retry_failure_is_surfaced() {
        let session = session(Some("button.go"));
        let doc = SnapshotDocument::new(PAGE);
        let result: Result<Performed<()>, _> = session
            .perform("#go", &doc, |locator| async move {
                if locator == "#go" {
                    Err(ActionError::element_not_found(locator))
                } else {
                    Err(ActionError::Timeout { timeout_ms: 50 })
                }
            })
            .await;
        assert_eq!(result.unwrap_err(), ActionError::Timeout { timeout_ms: 50 });
        assert!(session.repository().get_bundle("button.go").is_none());
    }

    #[tokio::test]
    async fn event_log_is_bounded() {
        let session = session(None);
        let doc = SnapshotDocument::new(PAGE);
        for i in 0..(MAX_EVENTS + 5) {
            let _ = session
                .perform(&format!("#gone-{}", i), &doc, |locator| async move {
                    Err::<(), _>(ActionError::element_not_found(locator))
                })
                .await;
        }
        let events = session.events();
        assert_eq!(events.len(), MAX_EVENTS);
        assert_eq!(events[0].broken, "#gone-5");
        assert!(events.iter().all(|e| e.healed.is_none()));
    }
}
