use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tracing::{debug, error, warn};

use selfheal_core_types::{DomProbe, ElementContext, LiveDocument, ScreenshotScope};

use crate::derive;
use crate::errors::{RepoErrKind, RepoError};
use crate::model::{CapturedElement, RepositoryStats, Snapshot};
use crate::policy::RepositoryPolicy;

/// In-memory store of recovery bundles keyed by the original locator.
///
/// One instance belongs to one automation session and is shared by handing out
/// an `Arc<ElementRepository>`. Values are `Arc<CapturedElement>` so readers
/// always see a whole bundle, never a partially overwritten one.
#[derive(Default)]
pub struct ElementRepository {
    entries: DashMap<String, Arc<CapturedElement>>,
    policy: RepositoryPolicy,
}

impl ElementRepository {
    pub fn new(policy: RepositoryPolicy) -> Self {
        Self {
            entries: DashMap::new(),
            policy,
        }
    }

    pub fn policy(&self) -> &RepositoryPolicy {
        &self.policy
    }

    /// Record recovery data for a locator that just resolved.
    ///
    /// Best effort: an absent element is skipped silently and document
    /// failures are logged, never returned. Neither case touches an existing
    /// bundle for `locator`.
    pub async fn capture(&self, locator: &str, document: &dyn LiveDocument) {
        match self.build_bundle(locator, document).await {
            Ok(Some(bundle)) => {
                debug!(
                    "Captured '{}' with {} alternatives",
                    locator,
                    bundle.alternative_locators.len()
                );
                self.insert(bundle);
            }
            Ok(None) => {
                debug!("Capture skipped, '{}' does not resolve", locator);
            }
            Err(err) => {
                error!("Capture failed for '{}': {}", locator, err);
            }
        }
    }

    async fn build_bundle(
        &self,
        locator: &str,
        document: &dyn LiveDocument,
    ) -> Result<Option<CapturedElement>, RepoError> {
        let Some(element) = document.query(locator).await?.into_iter().next() else {
            return Ok(None);
        };

        let context = document
            .evaluate(DomProbe::Context {
                locator: locator.to_string(),
            })
            .await?
            .into_context()?
            .unwrap_or_else(|| ElementContext {
                element,
                parent_text: None,
                previous_sibling_text: None,
                next_sibling_text: None,
                path: Vec::new(),
            });

        let bounding_box = context.element.bounding_box;
        let snapshot_image = match bounding_box {
            Some(bbox) if self.policy.capture_snapshot && !bbox.is_empty() => {
                match self.element_screenshot(document, bbox).await {
                    Ok(image) => Some(image),
                    Err(err) => {
                        warn!("Storing '{}' without snapshot: {}", locator, err);
                        None
                    }
                }
            }
            _ => None,
        };

        Ok(Some(CapturedElement {
            original_locator: locator.to_string(),
            alternative_locators: derive::alternative_locators(&context),
            snapshot_image,
            bounding_box,
            nearby_text: derive::nearby_text(&context, self.policy.max_text_len),
            captured_at: Utc::now(),
        }))
    }

    async fn element_screenshot(
        &self,
        document: &dyn LiveDocument,
        bbox: selfheal_core_types::BoundingBox,
    ) -> Result<Vec<u8>, RepoError> {
        let image = document
            .screenshot(ScreenshotScope::Clip(bbox))
            .await
            .map_err(|e| RepoErrKind::Screenshot(e.to_string()))?;
        if image.is_empty() {
            return Err(RepoErrKind::Screenshot("empty image".to_string()).into());
        }
        Ok(image)
    }

    /// Store a bundle, replacing any bundle with the same original locator.
    pub fn insert(&self, bundle: CapturedElement) {
        self.entries
            .insert(bundle.original_locator.clone(), Arc::new(bundle));
    }

    pub fn get_bundle(&self, locator: &str) -> Option<Arc<CapturedElement>> {
        self.entries.get(locator).map(|entry| Arc::clone(entry.value()))
    }

    /// Most specific stored alternative for `locator`.
    pub fn get_alternative(&self, locator: &str) -> Option<String> {
        self.get_bundle(locator)
            .and_then(|bundle| bundle.primary_alternative().map(str::to_string))
    }

    pub fn get_snapshot(&self, locator: &str) -> Option<Snapshot> {
        self.get_bundle(locator).and_then(|bundle| bundle.snapshot())
    }

    pub fn remove(&self, locator: &str) -> Option<Arc<CapturedElement>> {
        self.entries.remove(locator).map(|(_, bundle)| bundle)
    }

    /// Drop bundles captured more than `max_age` ago; returns how many went.
    pub fn evict_older_than(&self, max_age: Duration) -> usize {
        self.evict_older_than_at(Utc::now(), max_age)
    }

    /// Eviction against the policy's `max_age_ms`.
    pub fn evict_expired(&self) -> usize {
        self.evict_older_than(self.policy.max_age())
    }

    pub fn evict_older_than_at(&self, now: DateTime<Utc>, max_age: Duration) -> usize {
        let Ok(max_age) = chrono::Duration::from_std(max_age) else {
            return 0;
        };
        let mut removed = 0;
        self.entries.retain(|_, bundle| {
            let keep = now.signed_duration_since(bundle.captured_at) <= max_age;
            if !keep {
                removed += 1;
            }
            keep
        });
        if removed > 0 {
            debug!("Evicted {} stale bundles", removed);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&self) {
        self.entries.clear();
    }

    pub fn locators(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> RepositoryStats {
        let mut stats = RepositoryStats::default();
        for entry in self.entries.iter() {
            let bundle = entry.value();
            stats.entries += 1;
            if bundle.snapshot_image.is_some() {
                stats.with_snapshot += 1;
            }
            stats.oldest_captured_at = Some(match stats.oldest_captured_at {
                Some(oldest) if oldest <= bundle.captured_at => oldest,
                _ => bundle.captured_at,
            });
        }
        stats
    }
}
