//! Recovery strategies
//!
//! Five strategies in fallback order:
//! 1. Repository alternative - first stored alternative locator
//! 2. Role name - accessible role plus stored nearby text
//! 3. Looser CSS - less specific variants of the broken selector
//! 4. Visual - template match of the stored image, or a size heuristic
//! 5. Nearby text - text queries, then a text-node walk to an interactive element
//!
//! A strategy answers `Ok(None)` when it has nothing to offer. Errors are
//! reported to the resolver, which logs them and moves on.

use crate::{config::ResolverConfig, errors::LocatorError, loosen, types::HealStrategy};
use async_trait::async_trait;
use element_repository::{CapturedElement, ElementRepository, Snapshot};
use perceiver_visual::VisionBackend;
use selfheal_core_types::{
    locator, BoundingBox, DocumentError, DomProbe, ElementInfo, LiveDocument, ScreenshotScope,
};
use std::sync::Arc;
use tracing::{debug, warn};

/// Everything a strategy may look at while healing one locator
pub struct HealContext<'a> {
    pub broken: &'a str,
    pub document: &'a dyn LiveDocument,
    pub repository: &'a ElementRepository,
    pub bundle: Option<Arc<CapturedElement>>,
}

impl<'a> HealContext<'a> {
    pub fn new(
        broken: &'a str,
        document: &'a dyn LiveDocument,
        repository: &'a ElementRepository,
    ) -> Self {
        Self {
            broken,
            document,
            repository,
            bundle: repository.get_bundle(broken),
        }
    }

    /// Stored nearby text, when the bundle has any
    pub fn nearby_text(&self) -> Option<&str> {
        self.bundle
            .as_deref()
            .map(|b| b.nearby_text.trim())
            .filter(|t| !t.is_empty())
    }

    pub fn snapshot(&self) -> Option<Snapshot> {
        self.bundle.as_deref().and_then(CapturedElement::snapshot)
    }
}

/// Strategy trait for locator recovery
#[async_trait]
pub trait Strategy: Send + Sync {
    /// Attempt to produce a locator that matches the live document
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError>;

    /// Get strategy type
    fn strategy_type(&self) -> HealStrategy;

    /// Get strategy name
    fn name(&self) -> &'static str {
        self.strategy_type().name()
    }
}

/// First candidate with at least one match. Candidates the document rejects
/// as malformed are skipped; any other document failure aborts the strategy.
async fn first_resolving<I>(
    document: &dyn LiveDocument,
    candidates: I,
) -> Result<Option<String>, LocatorError>
where
    I: IntoIterator<Item = String> + Send,
    I::IntoIter: Send,
{
    for candidate in candidates {
        match document.resolves(&candidate).await {
            Ok(true) => return Ok(Some(candidate)),
            Ok(false) => debug!("Candidate {} matched nothing", candidate),
            Err(DocumentError::InvalidLocator { reason, .. }) => {
                debug!("Candidate {} rejected: {}", candidate, reason)
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(None)
}

/// Strategy 1: the repository's first alternative locator
#[derive(Debug, Default)]
pub struct RepositoryAlternativeStrategy;

#[async_trait]
impl Strategy for RepositoryAlternativeStrategy {
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError> {
        let Some(alternative) = ctx
            .bundle
            .as_deref()
            .and_then(CapturedElement::primary_alternative)
        else {
            return Ok(None);
        };
        first_resolving(ctx.document, [alternative.to_string()]).await
    }

    fn strategy_type(&self) -> HealStrategy {
        HealStrategy::RepositoryAlternative
    }
}

/// Strategy 2: role plus accessible name taken from the stored nearby text
#[derive(Debug)]
pub struct RoleNameStrategy {
    roles: Vec<String>,
    partial_name_len: usize,
}

impl RoleNameStrategy {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            roles: config.roles.clone(),
            partial_name_len: config.partial_name_len,
        }
    }

    fn candidates(&self, name: &str, exact: bool) -> Vec<String> {
        self.roles
            .iter()
            .map(|role| locator::role_name(role, name, exact))
            .collect()
    }
}

#[async_trait]
impl Strategy for RoleNameStrategy {
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError> {
        let Some(text) = ctx.nearby_text() else {
            return Ok(None);
        };

        if let Some(found) = first_resolving(ctx.document, self.candidates(text, true)).await? {
            return Ok(Some(found));
        }

        if text.chars().count() > self.partial_name_len {
            let prefix = locator::prefix_chars(text, self.partial_name_len);
            return first_resolving(ctx.document, self.candidates(prefix, false)).await;
        }

        Ok(None)
    }

    fn strategy_type(&self) -> HealStrategy {
        HealStrategy::RoleName
    }
}

/// Strategy 3: looser variants of the broken selector
#[derive(Debug, Default)]
pub struct LooserCssStrategy;

#[async_trait]
impl Strategy for LooserCssStrategy {
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError> {
        let candidates = loosen::looser_candidates(ctx.broken);
        debug!(
            "Looser candidates for {}: {:?}",
            ctx.broken, candidates
        );
        first_resolving(ctx.document, candidates).await
    }

    fn strategy_type(&self) -> HealStrategy {
        HealStrategy::LooserCss
    }
}

/// Strategy 4: locate the stored element image on screen; without a usable
/// vision backend, find an element of similar size
pub struct VisualStrategy {
    vision: Option<Arc<dyn VisionBackend>>,
    threshold: f64,
    size_tolerance: f64,
    scan_tags: Vec<String>,
}

impl VisualStrategy {
    pub fn new(config: &ResolverConfig, vision: Option<Arc<dyn VisionBackend>>) -> Self {
        Self {
            vision,
            threshold: config.visual_threshold,
            size_tolerance: config.size_tolerance,
            scan_tags: config.visual_scan_tags.clone(),
        }
    }

    async fn vision_match(
        &self,
        ctx: &HealContext<'_>,
        vision: &dyn VisionBackend,
        snapshot: &Snapshot,
    ) -> Result<Option<String>, LocatorError> {
        let screenshot = ctx.document.screenshot(ScreenshotScope::Viewport).await?;
        let Some(found) = vision.locate(&screenshot, &snapshot.image)? else {
            return Ok(None);
        };
        if !found.exceeds(self.threshold) {
            debug!(
                "Vision match confidence {:.3} not above {:.3}",
                found.confidence, self.threshold
            );
            return Ok(None);
        }
        let (x, y) = found.center();
        Ok(self.hit(ctx, x, y).await?.map(|_| locator::point(x, y)))
    }

    async fn size_match(
        &self,
        ctx: &HealContext<'_>,
        reference: &BoundingBox,
    ) -> Result<Option<String>, LocatorError> {
        let elements = ctx
            .document
            .evaluate(DomProbe::Elements {
                tags: self.scan_tags.clone(),
            })
            .await?
            .into_elements()?;

        for element in elements {
            let Some(bbox) = element.bounding_box else {
                continue;
            };
            if !bbox.similar_size(reference, self.size_tolerance) {
                continue;
            }
            let (x, y) = bbox.center();
            if self.hit(ctx, x, y).await?.is_some() {
                debug!("Size match <{}> at ({}, {})", element.tag, x, y);
                return Ok(Some(locator::point(x, y)));
            }
        }
        Ok(None)
    }

    async fn hit(
        &self,
        ctx: &HealContext<'_>,
        x: f64,
        y: f64,
    ) -> Result<Option<ElementInfo>, LocatorError> {
        Ok(ctx
            .document
            .evaluate(DomProbe::HitTest { x, y })
            .await?
            .into_hit()?)
    }
}

#[async_trait]
impl Strategy for VisualStrategy {
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError> {
        let Some(snapshot) = ctx.snapshot() else {
            return Ok(None);
        };

        if let Some(vision) = self.vision.as_deref() {
            // A working backend has the final say; only its failure
            // degrades to the size heuristic.
            match self.vision_match(ctx, vision, &snapshot).await {
                Err(LocatorError::Visual(reason)) => warn!(
                    "Vision backend {} failed, using size heuristic: {}",
                    vision.name(),
                    reason
                ),
                result => {
                    if let Ok(None) = result {
                        debug!("No vision match from {} above threshold", vision.name());
                    }
                    return result;
                }
            }
        }

        self.size_match(ctx, &snapshot.bounding_box).await
    }

    fn strategy_type(&self) -> HealStrategy {
        HealStrategy::Visual
    }
}

/// Strategy 5: elements carrying the stored nearby text
#[derive(Debug)]
pub struct NearbyTextStrategy {
    tags: Vec<String>,
    query_len: usize,
    interactive: Vec<String>,
}

impl NearbyTextStrategy {
    pub fn new(config: &ResolverConfig) -> Self {
        Self {
            tags: config.text_tags.clone(),
            query_len: config.text_query_len,
            interactive: config.interactive_tags.clone(),
        }
    }

    /// Text to search for: the bundle's nearby text, else text embedded in
    /// a text-bearing broken locator.
    fn search_text(ctx: &HealContext<'_>) -> Option<String> {
        if let Some(text) = ctx.nearby_text() {
            return Some(text.to_string());
        }
        if ctx.bundle.is_some() {
            return None;
        }
        text_hint(ctx.broken)
    }
}

#[async_trait]
impl Strategy for NearbyTextStrategy {
    async fn attempt(&self, ctx: &HealContext<'_>) -> Result<Option<String>, LocatorError> {
        let Some(text) = Self::search_text(ctx) else {
            return Ok(None);
        };

        let prefix = locator::prefix_chars(&text, self.query_len);
        let queries: Vec<String> = self
            .tags
            .iter()
            .map(|tag| locator::has_text(tag, prefix))
            .collect();
        if let Some(found) = first_resolving(ctx.document, queries).await? {
            return Ok(Some(found));
        }

        let anchor = ctx
            .document
            .evaluate(DomProbe::TextAnchor {
                text,
                interactive: self.interactive.clone(),
            })
            .await?
            .into_anchor()?;
        let Some(anchor) = anchor else {
            return Ok(None);
        };

        let synthesized = if let Some(id) = anchor.non_empty_id() {
            locator::id(id)
        } else if let Some(class) = anchor.first_class() {
            locator::classes(&[class])
        } else {
            debug!("Text anchor <{}> has neither id nor class", anchor.tag);
            return Ok(None);
        };
        first_resolving(ctx.document, [synthesized]).await
    }

    fn strategy_type(&self) -> HealStrategy {
        HealStrategy::NearbyText
    }
}

/// Text carried by `:has-text(...)`, `role=...[name=...]` and `text=` locators.
pub fn text_hint(locator_str: &str) -> Option<String> {
    let text = if let Some((_, text)) = locator::parse_has_text(locator_str) {
        text
    } else if let Some(role) = locator::parse_role(locator_str) {
        role.name
    } else {
        locator_str
            .trim()
            .strip_prefix("text=")?
            .trim_matches('"')
            .to_string()
    };
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

/// Instantiate the enabled strategies in fallback order.
pub fn build_chain(
    config: &ResolverConfig,
    vision: Option<Arc<dyn VisionBackend>>,
) -> Vec<Arc<dyn Strategy>> {
    config
        .enabled_strategies()
        .into_iter()
        .map(|kind| -> Arc<dyn Strategy> {
            match kind {
                HealStrategy::RepositoryAlternative => Arc::new(RepositoryAlternativeStrategy),
                HealStrategy::RoleName => Arc::new(RoleNameStrategy::new(config)),
                HealStrategy::LooserCss => Arc::new(LooserCssStrategy),
                HealStrategy::Visual => Arc::new(VisualStrategy::new(config, vision.clone())),
                HealStrategy::NearbyText => Arc::new(NearbyTextStrategy::new(config)),
            }
        })
        .collect()
}
