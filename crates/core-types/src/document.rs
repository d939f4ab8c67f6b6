//! The live document contract consumed by capture and healing.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geometry::BoundingBox;

/// Errors surfaced by a live document implementation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DocumentError {
    /// The locator could not be understood by the document
    #[error("Invalid locator '{locator}': {reason}")]
    InvalidLocator { locator: String, reason: String },

    /// Query execution failed
    #[error("Query failed: {0}")]
    Query(String),

    /// Screenshot capture failed
    #[error("Screenshot failed: {0}")]
    Screenshot(String),

    /// DOM probe evaluation failed
    #[error("Evaluation failed: {0}")]
    Evaluate(String),

    /// The probe answered with a result of the wrong shape
    #[error("Unexpected probe result: expected {expected}")]
    UnexpectedResult { expected: &'static str },

    /// The document (page, tab, window) is gone
    #[error("Document closed")]
    Closed,
}

/// Light description of one element matched by a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementInfo {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub classes: Vec<String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    /// Whitespace-collapsed text content.
    #[serde(default)]
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounding_box: Option<BoundingBox>,
}

impl ElementInfo {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .get(name)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn non_empty_id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn first_class(&self) -> Option<&str> {
        self.classes.iter().map(String::as_str).find(|c| !c.is_empty())
    }
}

/// One step of an element's ancestry, root first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PathSegment {
    pub tag: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// 1-based position among the parent's element children.
    pub index: usize,
}

/// Everything capture needs to know about a single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElementContext {
    pub element: ElementInfo,
    #[serde(default)]
    pub parent_text: Option<String>,
    #[serde(default)]
    pub previous_sibling_text: Option<String>,
    #[serde(default)]
    pub next_sibling_text: Option<String>,
    /// Ancestry from the root element down to (and including) the element.
    #[serde(default)]
    pub path: Vec<PathSegment>,
}

/// Typed DOM inspection requests ("evaluate a function against the document").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "probe", rename_all = "snake_case")]
pub enum DomProbe {
    /// Describe the first element matching `locator` together with its surroundings
    Context { locator: String },
    /// All elements with one of the given tag names, in document order
    Elements { tags: Vec<String> },
    /// Topmost element whose box contains the viewport point
    HitTest { x: f64, y: f64 },
    /// Walk text nodes for `text`, then return the nearest interactive
    /// descendant-or-self (tags in `interactive`) of the first match's parent
    TextAnchor {
        text: String,
        interactive: Vec<String>,
    },
}

impl DomProbe {
    pub fn name(&self) -> &'static str {
        match self {
            DomProbe::Context { .. } => "context",
            DomProbe::Elements { .. } => "elements",
            DomProbe::HitTest { .. } => "hit_test",
            DomProbe::TextAnchor { .. } => "text_anchor",
        }
    }
}

/// Answer to a [`DomProbe`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", content = "value", rename_all = "snake_case")]
pub enum ProbeResult {
    Context(Option<ElementContext>),
    Elements(Vec<ElementInfo>),
    Hit(Option<ElementInfo>),
    Anchor(Option<ElementInfo>),
}

impl ProbeResult {
    pub fn into_context(self) -> Result<Option<ElementContext>, DocumentError> {
        match self {
            ProbeResult::Context(context) => Ok(context),
            _ => Err(DocumentError::UnexpectedResult {
                expected: "context",
            }),
        }
    }

    pub fn into_elements(self) -> Result<Vec<ElementInfo>, DocumentError> {
        match self {
            ProbeResult::Elements(elements) => Ok(elements),
            _ => Err(DocumentError::UnexpectedResult {
                expected: "elements",
            }),
        }
    }

    pub fn into_hit(self) -> Result<Option<ElementInfo>, DocumentError> {
        match self {
            ProbeResult::Hit(hit) => Ok(hit),
            _ => Err(DocumentError::UnexpectedResult { expected: "hit" }),
        }
    }

    pub fn into_anchor(self) -> Result<Option<ElementInfo>, DocumentError> {
        match self {
            ProbeResult::Anchor(anchor) => Ok(anchor),
            _ => Err(DocumentError::UnexpectedResult { expected: "anchor" }),
        }
    }
}

/// Area covered by a screenshot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScreenshotScope {
    Viewport,
    Clip(BoundingBox),
}

/// Handle to the current UI state of one page or window.
///
/// Implementations wrap a real browser driver, a headless engine or a static
/// snapshot; capture and healing only ever go through these three calls.
#[async_trait]
pub trait LiveDocument: Send + Sync {
    /// Elements currently matching `locator` (zero, one or many)
    async fn query(&self, locator: &str) -> Result<Vec<ElementInfo>, DocumentError>;

    /// PNG-encoded screenshot of the viewport or of a clip rectangle
    async fn screenshot(&self, scope: ScreenshotScope) -> Result<Vec<u8>, DocumentError>;

    /// Run a DOM inspection probe
    async fn evaluate(&self, probe: DomProbe) -> Result<ProbeResult, DocumentError>;

    /// Existence check used before handing a locator back to callers
    async fn resolves(&self, locator: &str) -> Result<bool, DocumentError> {
        Ok(!self.query(locator).await?.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EmptyDocument;

    #[async_trait]
    impl LiveDocument for EmptyDocument {
        async fn query(&self, _locator: &str) -> Result<Vec<ElementInfo>, DocumentError> {
            Ok(Vec::new())
        }

        async fn screenshot(&self, _scope: ScreenshotScope) -> Result<Vec<u8>, DocumentError> {
            Err(DocumentError::Closed)
        }

        async fn evaluate(&self, _probe: DomProbe) -> Result<ProbeResult, DocumentError> {
            Ok(ProbeResult::Hit(None))
        }
    }

    #[tokio::test]
    async fn resolves_defaults_to_non_empty_query() {
        let doc = EmptyDocument;
        assert!(!doc.resolves("#missing").await.unwrap());
    }

    #[test]
    fn probe_result_shape_mismatch_is_an_error() {
        let err = ProbeResult::Hit(None).into_context().unwrap_err();
        assert_eq!(
            err,
            DocumentError::UnexpectedResult {
                expected: "context"
            }
        );
        assert!(ProbeResult::Elements(vec![]).into_elements().unwrap().is_empty());
    }

    #[test]
    fn element_info_helpers_skip_empty_values() {
        let mut info = ElementInfo::new("button");
        info.id = Some(String::new());
        info.classes = vec!["".into(), "primary".into()];
        info.attributes.insert("name".into(), String::new());
        assert_eq!(info.non_empty_id(), None);
        assert_eq!(info.first_class(), Some("primary"));
        assert_eq!(info.attr("name"), None);
    }
}
