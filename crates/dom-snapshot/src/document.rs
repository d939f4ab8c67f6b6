use std::path::Path;

use async_trait::async_trait;
use parking_lot::RwLock;
use scraper::Html;
use tracing::debug;

use perceiver_visual::codec;
use selfheal_core_types::{
    DocumentError, DomProbe, ElementInfo, LiveDocument, ProbeResult, ScreenshotScope,
};

use crate::render::render;
use crate::select::{self, describe};

/// Viewport used when none is configured.
pub const DEFAULT_VIEWPORT: (u32, u32) = (320, 200);

/// Live document over an HTML snapshot.
///
/// The snapshot is re-parsed on every call; the parsed tree never outlives a
/// single synchronous step, which keeps the handle `Send + Sync`.
pub struct SnapshotDocument {
    html: RwLock<String>,
    viewport: (u32, u32),
}

impl SnapshotDocument {
    pub fn new(html: impl Into<String>) -> Self {
        Self {
            html: RwLock::new(html.into()),
            viewport: DEFAULT_VIEWPORT,
        }
    }

    pub fn from_file(path: impl AsRef<Path>) -> std::io::Result<Self> {
        Ok(Self::new(std::fs::read_to_string(path)?))
    }

    pub fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = (width.max(1), height.max(1));
        self
    }

    pub fn viewport(&self) -> (u32, u32) {
        self.viewport
    }

    /// Swap the snapshot, as if the page had re-rendered.
    pub fn replace_html(&self, html: impl Into<String>) {
        *self.html.write() = html.into();
    }

    pub fn html(&self) -> String {
        self.html.read().clone()
    }

    fn parsed(&self) -> Html {
        Html::parse_document(&self.html.read())
    }

    fn query_sync(&self, locator: &str) -> Result<Vec<ElementInfo>, DocumentError> {
        let html = self.parsed();
        let matches = select::select_all(&html, locator)?;
        debug!("Snapshot query '{}' matched {}", locator, matches.len());
        Ok(matches.into_iter().map(describe).collect())
    }

    fn screenshot_sync(&self, scope: ScreenshotScope) -> Result<Vec<u8>, DocumentError> {
        let html = self.parsed();
        let (width, height) = self.viewport;
        let canvas = render(&html, width, height);
        let canvas = match scope {
            ScreenshotScope::Viewport => canvas,
            ScreenshotScope::Clip(bbox) => {
                codec::crop(&image::DynamicImage::ImageRgba8(canvas), &bbox)
                    .map_err(|e| DocumentError::Screenshot(e.to_string()))?
                    .to_rgba8()
            }
        };
        codec::encode_png(canvas).map_err(|e| DocumentError::Screenshot(e.to_string()))
    }

    fn evaluate_sync(&self, probe: DomProbe) -> Result<ProbeResult, DocumentError> {
        let html = self.parsed();
        let result = match probe {
            DomProbe::Context { locator } => ProbeResult::Context(
                select::select_all(&html, &locator)?
                    .into_iter()
                    .next()
                    .map(select::context),
            ),
            DomProbe::Elements { tags } => ProbeResult::Elements(
                select::all_elements(&html)
                    .filter(|el| tags.iter().any(|tag| tag == el.value().name()))
                    .map(describe)
                    .collect(),
            ),
            DomProbe::HitTest { x, y } => ProbeResult::Hit(select::hit_test(&html, x, y).map(describe)),
            DomProbe::TextAnchor { text, interactive } => ProbeResult::Anchor(
                select::text_anchor(&html, &text, &interactive).map(describe),
            ),
        };
        Ok(result)
    }
}

#[async_trait]
impl LiveDocument for SnapshotDocument {
    async fn query(&self, locator: &str) -> Result<Vec<ElementInfo>, DocumentError> {
        self.query_sync(locator)
    }

    async fn screenshot(&self, scope: ScreenshotScope) -> Result<Vec<u8>, DocumentError> {
        self.screenshot_sync(scope)
    }

    async fn evaluate(&self, probe: DomProbe) -> Result<ProbeResult, DocumentError> {
        self.evaluate_sync(probe)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use selfheal_core_types::BoundingBox;

    const PAGE: &str = r#"
        <html><body>
          <nav><a href="/" data-box="0,0,40,10">Home</a></nav>
          <button id="save" class="btn" data-box="10,20,50,20">Save</button>
        </body></html>
    "#;

    #[tokio::test]
    async fn query_describes_matches() {
        let doc = SnapshotDocument::new(PAGE);
        let found = doc.query("#save").await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].tag, "button");
        assert_eq!(found[0].classes, vec!["btn"]);
        assert_eq!(found[0].text, "Save");
        assert!(doc.resolves("a").await.unwrap());
        assert!(!doc.resolves("#missing").await.unwrap());
    }

    #[tokio::test]
    async fn replace_html_changes_answers() {
        let doc = SnapshotDocument::new(PAGE);
        doc.replace_html(PAGE.replace("id=\"save\"", "id=\"store\""));
        assert!(!doc.resolves("#save").await.unwrap());
        assert!(doc.resolves("#store").await.unwrap());
    }

    #[tokio::test]
    async fn clip_screenshot_has_box_size() {
        let doc = SnapshotDocument::new(PAGE);
        let clip = doc
            .screenshot(ScreenshotScope::Clip(BoundingBox::new(10.0, 20.0, 50.0, 20.0)))
            .await
            .unwrap();
        assert_eq!(codec::dimensions(&clip).unwrap(), (50, 20));
        let full = doc.screenshot(ScreenshotScope::Viewport).await.unwrap();
        assert_eq!(codec::dimensions(&full).unwrap(), DEFAULT_VIEWPORT);
    }

    #[tokio::test]
    async fn probes_answer_with_matching_shapes() {
        let doc = SnapshotDocument::new(PAGE);
        let ctx = doc
            .evaluate(DomProbe::Context {
                locator: "#save".into(),
            })
            .await
            .unwrap()
            .into_context()
            .unwrap()
            .unwrap();
        assert_eq!(ctx.previous_sibling_text.as_deref(), Some("Home"));

        let elements = doc
            .evaluate(DomProbe::Elements {
                tags: vec!["a".into(), "button".into()],
            })
            .await
            .unwrap()
            .into_elements()
            .unwrap();
        assert_eq!(elements.len(), 2);

        let hit = doc
            .evaluate(DomProbe::HitTest { x: 30.0, y: 30.0 })
            .await
            .unwrap()
            .into_hit()
            .unwrap();
        assert_eq!(hit.and_then(|h| h.id), Some("save".to_string()));
    }

    #[tokio::test]
    async fn invalid_locator_is_an_error() {
        let doc = SnapshotDocument::new(PAGE);
        assert!(doc.query("div[").await.is_err());
    }
}
