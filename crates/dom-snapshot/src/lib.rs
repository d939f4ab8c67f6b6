//! HTML snapshot acting as a live document.
//!
//! [`SnapshotDocument`] answers the [`LiveDocument`](selfheal_core_types::LiveDocument)
//! calls against a static HTML string. Element geometry comes from a
//! `data-box="x,y,width,height"` attribute; screenshots are rendered from that
//! geometry so visual matching can run without a browser. Swapping the HTML
//! with [`SnapshotDocument::replace_html`] simulates the page drifting between
//! capture and healing.

mod aria;
mod document;
mod render;
mod select;

pub use aria::implicit_role;
pub use document::{SnapshotDocument, DEFAULT_VIEWPORT};
