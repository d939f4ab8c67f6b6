//! Locator evaluation over a parsed snapshot.

use std::collections::BTreeMap;

use scraper::{ElementRef, Html, Selector};

use selfheal_core_types::locator::{parse_has_text, parse_point, parse_role};
use selfheal_core_types::{BoundingBox, DocumentError, ElementContext, ElementInfo, PathSegment};

use crate::aria::{accessible_name, name_matches, role_of};

pub(crate) const BOX_ATTR: &str = "data-box";

/// Elements matching `locator`, in document order.
pub(crate) fn select_all<'a>(
    html: &'a Html,
    locator: &str,
) -> Result<Vec<ElementRef<'a>>, DocumentError> {
    let locator = locator.trim();
    if locator.is_empty() {
        return Err(invalid(locator, "empty locator"));
    }

    if let Some((x, y)) = parse_point(locator) {
        return Ok(hit_test(html, x, y).into_iter().collect());
    }

    if let Some(query) = parse_role(locator) {
        return Ok(all_elements(html)
            .filter(|el| role_of(*el).as_deref() == Some(query.role.as_str()))
            .filter(|el| name_matches(&accessible_name(*el), &query.name, query.exact))
            .collect());
    }

    if let Some((base, text)) = parse_has_text(locator) {
        let base = if base.trim().is_empty() { "*" } else { base };
        let needle = text.to_lowercase();
        return Ok(css(html, base)?
            .into_iter()
            .filter(|el| collapsed_text(*el).to_lowercase().contains(&needle))
            .collect());
    }

    css(html, locator)
}

fn css<'a>(html: &'a Html, locator: &str) -> Result<Vec<ElementRef<'a>>, DocumentError> {
    let selector = Selector::parse(locator).map_err(|e| invalid(locator, &e.to_string()))?;
    Ok(html.select(&selector).collect())
}

fn invalid(locator: &str, reason: &str) -> DocumentError {
    DocumentError::InvalidLocator {
        locator: locator.to_string(),
        reason: reason.to_string(),
    }
}

pub(crate) fn all_elements(html: &Html) -> impl Iterator<Item = ElementRef<'_>> {
    html.root_element().descendants().filter_map(ElementRef::wrap)
}

/// Topmost (last painted) element whose box contains the point.
pub(crate) fn hit_test(html: &Html, x: f64, y: f64) -> Option<ElementRef<'_>> {
    all_elements(html)
        .filter(|el| bounding_box(*el).is_some_and(|b| b.contains(x, y)))
        .last()
}

pub(crate) fn bounding_box(el: ElementRef<'_>) -> Option<BoundingBox> {
    let raw = el.value().attr(BOX_ATTR)?;
    let parts: Vec<f64> = raw
        .split(',')
        .map(|p| p.trim().parse::<f64>())
        .collect::<Result<_, _>>()
        .ok()?;
    match parts.as_slice() {
        [x, y, width, height] => Some(BoundingBox::new(*x, *y, *width, *height)),
        _ => None,
    }
}

pub(crate) fn collapsed_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

pub(crate) fn describe(el: ElementRef<'_>) -> ElementInfo {
    let element = el.value();
    ElementInfo {
        tag: element.name().to_string(),
        id: element.id().map(str::to_string),
        classes: element.classes().map(str::to_string).collect(),
        attributes: element
            .attrs()
            .filter(|(name, _)| *name != BOX_ATTR)
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect::<BTreeMap<_, _>>(),
        text: collapsed_text(el),
        bounding_box: bounding_box(el),
    }
}

fn element_index(el: ElementRef<'_>) -> usize {
    el.prev_siblings()
        .filter(|node| node.value().is_element())
        .count()
        + 1
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

pub(crate) fn context(el: ElementRef<'_>) -> ElementContext {
    let parent = el.parent().and_then(ElementRef::wrap);
    let previous = el.prev_siblings().find_map(ElementRef::wrap);
    let next = el.next_siblings().find_map(ElementRef::wrap);

    let mut lineage: Vec<ElementRef<'_>> = el.ancestors().filter_map(ElementRef::wrap).collect();
    lineage.reverse();
    lineage.push(el);

    ElementContext {
        element: describe(el),
        parent_text: parent.map(collapsed_text).and_then(non_empty),
        previous_sibling_text: previous.map(collapsed_text).and_then(non_empty),
        next_sibling_text: next.map(collapsed_text).and_then(non_empty),
        path: lineage
            .into_iter()
            .map(|node| PathSegment {
                tag: node.value().name().to_string(),
                id: node.value().id().map(str::to_string),
                index: element_index(node),
            })
            .collect(),
    }
}

/// First text node containing `text`, then the nearest interactive element to
/// its parent: the parent itself or a descendant first, an ancestor otherwise.
pub(crate) fn text_anchor<'a>(
    html: &'a Html,
    text: &str,
    interactive: &[String],
) -> Option<ElementRef<'a>> {
    let wanted = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if wanted.is_empty() {
        return None;
    }
    let is_interactive =
        |el: &ElementRef<'_>| interactive.iter().any(|tag| tag == el.value().name());

    let parent = html.root_element().descendants().find_map(|node| {
        let content = node.value().as_text()?;
        let collapsed = content.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.contains(&wanted) {
            node.parent().and_then(ElementRef::wrap)
        } else {
            None
        }
    })?;

    parent
        .descendants()
        .filter_map(ElementRef::wrap)
        .find(|el| is_interactive(el))
        // Text wrapped inside a control, e.g. a span in a button.
        .or_else(|| {
            parent
                .ancestors()
                .filter_map(ElementRef::wrap)
                .find(|el| is_interactive(el))
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <form id="login">
            <label>Email</label>
            <input name="email" data-box="10,10,120,20">
            <button class="btn primary" data-box="10,40,60,20">Sign In</button>
          </form>
          <div class="card" data-box="0,100,200,80">
            <p>Ship to <span>home</span></p>
            <a href="/edit" data-box="150,150,30,10">Edit</a>
          </div>
          <button id="go" data-box="0,190,40,10"><span>Go now</span></button>
        </body></html>
    "#;

    fn tags(el: &[ElementRef<'_>]) -> Vec<String> {
        el.iter().map(|e| e.value().name().to_string()).collect()
    }

    #[test]
    fn css_role_text_and_point_locators() {
        let html = Html::parse_document(PAGE);
        assert_eq!(tags(&select_all(&html, "form > .btn").unwrap()), vec!["button"]);
        assert_eq!(
            tags(&select_all(&html, r#"role=button[name="Sign In"]"#).unwrap()),
            vec!["button"]
        );
        assert_eq!(
            tags(&select_all(&html, r#"role=textbox[name*="xyz"]"#).unwrap()),
            Vec::<String>::new()
        );
        assert_eq!(
            tags(&select_all(&html, r#"a:has-text("edit")"#).unwrap()),
            vec!["a"]
        );
        assert_eq!(tags(&select_all(&html, "point=160,155").unwrap()), vec!["a"]);
        assert_eq!(tags(&select_all(&html, "point=100,120").unwrap()), vec!["div"]);
        assert!(select_all(&html, "point=500,500").unwrap().is_empty());
    }

    #[test]
    fn invalid_css_is_reported() {
        let html = Html::parse_document(PAGE);
        let err = select_all(&html, "button[").unwrap_err();
        assert!(matches!(err, DocumentError::InvalidLocator { .. }));
    }

    #[test]
    fn context_collects_neighbours_and_path() {
        let html = Html::parse_document(PAGE);
        let input = select_all(&html, "input").unwrap()[0];
        let ctx = context(input);
        assert_eq!(ctx.element.attributes.get("name").map(String::as_str), Some("email"));
        assert!(!ctx.element.attributes.contains_key(BOX_ATTR));
        assert_eq!(ctx.element.bounding_box, Some(BoundingBox::new(10.0, 10.0, 120.0, 20.0)));
        assert_eq!(ctx.previous_sibling_text.as_deref(), Some("Email"));
        assert_eq!(ctx.next_sibling_text.as_deref(), Some("Sign In"));
        let path: Vec<_> = ctx.path.iter().map(|s| (s.tag.as_str(), s.index)).collect();
        assert_eq!(path, vec![("html", 1), ("body", 2), ("form", 1), ("input", 2)]);
        assert_eq!(ctx.path[2].id.as_deref(), Some("login"));
    }

    #[test]
    fn text_anchor_prefers_descendants_then_ancestors() {
        let html = Html::parse_document(PAGE);
        let interactive: Vec<String> = ["button", "a", "input"].iter().map(|s| s.to_string()).collect();

        let anchor = text_anchor(&html, "Edit", &interactive).unwrap();
        assert_eq!(anchor.value().name(), "a");

        let anchor = text_anchor(&html, "Go now", &interactive).unwrap();
        assert_eq!(anchor.value().id(), Some("go"));

        assert!(text_anchor(&html, "Ship to", &interactive).is_none());

        let anchor = text_anchor(&html, "Sign", &interactive).unwrap();
        assert_eq!(anchor.value().name(), "button");
        assert!(text_anchor(&html, "nowhere", &interactive).is_none());
    }
}
