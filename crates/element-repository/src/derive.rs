//! Alternative-locator derivation and nearby-text extraction used by capture.

use selfheal_core_types::locator::{self, prefix_chars};
use selfheal_core_types::{ElementContext, PathSegment};

/// Attributes probed for alternatives, in priority order.
const ATTRIBUTE_ANCHORS: [&str; 3] = ["name", "data-testid", "aria-label"];

/// Alternative locators for a captured element, most specific first.
///
/// Order: `#id`, `.class.list`, `[name]`, `[data-testid]`, `[aria-label]`,
/// tag compounded with the first of those, then the structural path.
pub fn alternative_locators(context: &ElementContext) -> Vec<String> {
    let element = &context.element;
    let mut anchors = Vec::new();

    if let Some(id) = element.non_empty_id() {
        anchors.push(id_selector(id));
    }

    if !element.classes.is_empty() && element.classes.iter().all(|c| is_identifier(c)) {
        let selector = locator::classes(&element.classes);
        if !selector.is_empty() {
            anchors.push(selector);
        }
    }

    for name in ATTRIBUTE_ANCHORS {
        if let Some(value) = element.attr(name) {
            anchors.push(locator::attribute(name, value));
        }
    }

    let mut alternatives = anchors.clone();
    if let Some(first) = anchors.first() {
        if !element.tag.is_empty() {
            alternatives.push(format!("{}{}", element.tag, first));
        }
    }
    if let Some(path) = structural_path(&context.path) {
        alternatives.push(path);
    }

    let mut seen = std::collections::HashSet::new();
    alternatives.retain(|candidate| seen.insert(candidate.clone()));
    alternatives
}

/// Absolute path anchored at the nearest ancestor-or-self with an id, else at
/// the root element, with sibling indexes for every unanchored step.
pub fn structural_path(path: &[PathSegment]) -> Option<String> {
    if path.is_empty() {
        return None;
    }
    let mut steps = Vec::with_capacity(path.len());
    for (depth, segment) in path.iter().enumerate().rev() {
        if let Some(id) = segment.id.as_deref().filter(|id| is_identifier(id)) {
            steps.push(locator::id(id));
            break;
        }
        if depth == 0 {
            steps.push(segment.tag.clone());
        } else {
            steps.push(format!("{}:nth-child({})", segment.tag, segment.index));
        }
    }
    steps.reverse();
    Some(steps.join(" > "))
}

/// Self text, else parent, previous sibling, next sibling; first non-empty wins.
pub fn nearby_text(context: &ElementContext, max_len: usize) -> String {
    [
        Some(context.element.text.as_str()),
        context.parent_text.as_deref(),
        context.previous_sibling_text.as_deref(),
        context.next_sibling_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(collapse_whitespace)
    .find(|text| !text.is_empty())
    .map(|text| prefix_chars(&text, max_len).to_string())
    .unwrap_or_default()
}

pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn id_selector(id: &str) -> String {
    if is_identifier(id) {
        locator::id(id)
    } else {
        locator::attribute("id", id)
    }
}

/// Plain CSS identifier: usable after `#` or `.` without escaping.
fn is_identifier(value: &str) -> bool {
    let mut chars = value.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return false,
    };
    let valid_rest = |c: char| c.is_alphanumeric() || c == '-' || c == '_';
    if first == '-' {
        return match chars.next() {
            Some(c) if c.is_alphabetic() || c == '_' || c == '-' => chars.all(valid_rest),
            _ => false,
        };
    }
    (first.is_alphabetic() || first == '_') && chars.all(valid_rest)
}
