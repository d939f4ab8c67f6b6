//! Minimal ARIA role and accessible-name computation for `role=` locators.

use scraper::ElementRef;

use crate::select::collapsed_text;

/// Role implied by an element's tag when no `role` attribute is present.
pub fn implicit_role(tag: &str, input_type: Option<&str>) -> Option<&'static str> {
    match tag {
        "button" => Some("button"),
        "a" => Some("link"),
        "textarea" => Some("textbox"),
        "select" => Some("combobox"),
        "input" => match input_type.map(|t| t.to_ascii_lowercase()).as_deref() {
            Some("checkbox") => Some("checkbox"),
            Some("radio") => Some("radio"),
            Some("submit") | Some("button") | Some("reset") | Some("image") => Some("button"),
            Some("hidden") => None,
            _ => Some("textbox"),
        },
        _ => None,
    }
}

pub(crate) fn role_of(el: ElementRef<'_>) -> Option<String> {
    let element = el.value();
    if let Some(explicit) = element
        .attr("role")
        .and_then(|roles| roles.split_whitespace().next())
    {
        return Some(explicit.to_ascii_lowercase());
    }
    implicit_role(element.name(), element.attr("type")).map(str::to_string)
}

/// `aria-label`, else text content, else `title`, else `placeholder`.
pub(crate) fn accessible_name(el: ElementRef<'_>) -> String {
    let element = el.value();
    if let Some(label) = element.attr("aria-label").map(str::trim).filter(|l| !l.is_empty()) {
        return label.to_string();
    }
    let text = collapsed_text(el);
    if !text.is_empty() {
        return text;
    }
    ["title", "placeholder", "value"]
        .iter()
        .find_map(|attr| element.attr(attr).map(str::trim).filter(|v| !v.is_empty()))
        .unwrap_or_default()
        .to_string()
}

/// Exact names compare verbatim; partial names are case-insensitive substrings.
pub(crate) fn name_matches(name: &str, wanted: &str, exact: bool) -> bool {
    if exact {
        name == wanted
    } else if wanted.is_empty() {
        true
    } else {
        name.to_lowercase().contains(&wanted.to_lowercase())
    }
}
