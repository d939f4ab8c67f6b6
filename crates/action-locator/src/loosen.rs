//! Less specific variants of a broken CSS locator
//!
//! Only the trailing compound selector is loosened. Ancestry before it is
//! dropped entirely or kept verbatim, never rewritten.

use selfheal_core_types::locator;
use std::collections::HashSet;

/// Exact-match attribute filter (`[name="value"]`) of a compound selector
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeFilter {
    pub name: String,
    pub value: String,
}

/// Parsed compound selector such as `button#go.btn.primary[type="submit"]`
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Compound<'a> {
    pub tag: Option<&'a str>,
    pub id: Option<&'a str>,
    pub classes: Vec<&'a str>,
    /// Only `=` filters; partial operators are already loose
    pub attributes: Vec<AttributeFilter>,
}

/// Candidates in trial order, deduplicated, never containing `broken` itself.
pub fn looser_candidates(broken: &str) -> Vec<String> {
    let broken = broken.trim();
    let mut candidates = Vec::new();

    if let Some(child) = after_last_child_combinator(broken) {
        candidates.push(child.to_string());
    }

    if let Some(compound) = parse_compound(last_compound(broken)) {
        let tag = compound.tag.unwrap_or("");
        if let Some(first) = compound.classes.first() {
            candidates.push(format!("{}.{}", tag, first));
        }
        if compound.id.is_some() && !tag.is_empty() {
            candidates.push(tag.to_string());
        }
        if let Some(attr) = compound.attributes.first() {
            let half = locator::prefix_chars(&attr.value, attr.value.chars().count() / 2);
            if !half.is_empty() {
                candidates.push(format!(
                    "{}{}",
                    tag,
                    locator::attribute_contains(&attr.name, half)
                ));
            }
        }
    }

    let mut seen = HashSet::new();
    candidates.retain(|c| c != broken && seen.insert(c.clone()));
    candidates
}

/// Text after the last top-level `>`, if any.
pub fn after_last_child_combinator(selector: &str) -> Option<&str> {
    let idx = *top_level_positions(selector, |c| c == '>').last()?;
    let tail = selector[idx + 1..].trim();
    (!tail.is_empty()).then_some(tail)
}

/// Last compound selector, past every combinator and list separator.
pub fn last_compound(selector: &str) -> &str {
    let selector = selector.trim();
    match top_level_positions(selector, |c| {
        c.is_whitespace() || matches!(c, '>' | '+' | '~' | ',')
    })
    .last()
    {
        Some(&idx) => {
            let width = selector[idx..].chars().next().map_or(1, char::len_utf8);
            selector[idx + width..].trim()
        }
        None => selector,
    }
}

pub fn parse_compound(compound: &str) -> Option<Compound<'_>> {
    let compound = compound.trim();
    if compound.is_empty() {
        return None;
    }

    let tag_end = compound.find(is_delimiter).unwrap_or(compound.len());
    let tag = &compound[..tag_end];
    let mut parsed = Compound::default();
    match tag {
        "" | "*" => {}
        _ if is_ident(tag) => parsed.tag = Some(tag),
        _ => return None,
    }

    let mut rest = &compound[tag_end..];
    while let Some(first) = rest.chars().next() {
        match first {
            '#' | '.' => {
                let body = &rest[1..];
                let end = body.find(is_delimiter).unwrap_or(body.len());
                let name = &body[..end];
                if !is_ident(name) {
                    return None;
                }
                if first == '#' {
                    parsed.id = Some(name);
                } else {
                    parsed.classes.push(name);
                }
                rest = &body[end..];
            }
            '[' => {
                let close = closing(rest, '[', ']')?;
                if let Some(filter) = parse_attribute(&rest[1..close]) {
                    parsed.attributes.push(filter);
                }
                rest = &rest[close + 1..];
            }
            ':' => {
                let body = rest.trim_start_matches(':');
                let end = body
                    .find(|c: char| is_delimiter(c) || c == '(')
                    .unwrap_or(body.len());
                let after_name = &rest[rest.len() - body.len() + end..];
                rest = if after_name.starts_with('(') {
                    &after_name[closing(after_name, '(', ')')? + 1..]
                } else {
                    after_name
                };
            }
            _ => return None,
        }
    }

    Some(parsed)
}

fn parse_attribute(body: &str) -> Option<AttributeFilter> {
    let (name, value) = body.split_once('=')?;
    if name.ends_with(['*', '^', '$', '|', '~']) {
        return None;
    }
    let name = name.trim();
    if !is_ident(name) {
        return None;
    }

    let value = value.trim();
    let value = match value.chars().next()? {
        quote @ ('"' | '\'') => {
            let inner = &value[1..];
            locator::unescape_css(&inner[..quoted_end(inner, quote)])
        }
        _ => value.split_whitespace().next()?.to_string(),
    };

    Some(AttributeFilter {
        name: name.to_string(),
        value,
    })
}

// Position of the unescaped closing quote in a quoted body (or its length).
fn quoted_end(inner: &str, quote: char) -> usize {
    let mut escaped = false;
    for (idx, ch) in inner.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == '\\' {
            escaped = true;
        } else if ch == quote {
            return idx;
        }
    }
    inner.len()
}

// Index of the bracket closing the one `input` starts with.
fn closing(input: &str, open: char, close: char) -> Option<usize> {
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match quote {
            Some(q) => {
                if ch == '\\' {
                    escaped = true;
                } else if ch == q {
                    quote = None;
                }
            }
            None => {
                if ch == '\\' {
                    escaped = true;
                } else if ch == '"' || ch == '\'' {
                    quote = Some(ch);
                } else if ch == open {
                    depth += 1;
                } else if ch == close {
                    depth = depth.checked_sub(1)?;
                    if depth == 0 {
                        return Some(idx);
                    }
                }
            }
        }
    }
    None
}

// Byte offsets of characters matching `pred` outside brackets, parentheses and quotes.
fn top_level_positions(input: &str, pred: impl Fn(char) -> bool) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    for (idx, ch) in input.char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        if let Some(q) = quote {
            if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
            continue;
        }
        match ch {
            '\\' => escaped = true,
            '[' | '(' => depth += 1,
            ']' | ')' => depth = depth.saturating_sub(1),
            '"' | '\'' => quote = Some(ch),
            _ if depth == 0 && pred(ch) => positions.push(idx),
            _ => {}
        }
    }
    positions
}

fn is_delimiter(ch: char) -> bool {
    matches!(ch, '#' | '.' | '[' | ':')
}

fn is_ident(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
}
