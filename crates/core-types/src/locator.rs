//! Builders and parsers for the locator forms generated during capture and healing.
//!
//! The grammar here is deliberately closed: only the shapes the repository and
//! the resolver emit are understood. Everything else is an opaque string for the
//! live document to interpret.

const ROLE_PREFIX: &str = "role=";
const POINT_PREFIX: &str = "point=";
const HAS_TEXT: &str = ":has-text(";

/// First `max` characters of `text`, never splitting a character.
pub fn prefix_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Quote a value as a double-quoted CSS string.
pub fn css_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for ch in value.chars() {
        if ch == '"' || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push('"');
    out
}

/// Inverse of [`css_string`] for a double-quoted string body without its quotes.
pub fn unescape_css(body: &str) -> String {
    let mut out = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(ch);
        }
    }
    out
}

pub fn id(value: &str) -> String {
    format!("#{}", value)
}

pub fn classes<S: AsRef<str>>(classes: &[S]) -> String {
    classes
        .iter()
        .map(|c| c.as_ref())
        .filter(|c| !c.is_empty())
        .map(|c| format!(".{}", c))
        .collect()
}

pub fn attribute(name: &str, value: &str) -> String {
    format!("[{}={}]", name, css_string(value))
}

pub fn attribute_contains(name: &str, value: &str) -> String {
    format!("[{}*={}]", name, css_string(value))
}

/// `role=<role>[name="..."]` (exact) or `role=<role>[name*="..."]` (partial).
pub fn role_name(role: &str, name: &str, exact: bool) -> String {
    let op = if exact { "=" } else { "*=" };
    format!("{}{}[name{}{}]", ROLE_PREFIX, role, op, css_string(name))
}

/// `<base>:has-text("...")`
pub fn has_text(base: &str, text: &str) -> String {
    format!("{}{}{})", base, HAS_TEXT, css_string(text))
}

/// Position-addressed locator for the topmost element under a viewport point.
pub fn point(x: f64, y: f64) -> String {
    format!("{}{},{}", POINT_PREFIX, x.round() as i64, y.round() as i64)
}

/// Parsed `role=` locator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleQuery {
    pub role: String,
    pub name: String,
    pub exact: bool,
}

pub fn parse_role(locator: &str) -> Option<RoleQuery> {
    let rest = locator.trim().strip_prefix(ROLE_PREFIX)?;
    let Some(open) = rest.find('[') else {
        let role = rest.trim();
        return (!role.is_empty()).then(|| RoleQuery {
            role: role.to_string(),
            name: String::new(),
            exact: false,
        });
    };
    let role = rest[..open].trim();
    let filter = rest[open + 1..].strip_suffix(']')?;
    let (exact, quoted) = if let Some(value) = filter.strip_prefix("name*=") {
        (false, value)
    } else {
        (true, filter.strip_prefix("name=")?)
    };
    let body = quoted.strip_prefix('"')?.strip_suffix('"')?;
    if role.is_empty() {
        return None;
    }
    Some(RoleQuery {
        role: role.to_string(),
        name: unescape_css(body),
        exact,
    })
}

/// Split `<base>:has-text("...")` into the base selector and the text.
pub fn parse_has_text(locator: &str) -> Option<(&str, String)> {
    let idx = locator.find(HAS_TEXT)?;
    let base = &locator[..idx];
    let body = locator[idx + HAS_TEXT.len()..]
        .strip_suffix(')')?
        .strip_prefix('"')?
        .strip_suffix('"')?;
    Some((base, unescape_css(body)))
}

pub fn parse_point(locator: &str) -> Option<(f64, f64)> {
    let rest = locator.trim().strip_prefix(POINT_PREFIX)?;
    let (x, y) = rest.split_once(',')?;
    Some((x.trim().parse().ok()?, y.trim().parse().ok()?))
}
