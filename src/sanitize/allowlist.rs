//! Static allow-list: which tags survive cleaning and with which attributes.

/// An allowed tag and the attributes it may keep.
#[derive(Debug, Clone, Copy)]
pub struct TagRule {
    pub tag: &'static str,
    pub attrs: &'static [&'static str],
}

const fn rule(tag: &'static str, attrs: &'static [&'static str]) -> TagRule {
    TagRule { tag, attrs }
}

const TABLE_CELL: &[&str] = &["abbr", "axis", "colspan", "rowspan", "width"];

/// Tags kept as-is (minus disallowed attributes). Sorted by tag.
pub const ALLOWED_TAGS: &[TagRule] = &[
    rule("a", &["href", "title"]),
    rule("b", &[]),
    rule("blockquote", &["cite"]),
    rule("br", &[]),
    rule("caption", &[]),
    rule("cite", &[]),
    rule("code", &[]),
    rule("col", &["span", "width"]),
    rule("colgroup", &["span", "width"]),
    rule("dd", &[]),
    rule("div", &[]),
    rule("dl", &[]),
    rule("dt", &[]),
    rule("em", &[]),
    rule("h1", &[]),
    rule("h2", &[]),
    rule("h3", &[]),
    rule("h4", &[]),
    rule("h5", &[]),
    rule("h6", &[]),
    rule("i", &[]),
    rule("li", &[]),
    rule("ol", &["start", "type"]),
    rule("p", &[]),
    rule("pre", &[]),
    rule("q", &["cite"]),
    rule("small", &[]),
    rule("span", &[]),
    rule("strike", &[]),
    rule("strong", &[]),
    rule("sub", &[]),
    rule("sup", &[]),
    rule("table", &["summary", "width"]),
    rule("tbody", &[]),
    rule("td", TABLE_CELL),
    rule("tfoot", &[]),
    rule("th", &["abbr", "axis", "colspan", "rowspan", "scope", "width"]),
    rule("thead", &[]),
    rule("tr", &[]),
    rule("u", &[]),
    rule("ul", &["type"]),
];

/// Tags removed together with everything inside them. Any other tag that is
/// not allowed is unwrapped: dropped, but its children are kept.
pub const DROPPED_TAGS: &[&str] = &[
    "audio", "button", "canvas", "embed", "head", "iframe", "img", "math", "noscript", "object",
    "script", "select", "style", "svg", "template", "textarea", "title", "video",
];

/// Attributes holding URLs, checked against [`ALLOWED_SCHEMES`].
pub const URL_ATTRS: &[&str] = &["href", "cite"];

/// URL schemes that may appear in [`URL_ATTRS`]. Scheme-less (relative or
/// fragment-only) URLs are always kept.
pub const ALLOWED_SCHEMES: &[&str] = &["http", "https", "mailto"];

pub fn tag_rule(tag: &str) -> Option<&'static TagRule> {
    ALLOWED_TAGS
        .binary_search_by(|rule| rule.tag.cmp(tag))
        .ok()
        .map(|index| &ALLOWED_TAGS[index])
}

pub fn is_dropped(tag: &str) -> bool {
    DROPPED_TAGS.binary_search(&tag).is_ok()
}

/// Whether a URL attribute value may be kept.
pub fn is_allowed_url(value: &str) -> bool {
    // Browsers ignore embedded whitespace and control characters in schemes
    let compact: String = value
        .chars()
        .filter(|c| !c.is_ascii_whitespace() && !c.is_control())
        .collect();

    let scheme_end = compact.find(|c| matches!(c, ':' | '/' | '?' | '#'));
    match scheme_end {
        Some(end) if compact[end..].starts_with(':') => {
            let scheme = compact[..end].to_ascii_lowercase();
            ALLOWED_SCHEMES.contains(&scheme.as_str())
        }
        _ => true,
    }
}
