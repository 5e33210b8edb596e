//! Href and fragment normalization.
//!
//! Every comparison between a TOC target and a resource path or element id
//! goes through these functions, so that `Text/../text/ch1.xhtml`,
//! `text\ch1.xhtml` and `./text/ch1.xhtml?x=1` all name the same resource and
//! `#Chap%C3%AEtre` matches `id="chapître"`.
//!
//! All functions are total: unusable input yields `None`, which callers treat
//! as "unresolvable".

use percent_encoding::percent_decode_str;

/// Split an href into its path and fragment at the first `#`.
///
/// The fragment is returned without the `#`; an empty fragment is `None`.
///
/// # Examples
///
/// ```
/// use epub_slicer::path::split_href;
///
/// assert_eq!(split_href("ch1.xhtml#sec2"), ("ch1.xhtml", Some("sec2")));
/// assert_eq!(split_href("ch1.xhtml"), ("ch1.xhtml", None));
/// assert_eq!(split_href("#note"), ("", Some("note")));
/// ```
pub fn split_href(href: &str) -> (&str, Option<&str>) {
    match href.split_once('#') {
        Some((path, fragment)) => (path, Some(fragment).filter(|f| !f.is_empty())),
        None => (href, None),
    }
}

/// Canonicalize a resource path.
///
/// Backslashes become forward slashes, any fragment or query string is
/// dropped, and `.`/`..` segments are resolved against an empty base. A `..`
/// that would climb above the archive root is ignored. Returns `None` when
/// nothing is left.
///
/// # Examples
///
/// ```
/// use epub_slicer::path::normalize_path;
///
/// assert_eq!(normalize_path("OEBPS/text/../ch1.xhtml#a"), Some("OEBPS/ch1.xhtml".into()));
/// assert_eq!(normalize_path("..\\..\\ch1.xhtml"), Some("ch1.xhtml".into()));
/// assert_eq!(normalize_path("  "), None);
/// ```
pub fn normalize_path(raw: &str) -> Option<String> {
    let unified = raw.trim().replace('\\', "/");
    let (path, _) = split_href(&unified);
    let path = path.split_once('?').map_or(path, |(before, _)| before);

    let mut stack: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment.trim() {
            "" | "." => {}
            ".." => {
                stack.pop();
            }
            segment => stack.push(segment),
        }
    }

    if stack.is_empty() {
        None
    } else {
        Some(stack.join("/"))
    }
}

/// Normalize a fragment identifier for lenient comparison.
///
/// Strips a leading `#`, percent-decodes as UTF-8 and lower-cases. When the
/// decoded bytes are not valid UTF-8 the raw (trimmed) value is used instead.
///
/// # Examples
///
/// ```
/// use epub_slicer::path::normalize_fragment;
///
/// assert_eq!(normalize_fragment("#Chapter%201"), Some("chapter 1".into()));
/// assert_eq!(normalize_fragment("#"), None);
/// ```
pub fn normalize_fragment(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    let trimmed = trimmed.strip_prefix('#').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return None;
    }

    let decoded = percent_decode_str(trimmed)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| trimmed.to_string());

    let normalized = decoded.trim().to_lowercase();
    if normalized.is_empty() {
        None
    } else {
        Some(normalized)
    }
}

/// A TOC target split into its normalized parts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HrefTarget {
    /// Canonical resource path.
    pub path: Option<String>,
    /// Decoded, lower-cased fragment.
    pub fragment: Option<String>,
    /// Fragment exactly as written (minus the `#`), for case-sensitive id lookups.
    pub fragment_original: Option<String>,
}

impl HrefTarget {
    /// Split and normalize an href.
    pub fn parse(href: &str) -> Self {
        let (path, fragment) = split_href(href.trim());
        let fragment_original = fragment
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(str::to_string);
        Self {
            path: normalize_path(path),
            fragment: fragment.and_then(normalize_fragment),
            fragment_original,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_normalize_path_segments() {
        assert_eq!(
            normalize_path("OEBPS/./text/../text/ch1.xhtml"),
            Some("OEBPS/text/ch1.xhtml".to_string())
        );
        assert_eq!(
            normalize_path("/OEBPS//ch1.xhtml"),
            Some("OEBPS/ch1.xhtml".to_string())
        );
    }

    #[test]
    fn test_normalize_path_backslashes_and_query() {
        assert_eq!(
            normalize_path("OEBPS\\text\\ch1.xhtml?v=2#top"),
            Some("OEBPS/text/ch1.xhtml".to_string())
        );
    }

    #[test]
    fn test_normalize_path_cannot_escape_root() {
        assert_eq!(normalize_path("../../ch1.xhtml"), Some("ch1.xhtml".to_string()));
        assert_eq!(normalize_path("a/../../b"), Some("b".to_string()));
    }

    #[test]
    fn test_normalize_path_blank() {
        assert_eq!(normalize_path(""), None);
        assert_eq!(normalize_path("./"), None);
        assert_eq!(normalize_path("a/.."), None);
        assert_eq!(normalize_path("#only-fragment"), None);
    }

    #[test]
    fn test_normalize_fragment() {
        assert_eq!(normalize_fragment("Intro"), Some("intro".to_string()));
        assert_eq!(normalize_fragment("#Chap%C3%AEtre"), Some("chapître".to_string()));
        assert_eq!(normalize_fragment("  "), None);
        assert_eq!(normalize_fragment("#"), None);
    }

    #[test]
    fn test_normalize_fragment_invalid_utf8_falls_back() {
        // %FF decodes to a lone byte that is not valid UTF-8
        assert_eq!(normalize_fragment("Sec%FF"), Some("sec%ff".to_string()));
    }

    #[test]
    fn test_href_target_parse() {
        let target = HrefTarget::parse("Text/../Text/ch2.xhtml#Part%20One");
        assert_eq!(target.path.as_deref(), Some("Text/ch2.xhtml"));
        assert_eq!(target.fragment.as_deref(), Some("part one"));
        assert_eq!(target.fragment_original.as_deref(), Some("Part%20One"));

        let bare = HrefTarget::parse("ch3.xhtml");
        assert_eq!(bare.fragment, None);
        assert_eq!(bare.fragment_original, None);
    }

    proptest! {
        #[test]
        fn prop_normalized_path_is_canonical(raw in "[a-zA-Z0-9./\\\\?#_ -]{0,40}") {
            if let Some(path) = normalize_path(&raw) {
                prop_assert!(!path.contains('\\'));
                prop_assert!(!path.starts_with('/'));
                prop_assert!(!path.contains('#'));
                prop_assert!(!path.contains('?'));
                for segment in path.split('/') {
                    prop_assert!(!segment.trim().is_empty());
                    prop_assert_ne!(segment.trim(), ".");
                    prop_assert_ne!(segment.trim(), "..");
                }
                prop_assert_eq!(normalize_path(&path), Some(path.clone()));
            }
        }

        #[test]
        fn prop_normalized_fragment_is_lowercase(raw in "#?[A-Za-z0-9%_ -]{0,24}") {
            if let Some(fragment) = normalize_fragment(&raw) {
                prop_assert_eq!(fragment.to_lowercase(), fragment.clone());
                prop_assert!(!fragment.is_empty());
            }
        }
    }
}
