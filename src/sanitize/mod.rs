//! HTML sanitizing and the themed chapter shell.
//!
//! Cleaning re-parses the input, keeps only tags and attributes from the
//! static [allow-list](allowlist), and serializes the result. It is total:
//! any string, however malformed, produces clean HTML.

pub mod allowlist;

use std::fmt::Write;

use crate::dom::{ArenaDom, ArenaNodeData, ArenaNodeId, escape_attr, escape_text, parse_fragment};
use crate::options::{ExtractOptions, Theme};

use allowlist::{URL_ATTRS, is_allowed_url, is_dropped, tag_rule};

/// Result of cleaning a fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cleaned {
    pub html: String,
    /// Whether any non-whitespace text survived.
    pub has_text: bool,
}

/// Reduce arbitrary HTML to the allow-listed subset.
pub fn clean_html(html: &str) -> Cleaned {
    let doc = parse_fragment(html);
    let mut cleaner = Cleaner {
        dom: doc.dom(),
        out: String::with_capacity(html.len()),
        has_text: false,
    };
    cleaner.children(doc.content_root());
    Cleaned {
        html: cleaner.out,
        has_text: cleaner.has_text,
    }
}

/// Clean a chapter's HTML and wrap it in the themed shell, substituting a
/// placeholder paragraph when no text survives.
pub fn sanitize_chapter(html: &str, title: &str, options: &ExtractOptions) -> String {
    let cleaned = clean_html(html);
    if cleaned.has_text {
        wrap_document(&cleaned.html, &options.theme)
    } else {
        placeholder_chapter(title, options)
    }
}

/// The themed shell around a placeholder paragraph naming `title`.
pub fn placeholder_chapter(title: &str, options: &ExtractOptions) -> String {
    let text = options
        .placeholder_text
        .replace("{title}", &escape_text(title));
    let body = format!(
        "<p style=\"color: {};\">{}</p>",
        escape_attr(&css_value(&options.theme.muted)),
        text
    );
    wrap_document(&body, &options.theme)
}

/// Wrap clean body HTML in a self-contained document.
///
/// Surrounding whitespace is trimmed so that re-sanitizing a wrapped chapter
/// gives the same document back.
pub fn wrap_document(body: &str, theme: &Theme) -> String {
    let body = body.trim();
    let mut out = String::with_capacity(body.len() + 512);
    out.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<style>\n");
    let _ = writeln!(
        out,
        "body {{ background-color: {}; color: {}; font-family: {}; line-height: {}; margin: 1.5em; }}",
        css_value(&theme.background),
        css_value(&theme.foreground),
        css_value(&theme.font_family),
        css_value(&theme.line_height),
    );
    let _ = writeln!(out, "a {{ color: {}; }}", css_value(&theme.link));
    out.push_str("pre, code { white-space: pre-wrap; }\n");
    out.push_str("table { border-collapse: collapse; }\n");
    out.push_str("</style>\n</head>\n<body>\n");
    out.push_str(body);
    out.push_str("\n</body>\n</html>\n");
    out
}

/// Theme values end up inside `<style>`; keep them from closing the rule or
/// the element.
fn css_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '<' | '>' | '{' | '}' | ';'))
        .collect()
}

struct Cleaner<'a> {
    dom: &'a ArenaDom,
    out: String,
    has_text: bool,
}

impl Cleaner<'_> {
    fn children(&mut self, parent: ArenaNodeId) {
        for child in self.dom.children(parent) {
            self.node(child);
        }
    }

    fn node(&mut self, id: ArenaNodeId) {
        let dom = self.dom;
        let Some(node) = dom.get(id) else {
            return;
        };

        match &node.data {
            ArenaNodeData::Text(text) => {
                if !text.trim().is_empty() {
                    self.has_text = true;
                }
                self.out.push_str(&escape_text(text));
            }
            ArenaNodeData::Element { name, attrs, .. } => {
                let tag = name.local.as_ref();
                if is_dropped(tag) {
                    return;
                }
                let Some(rule) = tag_rule(tag) else {
                    self.children(id);
                    return;
                };

                self.out.push('<');
                self.out.push_str(tag);
                for attr in attrs {
                    let attr_name = attr.name.local.as_ref();
                    if !rule.attrs.contains(&attr_name) {
                        continue;
                    }
                    if URL_ATTRS.contains(&attr_name) && !is_allowed_url(&attr.value) {
                        continue;
                    }
                    let _ = write!(self.out, " {}=\"{}\"", attr_name, escape_attr(&attr.value));
                }
                self.out.push('>');

                if tag == "br" || tag == "col" {
                    return;
                }
                // The parser eats one newline right after <pre>
                if tag == "pre" && self.first_text_starts_with_newline(id) {
                    self.out.push('\n');
                }
                self.children(id);
                self.out.push_str("</");
                self.out.push_str(tag);
                self.out.push('>');
            }
            ArenaNodeData::Document => self.children(id),
            ArenaNodeData::Comment(_) | ArenaNodeData::Doctype { .. } => {}
        }
    }

    fn first_text_starts_with_newline(&self, id: ArenaNodeId) -> bool {
        self.dom
            .children(id)
            .next()
            .and_then(|child| self.dom.text_content(child))
            .is_some_and(|text| text.starts_with('\n'))
    }
}
