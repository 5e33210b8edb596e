//! Parsed XHTML documents.
//!
//! Content documents are parsed with html5ever into an [`ArenaDom`] and
//! wrapped in a [`Document`] that also knows each attached node's position in
//! document order. Positions make "is this anchor before that one" and "is
//! this node inside that one" constant-time questions for the slicer.

mod arena;
mod serialize;
mod tree_sink;

pub use arena::{ArenaDom, ArenaNode, ArenaNodeData, ArenaNodeId, Attribute};
pub use serialize::{escape_attr, escape_text, inner_html, is_void_element, outer_html};

use html5ever::driver::ParseOpts;
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;

use tree_sink::ArenaSink;

const UNPLACED: u32 = u32::MAX;

/// Parse HTML into a [`Document`].
///
/// Parsing is browser-lenient and never fails.
pub fn parse_html(html: &str) -> Document {
    let sink = ArenaSink::new();
    let result = parse_document(sink, ParseOpts::default())
        .from_utf8()
        .one(html.as_bytes());
    Document::new(result.into_dom())
}

/// Parse a body fragment into a [`Document`].
///
/// The fragment is wrapped in a standards-mode shell, so the same markup
/// builds the same tree whether or not it carries a doctype of its own.
pub fn parse_fragment(html: &str) -> Document {
    let wrapped = format!("<!DOCTYPE html><html><head></head><body>{html}</body></html>");
    parse_html(&wrapped)
}

/// A parsed document plus its document-order index.
pub struct Document {
    dom: ArenaDom,
    body: Option<ArenaNodeId>,
    /// Pre-order position of each attached node, indexed by arena id.
    position: Vec<u32>,
    /// Position of the last node in each attached node's subtree.
    subtree_end: Vec<u32>,
}

impl Document {
    pub fn new(mut dom: ArenaDom) -> Self {
        // Duplicate ids resolve to the first element in document order, which
        // is not creation order once the parser has foster-parented anything.
        dom.reindex_ids();
        let mut document = Self {
            dom,
            body: None,
            position: Vec::new(),
            subtree_end: Vec::new(),
        };
        document.reindex();
        document
    }

    pub fn dom(&self) -> &ArenaDom {
        &self.dom
    }

    /// The `<body>` element, if the document has one.
    pub fn body(&self) -> Option<ArenaNodeId> {
        self.body
    }

    /// The node content lives under: `<body>`, else the document root.
    pub fn content_root(&self) -> ArenaNodeId {
        self.body.unwrap_or_else(|| self.dom.document())
    }

    /// Detach every element with one of the given tag names.
    ///
    /// Returns the number of elements removed.
    pub fn strip_tags(&mut self, tags: &[&str]) -> usize {
        let doomed: Vec<_> = self
            .dom
            .descendants(self.dom.document())
            .filter(|&id| {
                self.dom
                    .element_name(id)
                    .is_some_and(|name| tags.contains(&name.as_ref()))
            })
            .collect();

        for &id in &doomed {
            self.dom.detach(id);
        }
        if !doomed.is_empty() {
            self.dom.reindex_ids();
            self.reindex();
        }
        doomed.len()
    }

    fn reindex(&mut self) {
        let len = self.dom.len();
        self.position = vec![UNPLACED; len];
        self.subtree_end = vec![UNPLACED; len];

        let order: Vec<_> = self.dom.descendants(self.dom.document()).collect();
        for (pos, id) in order.iter().enumerate() {
            self.position[id.0 as usize] = pos as u32;
        }
        // Walk backwards so every child's subtree end is known before its parent's
        for (pos, id) in order.iter().enumerate().rev() {
            let node_end = self
                .dom
                .get(*id)
                .map(|n| n.last_child)
                .filter(|child| child.is_some())
                .map(|child| self.subtree_end[child.0 as usize])
                .unwrap_or(pos as u32);
            self.subtree_end[id.0 as usize] = node_end;
        }

        self.body = self.dom.find_by_tag("body");
    }

    /// Pre-order position of a node, or `None` if it is not attached.
    pub fn position(&self, id: ArenaNodeId) -> Option<u32> {
        self.position
            .get(id.0 as usize)
            .copied()
            .filter(|&pos| pos != UNPLACED)
    }

    /// Whether `id` is reachable from the document root.
    pub fn is_attached(&self, id: ArenaNodeId) -> bool {
        self.position(id).is_some()
    }

    /// Whether `a` comes strictly before `b` in document order.
    pub fn precedes(&self, a: ArenaNodeId, b: ArenaNodeId) -> bool {
        match (self.position(a), self.position(b)) {
            (Some(pa), Some(pb)) => pa < pb,
            _ => false,
        }
    }

    /// Whether `node` is a strict descendant of `ancestor`.
    pub fn contains(&self, ancestor: ArenaNodeId, node: ArenaNodeId) -> bool {
        match (self.position(ancestor), self.position(node)) {
            (Some(pa), Some(pn)) => pa < pn && pn <= self.subtree_end[ancestor.0 as usize],
            _ => false,
        }
    }

    /// Attached elements in document order.
    pub fn elements(&self) -> impl Iterator<Item = ArenaNodeId> + '_ {
        self.dom
            .descendants(self.dom.document())
            .filter(|&id| self.dom.is_element(id))
    }

    /// Whether the subtree under `root` holds any non-whitespace text.
    pub fn has_text(&self, root: ArenaNodeId) -> bool {
        self.dom
            .descendants(root)
            .filter_map(|id| self.dom.text_content(id))
            .any(|text| !text.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_finds_body() {
        let doc = parse_html("<html><body><p>Hi</p></body></html>");
        let body = doc.body().expect("body");
        assert!(doc.dom().is_tag(body, "body"));
        assert_eq!(doc.content_root(), body);
    }

    #[test]
    fn test_fragment_gets_implied_body() {
        let doc = parse_html("<h1>Title</h1><p>text</p>");
        assert!(doc.body().is_some());
        assert!(doc.has_text(doc.content_root()));
    }

    #[test]
    fn test_positions_and_containment() {
        let doc = parse_html(
            r#"<body><section id="s"><h1 id="a">A</h1><p id="p">x</p></section><h1 id="b">B</h1></body>"#,
        );
        let dom = doc.dom();
        let s = dom.get_by_id("s").unwrap();
        let a = dom.get_by_id("a").unwrap();
        let p = dom.get_by_id("p").unwrap();
        let b = dom.get_by_id("b").unwrap();

        assert!(doc.precedes(s, a));
        assert!(doc.precedes(a, b));
        assert!(!doc.precedes(b, a));
        assert!(doc.contains(s, a));
        assert!(doc.contains(s, p));
        assert!(!doc.contains(s, b));
        assert!(!doc.contains(a, a));
    }

    #[test]
    fn test_strip_tags() {
        let mut doc = parse_html(
            r#"<html><head><style>p{}</style><script>x()</script></head>
            <body><p>keep<img src="a.png"></p><script id="s">bad()</script></body></html>"#,
        );
        assert_eq!(doc.strip_tags(&["script", "style", "img"]), 4);

        let dom = doc.dom();
        assert!(dom.find_by_tag("script").is_none());
        assert!(dom.find_by_tag("style").is_none());
        assert!(dom.find_by_tag("img").is_none());
        assert!(dom.get_by_id("s").is_none());
        assert!(doc.elements().all(|id| doc.is_attached(id)));
    }

    #[test]
    fn test_duplicate_ids_resolve_in_document_order() {
        // The <p> is created after the table but foster-parented before it
        let doc = parse_html(r#"<body><table id="x"><p id="x">fostered</p><tr><td>c</td></tr></table></body>"#);
        let dom = doc.dom();
        let first = dom.get_by_id("x").unwrap();
        assert!(dom.is_tag(first, "p"));
        let table = dom.find_by_tag("table").unwrap();
        assert!(doc.precedes(first, table));
    }

    #[test]
    fn test_fragment_parse_ignores_caller_doctype() {
        let markup = "<p>a<table><tr><td>x</td></tr></table>b</p>";
        let bare = parse_fragment(markup);
        let quirky = parse_fragment(&format!("<!DOCTYPE html PUBLIC \"-//W3C//DTD HTML 3.2//EN\">{markup}"));
        let p = bare.dom().find_by_tag("p").unwrap();
        // Standards mode closes the paragraph before the table
        assert!(bare.dom().element_children(p).next().is_none());
        assert_eq!(
            inner_html(bare.dom(), bare.content_root()),
            inner_html(quirky.dom(), quirky.content_root())
        );
    }

    #[test]
    fn test_has_text_ignores_whitespace() {
        let doc = parse_html("<body><div>  \n </div></body>");
        assert!(!doc.has_text(doc.content_root()));
    }
}
