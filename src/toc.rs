//! Table-of-contents flattening.
//!
//! The hierarchical TOC is walked depth-first, pre-order, into a flat list of
//! [`TocNode`]s. The `order` counter assigned here is the canonical reading
//! order for everything downstream.

use crate::book::{BookSource, Resource, TocReference};
use crate::path::{HrefTarget, normalize_path};

/// A flattened TOC entry.
#[derive(Debug, Clone)]
pub struct TocNode<'b> {
    pub title: String,
    /// Nesting depth; roots are 0.
    pub level: usize,
    /// Canonical path of the target resource.
    pub resource_path: Option<String>,
    /// Decoded, lower-cased fragment.
    pub fragment: Option<String>,
    /// Fragment as written in the TOC.
    pub fragment_original: Option<String>,
    /// The book resource this entry points at, if it exists.
    pub resource: Option<&'b Resource>,
    /// Position in traversal order; unique and strictly increasing.
    pub order: usize,
}

impl TocNode<'_> {
    /// Whether this entry can become a chapter.
    pub fn is_navigable(&self) -> bool {
        self.resource.is_some() && self.resource_path.is_some()
    }
}

/// Flatten the book's TOC.
///
/// Entries are never deduplicated: several entries may point at the same
/// resource, or even the same fragment.
pub fn flatten_toc<'b, B: BookSource + ?Sized>(book: &'b B, untitled: &str) -> Vec<TocNode<'b>> {
    let mut nodes = Vec::new();
    for reference in book.toc() {
        flatten_into(book, reference, 0, untitled, &mut nodes);
    }
    nodes
}

fn flatten_into<'b, B: BookSource + ?Sized>(
    book: &'b B,
    reference: &'b TocReference,
    level: usize,
    untitled: &str,
    out: &mut Vec<TocNode<'b>>,
) {
    let owner = reference
        .resource
        .as_deref()
        .and_then(normalize_path)
        .and_then(|path| book.resource(&path));

    let href = non_blank(reference.href.as_deref()).or_else(|| owner.map(|r| r.href.as_str()));
    let target = href.map(HrefTarget::parse).unwrap_or_default();

    let resource = target
        .path
        .as_deref()
        .and_then(|path| book.resource(path))
        .or(owner);

    let title = non_blank(reference.title.as_deref())
        .or_else(|| resource.and_then(|r| non_blank(r.title.as_deref())))
        .unwrap_or(untitled)
        .to_string();

    out.push(TocNode {
        title,
        level,
        resource_path: target.path,
        fragment: target.fragment,
        fragment_original: target.fragment_original,
        resource,
        order: out.len(),
    });

    for child in &reference.children {
        flatten_into(book, child, level + 1, untitled, out);
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, Resource};
    use proptest::prelude::*;

    fn book_with(paths: &[&str]) -> Book {
        let mut book = Book::new();
        for path in paths {
            book.add_resource(Resource::new(*path, Vec::new()));
        }
        book
    }

    #[test]
    fn test_preorder_levels_and_order() {
        let mut book = book_with(&["a.xhtml", "b.xhtml"]);
        book.toc = vec![
            TocReference::new("Part", "a.xhtml")
                .with_child(TocReference::new("One", "a.xhtml#one"))
                .with_child(
                    TocReference::new("Two", "a.xhtml#two")
                        .with_child(TocReference::new("Two.1", "b.xhtml")),
                ),
            TocReference::new("Appendix", "b.xhtml#app"),
        ];

        let nodes = flatten_toc(&book, "Untitled");
        let summary: Vec<_> = nodes
            .iter()
            .map(|n| (n.title.as_str(), n.level, n.order))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("Part", 0, 0),
                ("One", 1, 1),
                ("Two", 1, 2),
                ("Two.1", 2, 3),
                ("Appendix", 0, 4),
            ]
        );
        assert_eq!(nodes[1].fragment.as_deref(), Some("one"));
        assert_eq!(nodes[4].resource_path.as_deref(), Some("b.xhtml"));
    }

    #[test]
    fn test_title_fallbacks() {
        let mut book = Book::new();
        book.add_resource(Resource::new("a.xhtml", Vec::new()).with_title("From Resource"));
        book.add_resource(Resource::new("b.xhtml", Vec::new()));
        book.toc = vec![
            TocReference {
                href: Some("a.xhtml".into()),
                ..Default::default()
            },
            TocReference {
                title: Some("   ".into()),
                href: Some("b.xhtml".into()),
                ..Default::default()
            },
        ];

        let nodes = flatten_toc(&book, "Untitled");
        assert_eq!(nodes[0].title, "From Resource");
        assert_eq!(nodes[1].title, "Untitled");
    }

    #[test]
    fn test_href_falls_back_to_owning_resource() {
        let mut book = Book::new();
        book.add_resource(Resource::new("OEBPS/c.xhtml", Vec::new()));
        book.toc = vec![TocReference::heading("Chapter").with_resource("OEBPS/c.xhtml")];

        let nodes = flatten_toc(&book, "Untitled");
        assert_eq!(nodes[0].resource_path.as_deref(), Some("OEBPS/c.xhtml"));
        assert!(nodes[0].is_navigable());
    }

    #[test]
    fn test_missing_resource_is_not_navigable() {
        let mut book = book_with(&["a.xhtml"]);
        book.toc = vec![
            TocReference::new("Gone", "missing.xhtml#x"),
            TocReference::heading("Heading only"),
        ];

        let nodes = flatten_toc(&book, "Untitled");
        assert_eq!(nodes[0].resource_path.as_deref(), Some("missing.xhtml"));
        assert!(!nodes[0].is_navigable());
        assert!(!nodes[1].is_navigable());
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut book = book_with(&["a.xhtml"]);
        book.toc = vec![
            TocReference::new("A", "a.xhtml#x"),
            TocReference::new("A again", "a.xhtml#x"),
        ];
        assert_eq!(flatten_toc(&book, "Untitled").len(), 2);
    }

    fn arb_toc() -> impl Strategy<Value = Vec<TocReference>> {
        let leaf = "[a-z]{1,6}".prop_map(|t| TocReference::new(t.clone(), format!("{t}.xhtml")));
        let tree = leaf.prop_recursive(4, 32, 4, |inner| {
            ("[a-z]{1,6}", prop::collection::vec(inner, 0..4)).prop_map(|(t, children)| {
                let mut reference = TocReference::new(t.clone(), format!("{t}.xhtml#{t}"));
                reference.children = children;
                reference
            })
        });
        prop::collection::vec(tree, 0..5)
    }

    fn expected_preorder(refs: &[TocReference], level: usize, out: &mut Vec<(String, usize)>) {
        for reference in refs {
            out.push((reference.title.clone().unwrap_or_default(), level));
            expected_preorder(&reference.children, level + 1, out);
        }
    }

    proptest! {
        #[test]
        fn prop_flatten_is_preorder(toc in arb_toc()) {
            let mut book = Book::new();
            book.toc = toc;
            let nodes = flatten_toc(&book, "Untitled");

            let mut expected = Vec::new();
            expected_preorder(&book.toc, 0, &mut expected);
            let actual: Vec<_> = nodes.iter().map(|n| (n.title.clone(), n.level)).collect();
            prop_assert_eq!(actual, expected);

            for (i, node) in nodes.iter().enumerate() {
                prop_assert_eq!(node.order, i);
            }
            for pair in nodes.windows(2) {
                prop_assert!(pair[1].level <= pair[0].level + 1);
            }
        }
    }
}
