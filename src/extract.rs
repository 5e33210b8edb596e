//! The extraction pass: book in, chapters and outline out.
//!
//! A pass flattens the TOC, slices every referenced resource and sanitizes
//! the slices. If that produces nothing, it falls back to one chapter per
//! spine item. Per-entry problems become placeholder chapters; the only
//! error is a book that yields no chapters at all.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::book::{BookSource, Resource};
use crate::error::{Error, Result};
use crate::loader::{DocumentCache, resource_key};
use crate::options::ExtractOptions;
use crate::sanitize::{placeholder_chapter, sanitize_chapter};
use crate::slicer::ResourceSlice;
use crate::spine::spine_chapters;
use crate::toc::{TocNode, flatten_toc};

/// One navigable unit of the book.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Chapter {
    pub title: String,
    /// Self-contained sanitized HTML document; never empty.
    pub content: String,
}

/// An outline entry for the reader UI.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct TocEntry {
    pub title: String,
    /// Index into [`Extraction::chapters`], or `None` for structural entries.
    pub chapter_index: Option<usize>,
    pub level: usize,
    pub resource_href: Option<String>,
    pub resource_id: Option<String>,
}

impl TocEntry {
    pub fn is_navigable(&self) -> bool {
        self.chapter_index.is_some()
    }
}

/// The result of one extraction pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize))]
pub struct Extraction {
    pub chapters: Vec<Chapter>,
    pub entries: Vec<TocEntry>,
}

impl Extraction {
    pub fn chapter(&self, index: usize) -> Option<&Chapter> {
        self.chapters.get(index)
    }

    /// The first outline entry that opens chapter `index`.
    pub fn entry_for_chapter(&self, index: usize) -> Option<&TocEntry> {
        self.entries
            .iter()
            .find(|entry| entry.chapter_index == Some(index))
    }
}

/// Extract chapters from a book.
pub fn extract_chapters<B: BookSource + ?Sized>(
    book: &B,
    options: &ExtractOptions,
) -> Result<Extraction> {
    ExtractionPass::new(book, options).run()
}

/// State owned by a single pass: the document cache lives and dies with it.
pub struct ExtractionPass<'b, 'o, B: BookSource + ?Sized> {
    book: &'b B,
    options: &'o ExtractOptions,
    cache: DocumentCache<'b, B>,
}

impl<'b, 'o, B: BookSource + ?Sized> ExtractionPass<'b, 'o, B> {
    pub fn new(book: &'b B, options: &'o ExtractOptions) -> Self {
        Self {
            book,
            options,
            cache: DocumentCache::new(book),
        }
    }

    pub fn run(mut self) -> Result<Extraction> {
        let nodes = flatten_toc(self.book, &self.options.untitled_title);
        let mut extraction = self.from_toc(&nodes);
        let mut source = "toc";

        if extraction.chapters.is_empty() {
            debug!(
                toc_entries = nodes.len(),
                spine = self.book.spine().len(),
                "TOC produced no chapters, using spine"
            );
            let (chapters, entries) = spine_chapters(self.book, &mut self.cache, self.options);
            extraction = Extraction { chapters, entries };
            source = "spine";
        }

        if extraction.chapters.is_empty() {
            return Err(Error::NoReadableChapters);
        }

        info!(
            source,
            chapters = extraction.chapters.len(),
            entries = extraction.entries.len(),
            documents = self.cache.parsed_count(),
            "Extracted chapters"
        );
        Ok(extraction)
    }

    fn from_toc(&mut self, nodes: &[TocNode<'b>]) -> Extraction {
        let mut groups: Vec<(&'b Resource, Vec<&TocNode<'b>>)> = Vec::new();
        let mut group_index: HashMap<String, usize> = HashMap::new();

        for node in nodes.iter().filter(|node| node.is_navigable()) {
            let Some(resource) = node.resource else {
                continue;
            };
            let index = *group_index
                .entry(resource_key(resource))
                .or_insert_with(|| {
                    groups.push((resource, Vec::new()));
                    groups.len() - 1
                });
            groups[index].1.push(node);
        }

        let mut contents: HashMap<usize, String> = HashMap::new();
        for (resource, group) in groups {
            let document = self.cache.load(resource);
            let slice = ResourceSlice::new(document, group);
            for (node, html) in slice.nodes.iter().zip(slice.slices()) {
                let content = match html {
                    Some(html) => sanitize_chapter(&html, &node.title, self.options),
                    None => placeholder_chapter(&node.title, self.options),
                };
                contents.insert(node.order, content);
            }
        }

        let mut extraction = Extraction::default();
        for node in nodes {
            let chapter_index = contents.remove(&node.order).map(|content| {
                extraction.chapters.push(Chapter {
                    title: node.title.clone(),
                    content,
                });
                extraction.chapters.len() - 1
            });
            extraction.entries.push(TocEntry {
                title: node.title.clone(),
                chapter_index,
                level: node.level,
                resource_href: node
                    .resource
                    .map(|r| r.href.clone())
                    .or_else(|| node.resource_path.clone()),
                resource_id: node.resource.and_then(|r| r.id.clone()),
            });
        }
        extraction
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, TocReference};

    fn book() -> Book {
        let mut book = Book::new();
        book.add_resource(
            Resource::new(
                "OEBPS/ch.xhtml",
                br#"<html><body><h1 id="a">One</h1><p>alpha</p><h1 id="b">Two</h1><p>beta</p></body></html>"#.to_vec(),
            )
            .with_id("ch"),
        );
        book.add_spine_item("OEBPS/ch.xhtml");
        book
    }

    #[test]
    fn test_fragments_in_one_resource() {
        let mut book = book();
        book.toc = vec![
            TocReference::new("One", "OEBPS/ch.xhtml#a"),
            TocReference::new("Two", "OEBPS/ch.xhtml#b"),
        ];

        let extraction = extract_chapters(&book, &ExtractOptions::default()).unwrap();
        assert_eq!(extraction.chapters.len(), 2);
        assert!(extraction.chapters[0].content.contains("alpha"));
        assert!(!extraction.chapters[0].content.contains("beta"));
        assert!(extraction.chapters[1].content.contains("beta"));
        assert!(!extraction.chapters[1].content.contains("alpha"));

        let entry = extraction.entry_for_chapter(1).unwrap();
        assert_eq!(entry.title, "Two");
        assert_eq!(entry.resource_id.as_deref(), Some("ch"));
        assert_eq!(entry.resource_href.as_deref(), Some("OEBPS/ch.xhtml"));
    }

    #[test]
    fn test_structural_entries_have_no_chapter() {
        let mut book = book();
        book.toc = vec![
            TocReference::heading("Part One").with_child(TocReference::new("One", "OEBPS/ch.xhtml#a")),
            TocReference::new("Lost", "OEBPS/missing.xhtml"),
        ];

        let extraction = extract_chapters(&book, &ExtractOptions::default()).unwrap();
        assert_eq!(extraction.chapters.len(), 1);
        let indices: Vec<_> = extraction.entries.iter().map(|e| e.chapter_index).collect();
        assert_eq!(indices, vec![None, Some(0), None]);
        assert_eq!(extraction.entries[1].level, 1);
        assert!(!extraction.entries[2].is_navigable());
        assert_eq!(
            extraction.entries[2].resource_href.as_deref(),
            Some("OEBPS/missing.xhtml")
        );
    }

    #[test]
    fn test_unresolved_anchor_gets_placeholder() {
        let mut book = Book::new();
        book.add_resource(Resource::new("a.xhtml", b"<p>x</p>".to_vec()));
        book.toc = vec![
            TocReference::new("First", "a.xhtml"),
            TocReference::new("Ghost", "a.xhtml#nowhere"),
        ];

        let extraction = extract_chapters(&book, &ExtractOptions::default()).unwrap();
        assert_eq!(extraction.chapters.len(), 2);
        assert!(extraction.chapters[0].content.contains("<p>x</p>"));
        assert!(extraction.chapters[1].content.contains("No readable content for Ghost."));
    }

    #[test]
    fn test_empty_book_is_fatal() {
        let err = extract_chapters(&Book::new(), &ExtractOptions::default()).unwrap_err();
        assert!(matches!(err, Error::NoReadableChapters));
    }

    #[test]
    fn test_resource_is_parsed_once() {
        let mut book = book();
        book.toc = vec![
            TocReference::new("One", "OEBPS/ch.xhtml#a"),
            TocReference::new("Two", "OEBPS/ch.xhtml#b"),
        ];
        let options = ExtractOptions::default();
        let mut pass = ExtractionPass::new(&book, &options);
        let nodes = flatten_toc(&book, "Untitled");
        pass.from_toc(&nodes);
        assert_eq!(pass.cache.parsed_count(), 1);
    }
}
