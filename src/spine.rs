//! One chapter per spine item, for books whose TOC yields nothing.

use tracing::debug;

use crate::book::BookSource;
use crate::dom::outer_html;
use crate::extract::{Chapter, TocEntry};
use crate::loader::DocumentCache;
use crate::options::ExtractOptions;
use crate::path::normalize_path;
use crate::sanitize::{placeholder_chapter, sanitize_chapter};

/// Build chapters and outline entries from the spine, in reading order.
///
/// Every spine item yields a chapter, with a placeholder when its resource is
/// missing, unreadable or empty.
pub fn spine_chapters<'b, B: BookSource + ?Sized>(
    book: &'b B,
    cache: &mut DocumentCache<'b, B>,
    options: &ExtractOptions,
) -> (Vec<Chapter>, Vec<TocEntry>) {
    let mut chapters = Vec::with_capacity(book.spine().len());
    let mut entries = Vec::with_capacity(book.spine().len());

    for (index, item) in book.spine().iter().enumerate() {
        let resource = normalize_path(&item.href).and_then(|path| book.resource(&path));
        let title = resource
            .and_then(|r| r.title.as_deref())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| options.spine_title(index));

        let body = resource
            .and_then(|r| cache.load(r))
            .map(|doc| outer_html(doc.dom(), doc.content_root()));
        let content = match body {
            Some(html) => sanitize_chapter(&html, &title, options),
            None => {
                debug!(href = %item.href, "Spine item has no readable document");
                placeholder_chapter(&title, options)
            }
        };

        entries.push(TocEntry {
            title: title.clone(),
            chapter_index: Some(index),
            level: 0,
            resource_href: Some(resource.map_or_else(|| item.href.clone(), |r| r.href.clone())),
            resource_id: resource.and_then(|r| r.id.clone()).or_else(|| item.id.clone()),
        });
        chapters.push(Chapter { title, content });
    }

    (chapters, entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{Book, Resource};

    #[test]
    fn test_titles_and_order() {
        let mut book = Book::new();
        book.add_resource(Resource::new("a.xhtml", b"<p>first</p>".to_vec()));
        book.add_resource(Resource::new("b.xhtml", b"<p>second</p>".to_vec()).with_title("Named"));
        book.add_resource(Resource::new("c.xhtml", b"<p>third</p>".to_vec()).with_id("c"));
        for href in ["a.xhtml", "b.xhtml", "c.xhtml"] {
            book.add_spine_item(href);
        }

        let mut cache = DocumentCache::new(&book);
        let (chapters, entries) = spine_chapters(&book, &mut cache, &ExtractOptions::default());

        let titles: Vec<_> = chapters.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Chapter 1", "Named", "Chapter 3"]);
        assert!(chapters[2].content.contains("<p>third</p>"));
        assert_eq!(entries[2].chapter_index, Some(2));
        assert_eq!(entries[2].resource_id.as_deref(), Some("c"));
    }

    #[test]
    fn test_missing_and_empty_resources_get_placeholders() {
        let mut book = Book::new();
        book.add_resource(Resource::new("empty.xhtml", b"<div><img src='x.png'></div>".to_vec()));
        book.add_spine_item("empty.xhtml");
        book.add_spine_item("gone.xhtml");

        let mut cache = DocumentCache::new(&book);
        let (chapters, entries) = spine_chapters(&book, &mut cache, &ExtractOptions::default());
        assert_eq!(chapters.len(), 2);
        assert!(chapters[0].content.contains("No readable content for Chapter 1."));
        assert!(chapters[1].content.contains("No readable content for Chapter 2."));
        assert_eq!(entries[1].resource_href.as_deref(), Some("gone.xhtml"));
    }
}
