//! Input model: the already-parsed book handed over by an EPUB reader.
//!
//! Extraction only needs a small surface from the container/OPF/NCX layer,
//! captured by the [`BookSource`] trait. [`Book`] is the in-memory
//! implementation; `ManifestBook` (behind the `cli` feature) reads resource
//! bytes lazily from an unpacked book on disk.

#[cfg(feature = "cli")]
mod manifest;

#[cfg(feature = "cli")]
pub use manifest::ManifestBook;

use std::borrow::Cow;
use std::collections::HashMap;
use std::io;

use percent_encoding::percent_decode_str;

use crate::path::normalize_path;

/// Read-only access to a parsed book.
///
/// Implementations must be immutable for the duration of an extraction pass.
pub trait BookSource {
    /// Root references of the table of contents.
    fn toc(&self) -> &[TocReference];

    /// Reading order.
    fn spine(&self) -> &[SpineItem];

    /// Look up a resource by normalized path.
    fn resource(&self, path: &str) -> Option<&Resource>;

    /// Raw bytes of a resource.
    ///
    /// The default implementation returns the bytes held by the resource.
    fn read_resource<'a>(&'a self, resource: &'a Resource) -> io::Result<Cow<'a, [u8]>> {
        Ok(Cow::Borrowed(&resource.data))
    }
}

/// A node of the book's table of contents, as the EPUB reader produced it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "cli", serde(default))]
pub struct TocReference {
    /// Label from the navigation document.
    pub title: Option<String>,
    /// Target already joined against the package root, possibly with `#fragment`.
    pub href: Option<String>,
    /// Path of the resource this reference belongs to, when the reader resolved it.
    pub resource: Option<String>,
    pub children: Vec<TocReference>,
}

impl TocReference {
    pub fn new(title: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            href: Some(href.into()),
            ..Default::default()
        }
    }

    /// A heading-only entry with no target.
    pub fn heading(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    pub fn with_child(mut self, child: TocReference) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_resource(mut self, path: impl Into<String>) -> Self {
        self.resource = Some(path.into());
        self
    }
}

/// An item in the reading order (spine).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(serde::Serialize, serde::Deserialize))]
pub struct SpineItem {
    pub href: String,
    #[cfg_attr(feature = "cli", serde(default))]
    pub id: Option<String>,
}

/// A content resource (usually an XHTML document).
#[derive(Debug, Clone, Default)]
pub struct Resource {
    /// Path inside the container.
    pub href: String,
    /// Manifest id.
    pub id: Option<String>,
    /// Title the reader found for this resource, if any.
    pub title: Option<String>,
    /// Declared character encoding.
    pub encoding: Option<String>,
    pub data: Vec<u8>,
}

impl Resource {
    pub fn new(href: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            href: href.into(),
            data,
            ..Default::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = Some(encoding.into());
        self
    }
}

/// In-memory book.
#[derive(Debug, Clone, Default)]
pub struct Book {
    pub toc: Vec<TocReference>,
    pub spine: Vec<SpineItem>,
    resources: HashMap<String, Resource>,
}

impl Book {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a resource, keyed by its normalized href.
    ///
    /// Resources whose href normalizes to nothing are ignored.
    pub fn add_resource(&mut self, resource: Resource) {
        if let Some(key) = normalize_path(&resource.href) {
            self.resources.insert(key, resource);
        }
    }

    /// Add a spine item.
    pub fn add_spine_item(&mut self, href: impl Into<String>) {
        self.spine.push(SpineItem {
            href: href.into(),
            id: None,
        });
    }

    pub fn resources(&self) -> impl Iterator<Item = &Resource> {
        self.resources.values()
    }
}

impl BookSource for Book {
    fn toc(&self) -> &[TocReference] {
        &self.toc
    }

    fn spine(&self) -> &[SpineItem] {
        &self.spine
    }

    fn resource(&self, path: &str) -> Option<&Resource> {
        lookup_resource(&self.resources, path)
    }
}

/// Exact lookup, then a percent-decoded retry (hrefs in malformed books are
/// often escaped while the container path is not).
pub(crate) fn lookup_resource<'a>(
    resources: &'a HashMap<String, Resource>,
    path: &str,
) -> Option<&'a Resource> {
    if let Some(resource) = resources.get(path) {
        return Some(resource);
    }
    let decoded = percent_decode_str(path).decode_utf8().ok()?;
    if decoded == path {
        return None;
    }
    resources.get(decoded.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resources_are_keyed_by_normalized_path() {
        let mut book = Book::new();
        book.add_resource(Resource::new("OEBPS\\text\\..\\ch1.xhtml", b"<p/>".to_vec()));

        assert!(book.resource("OEBPS/ch1.xhtml").is_some());
        assert!(book.resource("OEBPS/text/ch1.xhtml").is_none());
    }

    #[test]
    fn test_percent_decoded_lookup() {
        let mut book = Book::new();
        book.add_resource(Resource::new("Text/My Chapter.xhtml", Vec::new()));

        assert!(book.resource("Text/My%20Chapter.xhtml").is_some());
        assert!(book.resource("Text/Other%20Chapter.xhtml").is_none());
    }

    #[test]
    fn test_default_read_borrows_data() {
        let mut book = Book::new();
        book.add_resource(Resource::new("a.xhtml", b"abc".to_vec()));
        let resource = book.resource("a.xhtml").unwrap();
        let bytes = book.read_resource(resource).unwrap();
        assert!(matches!(bytes, Cow::Borrowed(_)));
        assert_eq!(bytes.as_ref(), b"abc");
    }

    #[test]
    fn test_toc_builders() {
        let entry = TocReference::new("Part I", "part1.xhtml")
            .with_child(TocReference::new("Chapter 1", "part1.xhtml#c1"))
            .with_child(TocReference::heading("Interlude"));
        assert_eq!(entry.children.len(), 2);
        assert_eq!(entry.children[1].href, None);
    }
}
