//! Document loading: bytes → decoded text → stripped DOM, cached per pass.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::book::{BookSource, Resource};
use crate::dom::{Document, parse_html};
use crate::path::normalize_path;
use crate::util::decode_text;

/// Elements removed from every loaded document before slicing.
pub const STRIPPED_TAGS: &[&str] = &["script", "style", "img"];

/// Decode and parse resource bytes, dropping scripts, styles and images.
pub fn load_document(bytes: &[u8], declared_encoding: Option<&str>) -> Document {
    let text = decode_text(bytes, declared_encoding);
    let mut document = parse_html(&text);
    let stripped = document.strip_tags(STRIPPED_TAGS);
    if stripped > 0 {
        debug!(stripped, "Removed script/style/img elements");
    }
    document
}

/// Parsed documents for one extraction pass, keyed by resource path.
///
/// A resource is read and parsed at most once; a failed read is remembered
/// as `None` so it is not retried either. The cache is owned by the pass and
/// dropped with it.
pub struct DocumentCache<'b, B: BookSource + ?Sized> {
    book: &'b B,
    documents: HashMap<String, Option<Document>>,
    parsed: usize,
}

impl<'b, B: BookSource + ?Sized> DocumentCache<'b, B> {
    pub fn new(book: &'b B) -> Self {
        Self {
            book,
            documents: HashMap::new(),
            parsed: 0,
        }
    }

    /// The parsed document for `resource`, or `None` if it cannot be read.
    pub fn load(&mut self, resource: &Resource) -> Option<&Document> {
        let path = resource_key(resource);
        if !self.documents.contains_key(&path) {
            let document = match self.book.read_resource(resource) {
                Ok(bytes) => {
                    self.parsed += 1;
                    Some(load_document(&bytes, resource.encoding.as_deref()))
                }
                Err(err) => {
                    warn!(path = %path, "Failed to read resource: {err}");
                    None
                }
            };
            self.documents.insert(path.clone(), document);
        }
        self.documents.get(&path).and_then(Option::as_ref)
    }

    /// Number of documents parsed so far.
    pub fn parsed_count(&self) -> usize {
        self.parsed
    }
}

/// Cache key of a resource: its normalized href.
pub fn resource_key(resource: &Resource) -> String {
    normalize_path(&resource.href).unwrap_or_else(|| resource.href.clone())
}
