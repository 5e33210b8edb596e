//! # epub-slicer
//!
//! Turns an EPUB's table of contents into a list of readable chapters.
//!
//! TOC entries in real books rarely map one-to-one onto content files: a
//! single XHTML file often holds several chapters, each marked by a fragment
//! anchor. This crate resolves every entry to a start node in its document,
//! carves the document into non-overlapping slices between consecutive
//! anchors, and sanitizes each slice into a small self-contained HTML page.
//! Books without a usable TOC get one chapter per spine item instead.
//!
//! ## Quick Start
//!
//! ```
//! use epub_slicer::{Book, ExtractOptions, Resource, TocReference, extract_chapters};
//!
//! let mut book = Book::new();
//! book.add_resource(Resource::new(
//!     "OEBPS/text.xhtml",
//!     br#"<h1 id="a">One</h1><p>alpha</p><h1 id="b">Two</h1><p>beta</p>"#.to_vec(),
//! ));
//! book.add_spine_item("OEBPS/text.xhtml");
//! book.toc.push(TocReference::new("One", "OEBPS/text.xhtml#a"));
//! book.toc.push(TocReference::new("Two", "OEBPS/text.xhtml#b"));
//!
//! let extraction = extract_chapters(&book, &ExtractOptions::default()).unwrap();
//! assert_eq!(extraction.chapters.len(), 2);
//! assert!(extraction.chapters[0].content.contains("alpha"));
//! assert!(extraction.chapters[1].content.contains("beta"));
//! ```
//!
//! ## Book sources
//!
//! Parsing the EPUB container is left to the caller. Anything that implements
//! [`BookSource`] can be extracted; [`Book`] keeps everything in memory.

pub mod anchor;
pub mod book;
pub mod dom;
pub mod error;
pub mod extract;
pub mod loader;
pub mod options;
pub mod path;
pub mod sanitize;
pub mod session;
pub mod slicer;
pub mod spine;
pub mod toc;
pub(crate) mod util;

#[cfg(feature = "cli")]
pub use book::ManifestBook;
pub use book::{Book, BookSource, Resource, SpineItem, TocReference};
pub use error::{Error, Result};
pub use extract::{Chapter, Extraction, TocEntry, extract_chapters};
pub use options::{ExtractOptions, Theme};
pub use session::{ExtractionSession, LoadTicket, Published};
