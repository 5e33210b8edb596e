//! Error types for chapter extraction.

use thiserror::Error;

/// Errors that can surface from an extraction pass or a book source.
///
/// Per-resource problems (missing files, bad fragments, undecodable bytes)
/// never show up here: they are absorbed into placeholder chapters.
#[derive(Error, Debug)]
pub enum Error {
    #[error("no readable chapters: the book has no usable table of contents and an empty spine")]
    NoReadableChapters,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "cli")]
    #[error("Invalid manifest: {0}")]
    InvalidManifest(String),

    #[cfg(feature = "cli")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
