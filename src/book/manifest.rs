//! A book described by a JSON manifest next to its unpacked content files.
//!
//! ```json
//! {
//!   "toc": [{ "title": "One", "href": "OEBPS/ch1.xhtml#one", "children": [] }],
//!   "spine": [{ "href": "OEBPS/ch1.xhtml" }],
//!   "resources": [{ "href": "OEBPS/ch1.xhtml", "id": "ch1", "encoding": "utf-8" }]
//! }
//! ```
//!
//! Resource bytes are read from `<manifest dir>/<file or href>` only when the
//! extraction pass asks for them.

use std::borrow::Cow;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use super::{BookSource, Resource, SpineItem, TocReference, lookup_resource};
use crate::error::{Error, Result};
use crate::path::normalize_path;

#[derive(Debug, Deserialize)]
struct Manifest {
    #[serde(default)]
    toc: Vec<TocReference>,
    #[serde(default)]
    spine: Vec<SpineItem>,
    #[serde(default)]
    resources: Vec<ManifestResource>,
}

#[derive(Debug, Deserialize)]
struct ManifestResource {
    href: String,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
    /// File holding the bytes, relative to the manifest; defaults to `href`.
    #[serde(default)]
    file: Option<PathBuf>,
}

/// Book backed by a manifest file and content files on disk.
#[derive(Debug)]
pub struct ManifestBook {
    toc: Vec<TocReference>,
    spine: Vec<SpineItem>,
    resources: HashMap<String, Resource>,
    files: HashMap<String, PathBuf>,
}

impl ManifestBook {
    /// Load a manifest; content files are not touched until read.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let root = path.parent().unwrap_or_else(|| Path::new(""));
        Self::from_json(&json, root)
    }

    /// Parse manifest JSON, resolving content files against `root`.
    pub fn from_json(json: &str, root: &Path) -> Result<Self> {
        let manifest: Manifest = serde_json::from_str(json)?;

        let mut resources = HashMap::new();
        let mut files = HashMap::new();
        for entry in manifest.resources {
            let key = normalize_path(&entry.href).ok_or_else(|| {
                Error::InvalidManifest(format!("resource href {:?} is empty", entry.href))
            })?;
            let file = root.join(entry.file.unwrap_or_else(|| PathBuf::from(&key)));
            files.insert(key.clone(), file);
            resources.insert(
                key,
                Resource {
                    href: entry.href,
                    id: entry.id,
                    title: entry.title,
                    encoding: entry.encoding,
                    data: Vec::new(),
                },
            );
        }

        debug!(
            resources = resources.len(),
            spine = manifest.spine.len(),
            toc_roots = manifest.toc.len(),
            "Loaded book manifest"
        );

        Ok(Self {
            toc: manifest.toc,
            spine: manifest.spine,
            resources,
            files,
        })
    }
}

impl BookSource for ManifestBook {
    fn toc(&self) -> &[TocReference] {
        &self.toc
    }

    fn spine(&self) -> &[SpineItem] {
        &self.spine
    }

    fn resource(&self, path: &str) -> Option<&Resource> {
        lookup_resource(&self.resources, path)
    }

    fn read_resource<'a>(&'a self, resource: &'a Resource) -> io::Result<Cow<'a, [u8]>> {
        let file = normalize_path(&resource.href)
            .and_then(|key| self.files.get(&key))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::NotFound,
                    format!("no file registered for {}", resource.href),
                )
            })?;
        fs::read(file).map(Cow::Owned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_json_reads_lazily() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("OEBPS")).unwrap();
        fs::write(dir.path().join("OEBPS/ch1.xhtml"), b"<p>one</p>").unwrap();

        let json = r#"{
            "toc": [{ "title": "One", "href": "OEBPS/ch1.xhtml" }],
            "spine": [{ "href": "OEBPS/ch1.xhtml" }, { "href": "OEBPS/ch2.xhtml" }],
            "resources": [
                { "href": "OEBPS/ch1.xhtml", "id": "c1" },
                { "href": "OEBPS/ch2.xhtml", "id": "c2" }
            ]
        }"#;
        let book = ManifestBook::from_json(json, dir.path()).unwrap();

        let ch1 = book.resource("OEBPS/ch1.xhtml").unwrap();
        assert_eq!(ch1.id.as_deref(), Some("c1"));
        assert_eq!(book.read_resource(ch1).unwrap().as_ref(), b"<p>one</p>");

        // Registered but missing on disk: surfaces as an I/O error, not a panic
        let ch2 = book.resource("OEBPS/ch2.xhtml").unwrap();
        assert!(book.read_resource(ch2).is_err());
    }

    #[test]
    fn test_explicit_file_override() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("blob.bin"), b"<p>x</p>").unwrap();

        let json = r#"{ "resources": [{ "href": "a/b.xhtml", "file": "blob.bin" }] }"#;
        let book = ManifestBook::from_json(json, dir.path()).unwrap();
        let resource = book.resource("a/b.xhtml").unwrap();
        assert_eq!(book.read_resource(resource).unwrap().as_ref(), b"<p>x</p>");
    }

    #[test]
    fn test_blank_href_is_rejected() {
        let json = r#"{ "resources": [{ "href": "  " }] }"#;
        let err = ManifestBook::from_json(json, Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::InvalidManifest(_)));
    }

    #[test]
    fn test_bad_json() {
        let err = ManifestBook::from_json("{ not json", Path::new(".")).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }
}
