//! Byte decoding helpers shared by the document loader.

use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};
use memchr::memmem;
use tracing::{debug, warn};

/// Decode resource bytes to a string, never failing.
///
/// The encoding is picked in this order:
/// 1. The declared encoding (from the package manifest), when not blank
/// 2. The `<?xml ... encoding="..."?>` declaration at the start of the bytes
/// 3. UTF-8
///
/// A byte order mark overrides all of the above. Unknown labels are logged
/// and replaced with UTF-8; malformed sequences become U+FFFD.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(decode_text(b"Hello", Some("utf-8")), "Hello");
/// assert_eq!(decode_text(b"caf\xe9", Some("windows-1252")), "café");
/// ```
pub fn decode_text<'a>(bytes: &'a [u8], declared_encoding: Option<&str>) -> Cow<'a, str> {
    let label = declared_encoding
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .or_else(|| extract_xml_encoding(bytes));

    let encoding = match label {
        Some(name) => Encoding::for_label(name.as_bytes()).unwrap_or_else(|| {
            warn!(encoding = name, "Unsupported encoding, decoding as UTF-8");
            UTF_8
        }),
        None => UTF_8,
    };

    let (text, used, malformed) = encoding.decode(bytes);
    if malformed {
        debug!(
            encoding = used.name(),
            "Malformed byte sequences replaced during decoding"
        );
    }
    text
}

/// Extract encoding from XML declaration.
///
/// Parses `<?xml ... encoding="..." ?>` to extract the encoding name. Only the
/// first 100 bytes are checked.
pub fn extract_xml_encoding(bytes: &[u8]) -> Option<&str> {
    let check_len = bytes.len().min(100);
    let prefix = &bytes[..check_len];

    let xml_start = memmem::find(prefix, b"<?xml")?;
    let after_xml = &prefix[xml_start..];
    let decl_end = memmem::find(after_xml, b"?>").unwrap_or(after_xml.len());
    let decl = &after_xml[..decl_end];

    let enc_pos = decl
        .windows(9)
        .position(|w| w.eq_ignore_ascii_case(b"encoding="))?;
    let after_enc = &decl[enc_pos + 9..];

    let (&quote, rest) = after_enc.split_first()?;
    if quote != b'"' && quote != b'\'' {
        return None;
    }

    let value_end = rest.iter().position(|&b| b == quote)?;
    std::str::from_utf8(&rest[..value_end]).ok()
}
