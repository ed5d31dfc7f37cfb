//! Content-type detection from magic bytes (file headers), not extensions.

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use crate::utils::config::SniffConsts;

/// Detect the content type of the file at `path` from its first bytes.
///
/// Only I/O errors fail; unknown content falls back to text or octet-stream.
pub fn sniff_file(path: &Path) -> io::Result<String> {
    let mut file = File::open(path)?;
    let mut header = Vec::with_capacity(SniffConsts::HEADER_LEN);
    file.by_ref()
        .take(SniffConsts::HEADER_LEN as u64)
        .read_to_end(&mut header)?;
    Ok(sniff_bytes(&header).to_string())
}

/// Detect the content type of a header buffer.
pub fn sniff_bytes(header: &[u8]) -> &'static str {
    if header.is_empty() {
        return SniffConsts::EMPTY;
    }
    if let Some(kind) = infer::get(header) {
        return kind.mime_type();
    }
    if looks_like_text(header) {
        SniffConsts::TEXT
    } else {
        SniffConsts::BINARY
    }
}

/// UTF-8 without NUL bytes. A multi-byte sequence cut off by the header limit still counts as text.
fn looks_like_text(header: &[u8]) -> bool {
    if header.contains(&0) {
        return false;
    }
    match std::str::from_utf8(header) {
        Ok(_) => true,
        Err(e) => e.error_len().is_none(),
    }
}

/// True when `filter` is empty or a substring of `content_type`.
pub fn matches_filter(content_type: &str, filter: &str) -> bool {
    filter.is_empty() || content_type.contains(filter)
}
