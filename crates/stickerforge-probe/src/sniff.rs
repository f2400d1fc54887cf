//! Buffer classification
//!
//! [`detect`] never fails: binary signatures are tried first, then a textual
//! sniff of the leading bytes, and finally a generic binary classification.

use crate::cache;
use crate::signature::{iso_bmff_brand, FileType, BINARY, HTML, SIGNATURES, TEXT, XML};

/// Number of leading bytes decoded for the textual sniff.
const TEXT_SNIFF_LEN: usize = 50;

/// Classify `data` by its magic number, memoizing the result.
///
/// Repeated calls on identical leading bytes are served from the process-wide
/// detection cache.
pub fn detect(data: &[u8]) -> FileType {
    cache::global().get_or_insert_with(data, detect_uncached)
}

/// Classify `data` without consulting the cache.
pub fn detect_uncached(data: &[u8]) -> FileType {
    detect_binary(data)
        .or_else(|| detect_text(data))
        .unwrap_or(BINARY)
}

fn detect_binary(data: &[u8]) -> Option<FileType> {
    iso_bmff_brand(data).or_else(|| SIGNATURES.iter().find_map(|sig| sig.resolve(data)))
}

fn detect_text(data: &[u8]) -> Option<FileType> {
    let head = &data[..data.len().min(TEXT_SNIFF_LEN)];
    let text = leading_utf8(head)?;
    let lowered = text.trim().to_lowercase();

    if lowered.starts_with("<!doctype html") || lowered.starts_with("<html") {
        return Some(HTML);
    }
    if lowered.starts_with("<?xml") {
        return Some(XML);
    }

    let printable = !lowered.is_empty()
        && lowered
            .chars()
            .all(|c| !c.is_control() || matches!(c, '\n' | '\r' | '\t'));
    printable.then_some(TEXT)
}

/// Decode the valid UTF-8 prefix of `head`, tolerating a multi-byte sequence
/// cut off by the sniff window.
fn leading_utf8(head: &[u8]) -> Option<&str> {
    match std::str::from_utf8(head) {
        Ok(s) => Some(s),
        Err(e) if e.error_len().is_none() && e.valid_up_to() > 0 => {
            std::str::from_utf8(&head[..e.valid_up_to()]).ok()
        }
        Err(_) => None,
    }
}
