//! Metadata extractor adapter.
//!
//! The actual document parsing (reading a binary file's metadata block and
//! page count) is an external capability behind [`DocumentParser`]. This
//! module validates what the parser returns against the catalog's
//! `"<authors>: <title>"` convention and surfaces a structured
//! [`Error::MetadataFormat`] instead of crashing on malformed input.

use crate::error::{Error, Result};
use crate::models::DocumentMetadata;
use crate::traits::{DocumentParser, RawDocumentInfo};

/// Split a raw title field on the first `:` into trimmed (authors, title).
///
/// Titles may themselves contain colons ("Calculus: Early Transcendentals"),
/// so only the first separator is structural.
pub fn parse_title_field(raw: &str) -> Result<(String, String)> {
    let (authors, title) = raw
        .split_once(':')
        .ok_or_else(|| Error::MetadataFormat(format!("missing ':' separator in {raw:?}")))?;
    let authors = authors.trim();
    let title = title.trim();
    if authors.is_empty() {
        return Err(Error::MetadataFormat(format!("empty authors in {raw:?}")));
    }
    if title.is_empty() {
        return Err(Error::MetadataFormat(format!("empty title in {raw:?}")));
    }
    Ok((authors.to_string(), title.to_string()))
}

/// Run the external parser over the document bytes and validate the result.
///
/// Rejects (without any catalog mutation or outward send by the caller):
/// an absent or empty title field, a missing `:` separator, empty authors or
/// title after trimming, and a non-positive page count.
pub fn extract_metadata(parser: &dyn DocumentParser, bytes: &[u8]) -> Result<DocumentMetadata> {
    let RawDocumentInfo {
        title_field,
        page_count,
    } = parser.parse(bytes)?;

    let raw = title_field
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .ok_or_else(|| Error::MetadataFormat("title field absent or empty".to_string()))?;

    let (authors, title) = parse_title_field(raw)?;

    if page_count <= 0 {
        return Err(Error::MetadataFormat(format!(
            "non-positive page count {page_count}"
        )));
    }

    Ok(DocumentMetadata {
        title,
        authors,
        page_count,
    })
}
