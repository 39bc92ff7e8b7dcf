//! Data model for the folio catalog.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Content-derived identifier for a document, in `sha256:<hex>` form.
///
/// This is the sole deduplication key. Transport-assigned file ids are not
/// stable across re-uploads of identical bytes, so they never participate in
/// identity decisions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentId(pub String);

impl ContentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Opaque reference to a chat (workspace channel) in the transport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChatId(pub i64);

/// Opaque reference to a discussion thread inside a chat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ThreadId(pub i64);

impl fmt::Display for ThreadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Opaque reference to a single message in the transport.
///
/// The `canonical_ref` of a catalog entry is the message that currently
/// represents the entry to end users; at most one entry may claim a given
/// message at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub i64);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Transport-held reference to stored binary content. Lets the system
/// re-send a document without re-uploading the bytes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileId(pub String);

impl FileId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The canonical record of one distinct document in the catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Content digest, primary key. Exactly one entry per distinct content.
    pub content_id: ContentId,
    /// Category label from the injected thread mapping.
    pub category: String,
    pub page_count: i64,
    pub title: String,
    pub authors: String,
    /// Document size in megabytes, rounded to two decimals.
    pub size_mb: f64,
    /// The single outward message representing this entry. Unique.
    pub canonical_ref: MessageId,
    /// Transport reference to the stored content.
    pub content_ref: FileId,
    pub created_at: DateTime<Utc>,
}

/// Request for inserting a new catalog entry. `created_at` is assigned by
/// the store.
#[derive(Debug, Clone)]
pub struct CreateEntryRequest {
    pub content_id: ContentId,
    pub category: String,
    pub page_count: i64,
    pub title: String,
    pub authors: String,
    pub size_mb: f64,
    pub canonical_ref: MessageId,
    pub content_ref: FileId,
}

/// Validated document metadata, produced by the extractor adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentMetadata {
    pub title: String,
    pub authors: String,
    pub page_count: i64,
}

/// Per-category aggregate line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryStats {
    pub category: String,
    pub books: i64,
    pub pages: i64,
    pub size_mb: f64,
}

/// Aggregate catalog statistics.
///
/// `per_category` is ordered by category name ascending. An empty catalog
/// yields zero-valued totals and an empty breakdown, never an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogStats {
    pub total_books: i64,
    pub total_pages: i64,
    pub total_size_mb: f64,
    pub total_categories: i64,
    pub per_category: Vec<CategoryStats>,
}

impl CatalogStats {
    pub fn empty() -> Self {
        Self {
            total_books: 0,
            total_pages: 0,
            total_size_mb: 0.0,
            total_categories: 0,
            per_category: Vec::new(),
        }
    }
}
