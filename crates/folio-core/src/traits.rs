//! Core traits for the folio catalog's external seams.
//!
//! These traits define the interfaces that concrete implementations must
//! satisfy, enabling pluggable backends and testability: the persistence
//! layer ([`CatalogRepository`]), the messaging transport
//! ([`DocumentTransport`]), and the document-parsing capability
//! ([`DocumentParser`]).

use async_trait::async_trait;

use crate::error::Result;
use crate::models::{
    CatalogEntry, CatalogStats, ChatId, ContentId, CreateEntryRequest, FileId, MessageId, ThreadId,
};

/// Repository for the canonical catalog table.
///
/// The catalog holds exactly one entry per content identity and exactly one
/// entry per canonical message reference; every mutating operation is
/// all-or-nothing. No other component writes this table.
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// Check whether an entry with this content identity exists.
    ///
    /// Called before any metadata work so byte-identical re-uploads
    /// short-circuit cheaply.
    async fn exists(&self, content_id: &ContentId) -> Result<bool>;

    /// Insert a new entry. Fails with `Error::ConstraintViolation` if the
    /// content identity or canonical reference is already present.
    async fn insert(&self, req: CreateEntryRequest) -> Result<()>;

    /// Fetch the entry currently claiming a canonical reference, if any.
    async fn find_by_canonical(&self, canonical_ref: MessageId) -> Result<Option<CatalogEntry>>;

    /// Delete the entry addressed by canonical reference. Succeeds as a
    /// no-op when absent (idempotent).
    async fn delete_by_canonical(&self, canonical_ref: MessageId) -> Result<()>;

    /// Replace the entry behind a canonical reference: delete the old row,
    /// then insert the new one, inside a single transaction. Deleting first
    /// keeps the canonical-reference uniqueness invariant from being
    /// violated even transiently.
    async fn replace(&self, canonical_ref: MessageId, req: CreateEntryRequest) -> Result<()>;

    /// Aggregate statistics: totals plus a per-category breakdown ordered by
    /// category name ascending. An empty catalog yields zero totals and an
    /// empty breakdown.
    async fn aggregate(&self) -> Result<CatalogStats>;
}

/// An outbound document payload: bytes plus presentation.
#[derive(Debug, Clone)]
pub struct OutboundDocument {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub caption: String,
}

/// A message the transport accepted, with the transport's handle to the
/// stored content.
#[derive(Debug, Clone)]
pub struct PublishedMessage {
    pub message: MessageId,
    pub file: FileId,
}

/// Messaging transport boundary (consumed).
///
/// Every outward call may fail with `Error::RateLimited` (the transport
/// reports a required wait) or `Error::Network` (transient failure). The
/// delivery policy in the ingest crate decides what happens next; transport
/// implementations just surface the classification.
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// Fetch the bytes behind a transport file reference.
    async fn fetch_file(&self, file: &FileId) -> Result<Vec<u8>>;

    /// Publish a fresh document message into a thread.
    async fn publish_document(
        &self,
        chat: ChatId,
        thread: ThreadId,
        doc: &OutboundDocument,
    ) -> Result<PublishedMessage>;

    /// Edit an existing document message in place, swapping content and
    /// caption while preserving the message reference.
    async fn edit_document(
        &self,
        chat: ChatId,
        message: MessageId,
        doc: &OutboundDocument,
    ) -> Result<PublishedMessage>;

    /// Re-send already-uploaded content (by file reference) to a recipient.
    async fn send_document(&self, chat: ChatId, file: &FileId, caption: &str) -> Result<()>;

    /// Delete a message.
    async fn delete_message(&self, chat: ChatId, message: MessageId) -> Result<()>;

    /// Edit the text of an existing plain message.
    async fn edit_text(&self, chat: ChatId, message: MessageId, text: &str) -> Result<()>;

    /// Post a short notice into a thread (used for rejection reports).
    async fn send_notice(&self, chat: ChatId, thread: ThreadId, text: &str) -> Result<()>;
}

/// What the external document parser reports about a file.
#[derive(Debug, Clone)]
pub struct RawDocumentInfo {
    /// The document's single metadata title field, expected to follow the
    /// `"<authors>: <title>"` convention. Validation happens in the
    /// metadata adapter, not here.
    pub title_field: Option<String>,
    pub page_count: i64,
}

/// Document-parsing capability boundary (consumed).
pub trait DocumentParser: Send + Sync {
    fn parse(&self, bytes: &[u8]) -> Result<RawDocumentInfo>;
}
