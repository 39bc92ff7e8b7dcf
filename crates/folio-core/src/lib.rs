//! # folio-core
//!
//! Shared types and trait seams for the folio document catalog.
//!
//! This crate provides:
//! - The core data model ([`CatalogEntry`], [`CatalogStats`], opaque
//!   transport references)
//! - The error taxonomy ([`Error`], [`Result`])
//! - Content identity ([`identify_bytes`], [`identify_stream`])
//! - The metadata extractor adapter ([`extract_metadata`])
//! - The immutable thread-to-category mapping ([`CategoryMap`])
//! - Trait seams for persistence, transport, and document parsing

pub mod category;
pub mod error;
pub mod identity;
pub mod logging;
pub mod metadata;
pub mod models;
pub mod traits;

pub use category::CategoryMap;
pub use error::{Error, Result};
pub use identity::{identify_bytes, identify_stream, HASH_CHUNK_SIZE};
pub use metadata::{extract_metadata, parse_title_field};
pub use models::{
    CatalogEntry, CatalogStats, CategoryStats, ChatId, ContentId, CreateEntryRequest,
    DocumentMetadata, FileId, MessageId, ThreadId,
};
pub use traits::{
    CatalogRepository, DocumentParser, DocumentTransport, OutboundDocument, PublishedMessage,
    RawDocumentInfo,
};
