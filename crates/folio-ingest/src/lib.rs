//! # folio-ingest
//!
//! Ingestion, deduplication, and catalog synchronization for the folio
//! document catalog.
//!
//! This crate provides:
//! - The [`IngestionCoordinator`] state machine deciding, for each upload
//!   event, whether it is new, a duplicate, a replacement, or a rejection,
//!   and driving the catalog and transport accordingly
//! - The bounded backoff-and-retry delivery policy ([`delivery::with_retry`])
//! - Operator commands (remove, update-stats)
//! - The pinned statistics report ([`StatsReporter`])
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use folio_ingest::{IngestConfig, IngestionCoordinator};
//!
//! let config = IngestConfig::from_json(&std::fs::read_to_string("folio.json")?)?;
//! let coordinator = IngestionCoordinator::new(catalog, transport, parser, config);
//!
//! let outcome = coordinator.ingest(event).await?;
//! ```

pub mod captions;
pub mod config;
pub mod coordinator;
pub mod delivery;
pub mod stats;

// Transport/parser doubles for tests
// Note: always compiled so integration tests (in tests/) can use them.
pub mod test_support;

// Re-export core types
pub use folio_core::*;

pub use config::IngestConfig;
pub use coordinator::{
    IngestOutcome, IngestionCoordinator, RejectReason, RemoveCommand, RemoveOutcome, ReplyContext,
    UploadEvent,
};
pub use stats::StatsReporter;
