//! Structured logging field name constants for folio.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation tools can query by standardized names across every
//! subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Catalog invariant at risk, requires operator attention |
//! | WARN  | Recoverable issue, automatic fallback applied (backoff, abandoned send) |
//! | INFO  | Lifecycle events, committed ingestions |
//! | DEBUG | Decision points: dispositions, dedup hits, stats refreshes |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "ingest", "db", "stats", "delivery"
pub const SUBSYSTEM: &str = "subsystem";

/// Logical operation name.
/// Examples: "ingest", "remove", "publish", "aggregate"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Content identity of the document being operated on.
pub const CONTENT_ID: &str = "content_id";

/// Discussion thread the event originated in.
pub const THREAD_ID: &str = "thread_id";

/// Canonical message reference of a catalog entry.
pub const CANONICAL_REF: &str = "canonical_ref";

/// Uploaded file's name as reported by the transport.
pub const FILE_NAME: &str = "file_name";

/// Category label resolved from the thread mapping.
pub const CATEGORY: &str = "category";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wait imposed by the transport's rate limiter, in seconds.
pub const RETRY_AFTER_SECS: &str = "retry_after_secs";

/// Number of catalog rows affected by a mutation.
pub const ROWS_AFFECTED: &str = "rows_affected";
