//! Ingestion coordinator: the per-event state machine.
//!
//! Each upload event is classified into an explicit disposition — new,
//! duplicate, replacement, rejected, or ignored — and the coordinator drives
//! the catalog mutation and outward side-effects for it. Two invariants
//! govern every path:
//!
//! - the dedup check runs before any metadata work, so byte-identical
//!   re-uploads never re-parse or touch the catalog;
//! - outward sends happen before catalog mutations, so an abandoned send
//!   (see [`crate::delivery`]) never leaves an orphaned row.
//!
//! Events are processed one at a time in transport delivery order; the
//! coordinator holds no internal concurrency, which is what makes the
//! check-then-insert sequence race-free.

use std::sync::Arc;

use tracing::{debug, info, warn};

use folio_core::{
    extract_metadata, identify_bytes, CatalogEntry, CatalogRepository, ChatId, ContentId,
    CreateEntryRequest, DocumentMetadata, DocumentParser, DocumentTransport, Error, FileId,
    MessageId, OutboundDocument, Result, ThreadId,
};

use crate::captions;
use crate::config::IngestConfig;
use crate::delivery::with_retry;

/// What the upload message was posted as a reply to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplyContext {
    /// Reply to a thread's topic-created marker: a genuinely new posting.
    TopicCreated,
    /// Reply to a message the system itself published: an operator is
    /// editing the book behind that canonical message.
    CatalogMessage { message: MessageId },
    /// Anything else. The upload is discarded without effect.
    Other,
}

/// An incoming upload event.
#[derive(Debug, Clone)]
pub struct UploadEvent {
    pub chat: ChatId,
    pub thread: ThreadId,
    /// Identity that posted the upload. Only configured operators may feed
    /// the catalog; anyone else's uploads are ignored without effect.
    pub issuer: i64,
    /// The uploader's own message carrying the document.
    pub message: MessageId,
    /// Transport reference to the uploaded file.
    pub file: FileId,
    pub file_name: String,
    pub reply_to: ReplyContext,
}

/// Why an upload was rejected before any mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The thread has no entry in the category mapping.
    UnknownCategory { thread: ThreadId },
    /// The document metadata failed the "Authors: Title" convention.
    MalformedMetadata { file_name: String, detail: String },
}

/// Final disposition of one upload event.
#[derive(Debug, Clone, PartialEq)]
pub enum IngestOutcome {
    /// A new entry was published and inserted.
    Published {
        content_id: ContentId,
        canonical_ref: MessageId,
    },
    /// An existing entry was replaced in place; its canonical reference is
    /// unchanged.
    Replaced {
        content_id: ContentId,
        canonical_ref: MessageId,
    },
    /// Byte-identical content already cataloged. Silent, not a failure.
    Duplicate { content_id: ContentId },
    /// Rejected before any mutation.
    Rejected(RejectReason),
    /// The outward send was abandoned; the catalog was left unmodified.
    Dropped { content_id: ContentId },
    /// The reply context matched no handled disposition.
    Ignored,
}

/// Outcome of an operator-issued remove command.
#[derive(Debug, Clone, PartialEq)]
pub enum RemoveOutcome {
    Removed { content_id: ContentId },
    /// No catalog entry behind the targeted message.
    NotFound,
    /// Issuer is not an authorized operator.
    Unauthorized,
    /// The archival send was abandoned; the entry was retained.
    Dropped,
}

/// Operator command targeting a replied-to canonical message.
#[derive(Debug, Clone)]
pub struct RemoveCommand {
    pub chat: ChatId,
    pub issuer: i64,
    /// The command message itself, deleted to keep the thread clean.
    pub invoking_message: MessageId,
    /// The replied-to message whose entry should be removed.
    pub target: Option<MessageId>,
}

/// The ingestion state machine.
pub struct IngestionCoordinator {
    catalog: Arc<dyn CatalogRepository>,
    transport: Arc<dyn DocumentTransport>,
    parser: Arc<dyn DocumentParser>,
    config: IngestConfig,
}

impl IngestionCoordinator {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        transport: Arc<dyn DocumentTransport>,
        parser: Arc<dyn DocumentParser>,
        config: IngestConfig,
    ) -> Self {
        Self {
            catalog,
            transport,
            parser,
            config,
        }
    }

    /// Process one upload event to completion.
    pub async fn ingest(&self, event: UploadEvent) -> Result<IngestOutcome> {
        if !self.config.is_operator(event.issuer) {
            debug!(
                issuer = event.issuer,
                file_name = %event.file_name,
                "ingest: upload from non-operator, ignoring"
            );
            return Ok(IngestOutcome::Ignored);
        }

        let bytes = self.transport.fetch_file(&event.file).await?;
        let content_id = identify_bytes(&bytes);

        // The uploader's message is noise once the bytes are in hand.
        if let Err(e) = self
            .transport
            .delete_message(event.chat, event.message)
            .await
        {
            debug!(error = %e, message = %event.message, "ingest: could not delete upload message");
        }

        let category = match self.config.categories.resolve(event.thread) {
            Ok(c) => c.to_string(),
            Err(Error::UnknownCategory(_)) => {
                info!(
                    thread_id = event.thread.0,
                    file_name = %event.file_name,
                    "ingest: rejected upload from unmapped thread"
                );
                return Ok(IngestOutcome::Rejected(RejectReason::UnknownCategory {
                    thread: event.thread,
                }));
            }
            Err(e) => return Err(e),
        };

        // Dedup before any metadata work.
        if self.catalog.exists(&content_id).await? {
            debug!(content_id = %content_id, "ingest: duplicate content, discarding");
            return Ok(IngestOutcome::Duplicate { content_id });
        }

        let meta = match extract_metadata(self.parser.as_ref(), &bytes) {
            Ok(meta) => meta,
            Err(Error::MetadataFormat(detail)) => {
                warn!(
                    file_name = %event.file_name,
                    content_id = %content_id,
                    detail = %detail,
                    "ingest: rejected upload with malformed metadata"
                );
                let notice = captions::render_rejection_notice(&event.file_name, &detail);
                if with_retry("send_notice", || {
                    self.transport.send_notice(event.chat, event.thread, &notice)
                })
                .await?
                .is_none()
                {
                    warn!(file_name = %event.file_name, "ingest: rejection notice dropped");
                }
                return Ok(IngestOutcome::Rejected(RejectReason::MalformedMetadata {
                    file_name: event.file_name,
                    detail,
                }));
            }
            Err(e) => return Err(e),
        };

        let size_mb = captions::size_in_mb(bytes.len());
        let ext = captions::file_extension(&event.file_name).map(str::to_string);
        let caption = captions::render_book_caption(&meta, ext.as_deref(), size_mb);
        let file_name = match &ext {
            Some(ext) => format!("{}.{ext}", meta.title),
            None => meta.title.clone(),
        };
        let doc = OutboundDocument {
            file_name,
            bytes,
            caption,
        };

        match event.reply_to {
            ReplyContext::TopicCreated => {
                self.commit_new(&event, &doc, &meta, category, size_mb, content_id)
                    .await
            }
            ReplyContext::CatalogMessage { message } => {
                match self.catalog.find_by_canonical(message).await? {
                    Some(previous) => {
                        self.commit_replacement(
                            &event, message, &previous, &doc, &meta, category, size_mb, content_id,
                        )
                        .await
                    }
                    None => {
                        // The replied message claims to be a catalog entry
                        // but no row backs it. Recover by publishing fresh
                        // rather than editing blind.
                        warn!(
                            canonical_ref = %message,
                            content_id = %content_id,
                            "ingest: replacement target has no catalog row, publishing as new"
                        );
                        self.commit_new(&event, &doc, &meta, category, size_mb, content_id)
                            .await
                    }
                }
            }
            ReplyContext::Other => {
                debug!(file_name = %event.file_name, "ingest: unhandled reply context, ignoring");
                Ok(IngestOutcome::Ignored)
            }
        }
    }

    /// NEW disposition: publish outward, then insert. Never the reverse.
    async fn commit_new(
        &self,
        event: &UploadEvent,
        doc: &OutboundDocument,
        meta: &DocumentMetadata,
        category: String,
        size_mb: f64,
        content_id: ContentId,
    ) -> Result<IngestOutcome> {
        let Some(published) = with_retry("publish_document", || {
            self.transport.publish_document(event.chat, event.thread, doc)
        })
        .await?
        else {
            warn!(
                content_id = %content_id,
                file_name = %event.file_name,
                thread_id = event.thread.0,
                "ingest: publish abandoned, catalog untouched"
            );
            return Ok(IngestOutcome::Dropped { content_id });
        };

        self.catalog
            .insert(CreateEntryRequest {
                content_id: content_id.clone(),
                category,
                page_count: meta.page_count,
                title: meta.title.clone(),
                authors: meta.authors.clone(),
                size_mb,
                canonical_ref: published.message,
                content_ref: published.file,
            })
            .await?;

        info!(
            content_id = %content_id,
            canonical_ref = %published.message,
            title = %meta.title,
            "ingest: published new entry"
        );
        Ok(IngestOutcome::Published {
            content_id,
            canonical_ref: published.message,
        })
    }

    /// REPLACEMENT disposition: archive the old content, edit the canonical
    /// message in place, then swap the catalog row atomically. The catalog
    /// is only touched after both sends succeed.
    #[allow(clippy::too_many_arguments)]
    async fn commit_replacement(
        &self,
        event: &UploadEvent,
        canonical: MessageId,
        previous: &CatalogEntry,
        doc: &OutboundDocument,
        meta: &DocumentMetadata,
        category: String,
        size_mb: f64,
        content_id: ContentId,
    ) -> Result<IngestOutcome> {
        // The old entry is about to be destroyed; park a copy with the
        // operators first so it stays recoverable.
        let audit = captions::render_replacement_audit(canonical, previous);
        if with_retry("archive_document", || {
            self.transport
                .send_document(self.config.operator_chat, &previous.content_ref, &audit)
        })
        .await?
        .is_none()
        {
            warn!(
                canonical_ref = %canonical,
                content_id = %content_id,
                "ingest: archival send abandoned, replacement dropped"
            );
            return Ok(IngestOutcome::Dropped { content_id });
        }

        let Some(edited) = with_retry("edit_document", || {
            self.transport.edit_document(event.chat, canonical, doc)
        })
        .await?
        else {
            warn!(
                canonical_ref = %canonical,
                content_id = %content_id,
                "ingest: edit abandoned after archival, catalog untouched"
            );
            return Ok(IngestOutcome::Dropped { content_id });
        };

        self.catalog
            .replace(
                canonical,
                CreateEntryRequest {
                    content_id: content_id.clone(),
                    category,
                    page_count: meta.page_count,
                    title: meta.title.clone(),
                    authors: meta.authors.clone(),
                    size_mb,
                    canonical_ref: edited.message,
                    content_ref: edited.file,
                },
            )
            .await?;

        info!(
            content_id = %content_id,
            canonical_ref = %edited.message,
            title = %meta.title,
            "ingest: replaced entry in place"
        );
        Ok(IngestOutcome::Replaced {
            content_id,
            canonical_ref: edited.message,
        })
    }

    /// Operator-issued removal: the fifth disposition. Archives a copy to
    /// the operator channel, then deletes the row and the canonical message.
    pub async fn remove(&self, cmd: RemoveCommand) -> Result<RemoveOutcome> {
        if !self.config.is_operator(cmd.issuer) {
            warn!(issuer = cmd.issuer, "remove: unauthorized issuer");
            return Ok(RemoveOutcome::Unauthorized);
        }

        // The command message itself is deleted regardless of outcome.
        if let Err(e) = self
            .transport
            .delete_message(cmd.chat, cmd.invoking_message)
            .await
        {
            debug!(error = %e, "remove: could not delete command message");
        }

        let Some(target) = cmd.target else {
            debug!("remove: command did not reply to a catalog message");
            return Ok(RemoveOutcome::NotFound);
        };

        let Some(entry) = self.catalog.find_by_canonical(target).await? else {
            info!(canonical_ref = %target, "remove: no entry behind target message");
            return Ok(RemoveOutcome::NotFound);
        };

        let audit = captions::render_removal_audit(&entry);
        if with_retry("archive_document", || {
            self.transport
                .send_document(self.config.operator_chat, &entry.content_ref, &audit)
        })
        .await?
        .is_none()
        {
            warn!(
                canonical_ref = %target,
                content_id = %entry.content_id,
                "remove: archival send abandoned, entry retained"
            );
            return Ok(RemoveOutcome::Dropped);
        }

        self.catalog.delete_by_canonical(target).await?;

        if let Err(e) = self.transport.delete_message(cmd.chat, target).await {
            debug!(error = %e, canonical_ref = %target, "remove: could not delete canonical message");
        }

        info!(
            content_id = %entry.content_id,
            canonical_ref = %target,
            title = %entry.title,
            "remove: entry removed"
        );
        Ok(RemoveOutcome::Removed {
            content_id: entry.content_id,
        })
    }
}
