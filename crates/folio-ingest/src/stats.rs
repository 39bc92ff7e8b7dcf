//! Stats reporter: recompute aggregates and republish the pinned report.
//!
//! The report is best-effort. If the pinned status message has been deleted
//! or is otherwise unreachable, the refresh is a logged no-op, never a
//! crash.

use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info};

use folio_core::{CatalogRepository, ChatId, DocumentTransport, MessageId, Result};

use crate::captions::render_stats_report;

pub struct StatsReporter {
    catalog: Arc<dyn CatalogRepository>,
    transport: Arc<dyn DocumentTransport>,
    status_chat: ChatId,
    status_message: MessageId,
}

impl StatsReporter {
    pub fn new(
        catalog: Arc<dyn CatalogRepository>,
        transport: Arc<dyn DocumentTransport>,
        status_chat: ChatId,
        status_message: MessageId,
    ) -> Self {
        Self {
            catalog,
            transport,
            status_chat,
            status_message,
        }
    }

    /// Recompute aggregates and edit them into the pinned status message.
    ///
    /// Returns `Ok(true)` when the message was updated and `Ok(false)` when
    /// the edit could not be delivered. Aggregation failures still
    /// propagate: a broken catalog is not a best-effort condition.
    pub async fn refresh(&self) -> Result<bool> {
        let stats = self.catalog.aggregate().await?;
        let report = render_stats_report(&stats, Utc::now());

        match self
            .transport
            .edit_text(self.status_chat, self.status_message, &report)
            .await
        {
            Ok(()) => {
                info!(
                    total_books = stats.total_books,
                    total_categories = stats.total_categories,
                    "stats: pinned report refreshed"
                );
                Ok(true)
            }
            Err(e) => {
                debug!(
                    error = %e,
                    status_message = %self.status_message,
                    "stats: pinned report unreachable, refresh skipped"
                );
                Ok(false)
            }
        }
    }

    /// Handle the operator's update-stats command: the invoking message is
    /// deleted to keep the thread clean, then the report is refreshed.
    pub async fn handle_command(&self, chat: ChatId, invoking_message: MessageId) -> Result<bool> {
        if let Err(e) = self.transport.delete_message(chat, invoking_message).await {
            debug!(error = %e, "stats: could not delete command message");
        }
        self.refresh().await
    }
}
