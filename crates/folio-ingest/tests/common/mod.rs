//! Shared harness for coordinator integration tests: an in-memory catalog,
//! a scriptable mock transport, and the plain-text stub parser.
#![allow(dead_code)] // each test binary uses a different slice of the harness

use std::collections::HashSet;
use std::sync::Arc;

use folio_db::test_fixtures::TestCatalog;
use folio_db::SqliteCatalogRepository;
use folio_ingest::test_support::{MockTransport, StubParser};
use folio_ingest::{
    CategoryMap, ChatId, FileId, IngestConfig, IngestionCoordinator, MessageId, ReplyContext,
    StatsReporter, ThreadId, UploadEvent,
};

pub const LIBRARY_CHAT: ChatId = ChatId(-100);
pub const OPERATOR_CHAT: ChatId = ChatId(-777);
pub const STATUS_CHAT: ChatId = ChatId(-100);
pub const STATUS_MESSAGE: MessageId = MessageId(943);
pub const OPERATOR_ID: i64 = 569356638;

pub const MATH_THREAD: ThreadId = ThreadId(1078);
pub const PHYSICS_THREAD: ThreadId = ThreadId(1086);

pub struct Harness {
    pub coordinator: IngestionCoordinator,
    pub catalog: Arc<SqliteCatalogRepository>,
    pub transport: Arc<MockTransport>,
    pub parser: Arc<StubParser>,
    next_upload_message: std::sync::atomic::AtomicI64,
}

impl Harness {
    pub async fn new() -> Self {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init()
            .ok();

        let catalog = Arc::new(TestCatalog::new().await.repo);
        let transport = Arc::new(MockTransport::new());
        let parser = Arc::new(StubParser::new());

        let config = IngestConfig {
            operator_chat: OPERATOR_CHAT,
            operators: HashSet::from([OPERATOR_ID]),
            status_chat: STATUS_CHAT,
            status_message: STATUS_MESSAGE,
            categories: CategoryMap::from_pairs([
                (MATH_THREAD.0, "Mathematics"),
                (PHYSICS_THREAD.0, "Physics"),
            ]),
        };

        Self {
            coordinator: IngestionCoordinator::new(
                catalog.clone(),
                transport.clone(),
                parser.clone(),
                config,
            ),
            catalog,
            transport,
            parser,
            next_upload_message: std::sync::atomic::AtomicI64::new(1),
        }
    }

    pub fn stats_reporter(&self) -> StatsReporter {
        StatsReporter::new(
            self.catalog.clone(),
            self.transport.clone(),
            STATUS_CHAT,
            STATUS_MESSAGE,
        )
    }

    /// Register document bytes with the transport and build an upload event
    /// for them.
    pub fn upload(
        &self,
        file_name: &str,
        bytes: &[u8],
        thread: ThreadId,
        reply_to: ReplyContext,
    ) -> UploadEvent {
        let file: FileId = self.transport.add_file(file_name, bytes);
        let message = MessageId(
            self.next_upload_message
                .fetch_add(1, std::sync::atomic::Ordering::SeqCst),
        );
        UploadEvent {
            chat: LIBRARY_CHAT,
            thread,
            issuer: OPERATOR_ID,
            message,
            file,
            file_name: file_name.to_string(),
            reply_to,
        }
    }

    pub async fn row_count(&self) -> i64 {
        use folio_ingest::CatalogRepository;
        self.catalog.aggregate().await.unwrap().total_books
    }
}

/// Plain-text "document" the stub parser understands: metadata title field
/// on line 1, page count on line 2.
pub fn book_bytes(title_field: &str, pages: i64) -> Vec<u8> {
    format!("{title_field}\n{pages}").into_bytes()
}
