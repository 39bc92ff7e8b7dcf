//! Test fixtures for catalog repository tests.
//!
//! Provides an in-memory catalog and an entry builder so tests stay terse.
//! Always compiled so integration tests in other crates can use it.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use crate::catalog::{init_schema, SqliteCatalogRepository};
use folio_core::{ContentId, CreateEntryRequest, FileId, MessageId};

/// An in-memory catalog with its schema applied.
///
/// The pool is built directly rather than via `create_pool_with_config`
/// because tests that pause tokio's clock need a pool whose `acquire` never
/// awaits: under a paused clock the runtime auto-advances past any pending
/// pool timer while the SQLite worker thread is still responding. That means
/// no pre-acquire ping, no idle/lifetime maintenance timers, and two
/// connections (to a named shared-cache in-memory database, so both see the
/// same data) so an idle connection is available even while the previously
/// used one is still being returned to the pool.
pub struct TestCatalog {
    pub repo: SqliteCatalogRepository,
}

impl TestCatalog {
    pub async fn new() -> Self {
        static NEXT_DB: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);
        let db = NEXT_DB.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
        let url = format!("sqlite:file:folio_test_{db}?mode=memory&cache=shared");
        let options = SqliteConnectOptions::from_str(&url)
            .expect("parse in-memory url")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(2)
            .test_before_acquire(false)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .expect("open in-memory database");

        // Warm up both connections now, in real time, so no test ever opens
        // a connection while the clock is paused.
        let c1 = pool.acquire().await.expect("warm up first connection");
        let c2 = pool.acquire().await.expect("warm up second connection");
        drop(c1);
        drop(c2);
        init_schema(&pool).await.expect("apply schema");

        // Dropping a connection returns it to the pool via a spawned task.
        // Wait for those tasks to finish so the fixture hands over a pool
        // with every connection idle; a paused-clock test that found a
        // return still in flight would time out its first acquire.
        while pool.num_idle() < 2 {
            tokio::time::sleep(std::time::Duration::from_millis(1)).await;
        }
        Self {
            repo: SqliteCatalogRepository::new(pool),
        }
    }
}

/// Build an insert request with sensible defaults for tests.
pub fn sample_entry(content: &str, canonical: i64) -> CreateEntryRequest {
    CreateEntryRequest {
        content_id: ContentId(format!("sha256:{content}")),
        category: "Mathematics".to_string(),
        page_count: 120,
        title: "A Sample Title".to_string(),
        authors: "A. Author".to_string(),
        size_mb: 1.25,
        canonical_ref: MessageId(canonical),
        content_ref: FileId(format!("file-{canonical}")),
    }
}
