//! Catalog repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, SqlitePool};
use tracing::debug;

use folio_core::{
    CatalogEntry, CatalogRepository, CatalogStats, CategoryStats, ContentId, CreateEntryRequest,
    Error, FileId, MessageId, Result,
};

/// Catalog table schema.
///
/// `content_id` is the primary key (one row per distinct content); the
/// unique index on `canonical_ref` enforces that at most one row claims a
/// given outward message at any time.
const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS catalog (
    content_id    TEXT PRIMARY KEY,
    category      TEXT NOT NULL,
    page_count    INTEGER NOT NULL,
    title         TEXT NOT NULL,
    authors       TEXT NOT NULL,
    size_mb       REAL NOT NULL,
    canonical_ref INTEGER NOT NULL UNIQUE,
    content_ref   TEXT NOT NULL,
    created_at    TEXT NOT NULL
)
"#;

/// Create the catalog table if it does not exist.
pub async fn init_schema(pool: &SqlitePool) -> Result<()> {
    sqlx::query(SCHEMA).execute(pool).await?;
    Ok(())
}

/// SQLite implementation of [`CatalogRepository`].
pub struct SqliteCatalogRepository {
    pool: SqlitePool,
}

impl SqliteCatalogRepository {
    /// Create a new repository over the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn entry_from_row(row: &SqliteRow) -> Result<CatalogEntry> {
    Ok(CatalogEntry {
        content_id: ContentId(row.try_get("content_id")?),
        category: row.try_get("category")?,
        page_count: row.try_get("page_count")?,
        title: row.try_get("title")?,
        authors: row.try_get("authors")?,
        size_mb: row.try_get("size_mb")?,
        canonical_ref: MessageId(row.try_get("canonical_ref")?),
        content_ref: FileId(row.try_get("content_ref")?),
        created_at: row.try_get("created_at")?,
    })
}

/// Map a unique-index failure to the catalog's constraint error; everything
/// else stays a database error.
fn map_insert_err(e: sqlx::Error, req: &CreateEntryRequest) -> Error {
    if let sqlx::Error::Database(ref db) = e {
        if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation) {
            return Error::ConstraintViolation(format!(
                "entry for {} (canonical_ref {}) conflicts with an existing row",
                req.content_id, req.canonical_ref
            ));
        }
    }
    Error::Database(e)
}

const INSERT_SQL: &str = r#"
INSERT INTO catalog
    (content_id, category, page_count, title, authors, size_mb, canonical_ref, content_ref, created_at)
VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
"#;

#[async_trait]
impl CatalogRepository for SqliteCatalogRepository {
    async fn exists(&self, content_id: &ContentId) -> Result<bool> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM catalog WHERE content_id = ?")
            .bind(content_id.as_str())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, req: CreateEntryRequest) -> Result<()> {
        sqlx::query(INSERT_SQL)
            .bind(req.content_id.as_str())
            .bind(&req.category)
            .bind(req.page_count)
            .bind(&req.title)
            .bind(&req.authors)
            .bind(req.size_mb)
            .bind(req.canonical_ref.0)
            .bind(req.content_ref.as_str())
            .bind(Utc::now())
            .execute(&self.pool)
            .await
            .map_err(|e| map_insert_err(e, &req))?;

        debug!(
            content_id = %req.content_id,
            canonical_ref = %req.canonical_ref,
            category = %req.category,
            "catalog: inserted entry"
        );
        Ok(())
    }

    async fn find_by_canonical(&self, canonical_ref: MessageId) -> Result<Option<CatalogEntry>> {
        sqlx::query("SELECT * FROM catalog WHERE canonical_ref = ?")
            .bind(canonical_ref.0)
            .fetch_optional(&self.pool)
            .await?
            .map(|row| entry_from_row(&row))
            .transpose()
    }

    async fn delete_by_canonical(&self, canonical_ref: MessageId) -> Result<()> {
        let result = sqlx::query("DELETE FROM catalog WHERE canonical_ref = ?")
            .bind(canonical_ref.0)
            .execute(&self.pool)
            .await?;
        debug!(
            canonical_ref = %canonical_ref,
            rows_affected = result.rows_affected(),
            "catalog: delete by canonical ref"
        );
        Ok(())
    }

    async fn replace(&self, canonical_ref: MessageId, req: CreateEntryRequest) -> Result<()> {
        // Delete-then-insert in one transaction: the canonical_ref unique
        // index must never see two claimants, and a failed insert must roll
        // the delete back.
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM catalog WHERE canonical_ref = ?")
            .bind(canonical_ref.0)
            .execute(&mut *tx)
            .await?;

        sqlx::query(INSERT_SQL)
            .bind(req.content_id.as_str())
            .bind(&req.category)
            .bind(req.page_count)
            .bind(&req.title)
            .bind(&req.authors)
            .bind(req.size_mb)
            .bind(req.canonical_ref.0)
            .bind(req.content_ref.as_str())
            .bind(Utc::now())
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_err(e, &req))?;

        tx.commit().await?;

        debug!(
            canonical_ref = %canonical_ref,
            content_id = %req.content_id,
            "catalog: replaced entry"
        );
        Ok(())
    }

    async fn aggregate(&self) -> Result<CatalogStats> {
        let totals = sqlx::query(
            r#"SELECT COUNT(*) AS total_books,
                      COALESCE(SUM(page_count), 0) AS total_pages,
                      COALESCE(SUM(size_mb), 0.0) AS total_size_mb,
                      COUNT(DISTINCT category) AS total_categories
               FROM catalog"#,
        )
        .fetch_one(&self.pool)
        .await?;

        let per_category = sqlx::query(
            r#"SELECT category,
                      COUNT(*) AS books,
                      COALESCE(SUM(page_count), 0) AS pages,
                      COALESCE(SUM(size_mb), 0.0) AS size_mb
               FROM catalog
               GROUP BY category
               ORDER BY category ASC"#,
        )
        .fetch_all(&self.pool)
        .await?
        .iter()
        .map(|row| -> Result<CategoryStats> {
            Ok(CategoryStats {
                category: row.try_get("category")?,
                books: row.try_get("books")?,
                pages: row.try_get("pages")?,
                size_mb: row.try_get("size_mb")?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

        Ok(CatalogStats {
            total_books: totals.try_get("total_books")?,
            total_pages: totals.try_get("total_pages")?,
            total_size_mb: totals.try_get("total_size_mb")?,
            total_categories: totals.try_get("total_categories")?,
            per_category,
        })
    }
}
