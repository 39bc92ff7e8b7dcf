//! # folio-db
//!
//! SQLite persistence layer for the folio catalog.
//!
//! This crate provides:
//! - Connection pool management
//! - The [`CatalogRepository`](folio_core::CatalogRepository) implementation
//!   backed by a single `catalog` table with a unique index on the canonical
//!   message reference
//! - Aggregate statistics queries
//!
//! ## Example
//!
//! ```rust,ignore
//! use folio_db::{create_pool, init_schema, SqliteCatalogRepository};
//!
//! let pool = create_pool("sqlite://library.db").await?;
//! init_schema(&pool).await?;
//! let catalog = SqliteCatalogRepository::new(pool);
//! let stats = catalog.aggregate().await?;
//! ```

pub mod catalog;
pub mod pool;


// Test fixtures for integration tests
// Note: always compiled so tests in other crates can use TestCatalog.
pub mod test_fixtures;

// Re-export core types
pub use folio_core::*;

pub use catalog::{init_schema, SqliteCatalogRepository};
pub use pool::{create_pool, create_pool_with_config, PoolConfig};
