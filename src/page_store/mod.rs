//! Page persistence: the store collaborator and the dedup layer on top of it.

mod dedup;
mod models;
mod schema;
mod sqlite_page_store;

pub use dedup::{
    bulk_insert_unique, BulkInsertError, BulkInsertOptions, InsertSummary, DEFAULT_BATCH_SIZE,
};
pub use models::*;
pub use schema::PAGE_VERSIONED_SCHEMAS;
pub use sqlite_page_store::SqlitePageStore;

use crate::generator::GeneratedPage;
use std::collections::HashSet;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    /// A unique constraint rejected the row. Another writer got there first.
    #[error("page with content hash {content_hash} already exists")]
    Conflict { content_hash: String },

    /// The store refused a single row for a reason other than uniqueness.
    #[error("row rejected: {0}")]
    Rejected(String),

    #[error("failed to serialize page: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The store itself is unusable (connection lost, I/O error, poisoned lock).
    #[error("store failure: {0}")]
    Fatal(String),
}

impl PersistenceError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, PersistenceError::Conflict { .. })
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, PersistenceError::Fatal(_))
    }
}

/// Result of [`PageStore::insert_many`]. Rows that failed individually are
/// listed with their content hash; they never abort the batch.
#[derive(Debug, Default)]
pub struct InsertManyOutcome {
    pub inserted: u64,
    pub rejected: Vec<(String, PersistenceError)>,
}

/// The persistent store pages are written to.
///
/// Implementations must enforce uniqueness of `slug` and of the content hash.
pub trait PageStore: Send + Sync {
    /// Which of the given content hashes are already stored.
    fn exists_by_hash(&self, hashes: &[String]) -> Result<HashSet<String>, PersistenceError>;

    /// Inserts pages with relaxed durability. Row-level failures go into the
    /// outcome; only store-wide failures are returned as `Err`.
    fn insert_many(&self, pages: &[GeneratedPage]) -> Result<InsertManyOutcome, PersistenceError>;

    fn get_by_slug(&self, slug: &str) -> Result<Option<StoredPage>, PersistenceError>;

    fn count_pages(&self) -> Result<u64, PersistenceError>;

    /// Returns false when no page has this slug.
    fn set_active(&self, slug: &str, active: bool) -> Result<bool, PersistenceError>;
}
