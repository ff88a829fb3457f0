//! Test fixtures: temporary stores and failure injection.

#![allow(dead_code)]

use super::constants::*;
use content_forge::bulk::{BulkSettings, GenerationRequest};
use content_forge::dimensions::{DimensionTuple, Language, Theme};
use content_forge::generator::{GeneratedPage, GeneratorConfig};
use content_forge::page_store::{
    InsertManyOutcome, PageStore, PersistenceError, SqlitePageStore, StoredPage,
};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

/// A fresh SQLite page store in its own temporary directory. Keep the
/// `TempDir` alive for as long as the store is used.
pub fn temp_store() -> (TempDir, Arc<SqlitePageStore>) {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let store = SqlitePageStore::new(dir.path().join("pages.db")).expect("Failed to open store");
    (dir, Arc::new(store))
}

pub fn scenario_tuple() -> DimensionTuple {
    DimensionTuple::new(
        SCENARIO_THEME,
        SCENARIO_LANGUAGE,
        SCENARIO_STYLE,
        SCENARIO_PLATFORM,
        SCENARIO_AUDIENCE,
        SCENARIO_EMOTION,
    )
}

/// Bulk settings without the progress bar, with small batches.
pub fn quiet_settings() -> BulkSettings {
    BulkSettings {
        generator: GeneratorConfig {
            base_url: TEST_BASE_URL.to_string(),
            ..Default::default()
        },
        batch_size: TEST_BATCH_SIZE,
        progress_interval: Duration::from_millis(100),
        show_progress: false,
        ..Default::default()
    }
}

/// A request restricted to English love quotes, which keeps the space at
/// one theme and one language.
pub fn love_quotes_request(target_count: usize, worker_count: usize) -> GenerationRequest {
    GenerationRequest {
        target_count,
        worker_count,
        themes: vec![Theme::LoveQuotes],
        languages: vec![Language::English],
        variation_offset: 0,
    }
}

/// Wraps a real store and fails on command.
pub struct FlakyStore {
    inner: Arc<SqlitePageStore>,
    /// `insert_many` calls allowed to succeed before every later call fails.
    successful_inserts: usize,
    insert_calls: AtomicUsize,
    fail_count: bool,
}

impl FlakyStore {
    pub fn failing_after(inner: Arc<SqlitePageStore>, successful_inserts: usize) -> Self {
        Self {
            inner,
            successful_inserts,
            insert_calls: AtomicUsize::new(0),
            fail_count: false,
        }
    }

    pub fn unreachable(inner: Arc<SqlitePageStore>) -> Self {
        Self {
            inner,
            successful_inserts: usize::MAX,
            insert_calls: AtomicUsize::new(0),
            fail_count: true,
        }
    }
}

impl PageStore for FlakyStore {
    fn exists_by_hash(&self, hashes: &[String]) -> Result<HashSet<String>, PersistenceError> {
        self.inner.exists_by_hash(hashes)
    }

    fn insert_many(&self, pages: &[GeneratedPage]) -> Result<InsertManyOutcome, PersistenceError> {
        let call = self.insert_calls.fetch_add(1, Ordering::SeqCst);
        if call >= self.successful_inserts {
            return Err(PersistenceError::Fatal("connection lost".to_string()));
        }
        self.inner.insert_many(pages)
    }

    fn get_by_slug(&self, slug: &str) -> Result<Option<StoredPage>, PersistenceError> {
        self.inner.get_by_slug(slug)
    }

    fn count_pages(&self) -> Result<u64, PersistenceError> {
        if self.fail_count {
            return Err(PersistenceError::Fatal("connection refused".to_string()));
        }
        self.inner.count_pages()
    }

    fn set_active(&self, slug: &str, active: bool) -> Result<bool, PersistenceError> {
        self.inner.set_active(slug, active)
    }
}
