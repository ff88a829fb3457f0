use super::{PageStore, PersistenceError};
use crate::generator::GeneratedPage;
use crate::metrics;
use std::collections::HashSet;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BATCH_SIZE: usize = 1000;

#[derive(Debug, Clone, Copy)]
pub struct BulkInsertOptions {
    pub batch_size: usize,
    /// Filter hashes already stored or repeated within a batch before inserting.
    pub skip_duplicates: bool,
}

impl Default for BulkInsertOptions {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            skip_duplicates: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertSummary {
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
}

impl InsertSummary {
    pub fn merge(&mut self, other: InsertSummary) {
        self.inserted += other.inserted;
        self.duplicates += other.duplicates;
        self.errors += other.errors;
    }

    pub fn total(&self) -> u64 {
        self.inserted + self.duplicates + self.errors
    }
}

/// A store-wide failure part way through [`bulk_insert_unique`]. `committed`
/// counts the sub-batches written before it.
#[derive(Debug, Error)]
#[error("{source} ({} pages inserted before the failure)", .committed.inserted)]
pub struct BulkInsertError {
    pub committed: InsertSummary,
    #[source]
    pub source: PersistenceError,
}

/// Persists `pages` in sub-batches, counting anything whose content hash is
/// already taken as a duplicate rather than an error.
///
/// A unique-constraint conflict raised by the store is a duplicate too, which
/// covers a concurrent writer inserting the same hash between the existence
/// check and the insert. Only a store-wide failure returns `Err`; sub-batches
/// written before it stay written.
pub fn bulk_insert_unique(
    store: &dyn PageStore,
    pages: &[GeneratedPage],
    options: BulkInsertOptions,
) -> Result<InsertSummary, BulkInsertError> {
    let mut summary = InsertSummary::default();
    for batch in pages.chunks(options.batch_size.max(1)) {
        match insert_batch(store, batch, options.skip_duplicates) {
            Ok(batch_summary) => summary.merge(batch_summary),
            Err(source) => {
                return Err(BulkInsertError {
                    committed: summary,
                    source,
                })
            }
        }
    }
    Ok(summary)
}

fn insert_batch(
    store: &dyn PageStore,
    batch: &[GeneratedPage],
    skip_duplicates: bool,
) -> Result<InsertSummary, PersistenceError> {
    let start = Instant::now();
    let mut summary = InsertSummary::default();

    let to_insert: Vec<GeneratedPage> = if skip_duplicates {
        let mut seen = HashSet::with_capacity(batch.len());
        let mut unique = Vec::with_capacity(batch.len());
        for page in batch {
            if seen.insert(page.content_hash()) {
                unique.push(page);
            } else {
                summary.duplicates += 1;
            }
        }

        let hashes: Vec<String> = unique.iter().map(|p| p.content_hash().to_string()).collect();
        let stored = store.exists_by_hash(&hashes)?;
        summary.duplicates += stored.len() as u64;
        unique
            .into_iter()
            .filter(|p| !stored.contains(p.content_hash()))
            .cloned()
            .collect()
    } else {
        batch.to_vec()
    };

    if !to_insert.is_empty() {
        let outcome = store.insert_many(&to_insert)?;
        summary.inserted += outcome.inserted;
        for (hash, err) in outcome.rejected {
            if err.is_conflict() {
                summary.duplicates += 1;
            } else {
                warn!("Failed to insert page {}: {}", hash, err);
                summary.errors += 1;
            }
        }
    }

    debug!(
        "Persisted batch of {}: {} inserted, {} duplicates, {} errors",
        batch.len(),
        summary.inserted,
        summary.duplicates,
        summary.errors
    );
    metrics::record_batch_persisted(
        summary.inserted,
        summary.duplicates,
        summary.errors,
        start.elapsed(),
    );
    Ok(summary)
}
