//! Parallel bulk generation over the combination space.
//!
//! The target range of linear indices is split into contiguous slices, one
//! per worker. Every worker runs on its own thread of a dedicated rayon pool
//! with its own [`ContentGenerator`](crate::generator::ContentGenerator), and
//! persists through the dedup layer. Cross-worker uniqueness is left to the
//! store's unique content hash.

mod progress;
mod worker;

pub use progress::{ProgressCounters, ProgressSnapshot};
pub use worker::WorkerReport;

use crate::dimensions::{CombinationSpace, DimensionError, Language, Theme};
use crate::generator::GeneratorConfig;
use crate::metrics;
use crate::page_store::{BulkInsertOptions, PageStore, PersistenceError, DEFAULT_BATCH_SIZE};
use crate::variation::TemplateLibrary;
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use worker::{run_worker, WorkerContext};

pub const DEFAULT_MAX_WORKERS: usize = 16;
pub const DEFAULT_PROGRESS_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum BulkError {
    #[error("page store unavailable: {0}")]
    StoreUnavailable(#[source] PersistenceError),

    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<DimensionError> for BulkError {
    fn from(err: DimensionError) -> Self {
        BulkError::InvalidRequest(err.to_string())
    }
}

/// A request for a bulk run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub target_count: usize,
    /// 0 picks one worker per logical CPU.
    pub worker_count: usize,
    /// Restricts the space to these themes. Empty means all.
    #[serde(default)]
    pub themes: Vec<Theme>,
    /// Restricts the space to these languages. Empty means all.
    #[serde(default)]
    pub languages: Vec<Language>,
    /// Base variation index for every tuple. Reusing an offset regenerates
    /// the same pages, which then dedup away.
    #[serde(default)]
    pub variation_offset: u64,
}

impl GenerationRequest {
    pub fn new(target_count: usize, worker_count: usize) -> Self {
        Self {
            target_count,
            worker_count,
            ..Default::default()
        }
    }

    pub fn space(&self) -> Result<CombinationSpace, DimensionError> {
        let themes = (!self.themes.is_empty()).then_some(self.themes.as_slice());
        let languages = (!self.languages.is_empty()).then_some(self.languages.as_slice());
        CombinationSpace::restricted(themes, languages)
    }
}

#[derive(Debug, Clone)]
pub struct BulkSettings {
    pub generator: GeneratorConfig,
    pub batch_size: usize,
    pub max_workers: usize,
    pub progress_interval: Duration,
    pub show_progress: bool,
}

impl Default for BulkSettings {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            max_workers: DEFAULT_MAX_WORKERS,
            progress_interval: DEFAULT_PROGRESS_INTERVAL,
            show_progress: false,
        }
    }
}

/// Aggregated outcome of a bulk run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BulkReport {
    pub requested: usize,
    /// `requested` clamped to the space size.
    pub target: usize,
    pub workers: usize,
    pub processed: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
    pub skipped_invalid: u64,
    /// One entry per worker that stopped on a fatal store error.
    pub worker_failures: Vec<String>,
    pub cancelled: bool,
    pub elapsed: Duration,
    pub pages_per_sec: f64,
}

impl BulkReport {
    fn absorb(&mut self, worker: WorkerReport) {
        self.processed += worker.processed;
        self.inserted += worker.inserted;
        self.duplicates += worker.duplicates;
        self.errors += worker.errors;
        self.skipped_invalid += worker.skipped_invalid;
        self.cancelled |= worker.cancelled;
        if let Some(failure) = worker.failure {
            self.worker_failures
                .push(format!("worker {}: {}", worker.worker_id, failure));
        }
    }

    pub fn is_success(&self) -> bool {
        self.worker_failures.is_empty()
    }
}

/// Splits `[0, total)` into `parts` contiguous ranges. The first
/// `total % parts` ranges are one longer. Empty ranges are dropped.
pub fn partition_range(total: usize, parts: usize) -> Vec<Range<usize>> {
    if total == 0 || parts == 0 {
        return Vec::new();
    }
    let parts = parts.min(total);
    let base = total / parts;
    let extra = total % parts;

    let mut ranges = Vec::with_capacity(parts);
    let mut start = 0;
    for i in 0..parts {
        let len = base + usize::from(i < extra);
        ranges.push(start..start + len);
        start += len;
    }
    ranges
}

/// Effective worker count: `requested`, or the CPU count when 0, capped at
/// `max_workers` and at the number of indices to process.
pub fn resolve_worker_count(requested: usize, max_workers: usize, target: usize) -> usize {
    let wanted = if requested == 0 {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    } else {
        requested
    };
    wanted.min(max_workers.max(1)).min(target).max(1)
}

pub struct BulkGenerator {
    store: Arc<dyn PageStore>,
    settings: BulkSettings,
    templates: Arc<TemplateLibrary>,
    token: CancellationToken,
}

impl BulkGenerator {
    pub fn new(store: Arc<dyn PageStore>, settings: BulkSettings) -> Self {
        Self::with_templates(store, settings, TemplateLibrary::builtin())
    }

    pub fn with_templates(
        store: Arc<dyn PageStore>,
        settings: BulkSettings,
        templates: Arc<TemplateLibrary>,
    ) -> Self {
        Self {
            store,
            settings,
            templates,
            token: CancellationToken::new(),
        }
    }

    /// Token that stops the workers at their next batch boundary.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn settings(&self) -> &BulkSettings {
        &self.settings
    }

    /// Generates up to `target_count` pages over the full space.
    pub fn generate_bulk(
        &self,
        target_count: usize,
        worker_count: usize,
    ) -> Result<BulkReport, BulkError> {
        self.run(&GenerationRequest::new(target_count, worker_count))
    }

    pub fn run(&self, request: &GenerationRequest) -> Result<BulkReport, BulkError> {
        let start = Instant::now();
        let space = request.space()?;

        let existing = self
            .store
            .count_pages()
            .map_err(BulkError::StoreUnavailable)?;

        let target = if request.target_count > space.len() {
            warn!(
                "Requested {} pages but only {} combinations exist, clamping",
                request.target_count,
                space.len()
            );
            space.len()
        } else {
            request.target_count
        };

        let mut report = BulkReport {
            requested: request.target_count,
            target,
            ..Default::default()
        };
        if target == 0 {
            return Ok(report);
        }

        let workers =
            resolve_worker_count(request.worker_count, self.settings.max_workers, target);
        report.workers = workers;
        let ranges = partition_range(target, workers);

        info!(
            "Generating {} pages over {} combinations with {} workers ({} pages already stored)",
            target,
            space.len(),
            workers,
            existing
        );

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("forge-worker-{}", i))
            .build()
            .map_err(|e| BulkError::ThreadPool(e.to_string()))?;

        // The reporter cancels this token on reaching the target; the
        // generator's own token stays usable for the next run.
        let run_token = self.token.child_token();
        let counters = ProgressCounters::new();
        let done = AtomicBool::new(false);
        let ctx = WorkerContext {
            store: self.store.as_ref(),
            space: &space,
            generator_config: &self.settings.generator,
            templates: &self.templates,
            insert_options: BulkInsertOptions {
                batch_size: self.settings.batch_size.max(1),
                skip_duplicates: true,
            },
            variation_offset: request.variation_offset,
            counters: &counters,
            token: &run_token,
        };
        let results: Mutex<Vec<WorkerReport>> = Mutex::new(Vec::with_capacity(workers));

        std::thread::scope(|scope| {
            scope.spawn(|| {
                progress::report_until_done(
                    &counters,
                    &done,
                    &run_token,
                    target as u64,
                    self.settings.progress_interval,
                    self.settings.show_progress,
                )
            });

            pool.scope(|s| {
                for (worker_id, range) in ranges.into_iter().enumerate() {
                    let ctx = &ctx;
                    let results = &results;
                    s.spawn(move |_| {
                        let worker_report = run_worker(worker_id, range, ctx);
                        if let Ok(mut results) = results.lock() {
                            results.push(worker_report);
                        }
                    });
                }
            });

            done.store(true, Ordering::Release);
        });

        let mut worker_reports = results
            .into_inner()
            .map_err(|_| BulkError::ThreadPool("worker results lock poisoned".to_string()))?;
        worker_reports.sort_by_key(|r| r.worker_id);
        for worker_report in worker_reports {
            report.absorb(worker_report);
        }

        report.elapsed = start.elapsed();
        let secs = report.elapsed.as_secs_f64();
        report.pages_per_sec = if secs > 0.0 {
            report.inserted as f64 / secs
        } else {
            0.0
        };
        metrics::record_bulk_run(report.elapsed);

        if report.is_success() {
            info!(
                "Bulk run finished in {:.1}s: {} inserted, {} duplicates, {} errors, {} skipped ({:.0} pages/s)",
                secs,
                report.inserted,
                report.duplicates,
                report.errors,
                report.skipped_invalid,
                report.pages_per_sec
            );
        } else {
            warn!(
                "Bulk run finished with {} failed workers: {} inserted, {} duplicates, {} errors",
                report.worker_failures.len(),
                report.inserted,
                report.duplicates,
                report.errors
            );
        }
        Ok(report)
    }
}
