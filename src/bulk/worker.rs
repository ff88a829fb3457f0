use super::progress::ProgressCounters;
use crate::dimensions::CombinationSpace;
use crate::generator::{ContentGenerator, GeneratedPage, GenerationError, GeneratorConfig};
use crate::metrics;
use crate::page_store::{bulk_insert_unique, BulkInsertOptions, InsertSummary, PageStore};
use crate::variation::TemplateLibrary;
use std::ops::Range;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Everything a worker needs, borrowed from the orchestrator for the
/// duration of the run.
pub struct WorkerContext<'a> {
    pub store: &'a dyn PageStore,
    pub space: &'a CombinationSpace,
    pub generator_config: &'a GeneratorConfig,
    pub templates: &'a Arc<TemplateLibrary>,
    pub insert_options: BulkInsertOptions,
    pub variation_offset: u64,
    pub counters: &'a ProgressCounters,
    pub token: &'a CancellationToken,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WorkerReport {
    pub worker_id: usize,
    pub processed: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
    pub skipped_invalid: u64,
    pub cancelled: bool,
    /// Set when a fatal store error ended the worker early.
    pub failure: Option<String>,
}

impl WorkerReport {
    fn add_summary(&mut self, summary: InsertSummary) {
        self.inserted += summary.inserted;
        self.duplicates += summary.duplicates;
        self.errors += summary.errors;
    }
}

/// Persists the staged batch. On a fatal store error the pages not yet
/// committed count as errors and the failure is recorded on the report.
fn flush(
    ctx: &WorkerContext,
    report: &mut WorkerReport,
    staged: &mut Vec<GeneratedPage>,
) -> bool {
    if staged.is_empty() {
        return true;
    }
    let batch_len = staged.len() as u64;
    let result = bulk_insert_unique(ctx.store, staged, ctx.insert_options);
    staged.clear();

    match result {
        Ok(summary) => {
            ctx.counters.add_inserted(summary.inserted);
            ctx.counters.add_duplicates(summary.duplicates);
            ctx.counters.add_errors(summary.errors);
            report.add_summary(summary);
            true
        }
        Err(err) => {
            error!(
                "Worker {} aborting: failed to persist batch of {}: {}",
                report.worker_id, batch_len, err
            );
            let committed = err.committed;
            let lost = batch_len.saturating_sub(committed.total());
            ctx.counters.add_inserted(committed.inserted);
            ctx.counters.add_duplicates(committed.duplicates);
            ctx.counters.add_errors(committed.errors + lost);
            report.add_summary(committed);
            report.errors += lost;
            report.failure = Some(err.source.to_string());
            false
        }
    }
}

/// Generates and persists every index in `range`, in order.
///
/// Stops early when the token is cancelled, after flushing whatever is
/// staged, or when the store fails.
pub fn run_worker(worker_id: usize, range: Range<usize>, ctx: &WorkerContext) -> WorkerReport {
    metrics::worker_started();
    debug!("Worker {} starting on {:?}", worker_id, range);

    let mut generator =
        ContentGenerator::with_templates(ctx.generator_config.clone(), Arc::clone(ctx.templates));
    let batch_size = ctx.insert_options.batch_size.max(1);
    let mut staged: Vec<GeneratedPage> = Vec::with_capacity(batch_size);
    let mut report = WorkerReport {
        worker_id,
        ..Default::default()
    };

    for index in range {
        if staged.is_empty() && ctx.token.is_cancelled() {
            report.cancelled = true;
            break;
        }

        let tuple = ctx.space.tuple_at(index);
        match generator.generate(&tuple, ctx.variation_offset) {
            Ok(page) => staged.push(page),
            Err(GenerationError::InvalidCombination { .. }) => {
                report.skipped_invalid += 1;
                ctx.counters.add_skipped_invalid(1);
            }
            Err(err) => {
                debug!("Worker {}: index {} failed: {}", worker_id, index, err);
                report.errors += 1;
                ctx.counters.add_errors(1);
            }
        }
        report.processed += 1;
        ctx.counters.add_processed(1);

        #[cfg(feature = "slowdown")]
        {
            std::thread::sleep(std::time::Duration::from_millis(1));
        }

        if staged.len() >= batch_size && !flush(ctx, &mut report, &mut staged) {
            metrics::worker_finished();
            return report;
        }
    }

    flush(ctx, &mut report, &mut staged);
    metrics::worker_finished();

    info!(
        "Worker {} done: {} processed, {} inserted, {} duplicates, {} errors, {} skipped{}",
        worker_id,
        report.processed,
        report.inserted,
        report.duplicates,
        report.errors,
        report.skipped_invalid,
        if report.cancelled { " (cancelled)" } else { "" }
    );
    report
}
