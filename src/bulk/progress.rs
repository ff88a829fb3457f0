//! Shared progress counters and the reporter loop.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::info;

/// Counters every worker bumps. Relaxed ordering: they are only read for
/// display and for the stop condition.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    processed: AtomicU64,
    inserted: AtomicU64,
    duplicates: AtomicU64,
    errors: AtomicU64,
    skipped_invalid: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub inserted: u64,
    pub duplicates: u64,
    pub errors: u64,
    pub skipped_invalid: u64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_processed(&self, n: u64) {
        self.processed.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_inserted(&self, n: u64) {
        self.inserted.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_duplicates(&self, n: u64) {
        self.duplicates.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_errors(&self, n: u64) {
        self.errors.fetch_add(n, Ordering::Relaxed);
    }

    pub fn add_skipped_invalid(&self, n: u64) {
        self.skipped_invalid.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            processed: self.processed.load(Ordering::Relaxed),
            inserted: self.inserted.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
            skipped_invalid: self.skipped_invalid.load(Ordering::Relaxed),
        }
    }
}

fn make_progress_bar(target: u64) -> ProgressBar {
    let pb = ProgressBar::new(target);
    pb.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} ({per_sec}, {eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    pb.set_draw_target(ProgressDrawTarget::stderr_with_hz(8));
    pb
}

/// Polling granularity of the reporter, so it notices `done` promptly even
/// with a long progress interval.
const REPORTER_TICK: Duration = Duration::from_millis(50);

/// Logs progress every `interval` until `done` is set. Cancels `token` once
/// `inserted` reaches `target`.
pub fn report_until_done(
    counters: &ProgressCounters,
    done: &AtomicBool,
    token: &CancellationToken,
    target: u64,
    interval: Duration,
    show_bar: bool,
) {
    let start = Instant::now();
    let bar = show_bar.then(|| make_progress_bar(target));
    let mut last_log = Instant::now();

    loop {
        let finished = done.load(Ordering::Acquire);
        let snapshot = counters.snapshot();

        if snapshot.inserted >= target && !token.is_cancelled() {
            info!("Target of {} inserted pages reached, stopping workers", target);
            token.cancel();
        }

        if let Some(bar) = &bar {
            bar.set_position(snapshot.processed.min(target));
            bar.set_message(format!(
                "{} new, {} dup, {} err",
                snapshot.inserted, snapshot.duplicates, snapshot.errors
            ));
        }

        if finished {
            break;
        }

        if last_log.elapsed() >= interval {
            let secs = start.elapsed().as_secs_f64();
            let rate = if secs > 0.0 {
                snapshot.processed as f64 / secs
            } else {
                0.0
            };
            info!(
                "Progress: {}/{} processed, {} inserted, {} duplicates, {} errors, {} skipped ({:.0}/s)",
                snapshot.processed,
                target,
                snapshot.inserted,
                snapshot.duplicates,
                snapshot.errors,
                snapshot.skipped_invalid,
                rate
            );
            last_log = Instant::now();
        }

        std::thread::sleep(REPORTER_TICK.min(interval));
    }

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
}
