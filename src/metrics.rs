use anyhow::{Context, Result};
use lazy_static::lazy_static;
use prometheus::{
    Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts, Registry, TextEncoder,
};
use std::path::Path;
use std::time::Duration;

/// Metric name prefix for all content-forge metrics
const PREFIX: &str = "content_forge";

lazy_static! {
    // Global Prometheus registry
    pub static ref REGISTRY: Registry = Registry::new();

    // Generation Metrics
    pub static ref GENERATION_ATTEMPTS_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_generation_attempts_total"),
        "Total content variations built and scored"
    ).expect("Failed to create generation_attempts_total metric");

    pub static ref PAGES_GENERATED_TOTAL: Counter = Counter::new(
        format!("{PREFIX}_pages_generated_total"),
        "Total pages accepted by a generator"
    ).expect("Failed to create pages_generated_total metric");

    pub static ref GENERATION_FAILURES_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_generation_failures_total"), "Generation failures by reason"),
        &["reason"]
    ).expect("Failed to create generation_failures_total metric");

    // Persistence Metrics
    pub static ref PAGES_PERSISTED_TOTAL: CounterVec = CounterVec::new(
        Opts::new(format!("{PREFIX}_pages_persisted_total"), "Pages handed to the store by outcome"),
        &["outcome"]
    ).expect("Failed to create pages_persisted_total metric");

    pub static ref BATCH_PERSIST_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_batch_persist_duration_seconds"),
            "Time spent persisting one batch of pages"
        )
        .buckets(vec![0.005, 0.01, 0.05, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0])
    ).expect("Failed to create batch_persist_duration_seconds metric");

    // Bulk Run Metrics
    pub static ref ACTIVE_WORKERS: Gauge = Gauge::new(
        format!("{PREFIX}_active_workers"),
        "Number of bulk generation workers currently running"
    ).expect("Failed to create active_workers metric");

    pub static ref BULK_RUN_DURATION_SECONDS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            format!("{PREFIX}_bulk_run_duration_seconds"),
            "Wall time of a bulk generation run"
        )
        .buckets(vec![1.0, 10.0, 60.0, 300.0, 900.0, 3600.0])
    ).expect("Failed to create bulk_run_duration_seconds metric");
}

/// Initialize all metrics and register them with the Prometheus registry
pub fn init_metrics() {
    // Ignore errors if already registered (tests call this repeatedly)
    let _ = REGISTRY.register(Box::new(GENERATION_ATTEMPTS_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PAGES_GENERATED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(GENERATION_FAILURES_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(PAGES_PERSISTED_TOTAL.clone()));
    let _ = REGISTRY.register(Box::new(BATCH_PERSIST_DURATION_SECONDS.clone()));
    let _ = REGISTRY.register(Box::new(ACTIVE_WORKERS.clone()));
    let _ = REGISTRY.register(Box::new(BULK_RUN_DURATION_SECONDS.clone()));

    tracing::debug!("Metrics registry initialized");
}

pub fn record_generation_attempt() {
    GENERATION_ATTEMPTS_TOTAL.inc();
}

pub fn record_page_generated() {
    PAGES_GENERATED_TOTAL.inc();
}

pub fn record_generation_failure(reason: &str) {
    GENERATION_FAILURES_TOTAL.with_label_values(&[reason]).inc();
}

/// Record the outcome of one persisted batch
pub fn record_batch_persisted(inserted: u64, duplicates: u64, errors: u64, duration: Duration) {
    PAGES_PERSISTED_TOTAL
        .with_label_values(&["inserted"])
        .inc_by(inserted as f64);
    PAGES_PERSISTED_TOTAL
        .with_label_values(&["duplicate"])
        .inc_by(duplicates as f64);
    PAGES_PERSISTED_TOTAL
        .with_label_values(&["error"])
        .inc_by(errors as f64);

    BATCH_PERSIST_DURATION_SECONDS.observe(duration.as_secs_f64());
}

pub fn worker_started() {
    ACTIVE_WORKERS.inc();
}

pub fn worker_finished() {
    ACTIVE_WORKERS.dec();
}

pub fn record_bulk_run(duration: Duration) {
    BULK_RUN_DURATION_SECONDS.observe(duration.as_secs_f64());
}

/// Encode the registry in the Prometheus text exposition format
pub fn gather_text() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = vec![];
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

/// Write the registry to a file for a node-exporter textfile collector.
///
/// Writes to a sibling temp file first and renames it, so the collector never
/// reads a half-written file.
pub fn write_metrics_file(path: &Path) -> Result<()> {
    let text = gather_text()?;
    let tmp_path = path.with_extension("prom.tmp");
    std::fs::write(&tmp_path, text)
        .with_context(|| format!("Failed to write metrics to {:?}", tmp_path))?;
    std::fs::rename(&tmp_path, path)
        .with_context(|| format!("Failed to move metrics file into place at {:?}", path))?;
    Ok(())
}
