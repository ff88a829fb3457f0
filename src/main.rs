use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod cli_style;
use cli_style::get_styles;

use content_forge::bulk::{BulkGenerator, BulkReport};
use content_forge::config::{AppConfig, CliConfig, FileConfig};
use content_forge::generator::{
    SimilarityMetric, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_UNIQUENESS_THRESHOLD,
};
use content_forge::metrics;
use content_forge::page_store::{PageStore, RunStatus, RunTotals, SqlitePageStore, StoredPage};
use content_forge::variation::TemplateLibrary;

fn parse_path(s: &str) -> Result<PathBuf> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(msg).with_context(|| format!("Error resolving path: {}", s));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir()?;
    Ok(cwd.join(original_path))
}

fn parse_similarity(s: &str) -> Result<SimilarityMetric> {
    match SimilarityMetric::parse(s) {
        Some(metric) => Ok(metric),
        None => bail!("expected exact_hash or hash_edit_distance, got {}", s),
    }
}

#[derive(Parser, Debug)]
#[command(styles=get_styles(), version, about = "Generates and deduplicates programmatic SEO pages")]
struct CliArgs {
    /// Path to a TOML config file. Its values override the flags below.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Directory holding pages.db.
    #[clap(long, value_parser = parse_path)]
    pub db_dir: Option<PathBuf>,

    /// Base URL for canonical links.
    #[clap(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// TOML template pack to use instead of the built-in templates.
    #[clap(long, value_parser = parse_path)]
    pub templates: Option<PathBuf>,

    /// Write Prometheus metrics here after the command finishes.
    #[clap(long, value_parser = parse_path)]
    pub metrics_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate pages in bulk and persist the unique ones.
    Generate {
        /// Number of pages to generate. Clamped to the combination space.
        #[clap(short, long)]
        count: usize,

        /// Worker threads. 0 uses one per CPU.
        #[clap(short, long, default_value_t = 0)]
        workers: usize,

        #[clap(long, default_value_t = content_forge::bulk::DEFAULT_MAX_WORKERS)]
        max_workers: usize,

        /// Base variation index. Change it to get new variants of stored pages.
        #[clap(long, default_value_t = 0)]
        offset: u64,

        /// Only generate these themes (repeatable).
        #[clap(long = "theme")]
        themes: Vec<String>,

        /// Only generate these languages (repeatable).
        #[clap(long = "language")]
        languages: Vec<String>,

        #[clap(long, default_value_t = content_forge::page_store::DEFAULT_BATCH_SIZE)]
        batch_size: usize,

        /// Minimum uniqueness score (0-100) a variant needs to be accepted.
        #[clap(long, default_value_t = DEFAULT_UNIQUENESS_THRESHOLD)]
        threshold: f64,

        #[clap(long, default_value_t = DEFAULT_MAX_ATTEMPTS)]
        max_attempts: u32,

        #[clap(long, default_value = "exact_hash", value_parser = parse_similarity)]
        similarity: SimilarityMetric,

        /// Seconds between progress log lines.
        #[clap(long, default_value_t = content_forge::config::DEFAULT_PROGRESS_INTERVAL_SECS)]
        progress_interval: u64,

        /// Disable the progress bar.
        #[clap(long)]
        no_progress: bool,
    },

    /// Show page counts and recent runs.
    Stats {
        /// How many recent runs to list.
        #[clap(long, default_value_t = 10)]
        runs: usize,
    },

    /// Print a stored page.
    Show {
        slug: String,

        /// Print the raw JSON instead of a summary.
        #[clap(long)]
        json: bool,
    },

    /// Mark a page inactive, or active again with --activate.
    Deactivate {
        slug: String,

        #[clap(long)]
        activate: bool,
    },
}

impl CliArgs {
    fn to_cli_config(&self) -> CliConfig {
        let mut cli = CliConfig {
            db_dir: self.db_dir.clone(),
            base_url: self.base_url.clone(),
            templates_path: self.templates.clone(),
            metrics_file: self.metrics_file.clone(),
            ..Default::default()
        };
        if let Command::Generate {
            workers,
            max_workers,
            themes,
            languages,
            batch_size,
            threshold,
            max_attempts,
            similarity,
            progress_interval,
            ..
        } = &self.command
        {
            cli.workers = *workers;
            cli.max_workers = *max_workers;
            cli.themes = themes.clone();
            cli.languages = languages.clone();
            cli.batch_size = *batch_size;
            cli.uniqueness_threshold = *threshold;
            cli.max_attempts = *max_attempts;
            cli.similarity_metric = *similarity;
            cli.progress_interval_secs = *progress_interval;
        }
        cli
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli_args = CliArgs::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to initialize logging")?;

    info!(
        "content-forge {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH")
    );

    let file_config = match &cli_args.config {
        Some(path) => {
            info!("Loading config from {:?}", path);
            Some(FileConfig::load(path)?)
        }
        None => None,
    };
    let config = AppConfig::resolve(&cli_args.to_cli_config(), file_config)?;

    metrics::init_metrics();

    info!("Opening page database at {:?}...", config.pages_db_path());
    let store = Arc::new(SqlitePageStore::new(config.pages_db_path())?);

    let result = match cli_args.command {
        Command::Generate {
            count,
            offset,
            no_progress,
            ..
        } => run_generate(&config, store, count, offset, !no_progress).await,
        Command::Stats { runs } => print_stats(&store, runs),
        Command::Show { slug, json } => show_page(&store, &slug, json),
        Command::Deactivate { slug, activate } => set_active(&store, &slug, activate),
    };

    if let Some(path) = &config.metrics_file {
        match metrics::write_metrics_file(path) {
            Ok(()) => info!("Metrics written to {:?}", path),
            Err(e) => warn!("Failed to write metrics file {:?}: {:#}", path, e),
        }
    }

    if let Err(e) = &result {
        cli_style::print_error(&format!("{:#}", e));
    }
    result
}

async fn run_generate(
    config: &AppConfig,
    store: Arc<SqlitePageStore>,
    count: usize,
    offset: u64,
    show_progress: bool,
) -> Result<()> {
    let templates = match &config.templates_path {
        Some(path) => {
            info!("Loading template pack from {:?}", path);
            Arc::new(TemplateLibrary::load(path)?)
        }
        None => TemplateLibrary::builtin(),
    };
    info!("Using templates {}", templates.version);

    let request = config.generation_request(count, offset);
    let request_json = serde_json::to_string(&request)?;
    let run_id = uuid::Uuid::new_v4().to_string();
    store.record_run_start(&run_id, count as u64, &request_json)?;
    info!("Starting run {}", run_id);

    let page_store: Arc<dyn PageStore> = store.clone();
    let bulk = BulkGenerator::with_templates(page_store, config.bulk_settings(show_progress), templates);

    let token = bulk.cancellation_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, finishing in-flight batches...");
            token.cancel();
        }
    });

    let outcome = tokio::task::spawn_blocking(move || bulk.run(&request))
        .await
        .context("Bulk generation task panicked")?;

    match outcome {
        Ok(report) => {
            let status = if !report.is_success() {
                RunStatus::Failed
            } else if report.cancelled {
                RunStatus::Cancelled
            } else {
                RunStatus::Completed
            };
            let failure = (!report.worker_failures.is_empty())
                .then(|| report.worker_failures.join("; "));
            store.record_run_finish(&run_id, status, &run_totals(&report), failure.as_deref())?;
            print_report(&run_id, &report);
            Ok(())
        }
        Err(e) => {
            store.record_run_finish(&run_id, RunStatus::Failed, &RunTotals::default(), Some(e.to_string().as_str()))?;
            Err(e).context("Bulk generation failed")
        }
    }
}

fn run_totals(report: &BulkReport) -> RunTotals {
    RunTotals {
        inserted: report.inserted,
        duplicates: report.duplicates,
        errors: report.errors,
        skipped_invalid: report.skipped_invalid,
        elapsed_ms: report.elapsed.as_millis() as u64,
    }
}

fn print_report(run_id: &str, report: &BulkReport) {
    cli_style::print_section_header("Generation Summary");
    cli_style::print_key_value("Run", run_id);
    cli_style::print_key_value("Requested", &report.requested.to_string());
    if report.target != report.requested {
        cli_style::print_key_value("Clamped to", &report.target.to_string());
    }
    cli_style::print_key_value("Workers", &report.workers.to_string());
    cli_style::print_key_value("Processed", &report.processed.to_string());
    cli_style::print_key_value_highlight("Inserted", &report.inserted.to_string());
    cli_style::print_key_value("Duplicates", &report.duplicates.to_string());
    cli_style::print_key_value("Errors", &report.errors.to_string());
    cli_style::print_key_value("Skipped (invalid)", &report.skipped_invalid.to_string());
    cli_style::print_key_value("Elapsed", &cli_style::format_duration(report.elapsed));
    cli_style::print_key_value("Throughput", &format!("{:.0} pages/s", report.pages_per_sec));
    cli_style::print_section_footer();

    for failure in &report.worker_failures {
        cli_style::print_error(failure);
    }
    if report.cancelled {
        cli_style::print_warning("Run was cancelled before covering the whole range");
    } else if report.is_success() {
        cli_style::print_success(&format!("{} new pages stored", report.inserted));
    }
}

fn print_stats(store: &SqlitePageStore, runs: usize) -> Result<()> {
    let total = store.count_pages()?;
    cli_style::print_section_header("Pages");
    cli_style::print_key_value_highlight("Total", &total.to_string());
    cli_style::print_section_footer();

    let by_theme = store.count_by_theme()?;
    if !by_theme.is_empty() {
        let mut table = cli_style::TableBuilder::new(&["Theme", "Pages"]);
        for (theme, n) in &by_theme {
            table.add_row(&[theme.clone(), n.to_string()]);
        }
        table.print();
    }

    cli_style::print_section_header("Recent Runs");
    let recent = store.recent_runs(runs)?;
    if recent.is_empty() {
        cli_style::print_empty_list("No runs recorded yet");
    } else {
        let mut table = cli_style::TableBuilder::new(&[
            "Run", "Started", "Status", "Requested", "Inserted", "Dup", "Err",
        ]);
        for run in &recent {
            table.add_row(&[
                run.id.clone(),
                run.started_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                run.status.as_str().to_string(),
                run.requested.to_string(),
                run.totals.inserted.to_string(),
                run.totals.duplicates.to_string(),
                run.totals.errors.to_string(),
            ]);
        }
        table.print();
    }
    cli_style::print_section_footer();
    Ok(())
}

fn show_page(store: &SqlitePageStore, slug: &str, json: bool) -> Result<()> {
    let Some(stored) = store.get_by_slug(slug)? else {
        bail!("No page with slug {}", slug);
    };
    if json {
        println!("{}", serde_json::to_string_pretty(&stored.page)?);
        return Ok(());
    }
    print_page(&stored);
    Ok(())
}

fn print_page(stored: &StoredPage) {
    let page = &stored.page;
    cli_style::print_section_header(&page.slug);
    cli_style::print_key_value_highlight("Title", &page.content.title);
    cli_style::print_key_value("Heading", &page.content.heading);
    cli_style::print_key_value("Description", &page.content.description);
    cli_style::print_key_value("Call to action", &page.content.call_to_action);
    cli_style::print_key_value("Canonical", &page.seo.canonical_url);
    cli_style::print_key_value("Active", if stored.is_active { "yes" } else { "no" });
    cli_style::print_key_value(
        "Created",
        &stored.created_at.format("%Y-%m-%d %H:%M:%S").to_string(),
    );
    cli_style::print_key_value(
        "Quality",
        &format!(
            "uniqueness {:.0}, readability {:.1}, sentiment {:.2}, keyword density {:.2}%",
            page.quality.uniqueness_score,
            page.quality.readability_score,
            page.quality.sentiment_score,
            page.quality.keyword_density
        ),
    );
    cli_style::print_key_value("Content hash", &page.generation.content_hash);
    println!();
    for feature in &page.content.features {
        cli_style::print_list_item(feature, 1);
    }
    cli_style::print_section_footer();
}

fn set_active(store: &SqlitePageStore, slug: &str, active: bool) -> Result<()> {
    if !store.set_active(slug, active)? {
        bail!("No page with slug {}", slug);
    }
    let state = if active { "active" } else { "inactive" };
    cli_style::print_success(&format!("{} is now {}", slug, state));
    Ok(())
}
