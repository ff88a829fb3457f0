mod file_config;

pub use file_config::{FileConfig, GenerationConfig};

use crate::bulk::{BulkSettings, GenerationRequest, DEFAULT_MAX_WORKERS};
use crate::dimensions::{Language, Theme};
use crate::generator::{
    GeneratorConfig, SimilarityMetric, DEFAULT_BASE_URL, DEFAULT_MAX_ATTEMPTS,
    DEFAULT_UNIQUENESS_THRESHOLD,
};
use crate::page_store::DEFAULT_BATCH_SIZE;
use anyhow::{bail, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_PROGRESS_INTERVAL_SECS: u64 = 5;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_dir: Option<PathBuf>,
    pub base_url: String,
    pub templates_path: Option<PathBuf>,
    pub metrics_file: Option<PathBuf>,
    pub uniqueness_threshold: f64,
    pub max_attempts: u32,
    pub similarity_metric: SimilarityMetric,
    pub batch_size: usize,
    pub workers: usize,
    pub max_workers: usize,
    pub progress_interval_secs: u64,
    pub themes: Vec<String>,
    pub languages: Vec<String>,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_dir: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            templates_path: None,
            metrics_file: None,
            uniqueness_threshold: DEFAULT_UNIQUENESS_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            similarity_metric: SimilarityMetric::default(),
            batch_size: DEFAULT_BATCH_SIZE,
            workers: 0,
            max_workers: DEFAULT_MAX_WORKERS,
            progress_interval_secs: DEFAULT_PROGRESS_INTERVAL_SECS,
            themes: Vec::new(),
            languages: Vec::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub db_dir: PathBuf,
    pub templates_path: Option<PathBuf>,
    pub metrics_file: Option<PathBuf>,

    // Generation
    pub generator: GeneratorConfig,
    pub batch_size: usize,
    pub workers: usize,
    pub max_workers: usize,
    pub progress_interval: Duration,
    pub themes: Vec<Theme>,
    pub languages: Vec<Language>,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        // TOML overrides CLI for each field
        let db_dir = file
            .db_dir
            .map(PathBuf::from)
            .or_else(|| cli.db_dir.clone())
            .ok_or_else(|| {
                anyhow::anyhow!("db_dir must be specified via --db-dir or in config file")
            })?;

        // Validate db_dir exists
        if !db_dir.exists() {
            bail!("Database directory does not exist: {:?}", db_dir);
        }
        if !db_dir.is_dir() {
            bail!("db_dir is not a directory: {:?}", db_dir);
        }

        let base_url = file
            .base_url
            .unwrap_or_else(|| cli.base_url.clone())
            .trim_end_matches('/')
            .to_string();
        if base_url.is_empty() {
            bail!("base_url must not be empty");
        }

        let templates_path = file
            .templates_path
            .map(PathBuf::from)
            .or_else(|| cli.templates_path.clone());
        if let Some(path) = &templates_path {
            if !path.is_file() {
                bail!("Template pack not found: {:?}", path);
            }
        }

        let metrics_file = file
            .metrics_file
            .map(PathBuf::from)
            .or_else(|| cli.metrics_file.clone());

        let generation = file.generation.unwrap_or_default();

        let uniqueness_threshold = generation
            .uniqueness_threshold
            .unwrap_or(cli.uniqueness_threshold);
        if !(0.0..=100.0).contains(&uniqueness_threshold) {
            bail!(
                "uniqueness_threshold must be between 0 and 100, got {}",
                uniqueness_threshold
            );
        }

        let max_attempts = generation.max_attempts.unwrap_or(cli.max_attempts);
        if max_attempts == 0 {
            bail!("max_attempts must be at least 1");
        }

        let similarity_metric = match generation.similarity_metric {
            Some(s) => match SimilarityMetric::parse(&s) {
                Some(metric) => metric,
                None => bail!("Unknown similarity_metric: {}", s),
            },
            None => cli.similarity_metric,
        };

        let batch_size = generation.batch_size.unwrap_or(cli.batch_size);
        if batch_size == 0 {
            bail!("batch_size must be at least 1");
        }

        let workers = generation.workers.unwrap_or(cli.workers);
        let max_workers = generation.max_workers.unwrap_or(cli.max_workers);
        if max_workers == 0 {
            bail!("max_workers must be at least 1");
        }

        let progress_interval = Duration::from_secs(
            generation
                .progress_interval_secs
                .unwrap_or(cli.progress_interval_secs)
                .max(1),
        );

        let themes = parse_axis_filter(
            generation.themes.as_deref().unwrap_or(cli.themes.as_slice()),
            "theme",
            Theme::parse,
        )?;
        let languages = parse_axis_filter(
            generation.languages.as_deref().unwrap_or(cli.languages.as_slice()),
            "language",
            Language::parse,
        )?;

        Ok(Self {
            db_dir,
            templates_path,
            metrics_file,
            generator: GeneratorConfig {
                uniqueness_threshold,
                max_attempts,
                similarity_metric,
                base_url,
            },
            batch_size,
            workers,
            max_workers,
            progress_interval,
            themes,
            languages,
        })
    }

    pub fn pages_db_path(&self) -> PathBuf {
        self.db_dir.join("pages.db")
    }

    pub fn bulk_settings(&self, show_progress: bool) -> BulkSettings {
        BulkSettings {
            generator: self.generator.clone(),
            batch_size: self.batch_size,
            max_workers: self.max_workers,
            progress_interval: self.progress_interval,
            show_progress,
        }
    }

    pub fn generation_request(&self, target_count: usize, variation_offset: u64) -> GenerationRequest {
        GenerationRequest {
            target_count,
            worker_count: self.workers,
            themes: self.themes.clone(),
            languages: self.languages.clone(),
            variation_offset,
        }
    }
}

fn parse_axis_filter<T>(
    values: &[String],
    axis: &str,
    parse: fn(&str) -> Option<T>,
) -> Result<Vec<T>> {
    values
        .iter()
        .map(|value| match parse(value) {
            Some(parsed) => Ok(parsed),
            None => bail!("Unknown {} in filter: {}", axis, value),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn make_temp_db_dir() -> TempDir {
        TempDir::new().unwrap()
    }

    fn cli_with_dir(dir: &TempDir) -> CliConfig {
        CliConfig {
            db_dir: Some(dir.path().to_path_buf()),
            ..Default::default()
        }
    }

    #[test]
    fn test_resolve_cli_only() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(temp_dir.path().to_path_buf()),
            base_url: "https://quotes.example.org/".to_string(),
            uniqueness_threshold: 70.0,
            max_attempts: 10,
            similarity_metric: SimilarityMetric::HashEditDistance,
            batch_size: 250,
            workers: 3,
            max_workers: 8,
            progress_interval_secs: 2,
            themes: vec!["love_quotes".to_string()],
            languages: vec!["hindi".to_string(), "english".to_string()],
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.generator.base_url, "https://quotes.example.org");
        assert_eq!(config.generator.uniqueness_threshold, 70.0);
        assert_eq!(config.generator.max_attempts, 10);
        assert_eq!(
            config.generator.similarity_metric,
            SimilarityMetric::HashEditDistance
        );
        assert_eq!(config.batch_size, 250);
        assert_eq!(config.workers, 3);
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.progress_interval, Duration::from_secs(2));
        assert_eq!(config.themes, vec![Theme::LoveQuotes]);
        assert_eq!(config.languages, vec![Language::Hindi, Language::English]);
        assert!(config.templates_path.is_none());
        assert!(config.metrics_file.is_none());
    }

    #[test]
    fn test_resolve_defaults() {
        let temp_dir = make_temp_db_dir();
        let config = AppConfig::resolve(&cli_with_dir(&temp_dir), None).unwrap();

        assert_eq!(config.generator.uniqueness_threshold, 85.0);
        assert_eq!(config.generator.max_attempts, 50);
        assert_eq!(config.generator.similarity_metric, SimilarityMetric::ExactHash);
        assert_eq!(config.generator.base_url, "https://example.com");
        assert_eq!(config.batch_size, 1000);
        assert_eq!(config.workers, 0);
        assert_eq!(config.max_workers, 16);
        assert!(config.themes.is_empty());
        assert!(config.languages.is_empty());
    }

    #[test]
    fn test_resolve_toml_overrides_cli() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/should/be/overridden")),
            base_url: "https://cli.example.com".to_string(),
            batch_size: 500,
            max_attempts: 12,
            themes: vec!["sad_quotes".to_string()],
            ..Default::default()
        };

        let file_config = FileConfig {
            db_dir: Some(temp_dir.path().to_string_lossy().to_string()),
            base_url: Some("https://toml.example.com".to_string()),
            generation: Some(GenerationConfig {
                batch_size: Some(64),
                similarity_metric: Some("hash_edit_distance".to_string()),
                themes: Some(vec!["birthday_wishes".to_string()]),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = AppConfig::resolve(&cli, Some(file_config)).unwrap();

        // TOML values should override CLI
        assert_eq!(config.db_dir, temp_dir.path());
        assert_eq!(config.generator.base_url, "https://toml.example.com");
        assert_eq!(config.batch_size, 64);
        assert_eq!(
            config.generator.similarity_metric,
            SimilarityMetric::HashEditDistance
        );
        assert_eq!(config.themes, vec![Theme::BirthdayWishes]);
        // CLI value used when TOML doesn't specify
        assert_eq!(config.generator.max_attempts, 12);
    }

    #[test]
    fn test_resolve_missing_db_dir_error() {
        let cli = CliConfig::default();
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result
            .unwrap_err()
            .to_string()
            .contains("db_dir must be specified"));
    }

    #[test]
    fn test_resolve_nonexistent_db_dir_error() {
        let cli = CliConfig {
            db_dir: Some(PathBuf::from("/nonexistent/path/that/should/not/exist")),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn test_resolve_db_dir_not_directory_error() {
        let temp_file = tempfile::NamedTempFile::new().unwrap();
        let cli = CliConfig {
            db_dir: Some(temp_file.path().to_path_buf()),
            ..Default::default()
        };
        let result = AppConfig::resolve(&cli, None);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("not a directory"));
    }

    #[test]
    fn test_resolve_rejects_out_of_range_threshold() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            uniqueness_threshold: 101.0,
            ..cli_with_dir(&temp_dir)
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("uniqueness_threshold"));
    }

    #[test]
    fn test_resolve_rejects_zero_attempts_and_batch() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            max_attempts: 0,
            ..cli_with_dir(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());

        let cli = CliConfig {
            batch_size: 0,
            ..cli_with_dir(&temp_dir)
        };
        assert!(AppConfig::resolve(&cli, None).is_err());
    }

    #[test]
    fn test_resolve_rejects_unknown_filter_values() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            languages: vec!["klingon".to_string()],
            ..cli_with_dir(&temp_dir)
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Unknown language in filter: klingon"));

        let file_config = FileConfig {
            generation: Some(GenerationConfig {
                similarity_metric: Some("cosine".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = AppConfig::resolve(&cli_with_dir(&temp_dir), Some(file_config)).unwrap_err();
        assert!(err.to_string().contains("Unknown similarity_metric"));
    }

    #[test]
    fn test_resolve_missing_template_pack() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            templates_path: Some(temp_dir.path().join("missing.toml")),
            ..cli_with_dir(&temp_dir)
        };
        let err = AppConfig::resolve(&cli, None).unwrap_err();
        assert!(err.to_string().contains("Template pack not found"));
    }

    #[test]
    fn test_derived_settings() {
        let temp_dir = make_temp_db_dir();
        let cli = CliConfig {
            workers: 4,
            themes: vec!["love_quotes".to_string()],
            ..cli_with_dir(&temp_dir)
        };
        let config = AppConfig::resolve(&cli, None).unwrap();

        assert_eq!(config.pages_db_path(), temp_dir.path().join("pages.db"));

        let settings = config.bulk_settings(true);
        assert_eq!(settings.batch_size, 1000);
        assert!(settings.show_progress);

        let request = config.generation_request(200, 7);
        assert_eq!(request.target_count, 200);
        assert_eq!(request.worker_count, 4);
        assert_eq!(request.variation_offset, 7);
        assert_eq!(request.themes, vec![Theme::LoveQuotes]);
    }
}
