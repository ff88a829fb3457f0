use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub db_dir: Option<String>,
    pub base_url: Option<String>,
    pub templates_path: Option<String>,
    pub metrics_file: Option<String>,

    // Feature configs
    pub generation: Option<GenerationConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct GenerationConfig {
    pub uniqueness_threshold: Option<f64>,
    pub max_attempts: Option<u32>,
    /// "exact_hash" or "hash_edit_distance"
    pub similarity_metric: Option<String>,
    pub batch_size: Option<usize>,
    pub workers: Option<usize>,
    pub max_workers: Option<usize>,
    pub progress_interval_secs: Option<u64>,
    pub themes: Option<Vec<String>>,
    pub languages: Option<Vec<String>>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
