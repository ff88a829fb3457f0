//! Single-page generation: validity gate, variation loop and scoring.

mod content;
mod models;
mod scoring;
mod similarity;
mod validity;

pub use content::{build_content, build_slug, content_hash, META_DESCRIPTION_MAX, META_TITLE_MAX};
pub use models::{
    GeneratedPage, GenerationInfo, GeneratorStats, PageContent, QualityMetrics, SeoMetadata,
};
pub use scoring::{content_text, keyword_density, readability_score, sentiment_score};
pub use similarity::{levenshtein_distance, normalized_similarity, SimilarityMetric, UsedHashRegistry};
pub use validity::{check_combination, is_valid_combination, PROFESSIONAL_THEMES};

use crate::dimensions::DimensionTuple;
use crate::metrics;
use crate::variation::{Seed, TemplateError, TemplateLibrary};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

/// Bumped whenever a change to generation alters the output for a given seed.
pub const ALGORITHM_VERSION: &str = "seeded-variation-3";

pub const DEFAULT_UNIQUENESS_THRESHOLD: f64 = 85.0;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
pub const DEFAULT_BASE_URL: &str = "https://example.com";

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid combination: {rule}")]
    InvalidCombination { rule: &'static str },

    #[error("no sufficiently unique variant after {attempts} attempts (best score {best_score:.1})")]
    UniquenessExhausted { attempts: u32, best_score: f64 },

    #[error("template error: {0}")]
    Template(#[from] TemplateError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl GenerationError {
    /// Label used for metrics and logs.
    pub fn reason(&self) -> &'static str {
        match self {
            GenerationError::InvalidCombination { .. } => "invalid_combination",
            GenerationError::UniquenessExhausted { .. } => "uniqueness_exhausted",
            GenerationError::Template(_) => "template",
            GenerationError::Serialization(_) => "serialization",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeneratorConfig {
    pub uniqueness_threshold: f64,
    pub max_attempts: u32,
    pub similarity_metric: SimilarityMetric,
    pub base_url: String,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            uniqueness_threshold: DEFAULT_UNIQUENESS_THRESHOLD,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            similarity_metric: SimilarityMetric::default(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

/// Generates pages and remembers the content hashes it has accepted.
///
/// Not shared between threads: each bulk worker owns one, so the registry
/// is only consistent per worker. The store's unique constraint on the
/// content hash is what keeps pages unique across workers.
pub struct ContentGenerator {
    config: GeneratorConfig,
    templates: Arc<TemplateLibrary>,
    registry: UsedHashRegistry,
    stats: GeneratorStats,
}

impl ContentGenerator {
    pub fn new(config: GeneratorConfig) -> Self {
        Self::with_templates(config, TemplateLibrary::builtin())
    }

    pub fn with_templates(config: GeneratorConfig, templates: Arc<TemplateLibrary>) -> Self {
        Self {
            config,
            templates,
            registry: UsedHashRegistry::new(),
            stats: GeneratorStats::default(),
        }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn stats(&self) -> GeneratorStats {
        self.stats
    }

    pub fn registered_hashes(&self) -> usize {
        self.registry.len()
    }

    /// Uniqueness of a content hash against what this generator has accepted.
    pub fn score_uniqueness(&self, content_hash: &str) -> f64 {
        self.registry
            .score(content_hash, self.config.similarity_metric)
    }

    /// Generates one page for `tuple`, starting at `variation_index`.
    ///
    /// Attempt `n` uses the seed for `variation_index + n`. The first variant
    /// that scores at least the uniqueness threshold is registered and
    /// returned. Invalid tuples are rejected before any seed is derived.
    pub fn generate(
        &mut self,
        tuple: &DimensionTuple,
        variation_index: u64,
    ) -> Result<GeneratedPage, GenerationError> {
        if let Some(rule) = check_combination(tuple) {
            self.stats.invalid_combinations += 1;
            metrics::record_generation_failure("invalid_combination");
            debug!("Skipping {:?}: {}", tuple, rule);
            return Err(GenerationError::InvalidCombination { rule });
        }

        let mut best_score = 0.0_f64;
        for attempt in 0..self.config.max_attempts {
            self.stats.attempts += 1;
            metrics::record_generation_attempt();

            let index = variation_index.wrapping_add(attempt as u64);
            let seed = Seed::derive(tuple, index);
            let content = build_content(&self.templates, tuple, &seed)?;
            let hash = content_hash(&content, tuple)?;

            let uniqueness = self.score_uniqueness(&hash);
            if uniqueness < self.config.uniqueness_threshold {
                best_score = best_score.max(uniqueness);
                self.stats.rejected_not_unique += 1;
                continue;
            }

            self.registry.register(hash.clone());
            self.stats.accepted += 1;
            metrics::record_page_generated();
            if attempt > 0 {
                debug!(
                    "Accepted variation {} for {} after {} rejected attempts",
                    index,
                    tuple.theme,
                    attempt
                );
            }
            return Ok(self.assemble(tuple, seed, index, content, hash, uniqueness));
        }

        metrics::record_generation_failure("uniqueness_exhausted");
        Err(GenerationError::UniquenessExhausted {
            attempts: self.config.max_attempts,
            best_score,
        })
    }

    fn assemble(
        &self,
        tuple: &DimensionTuple,
        seed: Seed,
        variation_index: u64,
        content: PageContent,
        content_hash: String,
        uniqueness_score: f64,
    ) -> GeneratedPage {
        let slug = build_slug(tuple, &seed);
        let seo = content::build_seo(&content, tuple, &slug, &self.config.base_url);

        let text = content_text(&content);
        let quality = QualityMetrics {
            uniqueness_score,
            readability_score: readability_score(&text),
            sentiment_score: sentiment_score(&text),
            keyword_density: keyword_density(&text, &seo.keywords),
        };

        GeneratedPage {
            slug,
            dimensions: *tuple,
            content,
            seo,
            quality,
            generation: GenerationInfo {
                algorithm_version: ALGORITHM_VERSION.to_string(),
                content_hash,
                variation_index,
                template_version: self.templates.version.clone(),
                seed: seed.as_str().to_string(),
            },
        }
    }
}
