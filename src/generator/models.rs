use crate::dimensions::DimensionTuple;
use serde::{Deserialize, Serialize};

/// The visible body of a page. Together with the dimensions, this is what
/// the content hash covers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageContent {
    pub title: String,
    pub heading: String,
    pub description: String,
    pub introduction: String,
    pub features: Vec<String>,
    pub examples: Vec<String>,
    pub call_to_action: String,
    pub footer_text: String,
    pub unique_value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeoMetadata {
    pub meta_title: String,
    pub meta_description: String,
    pub keywords: Vec<String>,
    pub canonical_url: String,
    pub og_title: String,
    pub og_description: String,
    /// schema.org `CreativeWork` JSON-LD.
    pub structured_data: serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityMetrics {
    /// 0-100, relative to what the generator has already accepted.
    pub uniqueness_score: f64,
    /// Flesch Reading Ease, clamped to 0-100.
    pub readability_score: f64,
    /// Lexicon polarity in -1..=1.
    pub sentiment_score: f64,
    /// Percentage of tokens that are keyword tokens.
    pub keyword_density: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationInfo {
    pub algorithm_version: String,
    pub content_hash: String,
    pub variation_index: u64,
    pub template_version: String,
    pub seed: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeneratedPage {
    pub slug: String,
    pub dimensions: DimensionTuple,
    pub content: PageContent,
    pub seo: SeoMetadata,
    pub quality: QualityMetrics,
    pub generation: GenerationInfo,
}

impl GeneratedPage {
    pub fn content_hash(&self) -> &str {
        &self.generation.content_hash
    }
}

/// Counters kept by one generator instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GeneratorStats {
    pub attempts: u64,
    pub accepted: u64,
    pub rejected_not_unique: u64,
    pub invalid_combinations: u64,
}
