//! Template pools.
//!
//! A library is built from a [`TemplatePatterns`] pack, either the one
//! compiled into the binary or a TOML file on disk. Construction parses
//! every pattern, so a bad pack is rejected before any page is generated.

use super::template::{Placeholder, Template, TemplateError};
use crate::dimensions::Length;
use anyhow::{Context, Result};
use lazy_static::lazy_static;
use serde::Deserialize;
use std::path::Path;
use std::sync::Arc;

const BUILTIN_TEMPLATES: &str = include_str!("builtin_templates.toml");

lazy_static! {
    static ref BUILTIN: Arc<TemplateLibrary> = Arc::new(
        TemplatePatterns::from_toml_str(BUILTIN_TEMPLATES)
            .and_then(|patterns| Ok(TemplateLibrary::from_patterns(patterns)?))
            .expect("built-in template pack is valid")
    );
}

fn default_min_features() -> usize {
    4
}

fn default_max_features() -> usize {
    6
}

/// Raw pattern pools as they appear in a template pack.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePatterns {
    pub version: String,
    #[serde(default = "default_min_features")]
    pub min_features: usize,
    #[serde(default = "default_max_features")]
    pub max_features: usize,
    pub titles: Vec<String>,
    pub headings: Vec<String>,
    pub description_intros: Vec<String>,
    pub description_middles: Vec<String>,
    #[serde(default)]
    pub occasion_lines: Vec<String>,
    pub description_endings: Vec<String>,
    pub introductions: Vec<String>,
    pub features: Vec<String>,
    pub examples: Vec<String>,
    pub calls_to_action: Vec<String>,
    pub unique_values: Vec<String>,
    pub footers: Vec<String>,
}

impl TemplatePatterns {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse template pack")
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read template pack: {:?}", path))?;
        Self::from_toml_str(&content).with_context(|| format!("Invalid template pack: {:?}", path))
    }
}

/// Parsed, validated template pools.
#[derive(Debug, Clone)]
pub struct TemplateLibrary {
    pub version: String,
    pub min_features: usize,
    pub max_features: usize,
    pub titles: Vec<Template>,
    pub headings: Vec<Template>,
    pub description_intros: Vec<Template>,
    pub description_middles: Vec<Template>,
    pub occasion_lines: Vec<Template>,
    pub description_endings: Vec<Template>,
    pub introductions: Vec<Template>,
    pub features: Vec<Template>,
    pub examples: Vec<Template>,
    pub calls_to_action: Vec<Template>,
    pub unique_values: Vec<Template>,
    pub footers: Vec<Template>,
}

/// Parses one pool. Optional-axis placeholders are only allowed where the
/// generator guarantees the value exists.
fn parse_pool(
    name: &'static str,
    patterns: &[String],
    allows_optional: bool,
    required: &[Placeholder],
) -> Result<Vec<Template>, TemplateError> {
    if patterns.is_empty() {
        return Err(TemplateError::EmptyPool(name));
    }
    let mut pool = Vec::with_capacity(patterns.len());
    for pattern in patterns {
        let template = Template::parse(pattern)?;
        if !allows_optional {
            if let Some(placeholder) = template
                .placeholders()
                .find(|p| matches!(p, Placeholder::Occasion | Placeholder::Length))
            {
                return Err(TemplateError::OptionalPlaceholder {
                    pool: name,
                    placeholder: placeholder.as_str(),
                });
            }
        }
        for placeholder in required {
            if !template.uses(*placeholder) {
                return Err(TemplateError::RequiredPlaceholder {
                    pool: name,
                    placeholder: placeholder.as_str(),
                    pattern: pattern.clone(),
                });
            }
        }
        pool.push(template);
    }
    Ok(pool)
}

impl TemplateLibrary {
    /// The pack compiled into the binary. Parsed once per process.
    pub fn builtin() -> Arc<TemplateLibrary> {
        BUILTIN.clone()
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let patterns = TemplatePatterns::load(path)?;
        Self::from_patterns(patterns)
            .with_context(|| format!("Template pack {:?} failed validation", path))
    }

    pub fn from_patterns(patterns: TemplatePatterns) -> Result<Self, TemplateError> {
        let features = parse_pool("features", &patterns.features, false, &[])?;
        if patterns.min_features == 0
            || patterns.min_features > patterns.max_features
            || patterns.max_features > features.len()
        {
            return Err(TemplateError::FeatureBounds {
                min: patterns.min_features,
                max: patterns.max_features,
                available: features.len(),
            });
        }

        // Occasion lines are optional as a pool; when present they must name the occasion.
        let occasion_lines = if patterns.occasion_lines.is_empty() {
            Vec::new()
        } else {
            parse_pool(
                "occasion_lines",
                &patterns.occasion_lines,
                true,
                &[Placeholder::Occasion],
            )?
        };

        Ok(Self {
            version: patterns.version,
            min_features: patterns.min_features,
            max_features: patterns.max_features,
            titles: parse_pool("titles", &patterns.titles, false, &[])?,
            headings: parse_pool("headings", &patterns.headings, false, &[])?,
            description_intros: parse_pool(
                "description_intros",
                &patterns.description_intros,
                false,
                &[Placeholder::Theme, Placeholder::Language],
            )?,
            description_middles: parse_pool(
                "description_middles",
                &patterns.description_middles,
                false,
                &[],
            )?,
            occasion_lines,
            description_endings: parse_pool(
                "description_endings",
                &patterns.description_endings,
                false,
                &[],
            )?,
            introductions: parse_pool("introductions", &patterns.introductions, false, &[])?,
            features,
            examples: parse_pool("examples", &patterns.examples, false, &[])?,
            calls_to_action: parse_pool("calls_to_action", &patterns.calls_to_action, false, &[])?,
            unique_values: parse_pool("unique_values", &patterns.unique_values, false, &[])?,
            footers: parse_pool("footers", &patterns.footers, false, &[])?,
        })
    }

    /// How many examples a page of the given length shows.
    pub fn example_count(length: Option<Length>) -> usize {
        match length {
            Some(Length::Short) => 2,
            Some(Length::Medium) | None => 3,
            Some(Length::Long) => 4,
        }
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::single_choice_patterns;
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_builtin_pack_is_valid() {
        let library = TemplateLibrary::builtin();
        assert_eq!(library.version, "builtin-3");
        assert_eq!(library.min_features, 4);
        assert_eq!(library.max_features, 6);
        assert!(library.features.len() >= library.max_features);
        assert!(!library.occasion_lines.is_empty());
        for intro in &library.description_intros {
            assert!(intro.uses(Placeholder::Theme));
            assert!(intro.uses(Placeholder::Language));
        }
    }

    #[test]
    fn test_builtin_is_shared() {
        let a = TemplateLibrary::builtin();
        let b = TemplateLibrary::builtin();
        assert!(Arc::ptr_eq(&a, &b));
    }

    #[test]
    fn test_empty_pool_is_rejected() {
        let mut patterns = single_choice_patterns();
        patterns.footers.clear();
        assert_eq!(
            TemplateLibrary::from_patterns(patterns).unwrap_err(),
            TemplateError::EmptyPool("footers")
        );
    }

    #[test]
    fn test_feature_bounds_must_fit_pool() {
        let mut patterns = single_choice_patterns();
        patterns.max_features = 3;
        assert!(matches!(
            TemplateLibrary::from_patterns(patterns),
            Err(TemplateError::FeatureBounds { available: 1, .. })
        ));
    }

    #[test]
    fn test_occasion_only_allowed_in_occasion_lines() {
        let mut patterns = single_choice_patterns();
        patterns.titles = vec!["{theme} for {occasion}".to_string()];
        assert!(matches!(
            TemplateLibrary::from_patterns(patterns),
            Err(TemplateError::OptionalPlaceholder {
                pool: "titles",
                placeholder: "occasion"
            })
        ));

        let mut patterns = single_choice_patterns();
        patterns.occasion_lines = vec!["Happy {occasion}!".to_string()];
        let library = TemplateLibrary::from_patterns(patterns).unwrap();
        assert_eq!(library.occasion_lines.len(), 1);
    }

    #[test]
    fn test_description_intro_must_name_theme_and_language() {
        let mut patterns = single_choice_patterns();
        patterns.description_intros = vec!["Just {theme}.".to_string()];
        assert!(matches!(
            TemplateLibrary::from_patterns(patterns),
            Err(TemplateError::RequiredPlaceholder {
                pool: "description_intros",
                placeholder: "language",
                ..
            })
        ));
    }

    #[test]
    fn test_load_pack_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "{}", BUILTIN_TEMPLATES.replace("builtin-3", "custom-1")).unwrap();

        let library = TemplateLibrary::load(file.path()).unwrap();
        assert_eq!(library.version, "custom-1");
        assert_eq!(library.titles.len(), TemplateLibrary::builtin().titles.len());
    }

    #[test]
    fn test_load_reports_bad_placeholder() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "{}",
            BUILTIN_TEMPLATES.replace("{qualifier} {theme} in {language} for {platform}", "{colour}")
        )
        .unwrap();

        let err = TemplateLibrary::load(file.path()).unwrap_err();
        assert!(format!("{:#}", err).contains("colour"));
    }

    #[test]
    fn test_example_count_follows_length() {
        assert_eq!(TemplateLibrary::example_count(Some(Length::Short)), 2);
        assert_eq!(TemplateLibrary::example_count(Some(Length::Medium)), 3);
        assert_eq!(TemplateLibrary::example_count(Some(Length::Long)), 4);
        assert_eq!(TemplateLibrary::example_count(None), 3);
    }
}
