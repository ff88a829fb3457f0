//! Page assembly from a seed: body, slug, SEO block and content hash.

use super::models::{PageContent, SeoMetadata};
use crate::dimensions::DimensionTuple;
use crate::variation::{
    sha256_hex, Seed, SeedSlot, Template, TemplateContext, TemplateError, TemplateLibrary,
};
use serde::Serialize;
use serde_json::json;

pub const META_TITLE_MAX: usize = 60;
pub const META_DESCRIPTION_MAX: usize = 160;

fn render_one(
    seed: &Seed,
    slot: SeedSlot,
    pool: &[Template],
    ctx: &TemplateContext,
) -> Result<String, TemplateError> {
    seed.pick(slot, pool).render(ctx)
}

fn render_many(
    seed: &Seed,
    slot: SeedSlot,
    pool: &[Template],
    count: usize,
    ctx: &TemplateContext,
) -> Result<Vec<String>, TemplateError> {
    seed.pick_distinct(slot, pool, count)
        .into_iter()
        .map(|template| template.render(ctx))
        .collect()
}

/// Builds every content field from its own seed slot.
pub fn build_content(
    library: &TemplateLibrary,
    tuple: &DimensionTuple,
    seed: &Seed,
) -> Result<PageContent, TemplateError> {
    let ctx = TemplateContext::new(tuple, seed);

    let mut description = vec![
        render_one(seed, SeedSlot::DescriptionIntro, &library.description_intros, &ctx)?,
        render_one(seed, SeedSlot::DescriptionMiddle, &library.description_middles, &ctx)?,
    ];
    if tuple.occasion.is_some() && !library.occasion_lines.is_empty() {
        description.push(render_one(
            seed,
            SeedSlot::OccasionLine,
            &library.occasion_lines,
            &ctx,
        )?);
    }
    description.push(render_one(
        seed,
        SeedSlot::DescriptionEnding,
        &library.description_endings,
        &ctx,
    )?);

    let feature_count = seed.range(
        SeedSlot::FeatureCount,
        library.min_features,
        library.max_features,
    );
    let example_count = TemplateLibrary::example_count(tuple.length);

    Ok(PageContent {
        title: render_one(seed, SeedSlot::Title, &library.titles, &ctx)?,
        heading: render_one(seed, SeedSlot::Heading, &library.headings, &ctx)?,
        description: description.join(" "),
        introduction: render_one(seed, SeedSlot::Introduction, &library.introductions, &ctx)?,
        features: render_many(seed, SeedSlot::Features, &library.features, feature_count, &ctx)?,
        examples: render_many(seed, SeedSlot::Examples, &library.examples, example_count, &ctx)?,
        call_to_action: render_one(seed, SeedSlot::CallToAction, &library.calls_to_action, &ctx)?,
        footer_text: render_one(seed, SeedSlot::Footer, &library.footers, &ctx)?,
        unique_value: render_one(seed, SeedSlot::UniqueValue, &library.unique_values, &ctx)?,
    })
}

#[derive(Serialize)]
struct HashedFields<'a> {
    content: &'a PageContent,
    dimensions: &'a DimensionTuple,
}

/// SHA-256 of the JSON form of `{content, dimensions}`.
pub fn content_hash(
    content: &PageContent,
    dimensions: &DimensionTuple,
) -> Result<String, serde_json::Error> {
    let bytes = serde_json::to_vec(&HashedFields {
        content,
        dimensions,
    })?;
    Ok(sha256_hex(&bytes))
}

/// Hyphenated dimension values in axis order plus the short seed.
pub fn build_slug(tuple: &DimensionTuple, seed: &Seed) -> String {
    let mut parts: Vec<String> = tuple
        .present_values()
        .into_iter()
        .map(|value| value.replace('_', "-"))
        .collect();
    parts.push(seed.short().to_string());
    parts.join("-")
}

/// Cuts `text` to at most `max` characters, ending in "..." when shortened.
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let kept: String = text.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

fn keywords(tuple: &DimensionTuple) -> Vec<String> {
    let theme = tuple.theme.humanize().to_lowercase();
    let language = tuple.language.humanize().to_lowercase();
    let mut keywords = vec![
        theme.clone(),
        format!("{} in {}", theme, language),
        format!("{} {}", language, theme),
        format!("{} for {}", theme, tuple.platform.humanize().to_lowercase()),
        format!("{} {}", tuple.emotion.humanize().to_lowercase(), theme),
        format!("{} {}", tuple.style.humanize().to_lowercase(), theme),
        format!("{} for {}", theme, tuple.audience.humanize().to_lowercase()),
    ];
    if let Some(occasion) = tuple.occasion {
        keywords.push(format!("{} {}", occasion.humanize().to_lowercase(), theme));
    }
    keywords
}

pub fn build_seo(
    content: &PageContent,
    tuple: &DimensionTuple,
    slug: &str,
    base_url: &str,
) -> SeoMetadata {
    let meta_title = truncate_chars(&content.title, META_TITLE_MAX);
    let meta_description = truncate_chars(&content.description, META_DESCRIPTION_MAX);
    let keywords = keywords(tuple);
    let canonical_url = format!("{}/{}", base_url.trim_end_matches('/'), slug);

    let structured_data = json!({
        "@context": "https://schema.org",
        "@type": "CreativeWork",
        "name": meta_title,
        "headline": content.heading,
        "description": meta_description,
        "inLanguage": tuple.language.humanize(),
        "genre": tuple.theme.humanize(),
        "keywords": keywords.join(", "),
        "url": canonical_url,
        "audience": {
            "@type": "Audience",
            "audienceType": tuple.audience.humanize(),
        },
    });

    SeoMetadata {
        og_title: meta_title.clone(),
        og_description: meta_description.clone(),
        meta_title,
        meta_description,
        keywords,
        canonical_url,
        structured_data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dimensions::{Audience, Emotion, Language, Length, Occasion, Platform, Style, Theme};

    fn tuple() -> DimensionTuple {
        DimensionTuple::new(
            Theme::LoveQuotes,
            Language::Hindi,
            Style::DarkTheme,
            Platform::InstagramReel,
            Audience::Students,
            Emotion::Romantic,
        )
    }

    #[test]
    fn test_build_content_is_deterministic() {
        let library = TemplateLibrary::builtin();
        let seed = Seed::derive(&tuple(), 4);
        let a = build_content(&library, &tuple(), &seed).unwrap();
        let b = build_content(&library, &tuple(), &seed).unwrap();
        assert_eq!(a, b);
        assert_eq!(
            content_hash(&a, &tuple()).unwrap(),
            content_hash(&b, &tuple()).unwrap()
        );
    }

    #[test]
    fn test_build_content_shape() {
        let library = TemplateLibrary::builtin();
        for variation in 0..30 {
            let t = tuple().with_length(Length::Long);
            let seed = Seed::derive(&t, variation);
            let content = build_content(&library, &t, &seed).unwrap();
            assert!((4..=6).contains(&content.features.len()));
            assert_eq!(content.examples.len(), 4);
            assert!(content.description.contains("Love Quotes"));
            assert!(content.description.contains("Hindi"));
            for text in [&content.title, &content.description, &content.footer_text] {
                assert!(!text.contains('{') && !text.contains('}'));
            }
        }
    }

    #[test]
    fn test_occasion_line_only_with_occasion() {
        let library = TemplateLibrary::builtin();
        let with = tuple().with_occasion(Occasion::Diwali);
        let seed = Seed::derive(&with, 0);
        let content = build_content(&library, &with, &seed).unwrap();
        assert!(content.description.contains("Diwali"));

        let seed = Seed::derive(&tuple(), 0);
        let content = build_content(&library, &tuple(), &seed).unwrap();
        assert!(!content.description.contains("Diwali"));
    }

    #[test]
    fn test_hash_covers_dimensions() {
        let library = TemplateLibrary::builtin();
        let seed = Seed::derive(&tuple(), 0);
        let content = build_content(&library, &tuple(), &seed).unwrap();
        let other = tuple().with_length(Length::Short);
        assert_ne!(
            content_hash(&content, &tuple()).unwrap(),
            content_hash(&content, &other).unwrap()
        );
        assert_eq!(content_hash(&content, &tuple()).unwrap().len(), 64);
    }

    #[test]
    fn test_slug_format() {
        let seed = Seed::derive(&tuple(), 0);
        let slug = build_slug(&tuple(), &seed);
        assert_eq!(
            slug,
            format!(
                "love-quotes-hindi-dark-theme-instagram-reel-students-romantic-{}",
                seed.short()
            )
        );

        let with = tuple().with_occasion(Occasion::NewYear).with_length(Length::Short);
        let slug = build_slug(&with, &Seed::derive(&with, 0));
        assert!(slug.contains("-romantic-new-year-short-"));
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("short", 60), "short");
        let long = "word ".repeat(40);
        let cut = truncate_chars(&long, 60);
        assert!(cut.chars().count() <= 60);
        assert!(cut.ends_with("..."));
    }

    #[test]
    fn test_seo_limits_and_canonical_url() {
        let library = TemplateLibrary::builtin();
        let seed = Seed::derive(&tuple(), 2);
        let content = build_content(&library, &tuple(), &seed).unwrap();
        let slug = build_slug(&tuple(), &seed);
        let seo = build_seo(&content, &tuple(), &slug, "https://example.com/");

        assert!(seo.meta_title.chars().count() <= META_TITLE_MAX);
        assert!(seo.meta_description.chars().count() <= META_DESCRIPTION_MAX);
        assert_eq!(seo.canonical_url, format!("https://example.com/{}", slug));
        assert_eq!(seo.structured_data["@type"], "CreativeWork");
        assert_eq!(seo.structured_data["inLanguage"], "Hindi");
        assert!(seo.keywords.contains(&"love quotes in hindi".to_string()));
    }
}
