//! Typed template parsing and rendering.
//!
//! Patterns are parsed once into literal and placeholder segments, so a
//! misspelled placeholder fails when the library is built instead of leaking
//! `{braces}` into a published page.

use super::seed::{Seed, SeedSlot};
use crate::dimensions::{words, DimensionTuple};
use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid");
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("unknown placeholder {{{name}}} in pattern \"{pattern}\"")]
    UnknownPlaceholder { pattern: String, name: String },

    #[error("unbalanced brace in pattern \"{0}\"")]
    Malformed(String),

    #[error("no value for {{{placeholder}}} in pattern \"{pattern}\"")]
    MissingValue {
        pattern: String,
        placeholder: &'static str,
    },

    #[error("template pool '{0}' is empty")]
    EmptyPool(&'static str),

    #[error("pool '{pool}' may not use the optional placeholder {{{placeholder}}}")]
    OptionalPlaceholder {
        pool: &'static str,
        placeholder: &'static str,
    },

    #[error("pattern \"{pattern}\" in pool '{pool}' must use {{{placeholder}}}")]
    RequiredPlaceholder {
        pool: &'static str,
        placeholder: &'static str,
        pattern: String,
    },

    #[error("feature bounds {min}..={max} do not fit a pool of {available}")]
    FeatureBounds {
        min: usize,
        max: usize,
        available: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    Theme,
    Language,
    Style,
    Platform,
    Audience,
    Emotion,
    Occasion,
    Length,
    Action,
    Qualifier,
    Intro,
}

impl Placeholder {
    pub fn as_str(&self) -> &'static str {
        match self {
            Placeholder::Theme => "theme",
            Placeholder::Language => "language",
            Placeholder::Style => "style",
            Placeholder::Platform => "platform",
            Placeholder::Audience => "audience",
            Placeholder::Emotion => "emotion",
            Placeholder::Occasion => "occasion",
            Placeholder::Length => "length",
            Placeholder::Action => "action",
            Placeholder::Qualifier => "qualifier",
            Placeholder::Intro => "intro",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "theme" => Some(Placeholder::Theme),
            "language" => Some(Placeholder::Language),
            "style" => Some(Placeholder::Style),
            "platform" => Some(Placeholder::Platform),
            "audience" => Some(Placeholder::Audience),
            "emotion" => Some(Placeholder::Emotion),
            "occasion" => Some(Placeholder::Occasion),
            "length" => Some(Placeholder::Length),
            "action" => Some(Placeholder::Action),
            "qualifier" => Some(Placeholder::Qualifier),
            "intro" => Some(Placeholder::Intro),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Slot(Placeholder),
}

/// A parsed pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Template {
    pattern: String,
    segments: Vec<Segment>,
}

fn check_literal(pattern: &str, literal: &str) -> Result<(), TemplateError> {
    if literal.contains('{') || literal.contains('}') {
        return Err(TemplateError::Malformed(pattern.to_string()));
    }
    Ok(())
}

impl Template {
    pub fn parse(pattern: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut last_end = 0;

        for captures in PLACEHOLDER_RE.captures_iter(pattern) {
            let (whole, name) = match (captures.get(0), captures.get(1)) {
                (Some(whole), Some(name)) => (whole, name.as_str()),
                _ => continue,
            };
            let literal = &pattern[last_end..whole.start()];
            check_literal(pattern, literal)?;
            if !literal.is_empty() {
                segments.push(Segment::Literal(literal.to_string()));
            }
            let placeholder =
                Placeholder::parse(name).ok_or_else(|| TemplateError::UnknownPlaceholder {
                    pattern: pattern.to_string(),
                    name: name.to_string(),
                })?;
            segments.push(Segment::Slot(placeholder));
            last_end = whole.end();
        }

        let tail = &pattern[last_end..];
        check_literal(pattern, tail)?;
        if !tail.is_empty() {
            segments.push(Segment::Literal(tail.to_string()));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn placeholders(&self) -> impl Iterator<Item = Placeholder> + '_ {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Slot(placeholder) => Some(*placeholder),
            Segment::Literal(_) => None,
        })
    }

    pub fn uses(&self, placeholder: Placeholder) -> bool {
        self.placeholders().any(|p| p == placeholder)
    }

    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.pattern.len() + 32);
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Slot(placeholder) => {
                    let value =
                        ctx.resolve(*placeholder)
                            .ok_or_else(|| TemplateError::MissingValue {
                                pattern: self.pattern.clone(),
                                placeholder: placeholder.as_str(),
                            })?;
                    out.push_str(value);
                }
            }
        }
        Ok(out)
    }
}

/// Resolved values for every placeholder of one page.
///
/// Filler words are chosen once per page from their own seed slots.
#[derive(Debug, Clone)]
pub struct TemplateContext {
    theme: String,
    language: String,
    style: String,
    platform: String,
    audience: String,
    emotion: String,
    occasion: Option<String>,
    length: Option<String>,
    action: &'static str,
    qualifier: &'static str,
    intro: &'static str,
}

impl TemplateContext {
    pub fn new(tuple: &DimensionTuple, seed: &Seed) -> Self {
        Self {
            theme: tuple.theme.humanize(),
            language: tuple.language.humanize(),
            style: tuple.style.humanize(),
            platform: tuple.platform.humanize(),
            audience: tuple.audience.humanize(),
            emotion: tuple.emotion.humanize(),
            occasion: tuple.occasion.map(|o| o.humanize()),
            length: tuple.length.map(|l| l.humanize()),
            action: *seed.pick(SeedSlot::Action, words::ACTION_WORDS),
            qualifier: *seed.pick(SeedSlot::Qualifier, words::QUALIFIERS),
            intro: *seed.pick(SeedSlot::Intro, words::INTRO_PHRASES),
        }
    }

    pub fn resolve(&self, placeholder: Placeholder) -> Option<&str> {
        match placeholder {
            Placeholder::Theme => Some(&self.theme),
            Placeholder::Language => Some(&self.language),
            Placeholder::Style => Some(&self.style),
            Placeholder::Platform => Some(&self.platform),
            Placeholder::Audience => Some(&self.audience),
            Placeholder::Emotion => Some(&self.emotion),
            Placeholder::Occasion => self.occasion.as_deref(),
            Placeholder::Length => self.length.as_deref(),
            Placeholder::Action => Some(self.action),
            Placeholder::Qualifier => Some(self.qualifier),
            Placeholder::Intro => Some(self.intro),
        }
    }
}

/// Parses and renders a single pattern for a tuple and seed.
pub fn fill_template(
    pattern: &str,
    tuple: &DimensionTuple,
    seed: &Seed,
) -> Result<String, TemplateError> {
    Template::parse(pattern)?.render(&TemplateContext::new(tuple, seed))
}
