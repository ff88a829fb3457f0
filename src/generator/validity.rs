//! Plausibility rules for dimension tuples.
//!
//! Rules are checked in table order and the first match names the rejection.

use crate::dimensions::{Audience, DimensionTuple, Emotion, Platform, Theme};

const ROMANTIC_THEMES: &[Theme] = &[Theme::LoveQuotes, Theme::RomanticShayari];

const NEGATIVE_THEMES: &[Theme] = &[Theme::SadQuotes, Theme::BreakupStatus];

const CELEBRATORY_THEMES: &[Theme] = &[
    Theme::BirthdayWishes,
    Theme::FestivalGreetings,
    Theme::GoodMorning,
];

/// Themes that make sense on a professional network.
pub const PROFESSIONAL_THEMES: &[Theme] = &[
    Theme::MotivationalQuotes,
    Theme::SuccessQuotes,
    Theme::LifeLessons,
    Theme::LeadershipQuotes,
    Theme::CareerAdvice,
    Theme::RealEstateTips,
];

const PROFESSIONAL_PLATFORMS: &[Platform] = &[Platform::LinkedinPost];

const MINOR_AUDIENCES: &[Audience] = &[Audience::Kids];

fn is_professional(tuple: &DimensionTuple) -> bool {
    PROFESSIONAL_PLATFORMS.contains(&tuple.platform)
}

fn is_minor(tuple: &DimensionTuple) -> bool {
    MINOR_AUDIENCES.contains(&tuple.audience)
}

pub struct ValidityRule {
    pub name: &'static str,
    violates: fn(&DimensionTuple) -> bool,
}

pub const RULES: &[ValidityRule] = &[
    ValidityRule {
        name: "romantic_or_attitude_theme_on_professional_platform",
        violates: |t| {
            is_professional(t)
                && (ROMANTIC_THEMES.contains(&t.theme) || t.theme == Theme::AttitudeStatus)
        },
    },
    ValidityRule {
        name: "theme_not_allowed_on_professional_platform",
        violates: |t| is_professional(t) && !PROFESSIONAL_THEMES.contains(&t.theme),
    },
    ValidityRule {
        name: "negative_theme_for_minors",
        violates: |t| is_minor(t) && NEGATIVE_THEMES.contains(&t.theme),
    },
    ValidityRule {
        name: "romance_for_minors",
        violates: |t| {
            is_minor(t) && (ROMANTIC_THEMES.contains(&t.theme) || t.emotion == Emotion::Romantic)
        },
    },
    ValidityRule {
        name: "celebration_with_negative_emotion",
        violates: |t| {
            CELEBRATORY_THEMES.contains(&t.theme)
                && matches!(t.emotion, Emotion::Sad | Emotion::Angry)
        },
    },
];

/// The first rule the tuple breaks, if any.
pub fn check_combination(tuple: &DimensionTuple) -> Option<&'static str> {
    RULES
        .iter()
        .find(|rule| (rule.violates)(tuple))
        .map(|rule| rule.name)
}

pub fn is_valid_combination(tuple: &DimensionTuple) -> bool {
    check_combination(tuple).is_none()
}
