use super::axes::{Audience, Axis, Emotion, Language, Length, Occasion, Platform, Style, Theme};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DimensionError {
    #[error("unknown axis: {0}")]
    UnknownAxis(String),

    #[error("unknown {axis} value: {value}")]
    UnknownValue { axis: Axis, value: String },

    #[error("axis {0} has no values left after filtering")]
    EmptyAxis(Axis),
}

/// A point in the combination space.
///
/// Every field is a closed enum, so a tuple can only hold values that exist
/// in the dimension catalog. Plausibility (e.g. no romance on LinkedIn) is a
/// separate check done by the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DimensionTuple {
    pub theme: Theme,
    pub language: Language,
    pub style: Style,
    pub platform: Platform,
    pub audience: Audience,
    pub emotion: Emotion,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub occasion: Option<Occasion>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<Length>,
}

fn parse_value<T>(axis: Axis, value: &str, parse: fn(&str) -> Option<T>) -> Result<T, DimensionError> {
    parse(value).ok_or_else(|| DimensionError::UnknownValue {
        axis,
        value: value.to_string(),
    })
}

impl DimensionTuple {
    pub fn new(
        theme: Theme,
        language: Language,
        style: Style,
        platform: Platform,
        audience: Audience,
        emotion: Emotion,
    ) -> Self {
        Self {
            theme,
            language,
            style,
            platform,
            audience,
            emotion,
            occasion: None,
            length: None,
        }
    }

    pub fn with_occasion(mut self, occasion: Occasion) -> Self {
        self.occasion = Some(occasion);
        self
    }

    pub fn with_length(mut self, length: Length) -> Self {
        self.length = Some(length);
        self
    }

    /// Builds a tuple from raw catalog strings, rejecting anything outside the axis domains.
    pub fn from_strs(
        theme: &str,
        language: &str,
        style: &str,
        platform: &str,
        audience: &str,
        emotion: &str,
    ) -> Result<Self, DimensionError> {
        Ok(Self::new(
            parse_value(Axis::Theme, theme, Theme::parse)?,
            parse_value(Axis::Language, language, Language::parse)?,
            parse_value(Axis::Style, style, Style::parse)?,
            parse_value(Axis::Platform, platform, Platform::parse)?,
            parse_value(Axis::Audience, audience, Audience::parse)?,
            parse_value(Axis::Emotion, emotion, Emotion::parse)?,
        ))
    }

    /// Sets an optional axis from its raw string value.
    pub fn set_optional(&mut self, axis: Axis, value: &str) -> Result<(), DimensionError> {
        match axis {
            Axis::Occasion => {
                self.occasion = Some(parse_value(axis, value, Occasion::parse)?);
            }
            Axis::Length => {
                self.length = Some(parse_value(axis, value, Length::parse)?);
            }
            other => return Err(DimensionError::UnknownAxis(other.to_string())),
        }
        Ok(())
    }

    /// Raw values in seed order: the six required axes, then occasion and length
    /// (empty when absent).
    pub fn seed_values(&self) -> [&'static str; 8] {
        [
            self.theme.as_str(),
            self.language.as_str(),
            self.style.as_str(),
            self.platform.as_str(),
            self.audience.as_str(),
            self.emotion.as_str(),
            self.occasion.map(|o| o.as_str()).unwrap_or(""),
            self.length.map(|l| l.as_str()).unwrap_or(""),
        ]
    }

    /// Raw values that are present, in axis order. Used for slugs.
    pub fn present_values(&self) -> Vec<&'static str> {
        self.seed_values()
            .into_iter()
            .filter(|value| !value.is_empty())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_strs_accepts_catalog_values() {
        let tuple = DimensionTuple::from_strs(
            "love_quotes",
            "hindi",
            "dark_theme",
            "instagram_reel",
            "students",
            "romantic",
        )
        .unwrap();
        assert_eq!(tuple.theme, Theme::LoveQuotes);
        assert_eq!(tuple.platform, Platform::InstagramReel);
        assert!(tuple.occasion.is_none());
    }

    #[test]
    fn test_from_strs_rejects_typos() {
        let err = DimensionTuple::from_strs(
            "love_quote",
            "hindi",
            "dark_theme",
            "instagram_reel",
            "students",
            "romantic",
        )
        .unwrap_err();
        assert_eq!(
            err,
            DimensionError::UnknownValue {
                axis: Axis::Theme,
                value: "love_quote".to_string()
            }
        );
        assert_eq!(err.to_string(), "unknown theme value: love_quote");
    }

    #[test]
    fn test_set_optional() {
        let mut tuple = DimensionTuple::new(
            Theme::BirthdayWishes,
            Language::English,
            Style::Minimal,
            Platform::WhatsappStatus,
            Audience::Everyone,
            Emotion::Happy,
        );
        tuple.set_optional(Axis::Occasion, "birthday").unwrap();
        tuple.set_optional(Axis::Length, "long").unwrap();
        assert_eq!(tuple.occasion, Some(Occasion::Birthday));
        assert_eq!(tuple.length, Some(Length::Long));
        assert!(tuple.set_optional(Axis::Theme, "love_quotes").is_err());
        assert!(tuple.set_optional(Axis::Length, "huge").is_err());
    }

    #[test]
    fn test_seed_values_are_stable() {
        let tuple = DimensionTuple::new(
            Theme::LoveQuotes,
            Language::Hindi,
            Style::DarkTheme,
            Platform::InstagramReel,
            Audience::Students,
            Emotion::Romantic,
        )
        .with_length(Length::Short);
        assert_eq!(
            tuple.seed_values(),
            [
                "love_quotes",
                "hindi",
                "dark_theme",
                "instagram_reel",
                "students",
                "romantic",
                "",
                "short"
            ]
        );
        assert_eq!(tuple.present_values().len(), 7);
    }

    #[test]
    fn test_serialization_skips_missing_optionals() {
        let tuple = DimensionTuple::new(
            Theme::LoveQuotes,
            Language::Hindi,
            Style::DarkTheme,
            Platform::InstagramReel,
            Audience::Students,
            Emotion::Romantic,
        );
        let json = serde_json::to_value(tuple).unwrap();
        assert!(json.get("occasion").is_none());
        assert_eq!(json["theme"], "love_quotes");
        let back: DimensionTuple = serde_json::from_value(json).unwrap();
        assert_eq!(back, tuple);
    }
}
