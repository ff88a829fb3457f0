//! Enumeration of the combination space.
//!
//! A linear index maps onto a tuple through a mixed-radix decomposition:
//! theme is the least significant digit, followed by language, style,
//! platform, audience and emotion. Occasion and length are embellishments
//! that simply cycle with the index.

use super::axes::{Audience, Axis, Emotion, Language, Length, Occasion, Platform, Style, Theme};
use super::tuple::{DimensionError, DimensionTuple};

#[derive(Debug, Clone)]
pub struct CombinationSpace {
    themes: Vec<Theme>,
    languages: Vec<Language>,
    styles: Vec<Style>,
    platforms: Vec<Platform>,
    audiences: Vec<Audience>,
    emotions: Vec<Emotion>,
    occasions: Vec<Occasion>,
    lengths: Vec<Length>,
}

impl CombinationSpace {
    /// The whole catalog.
    pub fn full() -> Self {
        Self {
            themes: Theme::ALL.to_vec(),
            languages: Language::ALL.to_vec(),
            styles: Style::ALL.to_vec(),
            platforms: Platform::ALL.to_vec(),
            audiences: Audience::ALL.to_vec(),
            emotions: Emotion::ALL.to_vec(),
            occasions: Occasion::ALL.to_vec(),
            lengths: Length::ALL.to_vec(),
        }
    }

    /// The catalog narrowed to the given themes and/or languages.
    ///
    /// Filters keep catalog order and drop repeated values so the index
    /// mapping stays a bijection.
    pub fn restricted(
        themes: Option<&[Theme]>,
        languages: Option<&[Language]>,
    ) -> Result<Self, DimensionError> {
        let mut space = Self::full();
        if let Some(themes) = themes {
            space.themes.retain(|t| themes.contains(t));
            if space.themes.is_empty() {
                return Err(DimensionError::EmptyAxis(Axis::Theme));
            }
        }
        if let Some(languages) = languages {
            space.languages.retain(|l| languages.contains(l));
            if space.languages.is_empty() {
                return Err(DimensionError::EmptyAxis(Axis::Language));
            }
        }
        Ok(space)
    }

    fn radices(&self) -> [usize; 6] {
        [
            self.themes.len(),
            self.languages.len(),
            self.styles.len(),
            self.platforms.len(),
            self.audiences.len(),
            self.emotions.len(),
        ]
    }

    /// Number of distinct combinations over the six combinatorial axes.
    pub fn len(&self) -> usize {
        self.radices().iter().product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn cardinality(&self, axis: Axis) -> usize {
        match axis {
            Axis::Theme => self.themes.len(),
            Axis::Language => self.languages.len(),
            Axis::Style => self.styles.len(),
            Axis::Platform => self.platforms.len(),
            Axis::Audience => self.audiences.len(),
            Axis::Emotion => self.emotions.len(),
            Axis::Occasion => self.occasions.len(),
            Axis::Length => self.lengths.len(),
        }
    }

    /// Maps a linear index to its tuple. Indices wrap around the space size.
    pub fn tuple_at(&self, index: usize) -> DimensionTuple {
        let [n_theme, n_language, n_style, n_platform, n_audience, n_emotion] = self.radices();
        let mut rest = index % self.len().max(1);

        let theme = self.themes[rest % n_theme];
        rest /= n_theme;
        let language = self.languages[rest % n_language];
        rest /= n_language;
        let style = self.styles[rest % n_style];
        rest /= n_style;
        let platform = self.platforms[rest % n_platform];
        rest /= n_platform;
        let audience = self.audiences[rest % n_audience];
        rest /= n_audience;
        let emotion = self.emotions[rest % n_emotion];

        DimensionTuple::new(theme, language, style, platform, audience, emotion)
            .with_occasion(self.occasions[index % self.occasions.len()])
            .with_length(self.lengths[index % self.lengths.len()])
    }
}
