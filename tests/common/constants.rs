//! Shared constants for end-to-end tests

#![allow(dead_code)]

use content_forge::dimensions::{Audience, Emotion, Language, Platform, Style, Theme};

// ============================================================================
// Scenario tuple
// ============================================================================

pub const SCENARIO_THEME: Theme = Theme::LoveQuotes;
pub const SCENARIO_LANGUAGE: Language = Language::Hindi;
pub const SCENARIO_STYLE: Style = Style::DarkTheme;
pub const SCENARIO_PLATFORM: Platform = Platform::InstagramReel;
pub const SCENARIO_AUDIENCE: Audience = Audience::Students;
pub const SCENARIO_EMOTION: Emotion = Emotion::Romantic;

pub const SCENARIO_SLUG_PREFIX: &str =
    "love-quotes-hindi-dark-theme-instagram-reel-students-romantic-";

// ============================================================================
// Bulk runs
// ============================================================================

/// Small batches so even short runs flush several times per worker.
pub const TEST_BATCH_SIZE: usize = 16;

pub const TEST_BASE_URL: &str = "https://quotes.test";
