//! Filler word lists and the sentiment lexicon.
//!
//! Order matters: the variation engine indexes these lists by seed, so
//! reordering or inserting entries changes every generated page.

pub const ACTION_WORDS: &[&str] = &[
    "Discover",
    "Explore",
    "Share",
    "Create",
    "Unlock",
    "Download",
    "Browse",
    "Find",
    "Grab",
    "Save",
    "Post",
    "Try",
];

pub const QUALIFIERS: &[&str] = &[
    "Best",
    "Top",
    "Trending",
    "Latest",
    "Viral",
    "Unique",
    "Heart-Touching",
    "Fresh",
    "Popular",
    "Handpicked",
    "Exclusive",
    "Creative",
    "Beautiful",
    "Original",
];

pub const INTRO_PHRASES: &[&str] = &[
    "Looking for",
    "Searching for",
    "Need",
    "Want to share",
    "Tired of boring",
    "Hunting for",
    "Ready for",
    "Craving",
];

pub const POSITIVE_WORDS: &[&str] = &[
    "love",
    "best",
    "beautiful",
    "happy",
    "joy",
    "inspire",
    "inspiring",
    "inspirational",
    "success",
    "amazing",
    "perfect",
    "bright",
    "celebrate",
    "smile",
    "fresh",
    "grateful",
    "hope",
    "peaceful",
    "confident",
    "win",
    "unique",
    "wonderful",
    "heart",
    "positive",
    "strong",
    "growth",
    "creative",
    "favourite",
    "easy",
];

pub const NEGATIVE_WORDS: &[&str] = &[
    "sad",
    "breakup",
    "pain",
    "angry",
    "hurt",
    "lonely",
    "alone",
    "cry",
    "tears",
    "broken",
    "boring",
    "tired",
    "fail",
    "loss",
    "regret",
    "bitter",
    "hate",
    "dark",
];
