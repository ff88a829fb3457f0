//! Quality metrics: readability, sentiment and keyword density.

use super::models::PageContent;
use crate::dimensions::words::{NEGATIVE_WORDS, POSITIVE_WORDS};
use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Flattens the page body into prose. Fields that don't end a sentence get a
/// full stop so that list items count as sentences.
pub fn content_text(content: &PageContent) -> String {
    let mut text = String::new();
    let fields = [
        &content.title,
        &content.heading,
        &content.description,
        &content.introduction,
    ]
    .into_iter()
    .chain(content.features.iter())
    .chain(content.examples.iter())
    .chain([
        &content.call_to_action,
        &content.unique_value,
        &content.footer_text,
    ]);

    for field in fields {
        let field = field.trim();
        if field.is_empty() {
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(field);
        if !field.ends_with(['.', '!', '?']) {
            text.push('.');
        }
    }
    text
}

/// Vowel-group syllable estimate. Good enough for English-like text.
fn estimate_syllables(word: &str) -> usize {
    let lower = word.to_lowercase();
    let chars: Vec<char> = lower.chars().filter(|c| c.is_alphabetic()).collect();
    if chars.is_empty() {
        return 0;
    }
    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut count = 0;
    let mut prev_vowel = false;
    for &c in &chars {
        let vowel = is_vowel(c);
        if vowel && !prev_vowel {
            count += 1;
        }
        prev_vowel = vowel;
    }
    // Silent trailing e ("share", "quote")
    if chars.len() > 2 && chars[chars.len() - 1] == 'e' && !is_vowel(chars[chars.len() - 2]) {
        count -= 1;
    }
    count.max(1)
}

/// Flesch Reading Ease clamped to 0-100. Empty text scores 0.
pub fn readability_score(text: &str) -> f64 {
    let words: Vec<&str> = text.unicode_words().collect();
    if words.is_empty() {
        return 0.0;
    }
    let sentences = text
        .unicode_sentences()
        .filter(|s| s.unicode_words().next().is_some())
        .count()
        .max(1);
    let syllables: usize = words.iter().map(|w| estimate_syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentences as f64;
    let syllables_per_word = syllables as f64 / words.len() as f64;
    let score = 206.835 - 1.015 * words_per_sentence - 84.6 * syllables_per_word;
    score.clamp(0.0, 100.0)
}

/// Lexicon polarity: (positive - negative) / (positive + negative), or 0
/// when no lexicon word occurs.
pub fn sentiment_score(text: &str) -> f64 {
    let mut positive = 0usize;
    let mut negative = 0usize;
    for word in text.unicode_words() {
        let word = word.to_lowercase();
        if POSITIVE_WORDS.contains(&word.as_str()) {
            positive += 1;
        } else if NEGATIVE_WORDS.contains(&word.as_str()) {
            negative += 1;
        }
    }
    let total = positive + negative;
    if total == 0 {
        return 0.0;
    }
    (positive as f64 - negative as f64) / total as f64
}

/// Percentage of tokens in `text` that appear in any of the keywords.
pub fn keyword_density(text: &str, keywords: &[String]) -> f64 {
    let keyword_tokens: HashSet<String> = keywords
        .iter()
        .flat_map(|k| k.unicode_words().map(|w| w.to_lowercase()))
        .collect();

    let mut total = 0usize;
    let mut hits = 0usize;
    for word in text.unicode_words() {
        total += 1;
        if keyword_tokens.contains(&word.to_lowercase()) {
            hits += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    hits as f64 / total as f64 * 100.0
}
