//! Uniqueness scoring against the hashes a generator has already accepted.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Calculate the Levenshtein (edit) distance between two strings.
pub fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();
    let a_len = a_chars.len();
    let b_len = b_chars.len();

    if a_len == 0 {
        return b_len;
    }
    if b_len == 0 {
        return a_len;
    }

    // Two rows instead of the full matrix
    let mut prev_row: Vec<usize> = (0..=b_len).collect();
    let mut curr_row: Vec<usize> = vec![0; b_len + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr_row[0] = i + 1;

        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };

            curr_row[j + 1] = (prev_row[j + 1] + 1) // deletion
                .min(curr_row[j] + 1) // insertion
                .min(prev_row[j] + cost); // substitution
        }

        std::mem::swap(&mut prev_row, &mut curr_row);
    }

    prev_row[b_len]
}

/// Edit distance scaled to `0.0..=1.0`, where 1.0 means identical.
pub fn normalized_similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein_distance(a, b) as f64 / longest as f64
}

/// How a candidate hash is compared with the registry.
///
/// `HashEditDistance` compares hex digests, which are uniformly random, so
/// it carries no information about the underlying content. Two unrelated
/// SHA-256 digests typically share 10-25% of their characters by edit
/// distance, which puts most candidates well below a threshold of 85 once
/// the registry holds more than a handful of hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    #[default]
    ExactHash,
    HashEditDistance,
}

impl SimilarityMetric {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimilarityMetric::ExactHash => "exact_hash",
            SimilarityMetric::HashEditDistance => "hash_edit_distance",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "exact_hash" => Some(SimilarityMetric::ExactHash),
            "hash_edit_distance" => Some(SimilarityMetric::HashEditDistance),
            _ => None,
        }
    }
}

impl std::fmt::Display for SimilarityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content hashes accepted by one generator. Grows only on acceptance.
#[derive(Debug, Default)]
pub struct UsedHashRegistry {
    hashes: HashSet<String>,
}

impl UsedHashRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, hash: &str) -> bool {
        self.hashes.contains(hash)
    }

    /// Returns false if the hash was already registered.
    pub fn register(&mut self, hash: String) -> bool {
        self.hashes.insert(hash)
    }

    pub fn len(&self) -> usize {
        self.hashes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hashes.is_empty()
    }

    /// Uniqueness of `hash` in `0.0..=100.0`. An exact match is always 0.
    pub fn score(&self, hash: &str, metric: SimilarityMetric) -> f64 {
        if self.contains(hash) {
            return 0.0;
        }
        match metric {
            SimilarityMetric::ExactHash => 100.0,
            SimilarityMetric::HashEditDistance => {
                let max_similarity = self
                    .hashes
                    .iter()
                    .map(|seen| normalized_similarity(hash, seen))
                    .fold(0.0_f64, f64::max);
                100.0 * (1.0 - max_similarity)
            }
        }
    }
}
