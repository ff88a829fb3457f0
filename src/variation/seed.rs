//! Deterministic seeds and seed-driven selection.

use crate::dimensions::DimensionTuple;
use sha2::{Digest, Sha256};

/// Width of the seed window each slot reads.
const SLICE_LEN: usize = 8;

/// A template slot. Each slot reads its own window of the seed so that the
/// title, the CTA and the filler words don't all land on the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeedSlot {
    Title,
    Action,
    Heading,
    Qualifier,
    DescriptionIntro,
    Intro,
    DescriptionMiddle,
    OccasionLine,
    DescriptionEnding,
    Introduction,
    Features,
    FeatureCount,
    Examples,
    CallToAction,
    UniqueValue,
    Footer,
}

impl SeedSlot {
    fn offset(&self) -> usize {
        match self {
            SeedSlot::Title => 0,
            SeedSlot::Action => 3,
            SeedSlot::Heading => 6,
            SeedSlot::Qualifier => 9,
            SeedSlot::DescriptionIntro => 12,
            SeedSlot::Intro => 15,
            SeedSlot::DescriptionMiddle => 18,
            SeedSlot::OccasionLine => 21,
            SeedSlot::DescriptionEnding => 24,
            SeedSlot::Introduction => 30,
            SeedSlot::Features => 36,
            SeedSlot::FeatureCount => 40,
            SeedSlot::Examples => 44,
            SeedSlot::CallToAction => 48,
            SeedSlot::UniqueValue => 52,
            SeedSlot::Footer => 56,
        }
    }
}

/// Hex SHA-256 digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    format!("{:x}", Sha256::digest(data))
}

fn seed_key(seed_slice: &str) -> u64 {
    let digest = Sha256::digest(seed_slice.as_bytes());
    let mut prefix = [0u8; 8];
    prefix.copy_from_slice(&digest[..8]);
    u64::from_be_bytes(prefix)
}

/// Re-hashes a seed slice and reduces its numeric prefix modulo `len`.
///
/// Returns 0 for an empty range; callers only index non-empty pools.
pub fn seed_to_index(seed_slice: &str, len: usize) -> usize {
    if len == 0 {
        return 0;
    }
    (seed_key(seed_slice) % len as u64) as usize
}

/// The variation seed for a tuple and variation index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Seed(String);

impl Seed {
    /// Hashes the tuple values in stable axis order together with the variation index.
    pub fn derive(tuple: &DimensionTuple, variation_index: u64) -> Self {
        let mut material = tuple.seed_values().join("|");
        material.push('|');
        material.push_str(&variation_index.to_string());
        Seed(sha256_hex(material.as_bytes()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Short prefix used to disambiguate slugs.
    pub fn short(&self) -> &str {
        &self.0[..SLICE_LEN]
    }

    pub fn slice(&self, slot: SeedSlot) -> &str {
        let start = slot.offset();
        &self.0[start..start + SLICE_LEN]
    }

    pub fn index(&self, slot: SeedSlot, len: usize) -> usize {
        seed_to_index(self.slice(slot), len)
    }

    /// Picks one entry of a non-empty pool.
    pub fn pick<'a, T>(&self, slot: SeedSlot, items: &'a [T]) -> &'a T {
        &items[self.index(slot, items.len())]
    }

    /// A value in `min..=max`.
    pub fn range(&self, slot: SeedSlot, min: usize, max: usize) -> usize {
        if max <= min {
            return min;
        }
        min + self.index(slot, max - min + 1)
    }

    /// Picks up to `count` distinct entries. Each entry gets a seeded sort key,
    /// so the selection is a deterministic shuffle of the pool.
    pub fn pick_distinct<'a, T>(&self, slot: SeedSlot, items: &'a [T], count: usize) -> Vec<&'a T> {
        let slice = self.slice(slot);
        let mut keyed: Vec<(u64, usize)> = (0..items.len())
            .map(|i| (seed_key(&format!("{}:{}", slice, i)), i))
            .collect();
        keyed.sort_unstable();
        keyed
            .into_iter()
            .take(count)
            .map(|(_, i)| &items[i])
            .collect()
    }
}

impl std::fmt::Display for Seed {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
