//! Seeded variation: deterministic seeds, seed-driven picks and typed templates.

mod library;
mod seed;
mod template;

pub use library::{TemplateLibrary, TemplatePatterns};
pub use seed::{seed_to_index, sha256_hex, Seed, SeedSlot};
pub use template::{fill_template, Placeholder, Template, TemplateContext, TemplateError};

#[cfg(test)]
pub(crate) use library::test_support;
