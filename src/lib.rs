//! Content Forge Library
//!
//! Seeded page generation, uniqueness scoring and deduplicated bulk
//! persistence for programmatic SEO catalogs.

pub mod bulk;
pub mod config;
pub mod dimensions;
pub mod generator;
pub mod metrics;
pub mod page_store;
pub mod sqlite_persistence;
pub mod variation;

// Re-export commonly used types for convenience
pub use bulk::{BulkGenerator, BulkReport, GenerationRequest};
pub use dimensions::DimensionTuple;
pub use generator::{ContentGenerator, GeneratedPage, GenerationError, GeneratorConfig};
pub use page_store::{PageStore, PersistenceError, SqlitePageStore};
