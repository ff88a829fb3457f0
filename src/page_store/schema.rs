//! SQLite schema for the page database.

use crate::sqlite_column;
use crate::sqlite_persistence::{Column, SqlType, Table, VersionedSchema};
use anyhow::Result;
use rusqlite::Connection;

const DEFAULT_TIMESTAMP: &str = "(cast(strftime('%s','now') as int))";

// =============================================================================
// Version 1 - Pages
// =============================================================================

/// Generated pages. `slug` and `content_hash` are both unique; the hash
/// constraint is what makes concurrent inserts safe.
const PAGES_TABLE_V1: Table = Table {
    name: "pages",
    columns: &[
        sqlite_column!("id", &SqlType::Integer, is_primary_key = true),
        sqlite_column!("slug", &SqlType::Text, non_null = true, is_unique = true),
        sqlite_column!(
            "content_hash",
            &SqlType::Text,
            non_null = true,
            is_unique = true
        ),
        sqlite_column!("theme", &SqlType::Text, non_null = true),
        sqlite_column!("language", &SqlType::Text, non_null = true),
        sqlite_column!("platform", &SqlType::Text, non_null = true),
        sqlite_column!("page_json", &SqlType::Text, non_null = true),
        sqlite_column!(
            "is_active",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("1")
        ),
        sqlite_column!(
            "created_at",
            &SqlType::Integer,
            non_null = true,
            default_value = Some(DEFAULT_TIMESTAMP)
        ),
    ],
    indices: &[("idx_pages_theme_language", "theme, language")],
    unique_constraints: &[],
};

// =============================================================================
// Version 2 - Run ledger
// =============================================================================

const GENERATION_RUNS_TABLE_V2: Table = Table {
    name: "generation_runs",
    columns: &[
        sqlite_column!("id", &SqlType::Text, is_primary_key = true),
        sqlite_column!("status", &SqlType::Text, non_null = true),
        sqlite_column!("started_at", &SqlType::Text, non_null = true),
        sqlite_column!("finished_at", &SqlType::Text),
        sqlite_column!("request_json", &SqlType::Text, non_null = true),
        sqlite_column!("requested", &SqlType::Integer, non_null = true),
        sqlite_column!(
            "inserted",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "duplicates",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "errors",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!(
            "skipped_invalid",
            &SqlType::Integer,
            non_null = true,
            default_value = Some("0")
        ),
        sqlite_column!("elapsed_ms", &SqlType::Integer),
        sqlite_column!("error_message", &SqlType::Text),
    ],
    indices: &[("idx_generation_runs_started", "started_at DESC")],
    unique_constraints: &[],
};

fn migrate_v1_to_v2(conn: &Connection) -> Result<()> {
    GENERATION_RUNS_TABLE_V2.create(conn)?;
    Ok(())
}

// =============================================================================
// Versioned Schema Definition
// =============================================================================

/// Version 1: pages
/// Version 2: generation run ledger
pub const PAGE_VERSIONED_SCHEMAS: &[VersionedSchema] = &[
    VersionedSchema {
        version: 1,
        tables: &[PAGES_TABLE_V1],
        migration: None,
    },
    VersionedSchema {
        version: 2,
        tables: &[PAGES_TABLE_V1, GENERATION_RUNS_TABLE_V2],
        migration: Some(migrate_v1_to_v2),
    },
];
