use super::models::{GenerationRun, RunStatus, RunTotals, StoredPage};
use super::schema::PAGE_VERSIONED_SCHEMAS;
use super::{InsertManyOutcome, PageStore, PersistenceError};
use crate::generator::GeneratedPage;
use crate::sqlite_persistence::BASE_DB_VERSION;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, params_from_iter, Connection, ErrorCode, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use tracing::{debug, info};

/// Upper bound on bound parameters per `IN (...)` lookup.
const EXISTS_CHUNK_SIZE: usize = 500;

const INSERT_PAGE_SQL: &str = "INSERT INTO pages (slug, content_hash, theme, language, platform, page_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6)";

pub struct SqlitePageStore {
    conn: Arc<Mutex<Connection>>,
}

fn fatal(err: rusqlite::Error) -> PersistenceError {
    PersistenceError::Fatal(err.to_string())
}

/// Splits an insert error into a row-level rejection (`Ok`) or a store-wide
/// failure (`Err`).
fn classify_insert_error(
    err: rusqlite::Error,
    content_hash: &str,
) -> Result<PersistenceError, PersistenceError> {
    match &err {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
                || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
            {
                Ok(PersistenceError::Conflict {
                    content_hash: content_hash.to_string(),
                })
            } else {
                Ok(PersistenceError::Rejected(
                    message.clone().unwrap_or_else(|| err.to_string()),
                ))
            }
        }
        _ => Err(fatal(err)),
    }
}

impl SqlitePageStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let path = db_path.as_ref();
        let is_new_db = !path.exists();

        let mut conn = Connection::open(path).context("Failed to open page database")?;
        // Pages can always be regenerated, so durability is traded for insert throughput.
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "OFF")?;

        if is_new_db {
            info!("Creating new page database at {:?}", path);
            let latest = PAGE_VERSIONED_SCHEMAS
                .last()
                .context("No page schema defined")?;
            latest.create(&conn)?;
        } else {
            let raw_version: i64 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
            let db_version = raw_version - BASE_DB_VERSION as i64;

            if db_version < 1 {
                bail!(
                    "Page database version {} is invalid (expected >= 1)",
                    db_version
                );
            }

            let version_index = PAGE_VERSIONED_SCHEMAS
                .iter()
                .position(|s| s.version == db_version as usize)
                .with_context(|| format!("Unknown page database version {}", db_version))?;
            PAGE_VERSIONED_SCHEMAS[version_index]
                .validate(&conn)
                .with_context(|| {
                    format!(
                        "Page database schema validation failed for version {}",
                        db_version
                    )
                })?;

            let current_schema_version = PAGE_VERSIONED_SCHEMAS.len();
            if (db_version as usize) < current_schema_version {
                info!(
                    "Migrating page database from version {} to {}",
                    db_version, current_schema_version
                );
                Self::migrate_if_needed(&mut conn, db_version as usize)?;
            }
        }

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn migrate_if_needed(conn: &mut Connection, from_version: usize) -> Result<()> {
        let tx = conn.transaction()?;
        let mut latest_from = from_version;
        for schema in PAGE_VERSIONED_SCHEMAS.iter().skip(from_version) {
            if schema.version > from_version {
                info!(
                    "Running page database migration from version {} to {}",
                    latest_from, schema.version
                );
                if let Some(migration_fn) = schema.migration {
                    migration_fn(&tx).with_context(|| {
                        format!("Failed to run migration to version {}", schema.version)
                    })?;
                }
                latest_from = schema.version;
            }
        }
        tx.execute(
            &format!("PRAGMA user_version = {}", BASE_DB_VERSION + latest_from),
            [],
        )?;
        tx.commit()?;
        Ok(())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, PersistenceError> {
        self.conn
            .lock()
            .map_err(|_| PersistenceError::Fatal("page database lock poisoned".to_string()))
    }

    fn format_datetime(dt: &DateTime<Utc>) -> String {
        dt.to_rfc3339()
    }

    fn parse_datetime(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or(DateTime::UNIX_EPOCH)
    }

    fn row_to_run(row: &rusqlite::Row) -> rusqlite::Result<GenerationRun> {
        let status_str: String = row.get("status")?;
        let started_at_str: String = row.get("started_at")?;
        let finished_at_str: Option<String> = row.get("finished_at")?;
        let elapsed_ms: Option<i64> = row.get("elapsed_ms")?;

        Ok(GenerationRun {
            id: row.get("id")?,
            status: RunStatus::parse(&status_str).unwrap_or(RunStatus::Failed),
            started_at: Self::parse_datetime(&started_at_str),
            finished_at: finished_at_str.map(|s| Self::parse_datetime(&s)),
            request_json: row.get("request_json")?,
            requested: row.get::<_, i64>("requested")? as u64,
            totals: RunTotals {
                inserted: row.get::<_, i64>("inserted")? as u64,
                duplicates: row.get::<_, i64>("duplicates")? as u64,
                errors: row.get::<_, i64>("errors")? as u64,
                skipped_invalid: row.get::<_, i64>("skipped_invalid")? as u64,
                elapsed_ms: elapsed_ms.unwrap_or(0) as u64,
            },
            error_message: row.get("error_message")?,
        })
    }

    // =========================================================================
    // Run ledger
    // =========================================================================

    pub fn record_run_start(&self, run_id: &str, requested: u64, request_json: &str) -> Result<()> {
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO generation_runs (id, status, started_at, request_json, requested) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                run_id,
                RunStatus::Running.as_str(),
                Self::format_datetime(&Utc::now()),
                request_json,
                requested as i64
            ],
        )
        .context("Failed to record run start")?;
        Ok(())
    }

    pub fn record_run_finish(
        &self,
        run_id: &str,
        status: RunStatus,
        totals: &RunTotals,
        error_message: Option<&str>,
    ) -> Result<()> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE generation_runs SET status = ?1, finished_at = ?2, inserted = ?3, duplicates = ?4, errors = ?5, skipped_invalid = ?6, elapsed_ms = ?7, error_message = ?8 WHERE id = ?9",
                params![
                    status.as_str(),
                    Self::format_datetime(&Utc::now()),
                    totals.inserted as i64,
                    totals.duplicates as i64,
                    totals.errors as i64,
                    totals.skipped_invalid as i64,
                    totals.elapsed_ms as i64,
                    error_message,
                    run_id
                ],
            )
            .context("Failed to record run finish")?;
        if updated == 0 {
            bail!("No generation run with id {}", run_id);
        }
        Ok(())
    }

    pub fn recent_runs(&self, limit: usize) -> Result<Vec<GenerationRun>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT * FROM generation_runs ORDER BY started_at DESC, rowid DESC LIMIT ?1",
        )?;
        let runs = stmt
            .query_map(params![limit as i64], Self::row_to_run)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(runs)
    }

    /// Page counts grouped by theme, largest first.
    pub fn count_by_theme(&self) -> Result<Vec<(String, u64)>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(
            "SELECT theme, COUNT(*) AS n FROM pages GROUP BY theme ORDER BY n DESC, theme ASC",
        )?;
        let counts = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(counts)
    }
}

impl PageStore for SqlitePageStore {
    fn exists_by_hash(&self, hashes: &[String]) -> Result<HashSet<String>, PersistenceError> {
        let conn = self.lock()?;
        let mut found = HashSet::new();
        for chunk in hashes.chunks(EXISTS_CHUNK_SIZE) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let mut stmt = conn
                .prepare(&format!(
                    "SELECT content_hash FROM pages WHERE content_hash IN ({})",
                    placeholders
                ))
                .map_err(fatal)?;
            let rows = stmt
                .query_map(params_from_iter(chunk.iter()), |row| row.get::<_, String>(0))
                .map_err(fatal)?;
            for row in rows {
                found.insert(row.map_err(fatal)?);
            }
        }
        Ok(found)
    }

    fn insert_many(&self, pages: &[GeneratedPage]) -> Result<InsertManyOutcome, PersistenceError> {
        let mut conn = self.lock()?;
        let tx = conn.transaction().map_err(fatal)?;
        let mut outcome = InsertManyOutcome::default();
        {
            let mut stmt = tx.prepare_cached(INSERT_PAGE_SQL).map_err(fatal)?;
            for page in pages {
                let hash = page.content_hash();
                let page_json = match serde_json::to_string(page) {
                    Ok(json) => json,
                    Err(e) => {
                        outcome.rejected.push((hash.to_string(), e.into()));
                        continue;
                    }
                };
                let result = stmt.execute(params![
                    page.slug,
                    hash,
                    page.dimensions.theme.as_str(),
                    page.dimensions.language.as_str(),
                    page.dimensions.platform.as_str(),
                    page_json,
                ]);
                match result {
                    Ok(_) => outcome.inserted += 1,
                    Err(e) => {
                        let row_error = classify_insert_error(e, hash)?;
                        debug!("Row {} rejected: {}", page.slug, row_error);
                        outcome.rejected.push((hash.to_string(), row_error));
                    }
                }
            }
        }
        tx.commit().map_err(fatal)?;
        Ok(outcome)
    }

    fn get_by_slug(&self, slug: &str) -> Result<Option<StoredPage>, PersistenceError> {
        let conn = self.lock()?;
        let row = conn
            .query_row(
                "SELECT page_json, is_active, created_at FROM pages WHERE slug = ?1",
                params![slug],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, i64>(1)?,
                        row.get::<_, i64>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(fatal)?;

        let Some((page_json, is_active, created_at)) = row else {
            return Ok(None);
        };
        Ok(Some(StoredPage {
            page: serde_json::from_str(&page_json)?,
            is_active: is_active != 0,
            created_at: DateTime::<Utc>::from_timestamp(created_at, 0).unwrap_or_default(),
        }))
    }

    fn count_pages(&self) -> Result<u64, PersistenceError> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM pages", [], |row| row.get(0))
            .map_err(fatal)?;
        Ok(count as u64)
    }

    fn set_active(&self, slug: &str, active: bool) -> Result<bool, PersistenceError> {
        let conn = self.lock()?;
        let updated = conn
            .execute(
                "UPDATE pages SET is_active = ?1 WHERE slug = ?2",
                params![active as i64, slug],
            )
            .map_err(fatal)?;
        Ok(updated > 0)
    }
}
