// 🗄️ SQLite store for the categories table
//
// A unique index on (category_type, name) backs the reconciler's existence
// check. It spans soft-deleted rows too, so a retired name is never re-added. Batches open with BEGIN IMMEDIATE so the
// write lock is held from the first check to the commit.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::time::Duration;

use super::CategoryStore;
use crate::error::{Result, SeedError};
use crate::record::{CategoryRecord, NewCategory};

const SELECT_COLUMNS: &str =
    "SELECT id, category_type, name, description, is_active, created_at FROM categories";

pub struct SqliteStore {
    conn: Connection,
    location: String,
    in_batch: bool,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path, busy_timeout: Duration) -> Result<Self> {
        let location = path.display().to_string();
        let unavailable = |e: rusqlite::Error| SeedError::StorageUnavailable {
            path: location.clone(),
            reason: e.to_string(),
        };

        let conn = Connection::open(path).map_err(unavailable)?;
        conn.busy_timeout(busy_timeout).map_err(unavailable)?;

        // WAL for crash recovery; reports back the mode actually in effect
        let mode: String = conn
            .pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))
            .map_err(unavailable)?;
        tracing::debug!(path = %location, journal_mode = %mode, "opened category store");

        setup_schema(&conn).map_err(unavailable)?;

        Ok(SqliteStore {
            conn,
            location,
            in_batch: false,
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let location = ":memory:".to_string();
        let unavailable = |e: rusqlite::Error| SeedError::StorageUnavailable {
            path: location.clone(),
            reason: e.to_string(),
        };

        let conn = Connection::open_in_memory().map_err(unavailable)?;
        setup_schema(&conn).map_err(unavailable)?;

        Ok(SqliteStore {
            conn,
            location,
            in_batch: false,
        })
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn in_batch(&self) -> bool {
        self.in_batch
    }

    #[cfg(test)]
    pub(crate) fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Create the categories table and its indexes (idempotent)
pub fn setup_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            category_type TEXT NOT NULL,
            name TEXT NOT NULL,
            description TEXT NOT NULL DEFAULT '',
            is_active INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL
        )",
        [],
    )?;

    // One row per (type, name), active or not
    conn.execute("DROP INDEX IF EXISTS idx_categories_active_name", [])?;
    conn.execute(
        "CREATE UNIQUE INDEX IF NOT EXISTS idx_categories_type_name
         ON categories(category_type, name)",
        [],
    )?;

    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_categories_type ON categories(category_type)",
        [],
    )?;

    Ok(())
}

fn row_to_record(row: &Row) -> rusqlite::Result<CategoryRecord> {
    let created_at_str: String = row.get(5)?;
    let created_at = DateTime::parse_from_rfc3339(&created_at_str)
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(5, rusqlite::types::Type::Text, Box::new(e))
        })?
        .with_timezone(&Utc);

    Ok(CategoryRecord {
        id: row.get(0)?,
        category_type: row.get(1)?,
        name: row.get(2)?,
        description: row.get(3)?,
        is_active: row.get(4)?,
        created_at,
    })
}

/// Escape LIKE wildcards so the query matches literally
fn like_pattern(query: &str) -> String {
    let mut escaped = String::with_capacity(query.len() + 2);
    escaped.push('%');
    for c in query.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

impl CategoryStore for SqliteStore {
    fn begin(&mut self) -> Result<()> {
        if !self.in_batch {
            self.conn.execute_batch("BEGIN IMMEDIATE")?;
            self.in_batch = true;
        }
        Ok(())
    }

    fn find(&self, category_type: &str, name: &str) -> Result<Option<CategoryRecord>> {
        let sql = format!(
            "{} WHERE category_type = ?1 AND name = ?2 LIMIT 1",
            SELECT_COLUMNS
        );

        let record = self
            .conn
            .query_row(&sql, params![category_type, name], row_to_record)
            .optional()?;

        Ok(record)
    }

    fn insert(&mut self, record: NewCategory) -> Result<CategoryRecord> {
        self.begin()?;

        let record = record.into_record();

        let result = self.conn.execute(
            "INSERT INTO categories (id, category_type, name, description, is_active, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                record.id,
                record.category_type,
                record.name,
                record.description,
                record.is_active,
                record.created_at.to_rfc3339(),
            ],
        );

        match result {
            Ok(_) => Ok(record),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(SeedError::DuplicateEntry {
                    category_type: record.category_type,
                    name: record.name,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn commit(&mut self) -> Result<()> {
        if !self.in_batch {
            return Ok(());
        }

        match self.conn.execute_batch("COMMIT") {
            Ok(()) => {
                self.in_batch = false;
                Ok(())
            }
            Err(e) => {
                // A failed COMMIT can leave the transaction open
                if !self.conn.is_autocommit() {
                    if let Err(rollback_err) = self.conn.execute_batch("ROLLBACK") {
                        tracing::warn!(error = %rollback_err, "rollback after failed commit also failed");
                    }
                }
                self.in_batch = false;
                Err(SeedError::CommitFailure(e.to_string()))
            }
        }
    }

    fn rollback(&mut self) -> Result<()> {
        if !self.in_batch {
            return Ok(());
        }

        self.in_batch = false;
        if !self.conn.is_autocommit() {
            self.conn.execute_batch("ROLLBACK")?;
        }
        Ok(())
    }

    fn query_active(&self, category_type: &str) -> Result<Vec<CategoryRecord>> {
        let sql = format!(
            "{} WHERE category_type = ?1 AND is_active = 1 ORDER BY name ASC",
            SELECT_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![category_type], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }

    fn count_active(&self, category_type: &str) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE category_type = ?1 AND is_active = 1",
            params![category_type],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    fn count_all_active(&self) -> Result<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM categories WHERE is_active = 1",
            [],
            |row| row.get(0),
        )?;

        Ok(count)
    }

    fn count_all(&self) -> Result<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM categories", [], |row| row.get(0))?;

        Ok(count)
    }

    fn search(&self, query: &str, category_type: Option<&str>) -> Result<Vec<CategoryRecord>> {
        let sql = format!(
            "{} WHERE is_active = 1
               AND (name LIKE ?1 ESCAPE '\\' OR description LIKE ?1 ESCAPE '\\')
               AND (?2 IS NULL OR category_type = ?2)
             ORDER BY category_type ASC, name ASC",
            SELECT_COLUMNS
        );

        let mut stmt = self.conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![like_pattern(query), category_type], row_to_record)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(records)
    }
}

// ============================================================================
// TESTS
// ============================================================================
