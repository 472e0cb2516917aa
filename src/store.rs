// src/store.rs
//! Read-only SQLite access for the search pipeline.
//!
//! The pipeline only needs three reads (see [`QuoteSource`]): a conjunctive FTS5 match,
//! a case-insensitive substring scan and a "most confident first" scan. The store is
//! opened with `SQLITE_OPEN_READ_ONLY` and never written at query time; the schema and
//! the data come from the `import-quotes` tool.

use once_cell::sync::OnceCell;
use rusqlite::{params, types::Value, Connection, OpenFlags, Row};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::debug;

use crate::error::StoreError;
use crate::model::QuoteRecord;

/// DDL for the `quotes` table, its FTS5 index and sync triggers.
pub const SCHEMA_SQL: &str = include_str!("../sql/schema.sql");

/// Distinct terms the substring scan looks at; later ones are ignored.
pub const MAX_SUBSTRING_TERMS: usize = 64;

const RECORD_COLUMNS: &str =
    "quotes.id, quotes.text, quotes.author, quotes.source, quotes.year, \
     quotes.tags, quotes.is_public_domain, quotes.confidence";

/// Storage reads the retriever relies on.
pub trait QuoteSource {
    /// Rows matching an FTS5 `MATCH` expression, at most `limit`.
    fn match_fts(&self, expr: &str, limit: usize) -> Result<Vec<QuoteRecord>, StoreError>;

    /// Rows where any term is a case-insensitive substring of text, tags or author.
    fn match_any_substring(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError>;

    /// Rows ordered by confidence desc, then year desc with missing years last.
    fn most_confident(&self, limit: usize) -> Result<Vec<QuoteRecord>, StoreError>;
}

/// A single read-only connection to the quotes database.
#[derive(Debug)]
pub struct QuoteStore {
    path: PathBuf,
    conn: Mutex<Connection>,
}

impl QuoteStore {
    /// Open `path` read-only. A missing file or a file without the `quotes` table is
    /// reported as [`StoreError::Unavailable`].
    pub fn open_read_only(path: &Path) -> Result<Self, StoreError> {
        let unavailable = |reason: String| StoreError::Unavailable {
            path: path.to_path_buf(),
            reason,
        };

        if !path.exists() {
            return Err(unavailable("database file not found".to_string()));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .map_err(|e| unavailable(e.to_string()))?;

        let has_quotes: bool = conn
            .query_row(
                "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'quotes')",
                [],
                |row| row.get(0),
            )
            .map_err(|e| unavailable(e.to_string()))?;
        if !has_quotes {
            return Err(unavailable("missing `quotes` table".to_string()));
        }

        debug!(target: "store", db_path = %path.display(), "opened quote store read-only");
        Ok(Self {
            path: path.to_path_buf(),
            conn: Mutex::new(conn),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Total number of stored quotes.
    pub fn count(&self) -> Result<usize, StoreError> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;
            Ok(n.max(0) as usize)
        })
    }

    fn with_conn<F, T>(&self, f: F) -> Result<T, StoreError>
    where
        F: FnOnce(&Connection) -> Result<T, StoreError>,
    {
        let guard = self.conn.lock().map_err(|_| StoreError::Poisoned)?;
        f(&guard)
    }

    fn collect(
        conn: &Connection,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<QuoteRecord>, StoreError> {
        let mut stmt = conn.prepare_cached(sql)?;
        let rows = stmt.query_map(params, record_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }
}

impl QuoteSource for QuoteStore {
    fn match_fts(&self, expr: &str, limit: usize) -> Result<Vec<QuoteRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS}
             FROM quotes_fts
             JOIN quotes ON quotes.rowid = quotes_fts.rowid
             WHERE quotes_fts MATCH ?1
             LIMIT ?2"
        );
        self.with_conn(|conn| Self::collect(conn, &sql, params![expr, limit as i64]))
    }

    fn match_any_substring(
        &self,
        terms: &[String],
        limit: usize,
    ) -> Result<Vec<QuoteRecord>, StoreError> {
        // OR makes repeats redundant; the cap keeps the expression tree shallow.
        let mut seen = HashSet::new();
        let terms: Vec<&str> = terms
            .iter()
            .map(String::as_str)
            .filter(|t| seen.insert(*t))
            .take(MAX_SUBSTRING_TERMS)
            .collect();
        if terms.is_empty() {
            return Ok(Vec::new());
        }

        // One numbered needle per term, reused across the three fields.
        let clauses = (1..=terms.len())
            .map(|i| {
                format!(
                    "(lower(text) LIKE lower(?{i}) OR lower(tags) LIKE lower(?{i}) OR lower(author) LIKE lower(?{i}))"
                )
            })
            .collect::<Vec<_>>()
            .join(" OR ");
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM quotes WHERE {clauses} LIMIT ?{}",
            terms.len() + 1
        );

        let mut values: Vec<Value> = terms
            .iter()
            .map(|t| Value::Text(format!("%{t}%")))
            .collect();
        values.push(Value::Integer(limit as i64));

        self.with_conn(|conn| Self::collect(conn, &sql, rusqlite::params_from_iter(values.iter())))
    }

    fn most_confident(&self, limit: usize) -> Result<Vec<QuoteRecord>, StoreError> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM quotes
             ORDER BY confidence DESC, year DESC NULLS LAST
             LIMIT ?1"
        );
        self.with_conn(|conn| Self::collect(conn, &sql, params![limit as i64]))
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<QuoteRecord> {
    Ok(QuoteRecord {
        id: row.get("id")?,
        text: row.get("text")?,
        author: row.get("author")?,
        source: row.get("source")?,
        year: row.get("year")?,
        tags: row.get("tags")?,
        is_public_domain: row.get::<_, Option<i64>>("is_public_domain")?.unwrap_or(0),
        confidence: row.get("confidence")?,
    })
}

/// Process-wide handle that opens the store on first use and then reuses it.
///
/// A failed open is not remembered, so the next request tries again.
#[derive(Debug, Clone)]
pub struct StoreHandle {
    path: PathBuf,
    cell: Arc<OnceCell<Arc<QuoteStore>>>,
}

impl StoreHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            cell: Arc::new(OnceCell::new()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_open(&self) -> bool {
        self.cell.get().is_some()
    }

    pub fn get(&self) -> Result<Arc<QuoteStore>, StoreError> {
        self.cell
            .get_or_try_init(|| QuoteStore::open_read_only(&self.path).map(Arc::new))
            .cloned()
    }
}
