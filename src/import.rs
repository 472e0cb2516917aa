// src/import.rs
//! CSV → SQLite bulk load used by the `import-quotes` tool.
//!
//! Rows are upserted by `id`; one transaction per file. Bad rows (empty id or text) are
//! skipped and counted, never fatal.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use rusqlite::{named_params, Connection, Transaction};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::store::SCHEMA_SQL;

/// Confidence assigned when the column is missing, empty or unparsable.
pub const DEFAULT_CONFIDENCE: f64 = 2.0;

/// A CSV row as it appears in the source file; every column is optional.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct RawQuoteRow {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub year: Option<String>,
    #[serde(default)]
    pub tags: Option<String>,
    #[serde(default)]
    pub is_public_domain: Option<String>,
    #[serde(default)]
    pub source_url: Option<String>,
    #[serde(default)]
    pub confidence: Option<String>,
}

/// A cleaned row ready for the upsert.
#[derive(Debug, Clone, PartialEq)]
pub struct NewQuote {
    pub id: String,
    pub text: String,
    pub author: Option<String>,
    pub source: Option<String>,
    pub year: Option<i64>,
    pub tags: String,
    pub is_public_domain: i64,
    pub source_url: Option<String>,
    pub confidence: f64,
}

fn trimmed(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn parse_flag(v: &Option<String>) -> i64 {
    match trimmed(v) {
        Some(s) => {
            let lower = s.to_ascii_lowercase();
            let truthy = matches!(lower.as_str(), "true" | "yes")
                || lower.parse::<f64>().map(|n| n != 0.0).unwrap_or(false);
            i64::from(truthy)
        }
        None => 0,
    }
}

impl RawQuoteRow {
    /// Normalize; `None` when id or text is empty after trimming.
    pub fn normalize(&self) -> Option<NewQuote> {
        let id = trimmed(&self.id)?;
        let text = trimmed(&self.text)?;
        Some(NewQuote {
            id,
            text,
            author: trimmed(&self.author),
            source: trimmed(&self.source),
            year: trimmed(&self.year).and_then(|y| y.parse::<i64>().ok()),
            tags: trimmed(&self.tags).unwrap_or_default(),
            is_public_domain: parse_flag(&self.is_public_domain),
            source_url: trimmed(&self.source_url),
            confidence: trimmed(&self.confidence)
                .and_then(|c| c.parse::<f64>().ok())
                .filter(|c| c.is_finite())
                .unwrap_or(DEFAULT_CONFIDENCE),
        })
    }
}

/// Counters for one imported file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportStats {
    pub read: usize,
    pub upserted: usize,
    pub skipped: usize,
}

/// Parse CSV text with a header row. A leading UTF-8 BOM is ignored.
pub fn parse_csv(input: &str) -> Result<Vec<RawQuoteRow>> {
    let input = input.strip_prefix('\u{feff}').unwrap_or(input);
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input.as_bytes());

    let mut rows = Vec::new();
    for (i, rec) in rdr.deserialize::<RawQuoteRow>().enumerate() {
        let row = rec.with_context(|| format!("CSV record {}", i + 1))?;
        rows.push(row);
    }
    Ok(rows)
}

/// Read-write handle used only by the import tooling.
pub struct QuoteImporter {
    conn: Connection,
}

impl QuoteImporter {
    /// Create or open the database at `path` and apply the schema.
    pub fn open(path: &Path) -> Result<Self> {
        Self::with_connection(connect(path)?, SCHEMA_SQL)
    }

    /// Like [`QuoteImporter::open`] but with a schema read from disk.
    pub fn open_with_schema(path: &Path, schema_path: &Path) -> Result<Self> {
        let schema = fs::read_to_string(schema_path)
            .with_context(|| format!("reading schema {}", schema_path.display()))?;
        Self::with_connection(connect(path)?, &schema)
    }

    fn with_connection(conn: Connection, schema: &str) -> Result<Self> {
        conn.execute_batch(schema).context("applying schema")?;
        Ok(Self { conn })
    }

    /// Upsert all rows in one transaction.
    pub fn upsert_rows(&mut self, rows: &[RawQuoteRow]) -> Result<ImportStats> {
        let tx = self.conn.transaction()?;
        let stats = upsert_in(&tx, rows)?;
        tx.commit()?;
        Ok(stats)
    }

    /// Parse and upsert one CSV file.
    pub fn import_file(&mut self, path: &Path) -> Result<ImportStats> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading CSV {}", path.display()))?;
        let rows = parse_csv(&content).with_context(|| format!("parsing CSV {}", path.display()))?;
        let stats = self.upsert_rows(&rows)?;
        tracing::info!(
            target: "import",
            file = %path.display(),
            read = stats.read,
            upserted = stats.upserted,
            skipped = stats.skipped,
            "imported"
        );
        Ok(stats)
    }
}

fn connect(path: &Path) -> Result<Connection> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)
            .with_context(|| format!("creating database directory {}", dir.display()))?;
    }
    Connection::open(path).with_context(|| format!("opening database {}", path.display()))
}

fn upsert_in(tx: &Transaction<'_>, rows: &[RawQuoteRow]) -> Result<ImportStats> {
    let mut stmt = tx.prepare_cached(
        "INSERT INTO quotes (id, text, author, source, year, tags, is_public_domain, source_url, confidence)
         VALUES (:id, :text, :author, :source, :year, :tags, :is_public_domain, :source_url, :confidence)
         ON CONFLICT(id) DO UPDATE SET
           text = excluded.text,
           author = excluded.author,
           source = excluded.source,
           year = excluded.year,
           tags = excluded.tags,
           is_public_domain = excluded.is_public_domain,
           source_url = excluded.source_url,
           confidence = excluded.confidence",
    )?;

    let mut stats = ImportStats::default();
    for raw in rows {
        stats.read += 1;
        let Some(q) = raw.normalize() else {
            stats.skipped += 1;
            continue;
        };
        stmt.execute(named_params! {
            ":id": q.id,
            ":text": q.text,
            ":author": q.author,
            ":source": q.source,
            ":year": q.year,
            ":tags": q.tags,
            ":is_public_domain": q.is_public_domain,
            ":source_url": q.source_url,
            ":confidence": q.confidence,
        })?;
        stats.upserted += 1;
    }
    Ok(stats)
}

static CSV_NAME_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^quotes.*\.csv$").expect("csv file regex"));

/// `quotes*.csv` files (case-insensitive) directly under `dir`, sorted by name.
pub fn discover_csv_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("listing {}", dir.display()))? {
        let entry = entry?;
        let name = entry.file_name();
        if CSV_NAME_RE.is_match(&name.to_string_lossy()) && entry.path().is_file() {
            out.push(entry.path());
        }
    }
    out.sort();
    Ok(out)
}
