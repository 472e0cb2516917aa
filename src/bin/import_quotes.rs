//! Bulk-load quotes from CSV into the SQLite store (upsert by id).
//!
//! Usage: `import-quotes [FILES]... [--db data/quotes.db] [--schema sql/schema.sql]`
//! Without FILES, every `data/quotes*.csv` is imported.

use anyhow::{bail, Result};
use clap::Parser;
use std::path::PathBuf;

use setback_quotes::import::{discover_csv_files, QuoteImporter};

#[derive(Debug, Parser)]
#[command(name = "import-quotes", about = "Upsert quotes from CSV files into the SQLite store")]
struct Cli {
    /// CSV files to import (default: data/quotes*.csv)
    files: Vec<PathBuf>,

    /// Target database
    #[arg(long, default_value = "data/quotes.db")]
    db: PathBuf,

    /// Schema file to apply instead of the built-in one
    #[arg(long)]
    schema: Option<PathBuf>,

    /// Directory scanned when no files are given
    #[arg(long, default_value = "data")]
    data_dir: PathBuf,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt().with_target(false).init();
    let cli = Cli::parse();

    let files = if cli.files.is_empty() {
        discover_csv_files(&cli.data_dir)?
    } else {
        cli.files.clone()
    };
    if files.is_empty() {
        bail!(
            "no CSV files found; pass paths or add files like {}/quotes.seed.csv",
            cli.data_dir.display()
        );
    }

    let mut importer = match &cli.schema {
        Some(schema) => QuoteImporter::open_with_schema(&cli.db, schema)?,
        None => QuoteImporter::open(&cli.db)?,
    };

    let mut total = 0usize;
    for file in &files {
        let stats = importer.import_file(file)?;
        println!(
            "Imported {} of {} rows from {} ({} skipped)",
            stats.upserted,
            stats.read,
            file.display(),
            stats.skipped
        );
        total += stats.upserted;
    }

    println!("Done. Upserted {} rows into {}", total, cli.db.display());
    Ok(())
}
