// src/config.rs
//! Service configuration: TOML file + env overrides.
//!
//! ```toml
//! [store]
//! path = "data/quotes.db"
//!
//! [search]
//! candidate_limit = 200
//! result_limit = 5
//!
//! [server]
//! static_dir = "public"
//! ```
//!
//! Lookup: `$QUOTES_CONFIG_PATH`, else `config/quotes.toml`; a missing default file means
//! built-in defaults. `$QUOTES_DB_PATH` and `$QUOTES_RESULT_LIMIT` override the file.

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::retrieve::MAX_CANDIDATES;

pub const DEFAULT_CONFIG_PATH: &str = "config/quotes.toml";
pub const ENV_CONFIG_PATH: &str = "QUOTES_CONFIG_PATH";
pub const ENV_DB_PATH: &str = "QUOTES_DB_PATH";
pub const ENV_RESULT_LIMIT: &str = "QUOTES_RESULT_LIMIT";

/// Results returned per query never exceed this.
pub const MAX_RESULTS: usize = 5;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub search: SearchConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Explicit database path; discovered when absent.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub candidate_limit: usize,
    pub result_limit: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            candidate_limit: MAX_CANDIDATES,
            result_limit: MAX_RESULTS,
        }
    }
}

impl SearchConfig {
    /// Clamp limits into `1..=ceiling`.
    pub fn sanitized(self) -> Self {
        Self {
            candidate_limit: self.candidate_limit.clamp(1, MAX_CANDIDATES),
            result_limit: self.result_limit.clamp(1, MAX_RESULTS),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Optional directory served as the fallback (UI assets).
    pub static_dir: Option<PathBuf>,
}

impl AppConfig {
    /// Parse a TOML string (no env overrides).
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.search = cfg.search.sanitized();
        Ok(cfg)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading quotes config from {}", path.display()))?;
        Self::from_toml_str(&content)
            .with_context(|| format!("parsing quotes config {}", path.display()))
    }

    /// Load using `$QUOTES_CONFIG_PATH` or the default path, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut cfg = match std::env::var(ENV_CONFIG_PATH) {
            Ok(p) => {
                let pb = PathBuf::from(p);
                if !pb.exists() {
                    return Err(anyhow!(
                        "{ENV_CONFIG_PATH} points to non-existent path {}",
                        pb.display()
                    ));
                }
                Self::load_from(&pb)?
            }
            Err(_) => {
                let default = PathBuf::from(DEFAULT_CONFIG_PATH);
                if default.exists() {
                    Self::load_from(&default)?
                } else {
                    Self::default()
                }
            }
        };
        cfg.apply_env_overrides();
        Ok(cfg)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(p) = std::env::var(ENV_DB_PATH) {
            if !p.trim().is_empty() {
                self.store.path = Some(PathBuf::from(p.trim()));
            }
        }
        if let Some(n) = parse_limit_env(std::env::var(ENV_RESULT_LIMIT).ok()) {
            self.search.result_limit = n;
        }
        self.search = self.search.sanitized();
    }

    /// Configured store path, or the discovered one.
    pub fn resolve_db_path(&self) -> PathBuf {
        match &self.store.path {
            Some(p) => p.clone(),
            None => find_db_path(),
        }
    }
}

// parse optional integer env; invalid values are ignored
fn parse_limit_env(raw: Option<String>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse::<usize>().ok())
}

/// Look for `data/quotes.db`: first under the working directory, then around the
/// executable. Falls back to the working-directory path so diagnostics stay readable.
pub fn find_db_path() -> PathBuf {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(Path::to_path_buf));
    find_db_path_from(&cwd, exe_dir.as_deref())
}

fn find_db_path_from(cwd: &Path, exe_dir: Option<&Path>) -> PathBuf {
    let primary = cwd.join("data").join("quotes.db");
    if primary.exists() {
        return primary;
    }
    if let Some(here) = exe_dir {
        for probe in ["../data/quotes.db", "../../data/quotes.db", "data/quotes.db"] {
            let p = here.join(probe);
            if p.exists() {
                return p;
            }
        }
    }
    primary
}
