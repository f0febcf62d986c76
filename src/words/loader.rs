//! Word catalog loading
//!
//! Three sources: a user-chosen local file (must look like JSON before we
//! read it), a one-shot network fetch, and the embedded starter catalog
//! used when nothing else is configured.

use super::WordCatalog;
use crate::{MinpairError, Result};
use log::{debug, info};
use once_cell::sync::Lazy;
use std::fs;
use std::path::{Path, PathBuf};

static BUILTIN_JSON: &str = include_str!("../../data/sample_words.json");

static BUILTIN: Lazy<WordCatalog> =
    Lazy::new(|| WordCatalog::from_json(BUILTIN_JSON).unwrap_or_default());

/// Where the catalog comes from; reload re-runs the same source
#[derive(Debug, Clone)]
pub enum CatalogSource {
    File(PathBuf),
    Url(String),
    Builtin,
}

impl CatalogSource {
    pub fn load(&self) -> Result<WordCatalog> {
        match self {
            CatalogSource::File(path) => load_file(path),
            CatalogSource::Url(url) => fetch_url(url),
            CatalogSource::Builtin => Ok(builtin()),
        }
    }

    /// Short description for the status line
    pub fn label(&self) -> String {
        match self {
            CatalogSource::File(path) => path.display().to_string(),
            CatalogSource::Url(url) => url.clone(),
            CatalogSource::Builtin => "built-in sample".to_string(),
        }
    }
}

/// Load and parse a local catalog file
///
/// Anything without a .json extension is rejected before reading.
pub fn load_file(path: &Path) -> Result<WordCatalog> {
    let is_json = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if !is_json {
        return Err(MinpairError::Catalog(format!(
            "{} is not a .json file",
            path.display()
        )));
    }

    debug!("loading word catalog from {}", path.display());
    let text = fs::read_to_string(path)?;
    let catalog = WordCatalog::from_json(&text)?;
    info!(
        "loaded {} pairs from {}",
        catalog.pair_count(),
        path.display()
    );
    Ok(catalog)
}

/// One-shot fetch of a catalog over HTTP
pub fn fetch_url(url: &str) -> Result<WordCatalog> {
    debug!("fetching word catalog from {}", url);
    let response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| MinpairError::Fetch(format!("{}: {}", url, e)))?;
    let text = response
        .text()
        .map_err(|e| MinpairError::Fetch(format!("{}: {}", url, e)))?;
    let catalog = WordCatalog::from_json(&text)?;
    info!("fetched {} pairs from {}", catalog.pair_count(), url);
    Ok(catalog)
}

/// The embedded starter catalog
pub fn builtin() -> WordCatalog {
    BUILTIN.clone()
}
