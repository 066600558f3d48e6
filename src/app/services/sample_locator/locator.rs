//! Two-tier run-sheet lookup by run number

use std::path::{Path, PathBuf};

use tokio::task;
use tracing::{debug, info, warn};

use super::cache::{LookupCache, format_run_number};
use crate::app::models::RunSheet;
use crate::app::services::directory_ingester::DirectoryIngester;
use crate::app::services::sheet_parser::parse_run_sheet;
use crate::config::Config;
use crate::constants::{DEFAULT_LOOKUP_FILE_NAME, DEFAULT_RUN_NUMBER_WIDTH};
use crate::{Error, Result};

/// Resolves a run sheet from its run number
///
/// The lookup cache is tried first and only the listed file is parsed. A
/// missing or unreadable cache, a key that is not in it, or a listed file
/// that no longer parses all fall back to ingesting the whole directory and
/// scanning for a matching `Run Number`.
#[derive(Debug, Clone)]
pub struct SampleLocator {
    ingester: DirectoryIngester,
    lookup_path: Option<PathBuf>,
    run_number_width: usize,
}

impl SampleLocator {
    /// Locator over `dir` with the cache at `<dir>/lookup.csv`
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        Self {
            lookup_path: Some(dir.join(DEFAULT_LOOKUP_FILE_NAME)),
            ingester: DirectoryIngester::new(dir),
            run_number_width: DEFAULT_RUN_NUMBER_WIDTH,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            ingester: DirectoryIngester::from_config(config)?,
            lookup_path: config.lookup_path(),
            run_number_width: config.run_number_width,
        })
    }

    /// Replace the cache location; `None` always scans the directory
    pub fn with_lookup_path(mut self, lookup_path: Option<PathBuf>) -> Self {
        self.lookup_path = lookup_path;
        self
    }

    pub fn with_ingester(mut self, ingester: DirectoryIngester) -> Self {
        self.ingester = ingester;
        self
    }

    pub fn with_run_number_width(mut self, width: usize) -> Self {
        self.run_number_width = width;
        self
    }

    pub fn lookup_path(&self) -> Option<&Path> {
        self.lookup_path.as_deref()
    }

    /// Find the run sheet for `run_number`
    pub async fn find(&self, run_number: u32) -> Result<RunSheet> {
        let key = format_run_number(run_number, self.run_number_width);

        if let Some(sheet) = self.find_cached(&key).await? {
            return Ok(sheet);
        }

        self.find_by_scan(&key).await
    }

    async fn find_cached(&self, key: &str) -> Result<Option<RunSheet>> {
        let Some(lookup_path) = self.lookup_path.clone() else {
            return Ok(None);
        };
        if !lookup_path.is_file() {
            debug!("No lookup cache at {}", lookup_path.display());
            return Ok(None);
        }

        let key = key.to_string();
        task::spawn_blocking(move || -> Result<Option<RunSheet>> {
            let cache = match LookupCache::load(&lookup_path) {
                Ok(cache) => cache,
                Err(e) => {
                    warn!("Ignoring unreadable lookup cache: {}", e);
                    return Ok(None);
                }
            };

            let Some(file) = cache.get(&key) else {
                debug!("Run {} not in lookup cache", key);
                return Ok(None);
            };

            match parse_run_sheet(file) {
                Ok(sheet) => {
                    info!("Found run {} via lookup cache: {}", key, file.display());
                    Ok(Some(sheet))
                }
                Err(e) => {
                    warn!("Stale lookup entry for run {}: {}", key, e);
                    Ok(None)
                }
            }
        })
        .await
        .map_err(|e| Error::task_failed(e.to_string()))?
    }

    async fn find_by_scan(&self, key: &str) -> Result<RunSheet> {
        info!(
            "Scanning {} for run {}",
            self.ingester.dir().display(),
            key
        );

        let report = self.ingester.ingest_run_sheets(&[]).await?;
        report
            .corpus
            .into_iter()
            .find(|sheet| sheet.header.run_number == key)
            .ok_or_else(|| Error::sample_not_found(key))
    }
}
