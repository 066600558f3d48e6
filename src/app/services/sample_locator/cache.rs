//! File-backed run-number lookup cache
//!
//! The cache is a headerless two-column CSV of `(run_number, run_sheet_path)`.
//! It is advisory: a stale or missing entry only costs a directory scan.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use csv::StringRecord;
use tracing::debug;

use crate::app::models::RunSheet;
use crate::{Error, Result};

/// Zero-pad a run number to the width used in run-sheet metadata
pub fn format_run_number(run_number: u32, width: usize) -> String {
    format!("{:0width$}", run_number, width = width)
}

/// Run number to run-sheet path mapping
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupCache {
    entries: BTreeMap<String, PathBuf>,
}

impl LookupCache {
    /// Read a cache file
    ///
    /// Rows with fewer than two fields are skipped. When a key appears more
    /// than once the last row wins. Relative paths are resolved against the
    /// directory holding the cache file.
    pub fn load(path: &Path) -> Result<Self> {
        let path_str = path.to_string_lossy().to_string();
        let base_dir = path.parent().unwrap_or_else(|| Path::new(""));

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| {
                Error::lookup_cache(path_str.clone(), "Failed to open lookup cache", Some(e))
            })?;

        let mut entries = BTreeMap::new();
        let mut record = StringRecord::new();
        while reader.read_record(&mut record).map_err(|e| {
            Error::lookup_cache(path_str.clone(), "Failed to read lookup record", Some(e))
        })? {
            let (Some(key), Some(file)) = (record.get(0), record.get(1)) else {
                debug!("Skipping short lookup record: {:?}", record);
                continue;
            };
            if key.is_empty() || file.is_empty() {
                continue;
            }

            entries.insert(key.to_string(), base_dir.join(file));
        }

        debug!("Loaded {} lookup entries from {}", entries.len(), path.display());
        Ok(Self { entries })
    }

    /// Build a cache from an already-parsed corpus
    pub fn from_run_sheets<'a, I>(sheets: I) -> Self
    where
        I: IntoIterator<Item = &'a RunSheet>,
    {
        let mut entries = BTreeMap::new();
        for sheet in sheets {
            if sheet.header.run_number.is_empty() {
                debug!("No run number in {}, not indexed", sheet.filename);
                continue;
            }
            entries.insert(
                sheet.header.run_number.clone(),
                PathBuf::from(&sheet.filename),
            );
        }
        Self { entries }
    }

    /// Write the cache as a headerless CSV, ordered by run number
    pub fn write(&self, path: &Path) -> Result<()> {
        let path_str = path.to_string_lossy().to_string();
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(path)
            .map_err(|e| {
                Error::lookup_cache(path_str.clone(), "Failed to create lookup cache", Some(e))
            })?;

        for (key, file) in &self.entries {
            let file = file.to_string_lossy();
            writer
                .write_record([key.as_str(), file.as_ref()])
                .map_err(|e| {
                    Error::lookup_cache(path_str.clone(), "Failed to write lookup record", Some(e))
                })?;
        }

        writer
            .flush()
            .map_err(|e| Error::io(format!("Failed to flush {}", path.display()), e))
    }

    pub fn get(&self, run_number: &str) -> Option<&Path> {
        self.entries.get(run_number).map(PathBuf::as_path)
    }

    pub fn insert(&mut self, run_number: impl Into<String>, file: impl Into<PathBuf>) {
        self.entries.insert(run_number.into(), file.into());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Path)> {
        self.entries
            .iter()
            .map(|(key, file)| (key.as_str(), file.as_path()))
    }
}
