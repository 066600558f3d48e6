//! Run-sheet file discovery
//!
//! Candidate files are the regular files directly inside the run-sheet
//! directory whose names start with one of the instrument-family prefixes and
//! end with the spreadsheet extension. Exclusions are exact file names.

use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::debug;

use crate::{Error, Result};

/// Filename filter for run-sheet discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePattern {
    prefixes: Vec<String>,
    suffix: String,
}

impl FilePattern {
    /// `extension` may be given with or without its leading dot
    pub fn new<I, S>(prefixes: I, extension: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            prefixes: prefixes.into_iter().map(Into::into).collect(),
            suffix: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    pub fn matches(&self, file_name: &str) -> bool {
        file_name.ends_with(&self.suffix)
            && self
                .prefixes
                .iter()
                .any(|prefix| file_name.starts_with(prefix.as_str()))
    }
}

/// Candidate files in `dir`, sorted by path
pub async fn discover_files(
    dir: &Path,
    pattern: &FilePattern,
    exclude: &[String],
) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::io(
            format!("Run-sheet directory not found: {}", dir.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    debug!("Searching for run sheets in: {}", dir.display());

    let mut files = Vec::new();
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| Error::io(format!("Failed to read directory {}", dir.display()), e))?;

    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_type().await?.is_file() {
            continue;
        }

        let file_name = entry.file_name();
        let Some(name) = file_name.to_str() else {
            continue;
        };

        if !pattern.matches(name) {
            continue;
        }
        if exclude.iter().any(|excluded| excluded == name) {
            debug!("Excluding {}", name);
            continue;
        }

        files.push(entry.path());
    }

    files.sort();
    debug!("Found {} run sheets in {}", files.len(), dir.display());
    Ok(files)
}
