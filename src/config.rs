//! Configuration management and validation.
//!
//! Settings are layered: built-in defaults, then an optional TOML file, then
//! environment variables, then command-line overrides applied by the caller
//! through the `with_*` builders.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, DEFAULT_LOOKUP_FILE_NAME, DEFAULT_RUN_NUMBER_WIDTH,
    DEFAULT_RUN_SHEET_PREFIXES, DEFAULT_SPREADSHEET_EXTENSION, ENV_LOG_PASSWORD,
    ENV_RUN_SHEET_DIR, ENV_WORKERS,
};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// What a directory ingest returns when some files fail to parse
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum IngestPolicy {
    /// Any failed file fails the whole ingest; parsed records are discarded
    #[default]
    EagerAbort,
    /// Return the records that parsed, with the failures reported alongside
    PartialSuccess,
}

/// Global configuration for spreadsheet processing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding run-sheet workbooks
    pub run_sheet_dir: Option<PathBuf>,

    /// Lookup cache file name inside the run-sheet directory
    pub lookup_file_name: String,

    /// Filename prefixes identifying run sheets
    pub run_sheet_prefixes: Vec<String>,

    /// Spreadsheet extension accepted during discovery, without the dot
    pub spreadsheet_extension: String,

    /// Maximum files parsed at once
    pub workers: usize,

    /// Behaviour when some files in a directory fail to parse
    pub ingest_policy: IngestPolicy,

    /// Zero-padded width of run numbers
    pub run_number_width: usize,

    /// Password for the clinical sample log
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clinical_log_password: Option<String>,

    /// Show a progress bar during directory ingestion
    pub show_progress: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_sheet_dir: None,
            lookup_file_name: DEFAULT_LOOKUP_FILE_NAME.to_string(),
            run_sheet_prefixes: DEFAULT_RUN_SHEET_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            spreadsheet_extension: DEFAULT_SPREADSHEET_EXTENSION.to_string(),
            workers: num_cpus::get(),
            ingest_policy: IngestPolicy::default(),
            run_number_width: DEFAULT_RUN_NUMBER_WIDTH,
            clinical_log_password: None,
            show_progress: false,
        }
    }
}

impl Config {
    /// Default configuration file location under the user config directory
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parse a TOML document; missing keys take their defaults
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text)
            .map_err(|e| Error::configuration(format!("invalid configuration: {}", e)))
    }

    /// Read a TOML configuration file
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::io(
                format!("Failed to read configuration file {}", path.display()),
                e,
            )
        })?;
        Self::from_toml_str(&text)
    }

    /// Defaults, then the configuration file, then the environment
    ///
    /// An explicitly named file must exist. Without one, the default location
    /// is used when present.
    pub fn load(config_file: Option<&Path>) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => Self::from_file(path)?,
            None => match Self::default_config_path().filter(|path| path.is_file()) {
                Some(path) => {
                    debug!("Loading configuration from {}", path.display());
                    Self::from_file(&path)?
                }
                None => Self::default(),
            },
        };

        config.apply_env_with(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply environment overrides read through `lookup`
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup(ENV_RUN_SHEET_DIR).filter(|value| !value.is_empty()) {
            self.run_sheet_dir = Some(PathBuf::from(dir));
        }

        if let Some(workers) = lookup(ENV_WORKERS).filter(|value| !value.is_empty()) {
            self.workers = workers.trim().parse().map_err(|_| {
                Error::configuration(format!(
                    "{} must be a positive integer, got '{}'",
                    ENV_WORKERS, workers
                ))
            })?;
        }

        if let Some(password) = lookup(ENV_LOG_PASSWORD).filter(|value| !value.is_empty()) {
            self.clinical_log_password = Some(password);
        }

        Ok(())
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::configuration("Worker count must be greater than 0"));
        }

        if self.run_sheet_prefixes.is_empty()
            || self.run_sheet_prefixes.iter().any(|prefix| prefix.is_empty())
        {
            return Err(Error::configuration(
                "At least one non-empty run-sheet prefix is required",
            ));
        }

        if self.spreadsheet_extension.trim_start_matches('.').is_empty() {
            return Err(Error::configuration("Spreadsheet extension cannot be empty"));
        }

        if self.lookup_file_name.is_empty() {
            return Err(Error::configuration("Lookup file name cannot be empty"));
        }

        if self.run_number_width == 0 {
            return Err(Error::configuration(
                "Run number width must be greater than 0",
            ));
        }

        Ok(())
    }

    /// Run-sheet directory, required by directory commands
    pub fn require_run_sheet_dir(&self) -> Result<&Path> {
        self.run_sheet_dir.as_deref().ok_or_else(|| {
            Error::configuration(format!(
                "No run-sheet directory configured (pass one or set {})",
                ENV_RUN_SHEET_DIR
            ))
        })
    }

    /// Lookup cache path inside the run-sheet directory
    pub fn lookup_path(&self) -> Option<PathBuf> {
        self.run_sheet_dir
            .as_ref()
            .map(|dir| dir.join(&self.lookup_file_name))
    }

    /// Set the run-sheet directory
    pub fn with_run_sheet_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.run_sheet_dir = Some(dir.into());
        self
    }

    /// Set the worker count
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the ingest policy
    pub fn with_ingest_policy(mut self, policy: IngestPolicy) -> Self {
        self.ingest_policy = policy;
        self
    }

    /// Set the run-sheet filename prefixes
    pub fn with_run_sheet_prefixes<I, S>(mut self, prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.run_sheet_prefixes = prefixes.into_iter().map(Into::into).collect();
        self
    }

    /// Set the lookup cache file name
    pub fn with_lookup_file_name(mut self, name: impl Into<String>) -> Self {
        self.lookup_file_name = name.into();
        self
    }

    /// Set the clinical log password
    pub fn with_clinical_log_password(mut self, password: impl Into<String>) -> Self {
        self.clinical_log_password = Some(password.into());
        self
    }

    /// Enable the ingest progress bar
    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }
}
