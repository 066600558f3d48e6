//! Bounded concurrent parsing of discovered files
//!
//! Every file gets its own task. Tasks take a permit from a semaphore sized to
//! the worker count, parse on the blocking pool, and send exactly one
//! [`IngestResult`] to a single consumer. The consumer drains the channel until
//! every sender is gone, then joins the task set.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use tokio::sync::{Semaphore, mpsc};
use tokio::task::{self, JoinSet};
use tracing::{debug, error, info};

use super::discovery::{FilePattern, discover_files};
use crate::app::models::RunSheet;
use crate::app::services::sheet_parser::parse_run_sheet;
use crate::config::{Config, IngestPolicy};
use crate::constants::{DEFAULT_RUN_SHEET_PREFIXES, DEFAULT_SPREADSHEET_EXTENSION};
use crate::{Error, Result};

/// Outcome of parsing one file
#[derive(Debug)]
pub struct IngestResult<T> {
    pub path: PathBuf,
    pub outcome: Result<T>,
}

/// One file that failed to parse
#[derive(Debug)]
pub struct IngestFailure {
    pub path: PathBuf,
    pub error: Error,
}

/// Aggregated outcome of a directory ingest
#[derive(Debug)]
pub struct IngestReport<T> {
    /// Parsed records, ordered by file path
    pub corpus: Vec<T>,

    /// Files that failed, ordered by file path
    pub failures: Vec<IngestFailure>,
}

impl<T> IngestReport<T> {
    /// Partition per-file results
    pub fn from_results(mut results: Vec<IngestResult<T>>) -> Self {
        results.sort_by(|a, b| a.path.cmp(&b.path));

        let mut corpus = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for IngestResult { path, outcome } in results {
            match outcome {
                Ok(record) => corpus.push(record),
                Err(error) => failures.push(IngestFailure { path, error }),
            }
        }

        Self { corpus, failures }
    }

    pub fn attempted(&self) -> usize {
        self.corpus.len() + self.failures.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Discovers run sheets in a directory and parses them concurrently
#[derive(Debug, Clone)]
pub struct DirectoryIngester {
    dir: PathBuf,
    pattern: FilePattern,
    workers: usize,
    policy: IngestPolicy,
    show_progress: bool,
}

impl DirectoryIngester {
    /// Ingester over `dir` with the default prefixes and extension
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            pattern: FilePattern::new(
                DEFAULT_RUN_SHEET_PREFIXES.iter().copied(),
                DEFAULT_SPREADSHEET_EXTENSION,
            ),
            workers: num_cpus::get(),
            policy: IngestPolicy::default(),
            show_progress: false,
        }
    }

    /// Ingester over the configured run-sheet directory
    pub fn from_config(config: &Config) -> Result<Self> {
        let dir = config.require_run_sheet_dir()?;
        Ok(Self {
            dir: dir.to_path_buf(),
            pattern: FilePattern::new(
                config.run_sheet_prefixes.iter().cloned(),
                &config.spreadsheet_extension,
            ),
            workers: config.workers,
            policy: config.ingest_policy,
            show_progress: config.show_progress,
        })
    }

    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    pub fn with_policy(mut self, policy: IngestPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_pattern(mut self, pattern: FilePattern) -> Self {
        self.pattern = pattern;
        self
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn policy(&self) -> IngestPolicy {
        self.policy
    }

    /// Candidate run sheets, minus exact-name exclusions
    pub async fn discover(&self, exclude: &[String]) -> Result<Vec<PathBuf>> {
        discover_files(&self.dir, &self.pattern, exclude).await
    }

    /// Parse every discovered run sheet
    ///
    /// Under [`IngestPolicy::EagerAbort`] any failed file fails the call with
    /// [`Error::IncompleteIngest`] and no records are returned. Under
    /// [`IngestPolicy::PartialSuccess`] the parsed subset comes back together
    /// with the failures. Every failure is logged with its file name either way.
    pub async fn ingest_run_sheets(&self, exclude: &[String]) -> Result<IngestReport<RunSheet>> {
        let files = self.discover(exclude).await?;
        info!(
            "Parsing {} run sheets from {}",
            files.len(),
            self.dir.display()
        );

        let results = self.ingest_files(files, parse_run_sheet).await?;
        self.apply_policy(IngestReport::from_results(results))
    }

    /// Parse `files` concurrently with `parse`, one result per file
    pub async fn ingest_files<T, F>(
        &self,
        files: Vec<PathBuf>,
        parse: F,
    ) -> Result<Vec<IngestResult<T>>>
    where
        T: Send + 'static,
        F: Fn(&Path) -> Result<T> + Send + Sync + 'static,
    {
        let total = files.len();
        let progress = self.progress_bar(total);
        let semaphore = Arc::new(Semaphore::new(self.workers.max(1)));
        let parse = Arc::new(parse);
        let (tx, mut rx) = mpsc::channel::<IngestResult<T>>(total.max(1));

        let mut tasks = JoinSet::new();
        for path in files {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let parse = Arc::clone(&parse);

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .map_err(|e| Error::task_failed(e.to_string()))?;

                let task_path = path.clone();
                let outcome = match task::spawn_blocking(move || (*parse)(&task_path)).await {
                    Ok(outcome) => outcome,
                    Err(e) => Err(Error::task_failed(format!("{}: {}", path.display(), e))),
                };

                tx.send(IngestResult { path, outcome })
                    .await
                    .map_err(|e| Error::task_failed(e.to_string()))
            });
        }
        drop(tx);

        let mut results = Vec::with_capacity(total);
        while let Some(result) = rx.recv().await {
            if let Err(e) = &result.outcome {
                error!("Error reading {}: {}", result.path.display(), e);
            } else {
                debug!("Parsed {}", result.path.display());
            }
            if let Some(pb) = &progress {
                pb.inc(1);
            }
            results.push(result);
        }

        while let Some(joined) = tasks.join_next().await {
            joined.map_err(|e| Error::task_failed(e.to_string()))??;
        }

        if let Some(pb) = progress {
            pb.finish_with_message(format!("Parsed {} files", results.len()));
        }

        Ok(results)
    }

    fn apply_policy<T>(&self, report: IngestReport<T>) -> Result<IngestReport<T>> {
        if report.is_complete() {
            return Ok(report);
        }

        match self.policy {
            IngestPolicy::EagerAbort => Err(Error::incomplete_ingest(
                report.failures.len(),
                report.attempted(),
            )),
            IngestPolicy::PartialSuccess => {
                info!(
                    "Continuing with {} of {} files ({} failed)",
                    report.corpus.len(),
                    report.attempted(),
                    report.failures.len()
                );
                Ok(report)
            }
        }
    }

    fn progress_bar(&self, total: usize) -> Option<ProgressBar> {
        if !self.show_progress || total == 0 {
            return None;
        }

        let pb = ProgressBar::new(total as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Parsing run sheets");
        Some(pb)
    }
}
