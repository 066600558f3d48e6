//! Command-line argument definitions for the laboratory spreadsheet processor
//!
//! This module defines the complete CLI interface using the clap derive API.
//! Options shared by every subcommand live on [`GlobalArgs`] and may be given
//! before or after the subcommand name.

use crate::config::{Config, IngestPolicy};
use crate::{Error, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;

/// CLI arguments for the laboratory spreadsheet processor
///
/// Reads array-processing queues, sequencing run sheets and clinical sample
/// logs into typed records and exports them as CSV.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "labsheet-processor",
    version,
    about = "Convert laboratory tracking spreadsheets into typed CSV records",
    long_about = "Reads human-maintained laboratory tracking workbooks (array-processing \
                  queues, sequencing run sheets and clinical sample logs), locates their \
                  variable-position header rows, validates every data row and exports the \
                  resulting records as CSV. Whole run-sheet directories are parsed \
                  concurrently, and individual runs can be located by run number."
)]
pub struct Args {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse every run sheet in a directory and export their samples
    RunSheets(RunSheetsArgs),
    /// Locate one run sheet by run number
    Find(FindArgs),
    /// Parse an array-processing queue workbook
    ArrayQueue(ArrayQueueArgs),
    /// Parse a clinical sample log workbook
    ClinicalLog(ClinicalLogArgs),
    /// Build the run-number lookup cache for a run-sheet directory
    Index(IndexArgs),
}

/// Options accepted by every subcommand
#[derive(Debug, Clone, Default, ClapArgs)]
pub struct GlobalArgs {
    /// Path to configuration file
    ///
    /// TOML configuration file. If not specified, looks for
    /// <config dir>/labsheet-processor/config.toml
    #[arg(
        short = 'c',
        long = "config",
        value_name = "FILE",
        global = true,
        help = "Path to configuration file (TOML format)"
    )]
    pub config_file: Option<PathBuf>,

    /// Number of files parsed concurrently
    #[arg(
        short = 'j',
        long = "workers",
        value_name = "COUNT",
        global = true,
        help = "Number of run sheets parsed concurrently"
    )]
    pub workers: Option<usize>,

    /// What to do when some run sheets in a directory fail to parse
    #[arg(
        long = "policy",
        value_enum,
        value_name = "POLICY",
        global = true,
        help = "Failure policy for directory ingestion"
    )]
    pub policy: Option<IngestPolicy>,

    /// Show a progress bar while parsing directories
    #[arg(long = "progress", global = true, help = "Show a progress bar")]
    pub progress: bool,

    /// Logging verbosity level
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)"
    )]
    pub verbose: u8,

    /// Only show errors
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        help = "Suppress output except errors",
        conflicts_with = "verbose"
    )]
    pub quiet: bool,
}

/// Arguments for the run-sheets command
#[derive(Debug, Clone, Parser)]
pub struct RunSheetsArgs {
    /// Run-sheet directory (overrides configuration)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// File names to leave out (exact match, comma-separated or repeated)
    #[arg(
        short = 'x',
        long = "exclude",
        value_name = "FILE",
        value_delimiter = ','
    )]
    pub exclude: Vec<String>,

    /// CSV output file; stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the find command
#[derive(Debug, Clone, Parser)]
pub struct FindArgs {
    /// Run number, without zero padding
    #[arg(value_name = "RUN_NUMBER")]
    pub run_number: u32,

    /// Run-sheet directory (overrides configuration)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Skip the lookup cache and scan the directory
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// CSV output file; stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the array-queue command
#[derive(Debug, Clone, Parser)]
pub struct ArrayQueueArgs {
    /// Array-processing queue workbook
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// CSV output file; stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the clinical-log command
#[derive(Debug, Clone, Parser)]
pub struct ClinicalLogArgs {
    /// Clinical sample log workbook
    #[arg(value_name = "FILE")]
    pub input: PathBuf,

    /// Workbook password (overrides configuration)
    #[arg(long = "password", value_name = "PASSWORD")]
    pub password: Option<String>,

    /// CSV output file; stdout when omitted
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

/// Arguments for the index command
#[derive(Debug, Clone, Parser)]
pub struct IndexArgs {
    /// Run-sheet directory (overrides configuration)
    #[arg(short = 'd', long = "dir", value_name = "PATH")]
    pub dir: Option<PathBuf>,

    /// Cache file to write; defaults to the configured lookup file in the directory
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,
}

impl GlobalArgs {
    /// Validate the shared arguments for consistency
    pub fn validate(&self) -> Result<()> {
        if self.workers == Some(0) {
            return Err(Error::configuration(
                "Number of workers must be greater than 0",
            ));
        }

        if let Some(config_file) = &self.config_file {
            if !config_file.exists() {
                return Err(Error::configuration(format!(
                    "Config file does not exist: {}",
                    config_file.display()
                )));
            }
        }

        Ok(())
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (never in quiet mode)
    pub fn show_progress(&self) -> bool {
        self.progress && !self.quiet
    }

    /// Apply command-line overrides on top of a loaded configuration
    pub fn apply_to(&self, mut config: Config) -> Config {
        if let Some(workers) = self.workers {
            config = config.with_workers(workers);
        }
        if let Some(policy) = self.policy {
            config = config.with_ingest_policy(policy);
        }
        if self.show_progress() {
            config = config.with_progress(true);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_run_sheets_command() {
        let args = Args::try_parse_from([
            "labsheet-processor",
            "run-sheets",
            "--dir",
            "/data/runs",
            "--exclude",
            "NovaSeq_a.xlsx,NovaSeq_b.xlsx",
            "-x",
            "NovaSeq_c.xlsx",
            "--policy",
            "partial-success",
            "-vv",
        ])
        .unwrap();

        assert_eq!(args.global.verbose, 2);
        assert_eq!(args.global.policy, Some(IngestPolicy::PartialSuccess));
        match args.command {
            Some(Commands::RunSheets(run_args)) => {
                assert_eq!(run_args.dir, Some(PathBuf::from("/data/runs")));
                assert_eq!(
                    run_args.exclude,
                    vec!["NovaSeq_a.xlsx", "NovaSeq_b.xlsx", "NovaSeq_c.xlsx"]
                );
                assert!(run_args.output.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_find_command() {
        let args =
            Args::try_parse_from(["labsheet-processor", "-j", "2", "find", "42", "--no-cache"])
                .unwrap();

        assert_eq!(args.global.workers, Some(2));
        match args.command {
            Some(Commands::Find(find_args)) => {
                assert_eq!(find_args.run_number, 42);
                assert!(find_args.no_cache);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_find_rejects_non_numeric_run() {
        assert!(Args::try_parse_from(["labsheet-processor", "find", "run42"]).is_err());
    }

    #[test]
    fn test_quiet_conflicts_with_verbose() {
        assert!(
            Args::try_parse_from(["labsheet-processor", "-q", "-v", "index"]).is_err()
        );
    }

    #[test]
    fn test_log_level() {
        let mut args = GlobalArgs::default();
        assert_eq!(args.get_log_level(), "warn");

        args.verbose = 1;
        assert_eq!(args.get_log_level(), "info");

        args.verbose = 3;
        assert_eq!(args.get_log_level(), "trace");

        args.verbose = 0;
        args.quiet = true;
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_show_progress() {
        let mut args = GlobalArgs {
            progress: true,
            ..Default::default()
        };
        assert!(args.show_progress());

        args.quiet = true;
        assert!(!args.show_progress());
    }

    #[test]
    fn test_validation() {
        let temp_dir = TempDir::new().unwrap();

        let args = GlobalArgs {
            workers: Some(0),
            ..Default::default()
        };
        assert!(args.validate().is_err());

        let args = GlobalArgs {
            config_file: Some(temp_dir.path().join("missing.toml")),
            ..Default::default()
        };
        assert!(args.validate().is_err());

        let config_file = temp_dir.path().join("config.toml");
        std::fs::write(&config_file, "workers = 2\n").unwrap();
        let args = GlobalArgs {
            config_file: Some(config_file),
            workers: Some(4),
            ..Default::default()
        };
        assert!(args.validate().is_ok());
    }

    #[test]
    fn test_apply_to_config() {
        let args = GlobalArgs {
            workers: Some(3),
            policy: Some(IngestPolicy::PartialSuccess),
            progress: true,
            ..Default::default()
        };

        let config = args.apply_to(Config::default());
        assert_eq!(config.workers, 3);
        assert_eq!(config.ingest_policy, IngestPolicy::PartialSuccess);
        assert!(config.show_progress);

        let config = GlobalArgs::default().apply_to(Config::default().with_workers(5));
        assert_eq!(config.workers, 5);
        assert_eq!(config.ingest_policy, IngestPolicy::EagerAbort);
    }
}
