//! Shared components for CLI commands
//!
//! Logging setup, layered configuration loading, CSV export and the colored
//! summary printed after every command.

use crate::cli::args::GlobalArgs;
use crate::config::Config;
use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Outcome of one command, reported once it finishes
#[derive(Debug, Clone, Default)]
pub struct CommandSummary {
    /// Heading for the summary block
    pub title: String,
    /// Workbooks parsed successfully
    pub files_parsed: usize,
    /// Workbooks that failed, with the reason
    pub failures: Vec<(PathBuf, String)>,
    /// Records written to the output
    pub records_written: usize,
    /// Output file, or `None` for stdout
    pub output: Option<PathBuf>,
    /// Wall-clock time for the command
    pub elapsed: Duration,
}

impl CommandSummary {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Print the summary to stderr so CSV on stdout stays clean
    pub fn print(&self) {
        eprintln!("\n{}", self.title.bright_green().bold());
        eprintln!(
            "  {} {}ms",
            "Time elapsed:".bright_cyan(),
            self.elapsed.as_millis().to_string().bright_white()
        );
        eprintln!(
            "  {} {}",
            "Files parsed:".bright_cyan(),
            self.files_parsed.to_string().bright_white()
        );
        if !self.failures.is_empty() {
            eprintln!(
                "  {} {}",
                "Files failed:".bright_red(),
                self.failures.len().to_string().bright_red().bold()
            );
            for (path, reason) in &self.failures {
                eprintln!("    {} {}", path.display().to_string().red(), reason);
            }
        }
        eprintln!(
            "  {} {}",
            "Records written:".bright_cyan(),
            self.records_written.to_string().bright_white().bold()
        );
        if let Some(output) = &self.output {
            eprintln!(
                "  {} {}",
                "Output:".bright_cyan(),
                output.display().to_string().bright_white()
            );
        }
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &GlobalArgs) -> Result<()> {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("labsheet_processor={}", log_level)));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("Failed to initialise logging")?;

    debug!("Logging initialized at level: {}", log_level);
    Ok(())
}

/// Load configuration: defaults, file, environment, then command-line overrides
pub fn load_configuration(args: &GlobalArgs, run_sheet_dir: Option<&Path>) -> Result<Config> {
    let mut config =
        Config::load(args.config_file.as_deref()).context("Failed to load configuration")?;

    if let Some(dir) = run_sheet_dir {
        config = config.with_run_sheet_dir(dir);
    }
    let config = args.apply_to(config);

    config.validate().context("Invalid configuration")?;
    debug!("Loaded configuration: {:?}", config);
    Ok(config)
}

/// Serialize `rows` as CSV with a header row, to `output` or stdout
pub fn write_csv<I, S>(rows: I, output: Option<&Path>) -> Result<usize>
where
    I: IntoIterator<Item = S>,
    S: Serialize,
{
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .with_context(|| format!("Failed to create output file {}", path.display()))?,
        )),
        None => Box::new(io::stdout().lock()),
    };

    let mut writer = csv::Writer::from_writer(sink);
    let mut written = 0;
    for row in rows {
        writer
            .serialize(row)
            .context("Failed to write CSV record")?;
        written += 1;
    }
    writer.flush().context("Failed to flush CSV output")?;

    Ok(written)
}
