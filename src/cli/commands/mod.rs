//! Command implementations for the laboratory spreadsheet processor CLI
//!
//! Each command loads the layered configuration, runs one service and writes
//! CSV to a file or stdout:
//! - `run_sheets`: directory ingestion, run lookup and the lookup cache
//! - `workbooks`: single array-queue and clinical-log workbooks

pub mod run_sheets;
pub mod shared;
pub mod workbooks;

pub use shared::CommandSummary;

use crate::cli::args::{Args, Commands};
use anyhow::{Result, bail};
use tracing::debug;

/// Main command runner
///
/// Validates the shared options, installs logging, dispatches to the
/// subcommand and prints its summary unless running quietly.
pub async fn run(args: Args) -> Result<CommandSummary> {
    let Args { global, command } = args;
    let Some(command) = command else {
        bail!("No command given");
    };

    global.validate()?;
    shared::setup_logging(&global)?;
    debug!("Command line arguments: {:?}", command);

    let summary = match command {
        Commands::RunSheets(sub) => run_sheets::run_run_sheets(&global, sub).await?,
        Commands::Find(sub) => run_sheets::run_find(&global, sub).await?,
        Commands::Index(sub) => run_sheets::run_index(&global, sub).await?,
        Commands::ArrayQueue(sub) => workbooks::run_array_queue(&global, sub).await?,
        Commands::ClinicalLog(sub) => workbooks::run_clinical_log(&global, sub).await?,
    };

    if !global.quiet {
        summary.print();
    }
    Ok(summary)
}
