//! Single-workbook commands

use super::shared::{CommandSummary, load_configuration, write_csv};
use crate::app::services::sheet_parser::{parse_array_queue, parse_clinical_log};
use crate::cli::args::{ArrayQueueArgs, ClinicalLogArgs, GlobalArgs};
use anyhow::{Context, Result};
use std::time::Instant;
use tokio::task;

/// Parse an array-processing queue and export its samples
pub async fn run_array_queue(
    global: &GlobalArgs,
    args: ArrayQueueArgs,
) -> Result<CommandSummary> {
    let start_time = Instant::now();
    load_configuration(global, None)?;

    let input = args.input.clone();
    let samples = task::spawn_blocking(move || parse_array_queue(&input))
        .await
        .context("Array queue parse task failed")??;

    let records_written = write_csv(&samples, args.output.as_deref())?;

    Ok(CommandSummary {
        files_parsed: 1,
        records_written,
        output: args.output,
        elapsed: start_time.elapsed(),
        ..CommandSummary::new("Array Queue Summary")
    })
}

/// Parse a clinical sample log and export its samples
pub async fn run_clinical_log(
    global: &GlobalArgs,
    args: ClinicalLogArgs,
) -> Result<CommandSummary> {
    let start_time = Instant::now();
    let config = load_configuration(global, None)?;

    let input = args.input.clone();
    let password = args.password.or(config.clinical_log_password);
    let log = task::spawn_blocking(move || parse_clinical_log(&input, password.as_deref()))
        .await
        .context("Clinical log parse task failed")??;

    let records_written = write_csv(&log.samples, args.output.as_deref())?;

    Ok(CommandSummary {
        files_parsed: 1,
        records_written,
        output: args.output,
        elapsed: start_time.elapsed(),
        ..CommandSummary::new("Clinical Log Summary")
    })
}
