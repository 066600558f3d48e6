//! Run-sheet directory ingestion and lookup commands

use super::shared::{CommandSummary, load_configuration, write_csv};
use crate::app::models::RunSheet;
use crate::app::services::directory_ingester::DirectoryIngester;
use crate::app::services::sample_locator::{LookupCache, SampleLocator};
use crate::cli::args::{FindArgs, GlobalArgs, IndexArgs, RunSheetsArgs};
use anyhow::{Context, Result};
use std::time::Instant;
use tracing::info;

/// Parse a run-sheet directory and export every sample
pub async fn run_run_sheets(global: &GlobalArgs, args: RunSheetsArgs) -> Result<CommandSummary> {
    let start_time = Instant::now();
    let config = load_configuration(global, args.dir.as_deref())?;
    let ingester = DirectoryIngester::from_config(&config)?;

    let report = ingester
        .ingest_run_sheets(&args.exclude)
        .await
        .with_context(|| format!("Failed to ingest {}", ingester.dir().display()))?;

    let records_written = write_csv(
        report.corpus.iter().flat_map(RunSheet::export_rows),
        args.output.as_deref(),
    )?;
    info!(
        "Exported {} samples from {} run sheets",
        records_written,
        report.corpus.len()
    );

    Ok(CommandSummary {
        files_parsed: report.corpus.len(),
        failures: report
            .failures
            .iter()
            .map(|failure| (failure.path.clone(), failure.error.to_string()))
            .collect(),
        records_written,
        output: args.output,
        elapsed: start_time.elapsed(),
        ..CommandSummary::new("Run Sheet Summary")
    })
}

/// Locate one run sheet by run number and export its samples
pub async fn run_find(global: &GlobalArgs, args: FindArgs) -> Result<CommandSummary> {
    let start_time = Instant::now();
    let config = load_configuration(global, args.dir.as_deref())?;

    let mut locator = SampleLocator::from_config(&config)?;
    if args.no_cache {
        locator = locator.with_lookup_path(None);
    }

    let sheet = locator
        .find(args.run_number)
        .await
        .with_context(|| format!("Failed to find run {}", args.run_number))?;
    info!("Run {} is {}", sheet.header.run_number, sheet.filename);

    let records_written = write_csv(sheet.export_rows(), args.output.as_deref())?;

    Ok(CommandSummary {
        files_parsed: 1,
        records_written,
        output: args.output,
        elapsed: start_time.elapsed(),
        ..CommandSummary::new(format!("Run {}", sheet.header.run_number))
    })
}

/// Parse a run-sheet directory and write the run-number lookup cache
pub async fn run_index(global: &GlobalArgs, args: IndexArgs) -> Result<CommandSummary> {
    let start_time = Instant::now();
    let config = load_configuration(global, args.dir.as_deref())?;
    let ingester = DirectoryIngester::from_config(&config)?;

    let report = ingester
        .ingest_run_sheets(&[])
        .await
        .with_context(|| format!("Failed to ingest {}", ingester.dir().display()))?;

    let cache_path = match args.output {
        Some(path) => path,
        None => ingester.dir().join(&config.lookup_file_name),
    };
    let cache = LookupCache::from_run_sheets(&report.corpus);
    cache
        .write(&cache_path)
        .with_context(|| format!("Failed to write {}", cache_path.display()))?;
    info!("Indexed {} runs into {}", cache.len(), cache_path.display());

    Ok(CommandSummary {
        files_parsed: report.corpus.len(),
        failures: report
            .failures
            .iter()
            .map(|failure| (failure.path.clone(), failure.error.to_string()))
            .collect(),
        records_written: cache.len(),
        output: Some(cache_path),
        elapsed: start_time.elapsed(),
        ..CommandSummary::new("Lookup Cache Summary")
    })
}
