//! Per-family parse entry points
//!
//! The `parse_*` functions open a workbook, parse it and drop it before
//! returning, on success and failure alike. The `read_*` functions do the same
//! work over any [`CellReader`]. Every error leaving this module carries the
//! name of the file it came from.

use std::path::Path;

use tracing::{debug, info};

use super::column_index::locate_header;
use super::metadata::parse_metadata;
use super::scanner::{RecordScanner, SheetSchema};
use super::schemas::{ArrayQueueSchema, ClinicalLogSchema, RunSheetSchema};
use crate::app::models::{ArrayQueueSample, ClinicalLog, RunSheet};
use crate::app::services::workbook::{CellReader, Workbook};
use crate::constants::run_sheet;
use crate::{Error, Result};

/// Parse an array-processing queue workbook
pub fn parse_array_queue(path: &Path) -> Result<Vec<ArrayQueueSample>> {
    let workbook = open(path, None)?;
    read_array_queue(&workbook)
}

/// Parse a sequencing run-sheet workbook
pub fn parse_run_sheet(path: &Path) -> Result<RunSheet> {
    let workbook = open(path, None)?;
    read_run_sheet(&workbook)
}

/// Parse a clinical sample log workbook, optionally password-protected
pub fn parse_clinical_log(path: &Path, password: Option<&str>) -> Result<ClinicalLog> {
    let workbook = open(path, password)?;
    read_clinical_log(&workbook)
}

pub fn read_array_queue<R: CellReader + ?Sized>(reader: &R) -> Result<Vec<ArrayQueueSample>> {
    let samples = scan_all::<R, ArrayQueueSchema>(reader)?;
    info!(
        "Read {} queued samples from {}",
        samples.len(),
        reader.source_name()
    );
    Ok(samples)
}

pub fn read_run_sheet<R: CellReader + ?Sized>(reader: &R) -> Result<RunSheet> {
    let file = reader.source_name();
    let sheet = RunSheetSchema::SHEET_NAME;

    let parse = || -> Result<RunSheet> {
        let location = locate_header(reader, sheet, RunSheetSchema::HEADER)?;
        let marker_row = location
            .marker_row
            .ok_or_else(|| Error::marker_not_found(sheet, run_sheet::DATA_MARKER))?;

        let header = parse_metadata(reader, sheet, marker_row)?;
        debug!(
            "Run {} on flow cell {} ({})",
            header.run_number, header.flow_cell_id, file
        );

        let samples = RecordScanner::<R, RunSheetSchema>::with_location(reader, location)
            .collect_records()?;

        Ok(RunSheet {
            filename: file.to_string(),
            header,
            samples,
        })
    };

    let run_sheet = parse().map_err(|e| e.in_file(file))?;
    info!(
        "Read run {} with {} samples from {}",
        run_sheet.header.run_number,
        run_sheet.samples.len(),
        file
    );
    Ok(run_sheet)
}

pub fn read_clinical_log<R: CellReader + ?Sized>(reader: &R) -> Result<ClinicalLog> {
    let samples = scan_all::<R, ClinicalLogSchema>(reader)?;
    info!(
        "Read {} clinical samples from {}",
        samples.len(),
        reader.source_name()
    );
    Ok(ClinicalLog {
        filename: reader.source_name().to_string(),
        samples,
    })
}

fn scan_all<R: CellReader + ?Sized, S: SheetSchema>(reader: &R) -> Result<Vec<S::Record>> {
    RecordScanner::<R, S>::open(reader)
        .and_then(|scanner| scanner.collect_records())
        .map_err(|e| e.in_file(reader.source_name()))
}

fn open(path: &Path, password: Option<&str>) -> Result<Workbook> {
    Workbook::open_with_password(path, password).map_err(|e| e.in_file(path.display().to_string()))
}
