//! Run-sheet metadata block extraction
//!
//! The rows above the `[Data]` marker hold one key/value pair each: the key in
//! the first column, the value in the second. Known keys are coerced strictly;
//! unknown keys are ignored so that new template rows do not break parsing.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use tracing::debug;

use crate::app::models::RunSheetHeader;
use crate::app::services::workbook::CellReader;
use crate::constants::{
    FLOW_CELL_ID_PLACEHOLDERS, FLOW_CELL_POSITIONS, METADATA_DATE_INPUT_FORMAT,
    METADATA_DATE_OUTPUT_FORMAT,
};
use crate::{Error, Result};

const SEQUENCING_START_DATE: &str = "Sequencing Start Date";
const FLOW_CELL_ID: &str = "Flow Cell ID";

/// Two digits per field; chrono alone would accept `3-15-23`
static START_DATE_SHAPE: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^\d{2}-\d{2}-\d{2}$").ok());

/// Parse the metadata rows `0..marker_row` of `sheet`
pub fn parse_metadata<R: CellReader + ?Sized>(
    reader: &R,
    sheet: &str,
    marker_row: usize,
) -> Result<RunSheetHeader> {
    let mut header = RunSheetHeader::default();
    let mut seen_start_date = false;

    for row in reader.rows(sheet)?.iter().take(marker_row) {
        let key = row.first().map(|cell| cell.trim()).unwrap_or_default();
        let value = row.get(1).map(|cell| cell.trim()).unwrap_or_default();

        match key {
            SEQUENCING_START_DATE => {
                header.sequencing_start_date = parse_start_date(value)?;
                seen_start_date = true;
            }
            "Instrument Name" => header.instrument_name = value.to_string(),
            "Run Number" => header.run_number = value.to_string(),
            "Flow Cell Position" => {
                if !FLOW_CELL_POSITIONS.contains(&value) {
                    return Err(Error::invalid_metadata(
                        key,
                        value,
                        "expected A or B",
                    ));
                }
                header.flow_cell_position = value.to_string();
            }
            FLOW_CELL_ID => header.flow_cell_id = value.to_string(),
            "Run Name" => header.run_name = value.to_string(),
            "Flow Cell Type" => header.flow_cell_type = value.to_string(),
            "Version" => header.version = value.to_string(),
            "Run Type" => header.run_type = value.to_string(),
            "Workflow" => header.workflow = value.to_string(),
            "Indexing" => header.indexing = value.to_string(),
            "Read 1 Cycles" => header.read1_cycles = parse_cycles(key, value)?,
            "Read 2 Cycles" => header.read2_cycles = parse_cycles(key, value)?,
            "i7 Index Read Cycles" => header.i7_index_read_cycles = parse_cycles(key, value)?,
            "i5 Index Read Cycles" => header.i5_index_read_cycles = parse_cycles(key, value)?,
            "" => {}
            other => debug!("Ignoring unknown metadata key '{}'", other),
        }
    }

    if !seen_start_date {
        return Err(Error::missing_metadata(SEQUENCING_START_DATE));
    }

    if header.flow_cell_id.is_empty() {
        return Err(Error::missing_metadata(FLOW_CELL_ID));
    }
    if FLOW_CELL_ID_PLACEHOLDERS.contains(&header.flow_cell_id.as_str()) {
        return Err(Error::invalid_metadata(
            FLOW_CELL_ID,
            &header.flow_cell_id,
            "placeholder flow cell ID",
        ));
    }

    Ok(header)
}

/// `MM-DD-YY` in, `DD/MM/YYYY` out
fn parse_start_date(value: &str) -> Result<String> {
    if value.is_empty() {
        return Err(Error::missing_metadata(SEQUENCING_START_DATE));
    }
    if !START_DATE_SHAPE
        .as_ref()
        .is_some_and(|shape| shape.is_match(value))
    {
        return Err(Error::invalid_metadata(
            SEQUENCING_START_DATE,
            value,
            "expected MM-DD-YY",
        ));
    }

    NaiveDate::parse_from_str(value, METADATA_DATE_INPUT_FORMAT)
        .map(|date| date.format(METADATA_DATE_OUTPUT_FORMAT).to_string())
        .map_err(|e| Error::invalid_metadata(SEQUENCING_START_DATE, value, e.to_string()))
}

fn parse_cycles(key: &str, value: &str) -> Result<i64> {
    value
        .parse::<i64>()
        .map_err(|e| Error::invalid_metadata(key, value, e.to_string()))
}
