//! Test utilities for sheet parser testing
//!
//! Builders for in-memory workbooks and real `.xlsx` fixtures shared by the
//! parser, ingester and locator tests.

use std::path::Path;

use calamine::Data;
use rust_xlsxwriter::Workbook as XlsxWriter;

use super::scanner::SheetSchema;
use super::schemas::{ArrayQueueSchema, ClinicalLogSchema};
use crate::app::services::workbook::Workbook;
use crate::constants::{array_queue, clinical_log, run_sheet};


fn to_data(text: &str) -> Data {
    if text.is_empty() {
        Data::Empty
    } else {
        Data::String(text.to_string())
    }
}

/// In-memory workbook with one sheet of text cells
pub fn text_workbook(sheet: &str, rows: &[&[&str]]) -> Workbook {
    let grid = rows
        .iter()
        .map(|row| row.iter().map(|cell| to_data(cell)).collect())
        .collect();
    Workbook::from_sheets("memory.xlsx", [(sheet.to_string(), grid)])
}

/// In-memory workbook built from owned rows
pub fn rows_workbook(file: &str, sheet: &str, rows: &[Vec<String>]) -> Workbook {
    let grid = rows
        .iter()
        .map(|row| row.iter().map(|cell| to_data(cell)).collect())
        .collect();
    Workbook::from_sheets(file, [(sheet.to_string(), grid)])
}

/// Write rows of text cells to a real `.xlsx` file
pub fn write_xlsx(path: &Path, sheet: &str, rows: &[Vec<String>]) {
    let mut writer = XlsxWriter::new();
    let worksheet = writer.add_worksheet();
    worksheet.set_name(sheet).unwrap();

    for (row, cells) in rows.iter().enumerate() {
        for (col, text) in cells.iter().enumerate() {
            if !text.is_empty() {
                worksheet
                    .write_string(row as u32, col as u16, text.as_str())
                    .unwrap();
            }
        }
    }

    writer.save(path).unwrap();
}

fn strings(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|cell| cell.to_string()).collect()
}

/// Run-sheet rows: metadata block, `[Data]` marker, two filler rows, header, samples
///
/// Each sample is `(SampleID, SampleName)`.
pub fn run_sheet_rows(
    run_number: &str,
    flow_cell_id: &str,
    samples: &[(&str, &str)],
) -> Vec<Vec<String>> {
    let mut rows = vec![
        strings(&["[Header]"]),
        strings(&["Sequencing Start Date", "03-15-23"]),
        strings(&["Instrument Name", "A01221"]),
        strings(&["Run Number", run_number]),
        strings(&["Flow Cell Position", "A"]),
        strings(&["Flow Cell ID", flow_cell_id]),
        strings(&["Run Name", "exome-batch"]),
        strings(&["Read 1 Cycles", "151"]),
        strings(&["Read 2 Cycles", "151"]),
        strings(&["i7 Index Read Cycles", "8"]),
        strings(&["i5 Index Read Cycles", "8"]),
        Vec::new(),
        strings(&[run_sheet::DATA_MARKER]),
        strings(&["Lane assignments follow"]),
        Vec::new(),
        strings(&[
            "SampleID",
            "SampleName",
            "LaneNumber",
            "SubjectID",
            "ProjectID",
            "Cohort",
            "LibraryType",
            "CaptureType",
            "LibraryID",
            "CaptureID",
            "Index",
            "Index2",
            "I7indexiD",
            "I5indexiD",
        ]),
    ];

    for &(id, uin) in samples {
        rows.push(strings(&[
            id, uin, "1", "SUBJ-1", "PRJ", "cohort-a", "WES", "Exome", "LIB1", "CAP1", "ACGT",
            "TTGA", "UDI0001", "UDI0001",
        ]));
    }
    rows
}

/// Write a run sheet to `dir/<file>` and return its path
pub fn write_run_sheet(
    dir: &Path,
    file: &str,
    run_number: &str,
    samples: &[(&str, &str)],
) -> std::path::PathBuf {
    let path = dir.join(file);
    write_xlsx(
        &path,
        run_sheet::SHEET_NAME,
        &run_sheet_rows(run_number, "HVLKJDSX3", samples),
    );
    path
}

/// Header row carrying every column `S` reads
pub fn schema_header<S: SheetSchema>() -> Vec<String> {
    S::FIELDS.iter().map(|spec| spec.column.to_string()).collect()
}

/// Data row aligned to [`schema_header`], unspecified columns empty
pub fn schema_row<S: SheetSchema>(values: &[(&str, &str)]) -> Vec<String> {
    S::FIELDS
        .iter()
        .map(|spec| {
            values
                .iter()
                .find(|(column, _)| *column == spec.column)
                .map(|(_, value)| value.to_string())
                .unwrap_or_default()
        })
        .collect()
}

/// Clinical log rows: title, blank row, header, then `data`
pub fn clinical_log_rows(data: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut rows = vec![strings(&["ATG Sample Log"]), Vec::new()];
    assert_eq!(rows.len(), clinical_log::HEADER_ROW);
    rows.push(schema_header::<ClinicalLogSchema>());
    rows.extend(data.iter().cloned());
    rows
}

/// Array queue rows: title, header, then `data`
pub fn array_queue_rows(data: &[Vec<String>]) -> Vec<Vec<String>> {
    let mut rows = vec![strings(&["Infinium queue"])];
    assert_eq!(rows.len(), array_queue::HEADER_ROW);
    rows.push(schema_header::<ArrayQueueSchema>());
    rows.extend(data.iter().cloned());
    rows
}
