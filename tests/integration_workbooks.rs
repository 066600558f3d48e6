//! End-to-end tests for array-queue and clinical-log workbooks

use chrono::NaiveDate;
use labsheet_processor::app::services::sheet_parser::{
    ClinicalLogSchema, SheetSchema, parse_array_queue, parse_clinical_log,
};
use labsheet_processor::cli::args::{ArrayQueueArgs, ClinicalLogArgs, GlobalArgs};
use labsheet_processor::cli::commands::workbooks::{run_array_queue, run_clinical_log};
use labsheet_processor::{Error, ErrorCategory};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn column(name: &str) -> u16 {
    ClinicalLogSchema::FIELDS
        .iter()
        .position(|spec| spec.column == name)
        .unwrap() as u16
}

fn write_clinical_header(sheet: &mut Worksheet) {
    sheet.write_string(0, 0, "ATG Sample Log").unwrap();
    for (col, spec) in ClinicalLogSchema::FIELDS.iter().enumerate() {
        sheet.write_string(2, col as u16, spec.column).unwrap();
    }
}

/// Clinical log with a real date cell, a text DOB, a skipped row and trailing notes
fn write_clinical_log(dir: &Path, gender: &str) -> PathBuf {
    let path = dir.join("sample_log.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("ATG Sample Log").unwrap();
    write_clinical_header(sheet);

    let date_format = Format::new().set_num_format("dd/mm/yyyy");

    sheet.write_string(3, column("SampleName"), "UIN-1").unwrap();
    sheet.write_string(3, column("SubjectID"), "SUBJ-1").unwrap();
    sheet.write_string(3, column("Status"), "Received").unwrap();
    sheet
        .write_number_with_format(3, column("Receipt date"), 45000.0, &date_format)
        .unwrap();
    sheet
        .write_string(3, column("Sample Collection Date"), "14/03/2023")
        .unwrap();
    sheet.write_string(3, column("DOB"), "1-Jan-1980").unwrap();
    sheet.write_string(3, column("Gender"), gender).unwrap();
    sheet.write_string(3, column("UR"), "NA").unwrap();

    sheet.write_string(4, column("SampleName"), "UIN-2").unwrap();
    sheet.write_string(4, column("SubjectID"), "SUBJ-2").unwrap();
    sheet
        .write_string(4, column("Status"), "Duplicate - Exclude")
        .unwrap();

    sheet.write_string(5, column("SubjectID"), "SUBJ-3").unwrap();
    sheet.write_string(5, column("DOB"), "sometime in 1975").unwrap();

    sheet.write_string(7, column("SampleName"), "notes").unwrap();

    workbook.save(&path).unwrap();
    path
}

fn write_array_queue(dir: &Path) -> PathBuf {
    let path = dir.join("ifm_queue.xlsx");
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name("IFM Queue").unwrap();

    let header = [
        "UIN",
        "SubjectID",
        "ProjectID",
        "Beadchip version",
        "BeadChip Sentrix ID",
        "Beadchip Sentrix Position",
    ];
    sheet.write_string(0, 0, "Infinium queue").unwrap();
    for (col, name) in header.iter().enumerate() {
        sheet.write_string(1, col as u16, *name).unwrap();
    }

    let rows = [
        ["UIN-10", "SUBJ-10", "PRJ", "GSA-24v3", "205771890123", "R01C01"],
        ["UIN-11", "SUBJ-11", "NA", "GSA-24v3", "205771890123", "R02C01"],
    ];
    for (offset, row) in rows.iter().enumerate() {
        for (col, value) in row.iter().enumerate() {
            sheet
                .write_string(2 + offset as u32, col as u16, *value)
                .unwrap();
        }
    }
    sheet.write_string(5, 0, "UIN-99").unwrap();

    workbook.save(&path).unwrap();
    path
}

#[test]
fn test_parse_array_queue_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_array_queue(temp_dir.path());

    let samples = parse_array_queue(&path).unwrap();

    assert_eq!(samples.len(), 2);
    assert_eq!(samples[0].sentrix_position, "R01C01");
    assert_eq!(samples[1].project_id, "");
    assert!(samples.iter().all(|sample| sample.infinium_id.is_empty()));
}

#[test]
fn test_parse_clinical_log_workbook() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_clinical_log(temp_dir.path(), "female");

    let log = parse_clinical_log(&path, None).unwrap();

    assert_eq!(log.samples.len(), 2);
    let first = &log.samples[0];
    assert_eq!(first.uin, "UIN-1");
    assert_eq!(first.gender, "FEMALE");
    assert_eq!(first.urn, "");
    assert_eq!(
        first.receipt_date.date(),
        NaiveDate::from_ymd_opt(2023, 3, 15)
    );
    assert_eq!(
        first.sample_collection_date.date(),
        NaiveDate::from_ymd_opt(2023, 3, 14)
    );
    assert_eq!(first.dob.date(), NaiveDate::from_ymd_opt(1980, 1, 1));
    assert!(first.consent_received_date.is_absent());

    // Empty SampleName with a SubjectID is still data; its bad DOB is dropped
    let second = &log.samples[1];
    assert_eq!(second.subject_id, "SUBJ-3");
    assert!(second.dob.is_absent());

    assert!(log.by_uin().contains_key("UIN-1"));
    assert!(!log.by_uin().contains_key("UIN-2"));
}

#[test]
fn test_clinical_log_rejects_unknown_gender() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_clinical_log(temp_dir.path(), "unknown");

    let err = parse_clinical_log(&path, None).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::Validation);
    assert!(err.file().unwrap().ends_with("sample_log.xlsx"));
    assert!(matches!(err.root(), Error::Validation { row: 4, .. }));
}

#[test]
fn test_password_on_plain_workbook_is_accepted() {
    let temp_dir = TempDir::new().unwrap();
    let path = write_clinical_log(temp_dir.path(), "MALE");

    let log = parse_clinical_log(&path, Some("secret")).unwrap();
    assert_eq!(log.samples[0].gender, "MALE");
}

#[tokio::test]
async fn test_workbook_commands_write_csv() {
    let temp_dir = TempDir::new().unwrap();
    let args = GlobalArgs {
        quiet: true,
        ..Default::default()
    };

    let queue_csv = temp_dir.path().join("queue.csv");
    let summary = run_array_queue(
        &args,
        ArrayQueueArgs {
            input: write_array_queue(temp_dir.path()),
            output: Some(queue_csv.clone()),
        },
    )
    .await
    .unwrap();
    assert_eq!(summary.records_written, 2);
    assert!(
        std::fs::read_to_string(&queue_csv)
            .unwrap()
            .contains("UIN-11,SUBJ-11,,")
    );

    let log_csv = temp_dir.path().join("log.csv");
    let summary = run_clinical_log(
        &args,
        ClinicalLogArgs {
            input: write_clinical_log(temp_dir.path(), "Male"),
            password: None,
            output: Some(log_csv.clone()),
        },
    )
    .await
    .unwrap();
    assert_eq!(summary.records_written, 2);
    let csv = std::fs::read_to_string(&log_csv).unwrap();
    assert!(csv.contains("2023-03-15"));
    assert!(csv.contains("1980-01-01"));
}
