//! Test utilities for sample locator testing

use std::path::Path;

use tempfile::TempDir;

use crate::app::services::sheet_parser::tests::{run_sheet_rows, write_run_sheet, write_xlsx};
use crate::constants::run_sheet;

// Test modules
mod cache_tests;

/// Write a headerless lookup cache with the given rows
pub fn write_lookup(path: &Path, rows: &[(&str, &str)]) {
    let body: String = rows
        .iter()
        .map(|(key, file)| format!("{},{}\n", key, file))
        .collect();
    std::fs::write(path, body).unwrap();
}

/// Directory with runs 0041 and 0042 plus a run sheet that fails to parse
pub fn locator_dir() -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    write_run_sheet(
        temp_dir.path(),
        "NovaSeq_0041.xlsx",
        "0041",
        &[("1", "U41-1")],
    );
    write_run_sheet(
        temp_dir.path(),
        "NextSeq_0042.xlsx",
        "0042",
        &[("1", "U42-1"), ("2", "U42-2")],
    );
    temp_dir
}

/// Add a run sheet with the `0` flow cell placeholder
pub fn add_broken_run_sheet(dir: &Path) {
    write_xlsx(
        &dir.join("NovaSeq_0099.xlsx"),
        run_sheet::SHEET_NAME,
        &run_sheet_rows("0099", "0", &[("1", "BAD-1")]),
    );
}
