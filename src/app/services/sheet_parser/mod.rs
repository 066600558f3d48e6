//! Tabular ingestion engine for laboratory spreadsheets
//!
//! Turns one worksheet into a sequence of typed records. The three spreadsheet
//! families share a single engine and differ only in their schema tables.
//!
//! ## Architecture
//!
//! - [`column_index`] - Header row location (fixed row or marker offset) and column mapping
//! - [`date_decoder`] - Serial and free-text date decoding
//! - [`fields`] - Declarative field descriptors and row resolution
//! - [`scanner`] - Stateful record scanner and the [`SheetSchema`] trait
//! - [`metadata`] - Run-sheet key/value metadata block
//! - [`schemas`] - Array queue, run sheet and clinical log tables
//! - [`parser`] - Per-family entry points over files or any [`CellReader`]
//!
//! ## Usage
//!
//! ```rust,no_run
//! use labsheet_processor::app::services::sheet_parser::parse_run_sheet;
//!
//! # fn example() -> labsheet_processor::Result<()> {
//! let run_sheet = parse_run_sheet(std::path::Path::new("NovaSeq_0042.xlsx"))?;
//! println!(
//!     "Run {} has {} samples",
//!     run_sheet.header.run_number,
//!     run_sheet.samples.len()
//! );
//! # Ok(())
//! # }
//! ```
//!
//! [`CellReader`]: crate::app::services::workbook::CellReader

pub mod column_index;
pub mod date_decoder;
pub mod fields;
pub mod metadata;
pub mod parser;
pub mod scanner;
pub mod schemas;

#[cfg(test)]
pub mod tests;

// Re-export main types for easy access
pub use column_index::{ColumnIndex, HeaderLocation, HeaderStrategy, locate_header};
pub use date_decoder::decode_date;
pub use parser::{
    parse_array_queue, parse_clinical_log, parse_run_sheet, read_array_queue, read_clinical_log,
    read_run_sheet,
};
pub use scanner::{RecordScanner, SheetSchema};
pub use schemas::{ArrayQueueSchema, ClinicalLogSchema, RunSheetSchema};
