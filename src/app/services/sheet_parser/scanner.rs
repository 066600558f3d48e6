//! Stateful row scanner producing typed records
//!
//! [`RecordScanner`] walks the data rows of one sheet with a single cursor.
//! Each [`advance`](RecordScanner::advance) yields at most one record. The
//! scan ends cleanly at the first row whose end-of-data columns are all empty,
//! and ends with an error on the first row that cannot be resolved or fails
//! validation. The two endings are told apart through
//! [`error`](RecordScanner::error).

use std::marker::PhantomData;

use tracing::debug;

use super::column_index::{ColumnIndex, HeaderLocation, HeaderStrategy, locate_header};
use super::fields::{FieldSpec, ResolvedRow, cell_text, resolve_row};
use crate::app::services::workbook::CellReader;
use crate::{Error, Result};

/// Layout and record rules of one spreadsheet family
pub trait SheetSchema {
    type Record;

    /// Worksheet holding the data table
    const SHEET_NAME: &'static str;

    /// How the header row is found
    const HEADER: HeaderStrategy;

    /// Every field of the record and the column it comes from
    const FIELDS: &'static [FieldSpec];

    /// Data ends at the first row where all of these columns are empty
    const END_OF_DATA_COLUMNS: &'static [&'static str];

    /// Whether the `NA` placeholder reads as an empty cell
    const NA_IS_EMPTY: bool = false;

    /// Assemble a record from resolved field values
    fn build(row: ResolvedRow) -> Self::Record;

    /// Rows that are silently passed over
    fn skip(_record: &Self::Record) -> bool {
        false
    }

    /// Record-level checks; `row` is zero-based
    fn validate(_record: &Self::Record, _row: usize) -> Result<()> {
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Scanning,
    Done,
}

/// Cursor over the data rows of one sheet
pub struct RecordScanner<'a, R: CellReader + ?Sized, S: SheetSchema> {
    reader: &'a R,
    columns: ColumnIndex,
    row: usize,
    state: ScanState,
    record: Option<S::Record>,
    error: Option<Error>,
    _schema: PhantomData<S>,
}

impl<'a, R: CellReader + ?Sized, S: SheetSchema> RecordScanner<'a, R, S> {
    /// Locate the header with the schema's strategy and position the cursor on the first data row
    pub fn open(reader: &'a R) -> Result<Self> {
        let location = locate_header(reader, S::SHEET_NAME, S::HEADER)?;
        Ok(Self::with_location(reader, location))
    }

    /// Start scanning from an already located header
    pub fn with_location(reader: &'a R, location: HeaderLocation) -> Self {
        Self {
            reader,
            columns: location.columns,
            row: location.data_start,
            state: ScanState::Scanning,
            record: None,
            error: None,
            _schema: PhantomData,
        }
    }

    /// Move to the next record
    ///
    /// Returns `false` once the scan is over, and keeps returning `false` on
    /// every later call.
    pub fn advance(&mut self) -> bool {
        if self.state == ScanState::Done {
            return false;
        }

        match self.next_record() {
            Ok(Some(record)) => {
                self.record = Some(record);
                self.row += 1;
                true
            }
            Ok(None) => {
                debug!("End of data in '{}' at row {}", S::SHEET_NAME, self.row + 1);
                self.finish(None);
                false
            }
            Err(e) => {
                debug!("Scan of '{}' stopped at row {}: {}", S::SHEET_NAME, self.row + 1, e);
                self.finish(Some(e));
                false
            }
        }
    }

    /// Record produced by the last successful advance
    pub fn record(&self) -> Option<&S::Record> {
        self.record.as_ref()
    }

    /// Move the current record out of the scanner
    pub fn take_record(&mut self) -> Option<S::Record> {
        self.record.take()
    }

    /// Error that ended the scan, if it did not end cleanly
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.state == ScanState::Done
    }

    /// Zero-based row the cursor points at
    pub fn row(&self) -> usize {
        self.row
    }

    /// Drain the scanner into a vector, failing with the terminal error if there was one
    pub fn collect_records(mut self) -> Result<Vec<S::Record>> {
        let mut records = Vec::new();
        while self.advance() {
            if let Some(record) = self.take_record() {
                records.push(record);
            }
        }

        match self.error.take() {
            Some(e) => Err(e),
            None => Ok(records),
        }
    }

    fn finish(&mut self, error: Option<Error>) {
        self.state = ScanState::Done;
        self.record = None;
        self.error = error;
    }

    fn next_record(&mut self) -> Result<Option<S::Record>> {
        loop {
            if self.at_end_of_data()? {
                return Ok(None);
            }

            let resolved = resolve_row(
                self.reader,
                S::SHEET_NAME,
                self.row,
                &self.columns,
                S::FIELDS,
                S::NA_IS_EMPTY,
            )?;
            let record = S::build(resolved);

            if S::skip(&record) {
                debug!("Skipping row {} of '{}'", self.row + 1, S::SHEET_NAME);
                self.row += 1;
                continue;
            }

            S::validate(&record, self.row)?;
            return Ok(Some(record));
        }
    }

    fn at_end_of_data(&self) -> Result<bool> {
        for column in S::END_OF_DATA_COLUMNS {
            let col = self.columns.get_index(column)?;
            let text = cell_text(self.reader, S::SHEET_NAME, self.row, col, S::NA_IS_EMPTY)?;
            if !text.is_empty() {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
