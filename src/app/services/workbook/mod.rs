//! Spreadsheet cell access
//!
//! The sheet parsers never talk to calamine directly. They depend on the
//! [`CellReader`] capability, which exposes every cell as a pair of texts:
//! the value as a person would see it (`formatted`) and the underlying value
//! with display formatting stripped (`raw`). Date columns read the raw text so
//! that a numeric serial is never mistaken for the formatted date string.
//!
//! [`Workbook`] is the calamine-backed implementation. It loads every worksheet
//! into memory when opened and is dropped as soon as the per-file parse ends.

use std::collections::HashMap;
use std::path::Path;

use calamine::{Data, Range, Reader, Xlsx, XlsxError, open_workbook};
use tracing::{debug, warn};

use crate::app::services::sheet_parser::date_decoder::serial_to_date;
use crate::{Error, Result};

/// Layout used for the formatted text of date-typed cells (spreadsheet short date)
const SHORT_DATE_DISPLAY_FORMAT: &str = "%m-%d-%y";

/// Both renderings of a single cell
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CellValue {
    /// Display text, e.g. `03-15-23` for a date cell
    pub formatted: String,

    /// Underlying value, e.g. `45000` for the same date cell
    pub raw: String,
}

impl CellValue {
    pub fn empty() -> Self {
        Self::default()
    }

    fn from_data(data: &Data) -> Self {
        match data {
            Data::Empty => Self::empty(),
            Data::String(s) => Self::same(s.clone()),
            Data::Int(i) => Self::same(i.to_string()),
            Data::Float(f) => Self::same(f.to_string()),
            Data::Bool(b) => Self::same(if *b { "TRUE" } else { "FALSE" }.to_string()),
            Data::Error(e) => Self::same(e.to_string()),
            Data::DateTime(dt) => {
                let serial = dt.as_f64();
                let formatted = if dt.is_datetime() {
                    serial_to_date(serial)
                        .map(|date| date.format(SHORT_DATE_DISPLAY_FORMAT).to_string())
                        .unwrap_or_else(|| serial.to_string())
                } else {
                    serial.to_string()
                };
                Self {
                    formatted,
                    raw: serial.to_string(),
                }
            }
            Data::DateTimeIso(s) | Data::DurationIso(s) => Self::same(s.clone()),
        }
    }

    fn same(text: String) -> Self {
        Self {
            formatted: text.clone(),
            raw: text,
        }
    }
}

/// Read-only access to the cells of an opened spreadsheet
///
/// Coordinates are zero-based and absolute: row 0 is the first row of the
/// sheet even when the used range starts further down. Cells outside the used
/// range read as empty.
pub trait CellReader {
    /// Name used to identify the source in errors and logs
    fn source_name(&self) -> &str;

    /// Read one cell
    fn cell(&self, sheet: &str, row: usize, col: usize) -> Result<CellValue>;

    /// Formatted text of every row, trailing empty cells trimmed
    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>>;

    /// Formatted text of one row, or `None` past the end of the sheet
    fn row(&self, sheet: &str, row: usize) -> Result<Option<Vec<String>>> {
        Ok(self.rows(sheet)?.into_iter().nth(row))
    }
}

/// Opened spreadsheet with every worksheet loaded into memory
#[derive(Debug, Clone)]
pub struct Workbook {
    file: String,
    sheets: HashMap<String, Range<Data>>,
}

impl Workbook {
    /// Open an `.xlsx` workbook
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with_password(path, None)
    }

    /// Open an `.xlsx` workbook that may be password-protected
    ///
    /// Encrypted packages cannot be decrypted by calamine; when a password is
    /// supplied and the open fails, the error says so.
    pub fn open_with_password(path: &Path, password: Option<&str>) -> Result<Self> {
        let file = path.display().to_string();
        debug!("Opening workbook: {}", file);

        if !path.exists() {
            return Err(Error::workbook(&file, "file does not exist"));
        }

        let mut workbook: Xlsx<_> = open_workbook(path).map_err(|e: XlsxError| {
            if password.is_some() {
                warn!("Workbook {} may be encrypted; decryption is not supported", file);
                Error::workbook(
                    &file,
                    format!("{} (password-protected workbooks are not supported)", e),
                )
            } else {
                Error::workbook(&file, e.to_string())
            }
        })?;

        let mut sheets = HashMap::new();
        for name in workbook.sheet_names() {
            let range = workbook
                .worksheet_range(&name)
                .map_err(|e| Error::workbook(&file, format!("sheet '{}': {}", name, e)))?;
            sheets.insert(name, range);
        }

        debug!("Loaded {} sheets from {}", sheets.len(), file);
        Ok(Self { file, sheets })
    }

    /// Build a workbook from in-memory grids, one per sheet
    pub fn from_sheets<I, S>(file: impl Into<String>, sheets: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<Vec<Data>>)>,
        S: Into<String>,
    {
        let sheets = sheets
            .into_iter()
            .map(|(name, grid)| (name.into(), grid_to_range(grid)))
            .collect();

        Self {
            file: file.into(),
            sheets,
        }
    }

    /// Names of the loaded sheets
    pub fn sheet_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.sheets.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn range(&self, sheet: &str) -> Result<&Range<Data>> {
        self.sheets
            .get(sheet)
            .ok_or_else(|| Error::sheet_not_found(sheet))
    }
}

impl CellReader for Workbook {
    fn source_name(&self) -> &str {
        &self.file
    }

    fn cell(&self, sheet: &str, row: usize, col: usize) -> Result<CellValue> {
        let range = self.range(sheet)?;
        let (Ok(row), Ok(col)) = (u32::try_from(row), u32::try_from(col)) else {
            return Ok(CellValue::empty());
        };

        Ok(range
            .get_value((row, col))
            .map(CellValue::from_data)
            .unwrap_or_default())
    }

    fn rows(&self, sheet: &str) -> Result<Vec<Vec<String>>> {
        let range = self.range(sheet)?;
        let Some((last_row, last_col)) = range.end() else {
            return Ok(Vec::new());
        };

        Ok((0..=last_row)
            .map(|row| row_text(range, row, last_col))
            .collect())
    }

    fn row(&self, sheet: &str, row: usize) -> Result<Option<Vec<String>>> {
        let range = self.range(sheet)?;
        let Some((last_row, last_col)) = range.end() else {
            return Ok(None);
        };

        match u32::try_from(row) {
            Ok(row) if row <= last_row => Ok(Some(row_text(range, row, last_col))),
            _ => Ok(None),
        }
    }
}

fn row_text(range: &Range<Data>, row: u32, last_col: u32) -> Vec<String> {
    let mut cells: Vec<String> = (0..=last_col)
        .map(|col| {
            range
                .get_value((row, col))
                .map(|data| CellValue::from_data(data).formatted)
                .unwrap_or_default()
        })
        .collect();

    while cells.last().is_some_and(|cell| cell.is_empty()) {
        cells.pop();
    }
    cells
}

fn grid_to_range(grid: Vec<Vec<Data>>) -> Range<Data> {
    let height = grid.len();
    let width = grid.iter().map(Vec::len).max().unwrap_or(0);
    if height == 0 || width == 0 {
        return Range::empty();
    }

    let mut range = Range::new((0, 0), ((height - 1) as u32, (width - 1) as u32));
    for (row, cells) in grid.into_iter().enumerate() {
        for (col, data) in cells.into_iter().enumerate() {
            if data != Data::Empty {
                range.set_value((row as u32, col as u32), data);
            }
        }
    }
    range
}
