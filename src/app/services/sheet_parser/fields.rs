//! Declarative field descriptors and row resolution
//!
//! Each sheet family declares its record as a table of [`FieldSpec`]s. One
//! generic loop, [`resolve_row`], reads every declared column of a row through
//! the [`ColumnIndex`] and decodes it according to its [`FieldKind`].

use std::collections::HashMap;

use tracing::warn;

use super::column_index::ColumnIndex;
use super::date_decoder::decode_date;
use crate::app::models::SampleDate;
use crate::app::services::workbook::CellReader;
use crate::constants::MISSING_VALUE_MARKER;
use crate::Result;

/// How a cell turns into a field value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Formatted text, trimmed
    Text,
    /// Formatted text, trimmed and upper-cased
    UpperText,
    /// Raw value through the date decoder; decode failure aborts the scan
    Date,
    /// Raw value through the date decoder; decode failure is logged and the date left absent
    LenientDate,
}

/// One record field bound to the column it is read from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub field: &'static str,
    pub column: &'static str,
    pub kind: FieldKind,
}

impl FieldSpec {
    pub const fn text(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column,
            kind: FieldKind::Text,
        }
    }

    pub const fn upper(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column,
            kind: FieldKind::UpperText,
        }
    }

    pub const fn date(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column,
            kind: FieldKind::Date,
        }
    }

    pub const fn lenient_date(field: &'static str, column: &'static str) -> Self {
        Self {
            field,
            column,
            kind: FieldKind::LenientDate,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Date(SampleDate),
}

/// Decoded values of one data row, keyed by field name
#[derive(Debug, Clone, Default)]
pub struct ResolvedRow {
    row: usize,
    values: HashMap<&'static str, FieldValue>,
}

impl ResolvedRow {
    /// Zero-based sheet row these values came from
    pub fn row(&self) -> usize {
        self.row
    }

    /// Take a text field; undeclared or date fields read as empty
    pub fn take_text(&mut self, field: &str) -> String {
        match self.values.remove(field) {
            Some(FieldValue::Text(text)) => text,
            _ => String::new(),
        }
    }

    /// Take a date field; undeclared or text fields read as absent
    pub fn take_date(&mut self, field: &str) -> SampleDate {
        match self.values.remove(field) {
            Some(FieldValue::Date(date)) => date,
            _ => SampleDate::absent(),
        }
    }
}

/// Formatted text of a cell as the scanner sees it
pub fn cell_text<R: CellReader + ?Sized>(
    reader: &R,
    sheet: &str,
    row: usize,
    col: usize,
    na_is_empty: bool,
) -> Result<String> {
    let text = reader.cell(sheet, row, col)?.formatted.trim().to_string();
    if na_is_empty && text == MISSING_VALUE_MARKER {
        Ok(String::new())
    } else {
        Ok(text)
    }
}

/// Resolve every declared field of `row`
///
/// A declared column missing from the header, a cell access failure or a
/// strict date that cannot be decoded fails the whole row.
pub fn resolve_row<R: CellReader + ?Sized>(
    reader: &R,
    sheet: &str,
    row: usize,
    columns: &ColumnIndex,
    fields: &[FieldSpec],
    na_is_empty: bool,
) -> Result<ResolvedRow> {
    let mut values = HashMap::with_capacity(fields.len());

    for spec in fields {
        let col = columns.get_index(spec.column)?;
        let value = match spec.kind {
            FieldKind::Text => FieldValue::Text(cell_text(reader, sheet, row, col, na_is_empty)?),
            FieldKind::UpperText => FieldValue::Text(
                cell_text(reader, sheet, row, col, na_is_empty)?.to_uppercase(),
            ),
            FieldKind::Date => {
                let raw = reader.cell(sheet, row, col)?.raw;
                FieldValue::Date(decode_date(&raw)?)
            }
            FieldKind::LenientDate => {
                let raw = reader.cell(sheet, row, col)?.raw;
                let date = decode_date(&raw).unwrap_or_else(|e| {
                    warn!(
                        "Row {}: unable to parse '{}' ({}), leaving it empty: {}",
                        row + 1,
                        spec.column,
                        spec.field,
                        e
                    );
                    SampleDate::absent()
                });
                FieldValue::Date(date)
            }
        };
        values.insert(spec.field, value);
    }

    Ok(ResolvedRow { row, values })
}
