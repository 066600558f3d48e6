//! Header location and column-name mapping
//!
//! A sheet's column header either sits on a fixed row or follows a marker cell
//! in the first column by a fixed offset. Either way the result is a
//! [`ColumnIndex`] mapping each header text to its zero-based column.

use std::collections::HashMap;

use tracing::debug;

use crate::app::services::workbook::CellReader;
use crate::{Error, Result};

/// Exact column-name to zero-based position mapping for one sheet
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnIndex {
    name_to_index: HashMap<String, usize>,
}

impl ColumnIndex {
    /// Map each non-empty header cell to its position
    ///
    /// Names are matched exactly, case and whitespace included. When a name
    /// repeats, the rightmost column wins.
    pub fn from_row<S: AsRef<str>>(cells: &[S]) -> Self {
        let name_to_index = cells
            .iter()
            .enumerate()
            .filter(|(_, name)| !name.as_ref().is_empty())
            .map(|(index, name)| (name.as_ref().to_string(), index))
            .collect();

        Self { name_to_index }
    }

    /// Position of a column; an unknown name is an error, never a default
    pub fn get_index(&self, column: &str) -> Result<usize> {
        self.name_to_index
            .get(column)
            .copied()
            .ok_or_else(|| Error::column_not_found(column))
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.name_to_index.contains_key(column)
    }

    pub fn len(&self) -> usize {
        self.name_to_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name_to_index.is_empty()
    }
}

/// How to find the header row of a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderStrategy {
    /// Header always on this zero-based row
    FixedRow(usize),

    /// Header `offset` rows below the first row whose first cell equals `marker`
    Marker {
        marker: &'static str,
        offset: usize,
    },
}

/// Where the header was found and where data starts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderLocation {
    pub columns: ColumnIndex,

    /// Zero-based header row
    pub header_row: usize,

    /// Zero-based first data row
    pub data_start: usize,

    /// Zero-based marker row, for marker-anchored sheets
    pub marker_row: Option<usize>,
}

/// Find the header row of `sheet` and build its column index
pub fn locate_header<R: CellReader + ?Sized>(
    reader: &R,
    sheet: &str,
    strategy: HeaderStrategy,
) -> Result<HeaderLocation> {
    let (header_row, marker_row) = match strategy {
        HeaderStrategy::FixedRow(row) => (row, None),
        HeaderStrategy::Marker { marker, offset } => {
            let marker_row = find_marker(reader, sheet, marker)?;
            (marker_row + offset, Some(marker_row))
        }
    };

    let cells = reader
        .row(sheet, header_row)?
        .ok_or_else(|| Error::header_not_found(sheet, header_row + 1))?;

    let columns = ColumnIndex::from_row(&cells);
    if columns.is_empty() {
        return Err(Error::header_not_found(sheet, header_row + 1));
    }

    debug!(
        "Header for sheet '{}' at row {} with {} columns",
        sheet,
        header_row + 1,
        columns.len()
    );

    Ok(HeaderLocation {
        columns,
        header_row,
        data_start: header_row + 1,
        marker_row,
    })
}

/// First row, scanning top-down, whose first cell is exactly `marker`
pub fn find_marker<R: CellReader + ?Sized>(reader: &R, sheet: &str, marker: &str) -> Result<usize> {
    reader
        .rows(sheet)?
        .iter()
        .position(|row| row.first().is_some_and(|cell| cell == marker))
        .ok_or_else(|| Error::marker_not_found(sheet, marker))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::services::sheet_parser::tests::text_workbook;

    #[test]
    fn test_index_matches_header_position() {
        let header = ["UIN", "SubjectID", "", "ProjectID"];
        let index = ColumnIndex::from_row(&header);

        for (position, name) in header.iter().enumerate().filter(|(_, n)| !n.is_empty()) {
            assert_eq!(index.get_index(name).unwrap(), position);
        }
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn test_duplicate_name_last_wins() {
        let index = ColumnIndex::from_row(&["Status", "UIN", "Status"]);
        assert_eq!(index.get_index("Status").unwrap(), 2);
    }

    #[test]
    fn test_lookup_is_exact() {
        let index = ColumnIndex::from_row(&["UIN"]);

        let err = index.get_index("uin").unwrap_err();
        assert_eq!(err.to_string(), "Unable to find index for 'uin' column");
        assert!(index.get_index("UIN ").is_err());
        assert!(!index.has_column("SubjectID"));

        // Header cells keep their padding
        let padded = ColumnIndex::from_row(&["UIN", " Status "]);
        assert_eq!(padded.get_index(" Status ").unwrap(), 1);
        assert!(padded.get_index("Status").is_err());
    }

    #[test]
    fn test_fixed_row_strategy() {
        let workbook = text_workbook(
            "Queue",
            &[&["title"], &["UIN", "SubjectID"], &["U1", "S1"]],
        );

        let location = locate_header(&workbook, "Queue", HeaderStrategy::FixedRow(1)).unwrap();
        assert_eq!(location.header_row, 1);
        assert_eq!(location.data_start, 2);
        assert_eq!(location.marker_row, None);
        assert_eq!(location.columns.get_index("SubjectID").unwrap(), 1);
    }

    #[test]
    fn test_fixed_row_past_end_is_header_not_found() {
        let workbook = text_workbook("Queue", &[&["title"]]);

        let err = locate_header(&workbook, "Queue", HeaderStrategy::FixedRow(4)).unwrap_err();
        assert!(matches!(err, Error::HeaderNotFound { row: 5, .. }));
    }

    #[test]
    fn test_blank_header_row_is_header_not_found() {
        let workbook = text_workbook("Queue", &[&["title"], &[], &["U1"]]);

        let err = locate_header(&workbook, "Queue", HeaderStrategy::FixedRow(1)).unwrap_err();
        assert!(matches!(err, Error::HeaderNotFound { .. }));
    }

    #[test]
    fn test_marker_strategy_offsets_from_first_marker() {
        let workbook = text_workbook(
            "Run",
            &[
                &["Run Number", "0042"],
                &["[Data]"],
                &[],
                &["notes"],
                &["SampleID", "SampleName"],
                &["1", "U1"],
                &["[Data]"],
            ],
        );

        let strategy = HeaderStrategy::Marker {
            marker: "[Data]",
            offset: 3,
        };
        let location = locate_header(&workbook, "Run", strategy).unwrap();
        assert_eq!(location.marker_row, Some(1));
        assert_eq!(location.header_row, 4);
        assert_eq!(location.data_start, 5);
        assert_eq!(location.columns.get_index("SampleName").unwrap(), 1);
    }

    #[test]
    fn test_missing_marker() {
        let workbook = text_workbook("Run", &[&["Run Number", "0042"], &["Data"]]);

        let strategy = HeaderStrategy::Marker {
            marker: "[Data]",
            offset: 3,
        };
        let err = locate_header(&workbook, "Run", strategy).unwrap_err();
        assert!(matches!(err, Error::MarkerNotFound { ref marker, .. } if marker == "[Data]"));
    }
}
