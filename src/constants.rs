//! Application constants for the laboratory spreadsheet processor
//!
//! This module contains sheet layouts, sentinel values and defaults shared
//! by the parsers, the directory ingester and the CLI.

// =============================================================================
// Spreadsheet Layouts
// =============================================================================

/// Array-processing queue workbook layout
pub mod array_queue {
    /// Worksheet holding the queue
    pub const SHEET_NAME: &str = "IFM Queue";

    /// Zero-based header row (second row of the sheet)
    pub const HEADER_ROW: usize = 1;
}

/// Sequencing run-sheet workbook layout
pub mod run_sheet {
    /// Worksheet holding the run sheet
    pub const SHEET_NAME: &str = "SampleRunSheet";

    /// First-column marker that anchors the data section
    pub const DATA_MARKER: &str = "[Data]";

    /// Rows between the marker and the column header row
    pub const HEADER_OFFSET: usize = 3;
}

/// Clinical sample log workbook layout
pub mod clinical_log {
    /// Worksheet holding the log
    pub const SHEET_NAME: &str = "ATG Sample Log";

    /// Zero-based header row (third row of the sheet)
    pub const HEADER_ROW: usize = 2;

    /// Statuses whose rows are silently skipped
    pub const SKIPPED_STATUSES: &[&str] = &["NO TEST - Do No Process", "Duplicate - Exclude"];

    /// Accepted values for the upper-cased gender column (empty is also accepted)
    pub const ALLOWED_GENDERS: &[&str] = &["MALE", "FEMALE"];
}

// =============================================================================
// Cell Values
// =============================================================================

/// Placeholder operators type for "not available"
pub const MISSING_VALUE_MARKER: &str = "NA";

/// Flow-cell identifiers that mean the field was never filled in
pub const FLOW_CELL_ID_PLACEHOLDERS: &[&str] = &["0", "0.0"];

/// Valid flow-cell positions on the instrument
pub const FLOW_CELL_POSITIONS: &[&str] = &["A", "B"];

/// Input layout for machine-entered metadata dates (MM-DD-YY)
pub const METADATA_DATE_INPUT_FORMAT: &str = "%m-%d-%y";

/// Output layout for metadata dates (DD/MM/YYYY)
pub const METADATA_DATE_OUTPUT_FORMAT: &str = "%d/%m/%Y";

/// Export layout for decoded sample dates
pub const SAMPLE_DATE_EXPORT_FORMAT: &str = "%Y-%m-%d";

// =============================================================================
// Discovery and Lookup Defaults
// =============================================================================

/// Instrument-family filename prefixes identifying run sheets
pub const DEFAULT_RUN_SHEET_PREFIXES: &[&str] = &["NovaSeq", "NextSeq"];

/// Spreadsheet extension accepted during discovery
pub const DEFAULT_SPREADSHEET_EXTENSION: &str = "xlsx";

/// Lookup cache file name inside the run-sheet directory
pub const DEFAULT_LOOKUP_FILE_NAME: &str = "lookup.csv";

/// Width of zero-padded run numbers
pub const DEFAULT_RUN_NUMBER_WIDTH: usize = 4;

// =============================================================================
// Environment Variables
// =============================================================================

/// Overrides the run-sheet directory
pub const ENV_RUN_SHEET_DIR: &str = "LABSHEET_RUN_SHEET_DIR";

/// Overrides the worker count
pub const ENV_WORKERS: &str = "LABSHEET_WORKERS";

/// Supplies the clinical log password
pub const ENV_LOG_PASSWORD: &str = "LABSHEET_LOG_PASSWORD";

/// Application directory name under the user config directory
pub const CONFIG_DIR_NAME: &str = "labsheet-processor";

/// Configuration file name
pub const CONFIG_FILE_NAME: &str = "config.toml";
