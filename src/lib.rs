//! Laboratory Spreadsheet Processor Library
//!
//! A Rust library for converting human-maintained laboratory tracking
//! spreadsheets into strongly-typed record sequences for pipeline tooling.
//!
//! This library provides tools for:
//! - Locating variable-position header rows and building column maps
//! - Scanning data rows lazily into typed records with inline validation
//! - Decoding date cells stored either as spreadsheet serials or free text
//! - Parsing run-sheet metadata blocks with strict per-key coercion
//! - Ingesting whole directories of run sheets concurrently
//! - Locating a run sheet by run number through a lookup cache or a full scan

pub mod config;
pub mod constants;

// Core application modules
pub mod app {
    pub mod models;
    pub mod services {
        pub mod directory_ingester;
        pub mod sample_locator;
        pub mod sheet_parser;
        pub mod workbook;
    }
}

// CLI modules
pub mod cli {
    pub mod args;
    pub mod commands;
}

// Re-export commonly used types
pub use app::models::{
    ArrayQueueSample, ClinicalLog, ClinicalSample, RunSheet, RunSheetHeader, RunSheetSample,
    SampleDate,
};
pub use config::Config;

/// Result type alias for the laboratory spreadsheet processor
pub type Result<T> = std::result::Result<T, Error>;

/// Error categories used to decide how far a failure propagates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Header, marker or required metadata problems; abort the whole file
    Structural,
    /// A declared column is absent from the header map
    FieldAccess,
    /// A field value is outside its allowed values
    Validation,
    /// A date cell could not be decoded by any strategy
    Decode,
    /// File system or workbook access failure
    Io,
    /// Batch ingestion did not parse every file
    Aggregate,
    /// Sample lookup failures
    Lookup,
    /// Invalid configuration
    Configuration,
}

/// Error types for spreadsheet ingestion operations
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Workbook could not be opened or read
    #[error("Workbook error in '{file}': {message}")]
    Workbook { file: String, message: String },

    /// Requested sheet is missing from the workbook
    #[error("Sheet '{sheet}' not found")]
    SheetNotFound { sheet: String },

    /// Header row could not be read
    #[error("Header not found in sheet '{sheet}' at row {row}")]
    HeaderNotFound { sheet: String, row: usize },

    /// Data-section marker never appears in the first column
    #[error("Marker '{marker}' not found in first column of sheet '{sheet}'")]
    MarkerNotFound { sheet: String, marker: String },

    /// Required metadata key is absent or empty
    #[error("Missing required metadata: {key}")]
    MissingMetadata { key: String },

    /// Metadata value failed coercion or validation
    #[error("Invalid metadata value for '{key}': '{value}' ({reason})")]
    InvalidMetadata {
        key: String,
        value: String,
        reason: String,
    },

    /// Declared column absent from the header map
    #[error("Unable to find index for '{column}' column")]
    ColumnNotFound { column: String },

    /// Date text not parseable by any strategy
    #[error("Unparseable date: '{value}'")]
    UnparseableDate { value: String },

    /// Record-level validation failure
    #[error("Validation error at row {row}: {message}")]
    Validation { row: usize, message: String },

    /// Any failure while parsing one file, tagged with the file name
    #[error("Failed to parse '{file}': {source}")]
    FileParse {
        file: String,
        #[source]
        source: Box<Error>,
    },

    /// Batch ingestion where at least one file failed
    #[error("Failed to parse all run sheets: {failed} of {attempted} files failed")]
    IncompleteIngest { failed: usize, attempted: usize },

    /// No run sheet matched the requested run number
    #[error("Sample not found: run number {run_number}")]
    SampleNotFound { run_number: String },

    /// Lookup cache file unreadable or malformed
    #[error("Lookup cache error in '{path}': {message}")]
    LookupCache {
        path: String,
        message: String,
        #[source]
        source: Option<csv::Error>,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// A concurrent parse task panicked or was cancelled
    #[error("Parse task failed: {message}")]
    TaskFailed { message: String },
}

impl Error {
    /// Create an I/O error with context
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            message: message.into(),
            source,
        }
    }

    /// Create a workbook access error
    pub fn workbook(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Workbook {
            file: file.into(),
            message: message.into(),
        }
    }

    /// Create a sheet not found error
    pub fn sheet_not_found(sheet: impl Into<String>) -> Self {
        Self::SheetNotFound {
            sheet: sheet.into(),
        }
    }

    /// Create a header not found error
    pub fn header_not_found(sheet: impl Into<String>, row: usize) -> Self {
        Self::HeaderNotFound {
            sheet: sheet.into(),
            row,
        }
    }

    /// Create a marker not found error
    pub fn marker_not_found(sheet: impl Into<String>, marker: impl Into<String>) -> Self {
        Self::MarkerNotFound {
            sheet: sheet.into(),
            marker: marker.into(),
        }
    }

    /// Create a missing metadata error
    pub fn missing_metadata(key: impl Into<String>) -> Self {
        Self::MissingMetadata { key: key.into() }
    }

    /// Create an invalid metadata error
    pub fn invalid_metadata(
        key: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidMetadata {
            key: key.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a column not found error
    pub fn column_not_found(column: impl Into<String>) -> Self {
        Self::ColumnNotFound {
            column: column.into(),
        }
    }

    /// Create an unparseable date error
    pub fn unparseable_date(value: impl Into<String>) -> Self {
        Self::UnparseableDate {
            value: value.into(),
        }
    }

    /// Create a validation error for a zero-based row index
    pub fn validation(row: usize, message: impl Into<String>) -> Self {
        Self::Validation {
            row: row + 1,
            message: message.into(),
        }
    }

    /// Tag an error with the file it came from
    pub fn in_file(self, file: impl Into<String>) -> Self {
        match self {
            already @ Self::FileParse { .. } => already,
            other => Self::FileParse {
                file: file.into(),
                source: Box::new(other),
            },
        }
    }

    /// Create an incomplete ingest error
    pub fn incomplete_ingest(failed: usize, attempted: usize) -> Self {
        Self::IncompleteIngest { failed, attempted }
    }

    /// Create a sample not found error
    pub fn sample_not_found(run_number: impl Into<String>) -> Self {
        Self::SampleNotFound {
            run_number: run_number.into(),
        }
    }

    /// Create a lookup cache error
    pub fn lookup_cache(
        path: impl Into<String>,
        message: impl Into<String>,
        source: Option<csv::Error>,
    ) -> Self {
        Self::LookupCache {
            path: path.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a task failure error
    pub fn task_failed(message: impl Into<String>) -> Self {
        Self::TaskFailed {
            message: message.into(),
        }
    }

    /// File name attached to this error, if any
    pub fn file(&self) -> Option<&str> {
        match self {
            Self::FileParse { file, .. } | Self::Workbook { file, .. } => Some(file),
            _ => None,
        }
    }

    /// Innermost error, looking through file tags
    pub fn root(&self) -> &Error {
        match self {
            Self::FileParse { source, .. } => source.root(),
            other => other,
        }
    }

    /// Classify the error
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::FileParse { source, .. } => source.category(),
            Self::SheetNotFound { .. }
            | Self::HeaderNotFound { .. }
            | Self::MarkerNotFound { .. }
            | Self::MissingMetadata { .. }
            | Self::InvalidMetadata { .. } => ErrorCategory::Structural,
            Self::ColumnNotFound { .. } => ErrorCategory::FieldAccess,
            Self::Validation { .. } => ErrorCategory::Validation,
            Self::UnparseableDate { .. } => ErrorCategory::Decode,
            Self::Io { .. } | Self::Workbook { .. } | Self::TaskFailed { .. } => ErrorCategory::Io,
            Self::IncompleteIngest { .. } => ErrorCategory::Aggregate,
            Self::SampleNotFound { .. } | Self::LookupCache { .. } => ErrorCategory::Lookup,
            Self::Configuration { .. } => ErrorCategory::Configuration,
        }
    }
}

// Automatic conversions from common error types
impl From<std::io::Error> for Error {
    fn from(error: std::io::Error) -> Self {
        Self::Io {
            message: "I/O operation failed".to_string(),
            source: error,
        }
    }
}
