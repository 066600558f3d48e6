//! Directory ingestion with per-file error isolation
//!
//! - [`discovery`] - Filename-pattern discovery with exact-name exclusions
//! - [`ingester`] - Bounded concurrent parsing and result aggregation

pub mod discovery;
pub mod ingester;

#[cfg(test)]
pub mod tests;

pub use crate::config::IngestPolicy;
pub use discovery::{FilePattern, discover_files};
pub use ingester::{DirectoryIngester, IngestFailure, IngestReport, IngestResult};
