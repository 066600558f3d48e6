//! Run-sheet lookup by run number
//!
//! - [`cache`] - Headerless CSV lookup cache, readable and writable
//! - [`locator`] - Cache-first lookup with a full directory scan as fallback

pub mod cache;
pub mod locator;

#[cfg(test)]
pub mod tests;

pub use cache::{LookupCache, format_run_number};
pub use locator::SampleLocator;
