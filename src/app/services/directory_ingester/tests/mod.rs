//! Test utilities for directory ingestion testing

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing_subscriber::fmt::MakeWriter;

use crate::app::services::sheet_parser::tests::{run_sheet_rows, write_run_sheet, write_xlsx};
use crate::constants::run_sheet;


/// In-memory sink for formatted log lines
#[derive(Debug, Clone, Default)]
pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

impl LogBuffer {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
    }

    /// Collect events on the current thread until the guard is dropped
    pub fn capture(&self) -> tracing::subscriber::DefaultGuard {
        let subscriber = tracing_subscriber::fmt()
            .with_writer(self.clone())
            .with_ansi(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        tracing::subscriber::set_default(subscriber)
    }
}

impl io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for LogBuffer {
    type Writer = LogBuffer;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

/// Directory holding `count` valid run sheets, two samples each
///
/// Files are named `NovaSeq_<run>.xlsx` with runs numbered from 1.
pub fn run_sheet_dir(count: usize) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    for run in 1..=count {
        let run_number = format!("{:04}", run);
        let first = format!("U{}-1", run);
        let second = format!("U{}-2", run);
        write_run_sheet(
            temp_dir.path(),
            &format!("NovaSeq_{}.xlsx", run_number),
            &run_number,
            &[("1", first.as_str()), ("2", second.as_str())],
        );
    }
    temp_dir
}

/// Run sheet whose flow cell ID is the `0` placeholder
pub fn write_malformed_run_sheet(dir: &Path, file: &str) -> PathBuf {
    let path = dir.join(file);
    write_xlsx(
        &path,
        run_sheet::SHEET_NAME,
        &run_sheet_rows("0999", "0", &[("1", "BAD-1")]),
    );
    path
}
