//! Data models for laboratory spreadsheet processing
//!
//! This module contains the typed records produced by the sheet parsers:
//! one record type per spreadsheet family, the run-sheet metadata block, and
//! the date type used for clinical date columns.
//!
//! Field order and serde names define the export columns.

use crate::constants::SAMPLE_DATE_EXPORT_FORMAT;
use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;

// =============================================================================
// Sample Date
// =============================================================================

/// Calendar date decoded from a spreadsheet cell, or absent
///
/// Absent dates export as an empty CSV field (JSON `null`); present dates
/// export as `YYYY-MM-DD`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SampleDate(Option<NaiveDate>);

impl SampleDate {
    /// Absent-date sentinel
    pub const fn absent() -> Self {
        Self(None)
    }

    /// Wrap a known calendar date
    pub const fn new(date: NaiveDate) -> Self {
        Self(Some(date))
    }

    pub fn is_absent(&self) -> bool {
        self.0.is_none()
    }

    pub fn date(&self) -> Option<NaiveDate> {
        self.0
    }
}

impl From<NaiveDate> for SampleDate {
    fn from(date: NaiveDate) -> Self {
        Self::new(date)
    }
}

impl fmt::Display for SampleDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(date) => write!(f, "{}", date.format(SAMPLE_DATE_EXPORT_FORMAT)),
            None => Ok(()),
        }
    }
}

impl Serialize for SampleDate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.0 {
            Some(_) => serializer.serialize_str(&self.to_string()),
            None => serializer.serialize_none(),
        }
    }
}

impl<'de> Deserialize<'de> for SampleDate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = Option::<String>::deserialize(deserializer)?;
        match text.as_deref().map(str::trim) {
            None | Some("") => Ok(Self::absent()),
            Some(value) => NaiveDate::parse_from_str(value, SAMPLE_DATE_EXPORT_FORMAT)
                .map(Self::new)
                .map_err(serde::de::Error::custom),
        }
    }
}

// =============================================================================
// Array Queue
// =============================================================================

/// One row of the array-processing queue sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArrayQueueSample {
    pub uin: String,
    pub subject_id: String,
    pub project_id: String,
    /// Reserved export column; the queue sheet never carries it
    pub infinium_id: String,
    pub beadchip_version: String,
    pub sentrix_id: String,
    pub sentrix_position: String,
}

// =============================================================================
// Run Sheet
// =============================================================================

/// Key/value metadata block at the top of a run sheet
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSheetHeader {
    /// Start date reformatted as `DD/MM/YYYY`
    pub sequencing_start_date: String,
    pub instrument_name: String,
    /// Zero-padded run number, compared verbatim by the sample locator
    pub run_number: String,
    #[serde(rename = "flowcell_position")]
    pub flow_cell_position: String,
    #[serde(rename = "flowcell_id")]
    pub flow_cell_id: String,
    pub run_name: String,
    #[serde(rename = "flowcell_type")]
    pub flow_cell_type: String,
    pub version: String,
    pub run_type: String,
    pub workflow: String,
    pub indexing: String,
    pub read1_cycles: i64,
    pub read2_cycles: i64,
    pub i7_index_read_cycles: i64,
    pub i5_index_read_cycles: i64,
}

/// One row of a run sheet's data section
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunSheetSample {
    pub id: String,
    pub uin: String,
    pub lane: String,
    pub subject_id: String,
    pub project_id: String,
    pub cohort: String,
    pub library_type: String,
    pub capture_type: String,
    pub library_id: String,
    pub capture_id: String,
    pub index: String,
    pub index2: String,
    pub i7_index_id: String,
    pub i5_index_id: String,
}

/// A fully parsed run sheet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSheet {
    /// Path the sheet was read from
    pub filename: String,
    pub header: RunSheetHeader,
    pub samples: Vec<RunSheetSample>,
}

/// Export row pairing a run-sheet sample with its run metadata
#[derive(Debug, Clone, Serialize)]
pub struct RunSheetExportRow<'a> {
    pub run_number: &'a str,
    pub instrument_name: &'a str,
    pub flowcell_id: &'a str,
    pub flowcell_position: &'a str,
    pub sequencing_start_date: &'a str,
    pub id: &'a str,
    pub uin: &'a str,
    pub lane: &'a str,
    pub subject_id: &'a str,
    pub project_id: &'a str,
    pub cohort: &'a str,
    pub library_type: &'a str,
    pub capture_type: &'a str,
    pub library_id: &'a str,
    pub capture_id: &'a str,
    pub index: &'a str,
    pub index2: &'a str,
    pub i7_index_id: &'a str,
    pub i5_index_id: &'a str,
}

impl RunSheet {
    /// Export rows for every sample, in sheet order
    pub fn export_rows(&self) -> impl Iterator<Item = RunSheetExportRow<'_>> {
        let header = &self.header;
        self.samples.iter().map(move |sample| RunSheetExportRow {
            run_number: &header.run_number,
            instrument_name: &header.instrument_name,
            flowcell_id: &header.flow_cell_id,
            flowcell_position: &header.flow_cell_position,
            sequencing_start_date: &header.sequencing_start_date,
            id: &sample.id,
            uin: &sample.uin,
            lane: &sample.lane,
            subject_id: &sample.subject_id,
            project_id: &sample.project_id,
            cohort: &sample.cohort,
            library_type: &sample.library_type,
            capture_type: &sample.capture_type,
            library_id: &sample.library_id,
            capture_id: &sample.capture_id,
            index: &sample.index,
            index2: &sample.index2,
            i7_index_id: &sample.i7_index_id,
            i5_index_id: &sample.i5_index_id,
        })
    }
}

// =============================================================================
// Clinical Log
// =============================================================================

/// One row of the clinical sample log
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalSample {
    #[serde(skip)]
    pub record: String,
    pub uin: String,
    pub status: String,
    pub receipt_date: SampleDate,
    #[serde(rename = "collection_date")]
    pub sample_collection_date: SampleDate,
    pub consent_received_date: SampleDate,
    pub urn: String,
    pub fin: String,
    pub patient_name: String,
    pub dob: SampleDate,
    #[serde(rename = "sex")]
    pub gender: String,
    pub subject_id: String,
    pub preservation_method: String,
    pub sample_type: String,
    pub report_type: String,
    pub disease: String,
    pub requesting_clinician: String,
    pub comments: String,
    pub project_id: String,
    pub tissue_source_type: String,
    pub nucleic_type: String,
    pub primary_tumour_site: String,
    pub tumour_content: String,
    pub request_date: String,
    pub requesting_doctor: String,
    pub consultant: String,
    pub source_laboratory: String,
    pub auslab: String,
    pub anatomical_pathology: String,
    pub emr: String,
}

/// A fully parsed clinical sample log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClinicalLog {
    pub filename: String,
    /// Samples in sheet order, skipped statuses excluded
    pub samples: Vec<ClinicalSample>,
}

impl ClinicalLog {
    /// Index samples by UIN; later rows replace earlier rows with the same UIN
    pub fn by_uin(&self) -> HashMap<&str, &ClinicalSample> {
        self.samples
            .iter()
            .map(|sample| (sample.uin.as_str(), sample))
            .collect()
    }
}
