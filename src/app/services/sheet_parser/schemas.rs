//! Schema tables for the three spreadsheet families
//!
//! Each schema binds record fields to the exact header text used by the lab's
//! templates, and carries the family's end-of-data, skip and validation rules.

use super::column_index::HeaderStrategy;
use super::fields::{FieldSpec, ResolvedRow};
use super::scanner::SheetSchema;
use crate::app::models::{ArrayQueueSample, ClinicalSample, RunSheetSample};
use crate::constants::{array_queue, clinical_log, run_sheet};
use crate::{Error, Result};

// =============================================================================
// Array Queue
// =============================================================================

/// `IFM Queue` sheet of the array-processing queue workbook
pub struct ArrayQueueSchema;

impl SheetSchema for ArrayQueueSchema {
    type Record = ArrayQueueSample;

    const SHEET_NAME: &'static str = array_queue::SHEET_NAME;
    const HEADER: HeaderStrategy = HeaderStrategy::FixedRow(array_queue::HEADER_ROW);
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("uin", "UIN"),
        FieldSpec::text("subject_id", "SubjectID"),
        FieldSpec::text("project_id", "ProjectID"),
        FieldSpec::text("beadchip_version", "Beadchip version"),
        FieldSpec::text("sentrix_id", "BeadChip Sentrix ID"),
        FieldSpec::text("sentrix_position", "Beadchip Sentrix Position"),
    ];
    const END_OF_DATA_COLUMNS: &'static [&'static str] = &["UIN"];
    const NA_IS_EMPTY: bool = true;

    fn build(mut row: ResolvedRow) -> Self::Record {
        ArrayQueueSample {
            uin: row.take_text("uin"),
            subject_id: row.take_text("subject_id"),
            project_id: row.take_text("project_id"),
            infinium_id: String::new(),
            beadchip_version: row.take_text("beadchip_version"),
            sentrix_id: row.take_text("sentrix_id"),
            sentrix_position: row.take_text("sentrix_position"),
        }
    }
}

// =============================================================================
// Run Sheet
// =============================================================================

/// Data section of the `SampleRunSheet` sheet
pub struct RunSheetSchema;

impl SheetSchema for RunSheetSchema {
    type Record = RunSheetSample;

    const SHEET_NAME: &'static str = run_sheet::SHEET_NAME;
    const HEADER: HeaderStrategy = HeaderStrategy::Marker {
        marker: run_sheet::DATA_MARKER,
        offset: run_sheet::HEADER_OFFSET,
    };
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("id", "SampleID"),
        FieldSpec::text("uin", "SampleName"),
        FieldSpec::text("lane", "LaneNumber"),
        FieldSpec::text("subject_id", "SubjectID"),
        FieldSpec::text("project_id", "ProjectID"),
        FieldSpec::text("cohort", "Cohort"),
        FieldSpec::text("library_type", "LibraryType"),
        FieldSpec::text("capture_type", "CaptureType"),
        FieldSpec::text("library_id", "LibraryID"),
        FieldSpec::text("capture_id", "CaptureID"),
        FieldSpec::text("index", "Index"),
        FieldSpec::text("index2", "Index2"),
        FieldSpec::text("i7_index_id", "I7indexiD"),
        FieldSpec::text("i5_index_id", "I5indexiD"),
    ];
    const END_OF_DATA_COLUMNS: &'static [&'static str] = &["SampleID"];

    fn build(mut row: ResolvedRow) -> Self::Record {
        RunSheetSample {
            id: row.take_text("id"),
            uin: row.take_text("uin"),
            lane: row.take_text("lane"),
            subject_id: row.take_text("subject_id"),
            project_id: row.take_text("project_id"),
            cohort: row.take_text("cohort"),
            library_type: row.take_text("library_type"),
            capture_type: row.take_text("capture_type"),
            library_id: row.take_text("library_id"),
            capture_id: row.take_text("capture_id"),
            index: row.take_text("index"),
            index2: row.take_text("index2"),
            i7_index_id: row.take_text("i7_index_id"),
            i5_index_id: row.take_text("i5_index_id"),
        }
    }

    fn validate(record: &Self::Record, row: usize) -> Result<()> {
        if record.uin.is_empty() {
            return Err(Error::validation(
                row,
                format!("missing sample UIN for sample '{}'", record.id),
            ));
        }
        Ok(())
    }
}

// =============================================================================
// Clinical Log
// =============================================================================

/// `ATG Sample Log` sheet of the clinical sample log workbook
pub struct ClinicalLogSchema;

impl SheetSchema for ClinicalLogSchema {
    type Record = ClinicalSample;

    const SHEET_NAME: &'static str = clinical_log::SHEET_NAME;
    const HEADER: HeaderStrategy = HeaderStrategy::FixedRow(clinical_log::HEADER_ROW);
    const FIELDS: &'static [FieldSpec] = &[
        FieldSpec::text("uin", "SampleName"),
        FieldSpec::text("record", "Record"),
        FieldSpec::date("receipt_date", "Receipt date"),
        FieldSpec::date("sample_collection_date", "Sample Collection Date"),
        FieldSpec::date("consent_received_date", "Consent Received date"),
        FieldSpec::text("urn", "UR"),
        FieldSpec::text("fin", "FIN"),
        FieldSpec::text("patient_name", "PatientName"),
        FieldSpec::lenient_date("dob", "DOB"),
        FieldSpec::upper("gender", "Gender"),
        FieldSpec::text("subject_id", "SubjectID"),
        FieldSpec::text("preservation_method", "TissuePreservationType"),
        FieldSpec::text("sample_type", "SampleType"),
        FieldSpec::text("report_type", "ReportType"),
        FieldSpec::text("disease", "Disease"),
        FieldSpec::text("requesting_clinician", "Requesting Clinician"),
        FieldSpec::text("comments", "Comments"),
        FieldSpec::text("status", "Status"),
        FieldSpec::text("project_id", "ProjectID"),
        FieldSpec::text("tissue_source_type", "TissueSourceType"),
        FieldSpec::text("nucleic_type", "NucleicType"),
        FieldSpec::text("primary_tumour_site", "Primary Tumour Site"),
        FieldSpec::text("tumour_content", "Tumour Content"),
        FieldSpec::text("request_date", "Request Date"),
        FieldSpec::text("requesting_doctor", "Requesting Doctor"),
        FieldSpec::text("consultant", "Consultant"),
        FieldSpec::text("source_laboratory", "Source Laboratory"),
        FieldSpec::text("auslab", "Auslab"),
        FieldSpec::text("anatomical_pathology", "Anatomical Pathology"),
        FieldSpec::text("emr", "EMR"),
    ];
    const END_OF_DATA_COLUMNS: &'static [&'static str] = &["SampleName", "SubjectID"];
    const NA_IS_EMPTY: bool = true;

    fn build(mut row: ResolvedRow) -> Self::Record {
        ClinicalSample {
            record: row.take_text("record"),
            uin: row.take_text("uin"),
            status: row.take_text("status"),
            receipt_date: row.take_date("receipt_date"),
            sample_collection_date: row.take_date("sample_collection_date"),
            consent_received_date: row.take_date("consent_received_date"),
            urn: row.take_text("urn"),
            fin: row.take_text("fin"),
            patient_name: row.take_text("patient_name"),
            dob: row.take_date("dob"),
            gender: row.take_text("gender"),
            subject_id: row.take_text("subject_id"),
            preservation_method: row.take_text("preservation_method"),
            sample_type: row.take_text("sample_type"),
            report_type: row.take_text("report_type"),
            disease: row.take_text("disease"),
            requesting_clinician: row.take_text("requesting_clinician"),
            comments: row.take_text("comments"),
            project_id: row.take_text("project_id"),
            tissue_source_type: row.take_text("tissue_source_type"),
            nucleic_type: row.take_text("nucleic_type"),
            primary_tumour_site: row.take_text("primary_tumour_site"),
            tumour_content: row.take_text("tumour_content"),
            request_date: row.take_text("request_date"),
            requesting_doctor: row.take_text("requesting_doctor"),
            consultant: row.take_text("consultant"),
            source_laboratory: row.take_text("source_laboratory"),
            auslab: row.take_text("auslab"),
            anatomical_pathology: row.take_text("anatomical_pathology"),
            emr: row.take_text("emr"),
        }
    }

    fn skip(record: &Self::Record) -> bool {
        clinical_log::SKIPPED_STATUSES.contains(&record.status.as_str())
    }

    fn validate(record: &Self::Record, row: usize) -> Result<()> {
        if !record.gender.is_empty()
            && !clinical_log::ALLOWED_GENDERS.contains(&record.gender.as_str())
        {
            return Err(Error::validation(
                row,
                format!("unknown gender: '{}'", record.gender),
            ));
        }
        Ok(())
    }
}
