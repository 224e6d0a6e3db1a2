use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{Interpretation, LabSource, ReportStatus};
use super::lab::ExtractedLabResult;

/// Persisted lab report header with its classified rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabReport {
    pub id: Uuid,
    pub patient_id: String,
    pub report_date: NaiveDate,
    pub created_at: NaiveDateTime,
    pub source: LabSource,
    pub results: Vec<LabResultRow>,
    pub deficiency_summary: Vec<String>,
}

impl LabReport {
    pub fn abnormal_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.status.is_abnormal())
            .count()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabResultRow {
    pub id: Uuid,
    pub report_id: Uuid,
    pub test_name: String,
    pub value: f64,
    pub unit: Option<String>,
    pub status: Interpretation,
    pub ref_range_low: Option<f64>,
    pub ref_range_high: Option<f64>,
    pub deficiency_name: Option<String>,
    pub explanation: Option<String>,
}

/// Line-pattern analysis of one document's text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportAnalysis {
    pub status: ReportStatus,
    pub flags: Vec<String>,
    pub summary: String,
    pub results: Vec<ExtractedLabResult>,
}
