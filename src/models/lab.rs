use serde::{Deserialize, Serialize};

use super::enums::Interpretation;

/// One lab row pulled out of report text by the line-pattern extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedLabResult {
    pub test_name_raw: String,
    pub test_name_canonical: Option<String>,
    pub value: Option<f64>,
    pub value_raw: String,
    pub unit: Option<String>,
    pub ref_low: Option<f64>,
    pub ref_high: Option<f64>,
    pub ref_raw: Option<String>,
    pub interpretation: Interpretation,
}

/// A value found next to a known alias by the alias-driven extractor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalReading {
    pub canonical_id: String,
    pub value: f64,
    pub unit: Option<String>,
}

/// Outcome of classifying a canonical value against the reference table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabClassification {
    pub status: Interpretation,
    pub ref_low: Option<f64>,
    pub ref_high: Option<f64>,
    pub deficiency_label: Option<String>,
    pub explanation: Option<String>,
}

impl LabClassification {
    pub fn unknown() -> Self {
        Self {
            status: Interpretation::Unknown,
            ref_low: None,
            ref_high: None,
            deficiency_label: None,
            explanation: None,
        }
    }
}

/// A patient-typed lab value (manual entry form).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManualLabEntry {
    pub test_name: String,
    pub value: f64,
    #[serde(default)]
    pub unit: Option<String>,
}
