use std::collections::HashMap;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use super::ValidationError;

/// Accepted systolic readings, mmHg.
pub const SYSTOLIC_LIMITS: RangeInclusive<i64> = 60..=250;
/// Accepted diastolic readings, mmHg.
pub const DIASTOLIC_LIMITS: RangeInclusive<i64> = 40..=180;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpCategory {
    pub label: String,
    pub systolic_min: i64,
    pub diastolic_min: i64,
    /// Descriptive only; classification gates on the minimums.
    #[serde(default)]
    pub systolic_max: Option<i64>,
    #[serde(default)]
    pub diastolic_max: Option<i64>,
    pub flagged: bool,
}

/// Categories are listed from least to most severe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BloodPressureConfig {
    pub categories: Vec<BpCategory>,
    pub normal_label: String,
    #[serde(default)]
    pub guidance: HashMap<String, String>,
}

impl BloodPressureConfig {
    /// Out-of-order minimums make the reverse scan pick the wrong bucket.
    /// That is a data-quality warning, not a load failure.
    pub(crate) fn validate(&self) {
        for pair in self.categories.windows(2) {
            if pair[1].systolic_min < pair[0].systolic_min
                || pair[1].diastolic_min < pair[0].diastolic_min
            {
                tracing::warn!(
                    lower = %pair[0].label,
                    higher = %pair[1].label,
                    "blood pressure categories not in increasing severity"
                );
            }
        }
    }

    pub fn guidance(&self, label: &str) -> &str {
        self.guidance.get(label).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BpClassification {
    pub flagged: bool,
    pub label: String,
    pub guidance: String,
}

/// Most severe category whose systolic and diastolic minimums are both met.
pub fn classify_blood_pressure(
    config: &BloodPressureConfig,
    systolic: i64,
    diastolic: i64,
) -> BpClassification {
    let (flagged, label) = config
        .categories
        .iter()
        .rev()
        .find(|c| systolic >= c.systolic_min && diastolic >= c.diastolic_min)
        .map(|c| (c.flagged, c.label.as_str()))
        .unwrap_or((false, config.normal_label.as_str()));

    BpClassification {
        flagged,
        label: label.to_string(),
        guidance: config.guidance(label).to_string(),
    }
}

/// Reject readings no cuff would plausibly produce.
pub fn validate_reading(systolic: i64, diastolic: i64) -> Result<(), ValidationError> {
    for (field, value, limits) in [
        ("systolic", systolic, &SYSTOLIC_LIMITS),
        ("diastolic", diastolic, &DIASTOLIC_LIMITS),
    ] {
        if !limits.contains(&value) {
            return Err(ValidationError::ReadingOutOfRange {
                field,
                value,
                min: *limits.start(),
                max: *limits.end(),
            });
        }
    }
    Ok(())
}
