use serde::{Deserialize, Serialize};

use crate::models::enums::Interpretation;
use crate::models::{ExtractedLabResult, LabResultRow};

/// Flags listed per bucket.
const MAX_FLAGS_PER_BUCKET: usize = 10;

pub const NO_VALUES_FLAG: &str = "No lab values detected";
pub const NO_VALUES_SUMMARY: &str =
    "Could not extract lab values from the PDF text. The report may be scanned (image-based).";
pub const RANGE_MISSING_FLAG: &str = "Reference range missing for some tests";
pub const RANGE_MISSING_SUMMARY: &str =
    "Values were extracted, but reference ranges were missing/unclear for some tests.";
pub const ALL_NORMAL_FLAG: &str = "All extracted parameters appear within range";
pub const ALL_NORMAL_SUMMARY: &str =
    "All extracted parameters appear within normal limits based on the reference ranges found in the report.";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabSummary {
    pub flags: Vec<String>,
    pub summary: String,
}

/// Anything with a display name and an interpretation can be summarized.
pub trait Interpreted {
    fn display_name(&self) -> &str;
    fn interpretation(&self) -> Interpretation;
}

impl Interpreted for ExtractedLabResult {
    fn display_name(&self) -> &str {
        &self.test_name_raw
    }

    fn interpretation(&self) -> Interpretation {
        self.interpretation
    }
}

impl Interpreted for LabResultRow {
    fn display_name(&self) -> &str {
        &self.test_name
    }

    fn interpretation(&self) -> Interpretation {
        self.status
    }
}

/// Roll classified results up into flag strings and a one-line summary.
pub fn summarize<R: Interpreted>(results: &[R]) -> LabSummary {
    if results.is_empty() {
        return LabSummary {
            flags: vec![NO_VALUES_FLAG.to_string()],
            summary: NO_VALUES_SUMMARY.to_string(),
        };
    }

    let bucket = |wanted: Interpretation| -> Vec<&R> {
        results
            .iter()
            .filter(|r| r.interpretation() == wanted)
            .collect()
    };
    let lows = bucket(Interpretation::Low);
    let highs = bucket(Interpretation::High);
    let unknown = bucket(Interpretation::Unknown);

    let flags: Vec<String> = lows
        .iter()
        .take(MAX_FLAGS_PER_BUCKET)
        .map(|r| format!("{} low", r.display_name()))
        .chain(
            highs
                .iter()
                .take(MAX_FLAGS_PER_BUCKET)
                .map(|r| format!("{} high", r.display_name())),
        )
        .collect();

    if flags.is_empty() {
        return if unknown.is_empty() {
            LabSummary {
                flags: vec![ALL_NORMAL_FLAG.to_string()],
                summary: ALL_NORMAL_SUMMARY.to_string(),
            }
        } else {
            LabSummary {
                flags: vec![RANGE_MISSING_FLAG.to_string()],
                summary: RANGE_MISSING_SUMMARY.to_string(),
            }
        };
    }

    let counts: Vec<String> = [
        (lows.len(), "low"),
        (highs.len(), "high"),
        (unknown.len(), "unknown-range"),
    ]
    .into_iter()
    .filter(|(n, _)| *n > 0)
    .map(|(n, label)| format!("{n} {label}"))
    .collect();

    LabSummary {
        flags,
        summary: format!("Abnormal results detected ({}).", counts.join(", ")),
    }
}

/// Distinct deficiency labels of the low rows, in row order.
pub fn deficiency_summary(rows: &[LabResultRow]) -> Vec<String> {
    let mut labels: Vec<String> = Vec::new();
    for row in rows.iter().filter(|r| r.status == Interpretation::Low) {
        if let Some(label) = &row.deficiency_name {
            if !labels.contains(label) {
                labels.push(label.clone());
            }
        }
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn result(name: &str, interpretation: Interpretation) -> ExtractedLabResult {
        ExtractedLabResult {
            test_name_raw: name.into(),
            test_name_canonical: None,
            value: Some(1.0),
            value_raw: "1".into(),
            unit: None,
            ref_low: None,
            ref_high: None,
            ref_raw: None,
            interpretation,
        }
    }

    fn row(name: &str, status: Interpretation, deficiency: Option<&str>) -> LabResultRow {
        LabResultRow {
            id: Uuid::new_v4(),
            report_id: Uuid::nil(),
            test_name: name.into(),
            value: 1.0,
            unit: None,
            status,
            ref_range_low: None,
            ref_range_high: None,
            deficiency_name: deficiency.map(str::to_string),
            explanation: None,
        }
    }

    #[test]
    fn empty_input_reports_nothing_detected() {
        let s = summarize::<ExtractedLabResult>(&[]);
        assert_eq!(s.flags, vec![NO_VALUES_FLAG]);
        assert!(s.summary.contains("scanned"));
    }

    #[test]
    fn all_normal() {
        let s = summarize(&[result("Glucose", Interpretation::Normal)]);
        assert_eq!(s.flags, vec![ALL_NORMAL_FLAG]);
        assert_eq!(s.summary, ALL_NORMAL_SUMMARY);
    }

    #[test]
    fn missing_ranges_without_abnormal() {
        let s = summarize(&[
            result("Glucose", Interpretation::Normal),
            result("TSH", Interpretation::Unknown),
        ]);
        assert_eq!(s.flags, vec![RANGE_MISSING_FLAG]);
        assert_eq!(s.summary, RANGE_MISSING_SUMMARY);
    }

    #[test]
    fn lows_listed_before_highs() {
        let s = summarize(&[
            result("LDL", Interpretation::High),
            result("Hemoglobin", Interpretation::Low),
            result("TSH", Interpretation::Unknown),
            result("Glucose", Interpretation::Normal),
        ]);
        assert_eq!(s.flags, vec!["Hemoglobin low", "LDL high"]);
        assert_eq!(s.summary, "Abnormal results detected (1 low, 1 high, 1 unknown-range).");
    }

    #[test]
    fn zero_counts_are_omitted() {
        let s = summarize(&[
            result("LDL", Interpretation::High),
            result("Triglycerides", Interpretation::High),
        ]);
        assert_eq!(s.summary, "Abnormal results detected (2 high).");
    }

    #[test]
    fn flags_capped_per_bucket() {
        let mut results: Vec<ExtractedLabResult> = (0..12)
            .map(|i| result(&format!("Low{i}"), Interpretation::Low))
            .collect();
        results.extend((0..11).map(|i| result(&format!("High{i}"), Interpretation::High)));
        let s = summarize(&results);
        assert_eq!(s.flags.len(), 20);
        assert_eq!(s.flags[9], "Low9 low");
        assert_eq!(s.flags[10], "High0 high");
        // counts still reflect every row
        assert_eq!(s.summary, "Abnormal results detected (12 low, 11 high).");
    }

    #[test]
    fn summarizes_stored_rows() {
        let s = summarize(&[row("Vitamin D", Interpretation::Low, None)]);
        assert_eq!(s.flags, vec!["Vitamin D low"]);
    }

    #[test]
    fn deficiency_summary_dedups_low_labels() {
        let rows = [
            row("Vitamin D", Interpretation::Low, Some("Vitamin D deficiency")),
            row("Iron", Interpretation::Low, Some("Iron deficiency")),
            row("Ferritin", Interpretation::Normal, Some("Low iron stores")),
            row("25-OH D", Interpretation::Low, Some("Vitamin D deficiency")),
        ];
        assert_eq!(
            deficiency_summary(&rows),
            vec!["Vitamin D deficiency", "Iron deficiency"]
        );
    }
}
