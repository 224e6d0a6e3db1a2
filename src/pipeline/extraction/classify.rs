use crate::models::enums::Interpretation;
use crate::models::LabClassification;
use crate::reference::ReferenceTable;

use super::range::interpret;

/// Classify a canonical value against the reference table.
///
/// Unknown tests classify as `unknown` with every other field absent. The
/// deficiency label is only attached to `low`, the explanation to `low` and
/// `high`. The unit is informational; values are compared as given.
pub fn classify(
    reference: &ReferenceTable,
    canonical_id: &str,
    value: f64,
    unit: Option<&str>,
) -> LabClassification {
    let Some(test) = reference.get(canonical_id) else {
        tracing::debug!(canonical_id, "classification requested for unknown test");
        return LabClassification::unknown();
    };

    if let (Some(given), Some(expected)) = (unit, test.unit.as_deref()) {
        if !given.eq_ignore_ascii_case(expected) {
            tracing::debug!(canonical_id, given, expected, "unit differs from reference unit");
        }
    }

    let status = interpret(Some(value), test.low, test.high);
    LabClassification {
        status,
        ref_low: test.low,
        ref_high: test.high,
        deficiency_label: match status {
            Interpretation::Low => test.deficiency_label.clone(),
            _ => None,
        },
        explanation: if status.is_abnormal() {
            test.explanation.clone()
        } else {
            None
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> ReferenceTable {
        ReferenceTable::bundled().unwrap()
    }

    #[test]
    fn low_vitamin_d_carries_deficiency() {
        let c = classify(&table(), "Vitamin D", 18.0, Some("ng/mL"));
        assert_eq!(c.status, Interpretation::Low);
        assert_eq!(c.ref_low, Some(30.0));
        assert_eq!(c.deficiency_label.as_deref(), Some("Vitamin D deficiency"));
        assert!(c.explanation.is_some());
    }

    #[test]
    fn high_value_has_explanation_but_no_deficiency() {
        let c = classify(&table(), "LDL Cholesterol", 165.0, None);
        assert_eq!(c.status, Interpretation::High);
        assert_eq!(c.ref_low, None);
        assert_eq!(c.ref_high, Some(100.0));
        assert!(c.deficiency_label.is_none());
        assert!(c.explanation.is_some());
    }

    #[test]
    fn normal_value_is_bare() {
        let c = classify(&table(), "Hemoglobin", 14.0, Some("g/dL"));
        assert_eq!(c.status, Interpretation::Normal);
        assert!(c.deficiency_label.is_none());
        assert!(c.explanation.is_none());
    }

    #[test]
    fn unknown_test_is_unknown() {
        let c = classify(&table(), "Lipoprotein(a)", 80.0, None);
        assert_eq!(c, LabClassification::unknown());
    }

    #[test]
    fn mismatched_unit_still_classifies() {
        let c = classify(&table(), "Hemoglobin", 9.0, Some("mmol/L"));
        assert_eq!(c.status, Interpretation::Low);
    }
}
