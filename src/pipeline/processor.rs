//! Report processing: text in, classified lab data out.
//!
//! Two paths share the same vocabulary. The line-pattern path produces a
//! [`ReportAnalysis`] for display; the alias-driven path (and manual entry)
//! produces a [`LabReport`] keyed on canonical test ids, ready to store.

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::models::enums::{LabSource, ReportStatus};
use crate::models::{CanonicalReading, LabReport, LabResultRow, ManualLabEntry, ReportAnalysis};
use crate::pipeline::extraction::{
    classify, deficiency_summary, summarize, CanonicalExtractor, ExtractionError,
    LinePatternExtractor, ReportTextSource,
};
use crate::reference::{AliasResolver, ReferenceTable};

pub struct ReportProcessor<'a> {
    reference: &'a ReferenceTable,
    resolver: &'a AliasResolver,
}

impl<'a> ReportProcessor<'a> {
    pub fn new(reference: &'a ReferenceTable, resolver: &'a AliasResolver) -> Self {
        Self { reference, resolver }
    }

    /// Line-pattern analysis of already-extracted text.
    ///
    /// Blank text is `no_readable_content`; text with zero recognisable rows
    /// is `nothing_recognized`. Both still carry the aggregator's flags.
    pub fn analyze_text(&self, text: &str) -> ReportAnalysis {
        let results = LinePatternExtractor::with_resolver(self.resolver).extract(text);
        let status = if text.trim().is_empty() {
            ReportStatus::NoReadableContent
        } else if results.is_empty() {
            ReportStatus::NothingRecognized
        } else {
            ReportStatus::Analyzed
        };
        let summary = summarize(&results);

        tracing::info!(%status, results = results.len(), "report analyzed");
        ReportAnalysis {
            status,
            flags: summary.flags,
            summary: summary.summary,
            results,
        }
    }

    /// Decode a document through `source`, then analyze it.
    pub fn analyze_document(
        &self,
        source: &dyn ReportTextSource,
        document: &[u8],
    ) -> Result<ReportAnalysis, ExtractionError> {
        let text = source.extract_text(document)?;
        Ok(self.analyze_text(&text))
    }

    /// Alias-driven extraction, classified into a report for `patient_id`.
    pub fn build_report(&self, patient_id: &str, report_date: NaiveDate, text: &str) -> LabReport {
        let readings = CanonicalExtractor::new(self.resolver, self.reference).extract(text);
        let mut report = empty_report(patient_id, report_date, LabSource::Upload);
        report.results = readings
            .iter()
            .map(|reading| self.classified_row(report.id, reading))
            .collect();
        report.deficiency_summary = deficiency_summary(&report.results);
        report
    }

    /// Classify typed-in values. Names resolve through the alias table;
    /// unresolved names are kept verbatim with status `unknown`.
    pub fn build_manual_report(
        &self,
        patient_id: &str,
        report_date: NaiveDate,
        entries: &[ManualLabEntry],
    ) -> LabReport {
        let mut report = empty_report(patient_id, report_date, LabSource::Manual);
        report.results = entries
            .iter()
            .map(|entry| match self.resolver.resolve(&entry.test_name) {
                Some(canonical_id) => {
                    let unit = entry.unit.clone().or_else(|| {
                        self.reference.get(canonical_id).and_then(|t| t.unit.clone())
                    });
                    self.classified_row(
                        report.id,
                        &CanonicalReading {
                            canonical_id: canonical_id.to_string(),
                            value: entry.value,
                            unit,
                        },
                    )
                }
                None => {
                    tracing::debug!("manual entry did not resolve to a known test");
                    unknown_row(report.id, entry)
                }
            })
            .collect();
        report.deficiency_summary = deficiency_summary(&report.results);
        report
    }

    fn classified_row(&self, report_id: Uuid, reading: &CanonicalReading) -> LabResultRow {
        let c = classify(
            self.reference,
            &reading.canonical_id,
            reading.value,
            reading.unit.as_deref(),
        );
        LabResultRow {
            id: Uuid::new_v4(),
            report_id,
            test_name: reading.canonical_id.clone(),
            value: reading.value,
            unit: reading.unit.clone(),
            status: c.status,
            ref_range_low: c.ref_low,
            ref_range_high: c.ref_high,
            deficiency_name: c.deficiency_label,
            explanation: c.explanation,
        }
    }
}

fn empty_report(patient_id: &str, report_date: NaiveDate, source: LabSource) -> LabReport {
    LabReport {
        id: Uuid::new_v4(),
        patient_id: patient_id.to_string(),
        report_date,
        created_at: Utc::now().naive_utc(),
        source,
        results: Vec::new(),
        deficiency_summary: Vec::new(),
    }
}

fn unknown_row(report_id: Uuid, entry: &ManualLabEntry) -> LabResultRow {
    LabResultRow {
        id: Uuid::new_v4(),
        report_id,
        test_name: entry.test_name.trim().to_string(),
        value: entry.value,
        unit: entry.unit.clone(),
        status: crate::models::enums::Interpretation::Unknown,
        ref_range_low: None,
        ref_range_high: None,
        deficiency_name: None,
        explanation: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::enums::Interpretation;
    use crate::pipeline::extraction::PlainTextSource;

    fn fixtures() -> (ReferenceTable, AliasResolver) {
        let table = ReferenceTable::bundled().unwrap();
        let resolver = AliasResolver::with_default_synonyms(&table);
        (table, resolver)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 14).unwrap()
    }

    const REPORT: &str = "\
CITY DIAGNOSTICS LTD
Patient: A. Kumar   Age: 42
Test            Result   Unit    Reference
Hemoglobin      11.2     g/dL    13.0 - 17.0
LDL Cholesterol 165      mg/dL   < 100
HDL Cholesterol 52       mg/dL   > 40
Vitamin D: 18 ng/mL (30 - 100)
*** End of report ***
";

    #[test]
    fn analyzed_report_flags_abnormal_rows() {
        let (table, resolver) = fixtures();
        let analysis = ReportProcessor::new(&table, &resolver).analyze_text(REPORT);
        assert_eq!(analysis.status, ReportStatus::Analyzed);
        assert_eq!(analysis.results.len(), 4);
        assert_eq!(
            analysis.flags,
            vec!["Hemoglobin low", "Vitamin D low", "LDL Cholesterol high"]
        );
        assert_eq!(analysis.summary, "Abnormal results detected (2 low, 1 high).");
        assert_eq!(analysis.results[0].test_name_canonical.as_deref(), Some("Hemoglobin"));
    }

    #[test]
    fn blank_text_is_no_readable_content() {
        let (table, resolver) = fixtures();
        let analysis = ReportProcessor::new(&table, &resolver).analyze_text("  \n\u{0c}\n ");
        assert_eq!(analysis.status, ReportStatus::NoReadableContent);
        assert_eq!(analysis.flags, vec!["No lab values detected"]);
        assert!(analysis.results.is_empty());
    }

    #[test]
    fn prose_only_is_nothing_recognized() {
        let (table, resolver) = fixtures();
        let analysis = ReportProcessor::new(&table, &resolver)
            .analyze_text("Dear patient,\nplease collect your report in person.");
        assert_eq!(analysis.status, ReportStatus::NothingRecognized);
        assert_eq!(analysis.flags, vec!["No lab values detected"]);
    }

    #[test]
    fn analyze_document_decodes_first() {
        let (table, resolver) = fixtures();
        let processor = ReportProcessor::new(&table, &resolver);
        let analysis = processor
            .analyze_document(&PlainTextSource, b"TSH 6.2 mIU/L 0.4 - 4.0")
            .unwrap();
        assert_eq!(analysis.results[0].interpretation, Interpretation::High);

        assert!(processor.analyze_document(&PlainTextSource, &[0xff, 0xfe]).is_err());
    }

    struct FailingSource;

    impl ReportTextSource for FailingSource {
        fn extract_text(&self, _document: &[u8]) -> Result<String, ExtractionError> {
            Err(ExtractionError::TextSource("decoder unavailable".into()))
        }
    }

    #[test]
    fn text_source_failure_propagates() {
        let (table, resolver) = fixtures();
        let err = ReportProcessor::new(&table, &resolver)
            .analyze_document(&FailingSource, b"%PDF-1.7")
            .unwrap_err();
        assert!(matches!(err, ExtractionError::TextSource(msg) if msg == "decoder unavailable"));
    }

    #[test]
    fn canonical_report_classifies_against_reference() {
        let (table, resolver) = fixtures();
        let report = ReportProcessor::new(&table, &resolver).build_report(
            "patient-1",
            date(),
            "Serum Vitamin B12 ..... 150 pg/mL\nHaemoglobin 14.1\nIron 40 ug/dL",
        );
        assert_eq!(report.source, LabSource::Upload);
        assert_eq!(report.results.len(), 3);
        assert!(report.results.iter().all(|r| r.report_id == report.id));

        let b12 = &report.results[0];
        assert_eq!(b12.test_name, "Vitamin B12");
        assert_eq!(b12.status, Interpretation::Low);
        assert_eq!(b12.deficiency_name.as_deref(), Some("Vitamin B12 deficiency"));
        assert_eq!(report.results[1].status, Interpretation::Normal);
        assert_eq!(
            report.deficiency_summary,
            vec!["Vitamin B12 deficiency", "Iron deficiency"]
        );
        assert_eq!(report.abnormal_count(), 2);
    }

    #[test]
    fn manual_entries_resolve_aliases_and_fill_units() {
        let (table, resolver) = fixtures();
        let entries = vec![
            ManualLabEntry { test_name: "vit d".into(), value: 12.0, unit: None },
            ManualLabEntry { test_name: "Hemoglobin".into(), value: 15.0, unit: Some("g/dL".into()) },
            ManualLabEntry { test_name: " Lipoprotein(a) ".into(), value: 80.0, unit: Some("nmol/L".into()) },
        ];
        let report =
            ReportProcessor::new(&table, &resolver).build_manual_report("patient-1", date(), &entries);
        assert_eq!(report.source, LabSource::Manual);

        let vit_d = &report.results[0];
        assert_eq!(vit_d.test_name, "Vitamin D");
        assert_eq!(vit_d.unit.as_deref(), Some("ng/mL"));
        assert_eq!(vit_d.status, Interpretation::Low);

        assert_eq!(report.results[1].status, Interpretation::Normal);

        let unknown = &report.results[2];
        assert_eq!(unknown.test_name, "Lipoprotein(a)");
        assert_eq!(unknown.status, Interpretation::Unknown);
        assert_eq!(unknown.unit.as_deref(), Some("nmol/L"));

        assert_eq!(report.deficiency_summary, vec!["Vitamin D deficiency"]);
    }
}
