use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::CanonicalReading;
use crate::reference::{AliasResolver, ReferenceTable};

use super::range::parse_number;
use super::report_lines;

/// Unsigned integer or decimal.
static NUMERIC_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+(?:\.\d+)?").expect("Invalid numeric token pattern"));

/// Alias-driven extractor: one reading per canonical test per run.
///
/// For each line, the longest alias found anchors the search; the first
/// number after it is the value and the unit comes from the reference table.
/// Lines without an alias, or without a number after it, contribute nothing.
pub struct CanonicalExtractor<'a> {
    resolver: &'a AliasResolver,
    reference: &'a ReferenceTable,
}

impl<'a> CanonicalExtractor<'a> {
    pub fn new(resolver: &'a AliasResolver, reference: &'a ReferenceTable) -> Self {
        Self { resolver, reference }
    }

    pub fn extract(&self, text: &str) -> Vec<CanonicalReading> {
        let mut seen: HashSet<&str> = HashSet::new();
        let mut readings = Vec::new();

        for line in report_lines(text) {
            let lowered = line.to_lowercase();
            let Some(found) = self.resolver.find(&lowered) else {
                continue;
            };
            if seen.contains(found.canonical_id) {
                continue;
            }

            let remainder = &lowered[found.end..];
            let Some(value) = NUMERIC_TOKEN
                .find(remainder)
                .and_then(|m| parse_number(m.as_str()))
            else {
                continue;
            };

            seen.insert(found.canonical_id);
            readings.push(CanonicalReading {
                canonical_id: found.canonical_id.to_string(),
                value,
                unit: self
                    .reference
                    .get(found.canonical_id)
                    .and_then(|t| t.unit.clone()),
            });
        }

        tracing::debug!(readings = readings.len(), "alias-driven extraction");
        readings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixtures() -> (ReferenceTable, AliasResolver) {
        let table = ReferenceTable::bundled().unwrap();
        let resolver = AliasResolver::with_default_synonyms(&table);
        (table, resolver)
    }

    #[test]
    fn value_follows_alias() {
        let (table, resolver) = fixtures();
        let readings = CanonicalExtractor::new(&resolver, &table)
            .extract("25-OH Vitamin D (serum) ..... 18.4 ng/mL");
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].canonical_id, "Vitamin D");
        assert_eq!(readings[0].value, 18.4);
        assert_eq!(readings[0].unit.as_deref(), Some("ng/mL"));
    }

    #[test]
    fn numbers_before_the_alias_are_ignored() {
        let (table, resolver) = fixtures();
        let readings =
            CanonicalExtractor::new(&resolver, &table).extract("12 Hemoglobin result 13.6 g/dL");
        assert_eq!(readings[0].value, 13.6);
    }

    #[test]
    fn unit_comes_from_reference_not_text() {
        let (table, resolver) = fixtures();
        let readings = CanonicalExtractor::new(&resolver, &table).extract("HbA1c 48 mmol/mol");
        assert_eq!(readings[0].canonical_id, "HbA1c");
        assert_eq!(readings[0].unit.as_deref(), Some("%"));
    }

    #[test]
    fn one_reading_per_canonical_test() {
        let (table, resolver) = fixtures();
        let text = "Hemoglobin 13.1 g/dL\nHaemoglobin 9.0 g/dL\nTSH 2.2";
        let readings = CanonicalExtractor::new(&resolver, &table).extract(text);
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value, 13.1);
        assert_eq!(readings[1].canonical_id, "TSH");
    }

    #[test]
    fn alias_without_number_does_not_consume_test() {
        let (table, resolver) = fixtures();
        let text = "Hemoglobin (see below)\nHemoglobin 12.9";
        let readings = CanonicalExtractor::new(&resolver, &table).extract(text);
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].value, 12.9);
    }

    #[test]
    fn sign_is_not_part_of_token() {
        let (table, resolver) = fixtures();
        let readings = CanonicalExtractor::new(&resolver, &table).extract("Sodium: -140 mmol/L");
        assert_eq!(readings[0].value, 140.0);
    }

    #[test]
    fn only_first_alias_per_line_is_used() {
        let (table, resolver) = fixtures();
        // "ldl cholesterol" outranks "hdl" by length; the HDL value is never read
        let readings = CanonicalExtractor::new(&resolver, &table)
            .extract("HDL 38 / LDL Cholesterol 165");
        assert_eq!(readings.len(), 1);
        assert_eq!(readings[0].canonical_id, "LDL Cholesterol");
        assert_eq!(readings[0].value, 165.0);
    }

    #[test]
    fn unknown_lines_are_skipped() {
        let (table, resolver) = fixtures();
        let readings = CanonicalExtractor::new(&resolver, &table)
            .extract("Report generated 2024-01-15\nReferred by Dr. Rao");
        assert!(readings.is_empty());
    }
}
