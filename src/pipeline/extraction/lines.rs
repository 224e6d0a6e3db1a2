use std::collections::HashSet;

use crate::models::ExtractedLabResult;
use crate::reference::AliasResolver;

use super::patterns::{default_patterns, LinePattern};
use super::range::{interpret, parse_number, parse_reference_range};
use super::report_lines;

/// Line-by-line extractor driven by an ordered list of [`LinePattern`]s.
///
/// With a resolver attached, each row also gets its canonical test id.
pub struct LinePatternExtractor<'a> {
    patterns: Vec<Box<dyn LinePattern>>,
    resolver: Option<&'a AliasResolver>,
}

impl Default for LinePatternExtractor<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> LinePatternExtractor<'a> {
    pub fn new() -> Self {
        Self {
            patterns: default_patterns(),
            resolver: None,
        }
    }

    pub fn with_resolver(resolver: &'a AliasResolver) -> Self {
        Self {
            patterns: default_patterns(),
            resolver: Some(resolver),
        }
    }

    /// Replace the pattern list (precedence = vector order).
    pub fn with_patterns(mut self, patterns: Vec<Box<dyn LinePattern>>) -> Self {
        self.patterns = patterns;
        self
    }

    /// Extract every recognisable lab row. Unmatched lines are skipped;
    /// a repeated (test, value, range) triple keeps only its first row.
    pub fn extract(&self, text: &str) -> Vec<ExtractedLabResult> {
        let mut results = Vec::new();
        let mut seen: HashSet<(String, String, String)> = HashSet::new();
        let mut line_count = 0usize;

        for line in report_lines(text) {
            line_count += 1;
            let Some(m) = self.patterns.iter().find_map(|p| p.match_line(line)) else {
                continue;
            };

            let key = (
                m.test.to_lowercase(),
                m.value_raw.clone(),
                m.ref_raw.clone().unwrap_or_default(),
            );
            if !seen.insert(key) {
                continue;
            }

            let value = parse_number(&m.value_raw);
            let (ref_low, ref_high) = m
                .ref_raw
                .as_deref()
                .map(parse_reference_range)
                .unwrap_or((None, None));

            results.push(ExtractedLabResult {
                test_name_canonical: self
                    .resolver
                    .and_then(|r| r.resolve(&m.test))
                    .map(str::to_string),
                interpretation: interpret(value, ref_low, ref_high),
                test_name_raw: m.test,
                value,
                value_raw: m.value_raw,
                unit: m.unit,
                ref_low,
                ref_high,
                ref_raw: m.ref_raw,
            });
        }

        tracing::debug!(lines = line_count, results = results.len(), "line-pattern extraction");
        results
    }
}

/// Line-pattern extraction with the default layouts and no alias resolution.
pub fn extract_lab_results(text: &str) -> Vec<ExtractedLabResult> {
    LinePatternExtractor::new().extract(text)
}
