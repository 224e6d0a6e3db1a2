use std::collections::HashSet;

use serde::Serialize;

use super::table::ReferenceTable;

/// Known spellings that differ from the canonical id, as (alias, canonical id).
/// Keys are matched case-insensitively; order breaks length ties.
pub const SYNONYMS: &[(&str, &str)] = &[
    ("haemoglobin", "Hemoglobin"),
    ("hemoglobin (hb)", "Hemoglobin"),
    ("hgb", "Hemoglobin"),
    ("hemoglobin a1c", "HbA1c"),
    ("haemoglobin a1c", "HbA1c"),
    ("glycated hemoglobin", "HbA1c"),
    ("glycosylated hemoglobin", "HbA1c"),
    ("glycated haemoglobin", "HbA1c"),
    ("a1c", "HbA1c"),
    ("fasting blood glucose", "Fasting Blood Sugar"),
    ("fasting plasma glucose", "Fasting Blood Sugar"),
    ("fasting glucose", "Fasting Blood Sugar"),
    ("glucose fasting", "Fasting Blood Sugar"),
    ("fbs", "Fasting Blood Sugar"),
    ("fpg", "Fasting Blood Sugar"),
    ("serum cholesterol", "Total Cholesterol"),
    ("cholesterol total", "Total Cholesterol"),
    ("cholesterol", "Total Cholesterol"),
    ("ldl-c", "LDL Cholesterol"),
    ("ldl cholesterol direct", "LDL Cholesterol"),
    ("low density lipoprotein", "LDL Cholesterol"),
    ("ldl", "LDL Cholesterol"),
    ("hdl-c", "HDL Cholesterol"),
    ("high density lipoprotein", "HDL Cholesterol"),
    ("hdl", "HDL Cholesterol"),
    ("triglyceride", "Triglycerides"),
    ("tgl", "Triglycerides"),
    ("25-oh vitamin d", "Vitamin D"),
    ("25-hydroxy vitamin d", "Vitamin D"),
    ("vitamin d3", "Vitamin D"),
    ("vitamin d total", "Vitamin D"),
    ("vit d", "Vitamin D"),
    ("cholecalciferol", "Vitamin D"),
    ("vit b12", "Vitamin B12"),
    ("cobalamin", "Vitamin B12"),
    ("cyanocobalamin", "Vitamin B12"),
    ("b12", "Vitamin B12"),
    ("serum iron", "Iron"),
    ("iron serum", "Iron"),
    ("serum ferritin", "Ferritin"),
    ("thyroid stimulating hormone", "TSH"),
    ("thyrotropin", "TSH"),
    ("serum creatinine", "Creatinine"),
    ("s. creatinine", "Creatinine"),
    ("serum calcium", "Calcium"),
    ("total leucocyte count", "WBC"),
    ("total leukocyte count", "WBC"),
    ("white blood cell count", "WBC"),
    ("white blood cells", "WBC"),
    ("tlc", "WBC"),
    ("platelet count", "Platelets"),
    ("plt", "Platelets"),
    ("serum uric acid", "Uric Acid"),
    ("urate", "Uric Acid"),
    ("serum sodium", "Sodium"),
    ("na+", "Sodium"),
    ("serum potassium", "Potassium"),
    ("k+", "Potassium"),
];

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasEntry {
    pub alias_text: String,
    pub canonical_id: String,
}

/// Where an alias was found inside a line (byte offsets into the lowercased line).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasMatch<'a> {
    pub alias: &'a str,
    pub canonical_id: &'a str,
    pub start: usize,
    pub end: usize,
}

/// Longest-match-first alias lookup over the canonical vocabulary.
///
/// Entries are sorted by descending alias length with a stable sort, so an
/// alias that is a substring of a longer alias never shadows it and equal
/// lengths keep insertion order (canonical ids first, then synonyms).
#[derive(Debug, Clone, Default)]
pub struct AliasResolver {
    entries: Vec<AliasEntry>,
}

impl AliasResolver {
    /// Every canonical id maps to itself, then each synonym whose target exists.
    /// A key seen twice keeps its first mapping.
    pub fn build(table: &ReferenceTable, synonyms: &[(&str, &str)]) -> Self {
        let mut seen: HashSet<String> = HashSet::new();
        let mut entries = Vec::new();

        let own = table.iter().map(|t| (t.id.as_str(), t.id.as_str()));
        for (alias, canonical) in own.chain(synonyms.iter().copied()) {
            if table.get(canonical).is_none() {
                tracing::debug!(alias, canonical, "synonym targets unknown canonical test, skipped");
                continue;
            }
            let key = alias.trim().to_lowercase();
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            entries.push(AliasEntry {
                alias_text: key,
                canonical_id: canonical.to_string(),
            });
        }

        entries.sort_by(|a, b| b.alias_text.chars().count().cmp(&a.alias_text.chars().count()));

        tracing::debug!(aliases = entries.len(), "alias table built");
        Self { entries }
    }

    /// Canonical ids plus the bundled [`SYNONYMS`].
    pub fn with_default_synonyms(table: &ReferenceTable) -> Self {
        Self::build(table, SYNONYMS)
    }

    /// Canonical id of the first (longest) alias occurring anywhere in `text`.
    pub fn resolve(&self, text: &str) -> Option<&str> {
        self.find(&text.to_lowercase()).map(|m| m.canonical_id)
    }

    /// Locate the first matching alias in an already-lowercased line.
    pub fn find<'a>(&'a self, lowered: &str) -> Option<AliasMatch<'a>> {
        self.entries.iter().find_map(|entry| {
            lowered.find(entry.alias_text.as_str()).map(|start| AliasMatch {
                alias: entry.alias_text.as_str(),
                canonical_id: entry.canonical_id.as_str(),
                start,
                end: start + entry.alias_text.len(),
            })
        })
    }

    /// Alias keys in lookup order.
    pub fn entries(&self) -> &[AliasEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::CanonicalTestDefinition;

    fn small_table() -> ReferenceTable {
        ReferenceTable::new(vec![
            CanonicalTestDefinition::with_range("HbA1c", Some(4.0), Some(5.6), Some("%")),
            CanonicalTestDefinition::with_range("Hemoglobin", Some(12.0), Some(17.5), Some("g/dL")),
            CanonicalTestDefinition::with_range("Vitamin D", Some(30.0), Some(100.0), Some("ng/mL")),
        ])
        .unwrap()
    }

    #[test]
    fn canonical_ids_are_their_own_alias() {
        let resolver = AliasResolver::build(&small_table(), &[]);
        assert_eq!(resolver.resolve("VITAMIN D, 25-OH"), Some("Vitamin D"));
        assert_eq!(resolver.resolve("hemoglobin 13"), Some("Hemoglobin"));
    }

    #[test]
    fn longer_alias_wins_over_contained_alias() {
        let resolver = AliasResolver::build(
            &small_table(),
            &[("hba1c (glycated)", "HbA1c"), ("hemoglobin a1c", "HbA1c")],
        );
        // "hemoglobin" is inside "hemoglobin a1c"
        assert_eq!(resolver.resolve("Hemoglobin A1c 6.1 %"), Some("HbA1c"));
        assert_eq!(resolver.resolve("Hemoglobin 13.1 g/dL"), Some("Hemoglobin"));
        let m = resolver.find("hba1c (glycated) 5.9").unwrap();
        assert_eq!(m.alias, "hba1c (glycated)");
    }

    #[test]
    fn entries_sorted_longest_first() {
        let resolver = AliasResolver::with_default_synonyms(&ReferenceTable::bundled().unwrap());
        let lengths: Vec<usize> = resolver
            .entries()
            .iter()
            .map(|e| e.alias_text.chars().count())
            .collect();
        assert!(lengths.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn equal_length_ties_keep_insertion_order() {
        let resolver =
            AliasResolver::build(&small_table(), &[("abc", "HbA1c"), ("xyz", "Hemoglobin")]);
        assert_eq!(resolver.resolve("xyz abc"), Some("HbA1c"));
    }

    #[test]
    fn first_mapping_of_duplicate_key_wins() {
        let resolver = AliasResolver::build(
            &small_table(),
            &[("hb", "Hemoglobin"), ("HB", "HbA1c")],
        );
        assert_eq!(resolver.resolve("hb 12"), Some("Hemoglobin"));
    }

    #[test]
    fn synonyms_for_unknown_tests_are_skipped() {
        let resolver = AliasResolver::build(&small_table(), &[("tsh", "TSH")]);
        assert_eq!(resolver.resolve("TSH 2.1"), None);
        assert_eq!(resolver.len(), 3);
    }

    #[test]
    fn no_alias_resolves_to_none() {
        let resolver = AliasResolver::with_default_synonyms(&ReferenceTable::bundled().unwrap());
        assert_eq!(resolver.resolve("Patient name: John Doe"), None);
        assert_eq!(resolver.resolve(""), None);
    }

    #[test]
    fn resolution_is_idempotent() {
        let resolver = AliasResolver::with_default_synonyms(&ReferenceTable::bundled().unwrap());
        let first = resolver.resolve("LDL Cholesterol 165 mg/dL");
        let second = resolver.resolve("LDL Cholesterol 165 mg/dL");
        assert_eq!(first, Some("LDL Cholesterol"));
        assert_eq!(first, second);
    }

    #[test]
    fn bundled_synonyms_map_to_canonical_tests() {
        let resolver = AliasResolver::with_default_synonyms(&ReferenceTable::bundled().unwrap());
        assert_eq!(resolver.resolve("Glycated Hemoglobin 6.4"), Some("HbA1c"));
        assert_eq!(resolver.resolve("25-OH Vitamin D 18 ng/mL"), Some("Vitamin D"));
        assert_eq!(resolver.resolve("Total Cholesterol 230"), Some("Total Cholesterol"));
        assert_eq!(resolver.resolve("Serum Cholesterol 230"), Some("Total Cholesterol"));
        assert_eq!(resolver.resolve("HDL-C 38"), Some("HDL Cholesterol"));
    }

    #[test]
    fn find_reports_byte_offsets() {
        let resolver = AliasResolver::build(&small_table(), &[]);
        let m = resolver.find("serum vitamin d: 18").unwrap();
        assert_eq!(m.start, 6);
        assert_eq!(m.end, 15);
        assert_eq!(m.canonical_id, "Vitamin D");
    }
}
