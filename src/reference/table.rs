use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::ReferenceError;

pub const REFERENCE_FILE: &str = "reference_ranges.json";

const BUNDLED_REFERENCE: &str = include_str!("../../resources/config/reference_ranges.json");

/// Reference interval and patient-facing wording for one canonical test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTestDefinition {
    pub id: String,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub deficiency_label: Option<String>,
    #[serde(default)]
    pub explanation: Option<String>,
}

impl CanonicalTestDefinition {
    /// Bare definition with only a range, handy for synthetic tables.
    pub fn with_range(id: &str, low: Option<f64>, high: Option<f64>, unit: Option<&str>) -> Self {
        Self {
            id: id.to_string(),
            low,
            high,
            unit: unit.map(str::to_string),
            deficiency_label: None,
            explanation: None,
        }
    }
}

/// Static table of canonical tests, in configuration order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable {
    tests: Vec<CanonicalTestDefinition>,
}

impl ReferenceTable {
    /// Build from already-parsed definitions. Ids must be unique and non-blank.
    pub fn new(tests: Vec<CanonicalTestDefinition>) -> Result<Self, ReferenceError> {
        let mut seen = HashSet::new();
        for test in &tests {
            if test.id.trim().is_empty() {
                return Err(ReferenceError::BlankTestId);
            }
            if !seen.insert(test.id.as_str()) {
                return Err(ReferenceError::DuplicateTest(test.id.clone()));
            }
            if let (Some(low), Some(high)) = (test.low, test.high) {
                if low > high {
                    tracing::warn!(test = %test.id, low, high, "reference range has low > high");
                }
            }
        }
        Ok(Self { tests })
    }

    pub fn from_json(json: &str) -> Result<Self, ReferenceError> {
        let tests: Vec<CanonicalTestDefinition> = serde_json::from_str(json)
            .map_err(|e| ReferenceError::ReferenceDataParse(REFERENCE_FILE.into(), e.to_string()))?;
        Self::new(tests)
    }

    /// Load `reference_ranges.json` from a config directory.
    pub fn load(config_dir: &Path) -> Result<Self, ReferenceError> {
        let path = config_dir.join(REFERENCE_FILE);
        let json = std::fs::read_to_string(&path).map_err(|e| {
            ReferenceError::ReferenceDataLoad(path.display().to_string(), e.to_string())
        })?;
        let table = Self::from_json(&json)?;
        tracing::info!(tests = table.len(), path = %path.display(), "reference table loaded");
        Ok(table)
    }

    /// The table shipped with the binary.
    pub fn bundled() -> Result<Self, ReferenceError> {
        Self::from_json(BUNDLED_REFERENCE)
    }

    /// Exact, case-sensitive lookup by canonical id.
    pub fn get(&self, id: &str) -> Option<&CanonicalTestDefinition> {
        self.tests.iter().find(|t| t.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &CanonicalTestDefinition> {
        self.tests.iter()
    }

    pub fn len(&self) -> usize {
        self.tests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }
}
