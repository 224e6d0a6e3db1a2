use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::enums::TriageLevel;

use super::{RuleError, TRIAGE_FILE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomRule {
    pub id: String,
    pub base_score: i64,
    #[serde(default)]
    pub red_flag: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageThresholds {
    pub low_max: i64,
    pub medium_max: i64,
}

fn default_red_flag_floor() -> i64 {
    21
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageConfig {
    pub symptoms: Vec<SymptomRule>,
    /// Keyed by the 1–5 severity rating.
    pub severity_multipliers: BTreeMap<u8, f64>,
    pub duration_multipliers: BTreeMap<String, f64>,
    pub thresholds: TriageThresholds,
    /// Minimum score whenever a red-flag symptom is present.
    #[serde(default = "default_red_flag_floor")]
    pub red_flag_floor: i64,
    #[serde(default)]
    pub guidance: HashMap<TriageLevel, String>,
}

impl TriageConfig {
    pub(crate) fn validate(&self) -> Result<(), RuleError> {
        if self.thresholds.low_max > self.thresholds.medium_max {
            return Err(RuleError::InvalidConfig(
                TRIAGE_FILE.into(),
                "thresholds.low_max exceeds thresholds.medium_max".into(),
            ));
        }
        if self.red_flag_floor > self.thresholds.medium_max
            || self.red_flag_floor <= self.thresholds.low_max
        {
            tracing::warn!(
                floor = self.red_flag_floor,
                low_max = self.thresholds.low_max,
                medium_max = self.thresholds.medium_max,
                "red-flag floor does not land in the Medium band"
            );
        }
        Ok(())
    }

    pub fn level_for(&self, score: i64) -> TriageLevel {
        if score <= self.thresholds.low_max {
            TriageLevel::Low
        } else if score <= self.thresholds.medium_max {
            TriageLevel::Medium
        } else {
            TriageLevel::High
        }
    }

    /// Guidance text for a level; empty when not configured.
    pub fn guidance(&self, level: TriageLevel) -> &str {
        self.guidance.get(&level).map(String::as_str).unwrap_or("")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriageOutcome {
    pub score: i64,
    pub level: TriageLevel,
}

/// Weighted symptom score and its triage level.
///
/// Unknown symptom ids score zero. Missing severity or duration multipliers
/// count as 1.0. A red-flag symptom lifts the score to the configured floor.
pub fn score_triage(
    config: &TriageConfig,
    symptoms: &[String],
    severity: u8,
    duration: &str,
) -> TriageOutcome {
    let matched: Vec<&SymptomRule> = symptoms
        .iter()
        .filter_map(|id| config.symptoms.iter().find(|s| &s.id == id))
        .collect();

    let base: i64 = matched.iter().map(|s| s.base_score).sum();
    let severity_mult = config.severity_multipliers.get(&severity).copied().unwrap_or(1.0);
    let duration_mult = config.duration_multipliers.get(duration).copied().unwrap_or(1.0);

    let mut score = (base as f64 * severity_mult * duration_mult).trunc() as i64;
    let red_flag = matched.iter().any(|s| s.red_flag);
    if red_flag && score < config.red_flag_floor {
        score = config.red_flag_floor;
    }

    let level = config.level_for(score);
    tracing::debug!(
        symptoms = symptoms.len(),
        matched = matched.len(),
        red_flag,
        score,
        %level,
        "triage scored"
    );
    TriageOutcome { score, level }
}
