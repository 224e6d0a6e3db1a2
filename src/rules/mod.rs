//! Table-driven scorers for patient questionnaires.
//!
//! Every engine is a pure function over an explicit configuration value.
//! Configurations are plain serde documents, loaded once at startup and
//! never mutated afterwards.

pub mod blood_pressure;
pub mod diet;
pub mod lifestyle;
pub mod mental;
pub mod triage;

pub use blood_pressure::*;
pub use diet::*;
pub use lifestyle::*;
pub use mental::*;
pub use triage::*;

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::enums::ScreenerType;

#[derive(Error, Debug)]
pub enum RuleError {
    #[error("Failed to read rule config {0}: {1}")]
    ConfigLoad(String, String),

    #[error("Failed to parse rule config {0}: {1}")]
    ConfigParse(String, String),

    #[error("Invalid rule config {0}: {1}")]
    InvalidConfig(String, String),

    #[error("Rejected input: {0}")]
    Validation(#[from] ValidationError),
}

/// Rejected questionnaire input. Nothing is scored or stored.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{screener} expects {expected} answers, got {actual}")]
    AnswerCount {
        screener: ScreenerType,
        expected: usize,
        actual: usize,
    },

    #[error("{screener} answer {position} is {value}, expected 0..={max}")]
    AnswerOutOfRange {
        screener: ScreenerType,
        position: usize,
        value: i64,
        max: i64,
    },

    #[error("{field} reading {value} outside {min}..={max}")]
    ReadingOutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },
}

/// Inclusive score interval with its label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBucket {
    pub label: String,
    pub min: i64,
    pub max: i64,
}

impl ScoreBucket {
    pub fn contains(&self, score: i64) -> bool {
        self.min <= score && score <= self.max
    }
}

/// Label of the first bucket, in configured order, containing `score`.
pub fn first_bucket(buckets: &[ScoreBucket], score: i64) -> Option<&str> {
    buckets
        .iter()
        .find(|b| b.contains(score))
        .map(|b| b.label.as_str())
}

pub const LIFESTYLE_FILE: &str = "lifestyle.json";
pub const TRIAGE_FILE: &str = "triage.json";
pub const MENTAL_FILE: &str = "mental.json";
pub const BLOOD_PRESSURE_FILE: &str = "blood_pressure.json";
pub const DIET_FILE: &str = "diet.json";

const BUNDLED_LIFESTYLE: &str = include_str!("../../resources/config/lifestyle.json");
const BUNDLED_TRIAGE: &str = include_str!("../../resources/config/triage.json");
const BUNDLED_MENTAL: &str = include_str!("../../resources/config/mental.json");
const BUNDLED_BLOOD_PRESSURE: &str = include_str!("../../resources/config/blood_pressure.json");
const BUNDLED_DIET: &str = include_str!("../../resources/config/diet.json");

/// All rule configurations of one process.
#[derive(Debug, Clone)]
pub struct RuleSet {
    pub lifestyle: LifestyleConfig,
    pub triage: TriageConfig,
    pub mental: MentalConfig,
    pub blood_pressure: BloodPressureConfig,
    pub diet: DietConfig,
}

impl RuleSet {
    /// The configurations shipped with the binary.
    pub fn bundled() -> Result<Self, RuleError> {
        Self::from_sources(|name| {
            Ok(match name {
                LIFESTYLE_FILE => BUNDLED_LIFESTYLE,
                TRIAGE_FILE => BUNDLED_TRIAGE,
                MENTAL_FILE => BUNDLED_MENTAL,
                BLOOD_PRESSURE_FILE => BUNDLED_BLOOD_PRESSURE,
                _ => BUNDLED_DIET,
            }
            .to_string())
        })
    }

    /// Read every rule file from a config directory.
    pub fn load(config_dir: &Path) -> Result<Self, RuleError> {
        let rules = Self::from_sources(|name| {
            let path = config_dir.join(name);
            std::fs::read_to_string(&path)
                .map_err(|e| RuleError::ConfigLoad(path.display().to_string(), e.to_string()))
        })?;
        tracing::info!(dir = %config_dir.display(), "rule configs loaded");
        Ok(rules)
    }

    fn from_sources<F>(mut read: F) -> Result<Self, RuleError>
    where
        F: FnMut(&str) -> Result<String, RuleError>,
    {
        let lifestyle: LifestyleConfig = parse(LIFESTYLE_FILE, &read(LIFESTYLE_FILE)?)?;
        let triage: TriageConfig = parse(TRIAGE_FILE, &read(TRIAGE_FILE)?)?;
        let mental: MentalConfig = parse(MENTAL_FILE, &read(MENTAL_FILE)?)?;
        let blood_pressure: BloodPressureConfig =
            parse(BLOOD_PRESSURE_FILE, &read(BLOOD_PRESSURE_FILE)?)?;
        let diet: DietConfig = parse(DIET_FILE, &read(DIET_FILE)?)?;

        triage.validate()?;
        mental.validate()?;
        blood_pressure.validate();
        diet.validate()?;

        Ok(Self {
            lifestyle,
            triage,
            mental,
            blood_pressure,
            diet,
        })
    }
}

fn parse<T: DeserializeOwned>(name: &str, json: &str) -> Result<T, RuleError> {
    serde_json::from_str(json).map_err(|e| RuleError::ConfigParse(name.into(), e.to_string()))
}
