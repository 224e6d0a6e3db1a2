use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::enums::ScreenerType;

use super::{first_bucket, RuleError, ScoreBucket, ValidationError, MENTAL_FILE};

/// Highest score a single screener answer can carry.
pub const MAX_ANSWER: i64 = 3;

/// Severity reported when no bucket contains the score.
pub const UNKNOWN_SEVERITY: &str = "Unknown";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenerConfig {
    pub questions: Vec<String>,
    pub severity_buckets: Vec<ScoreBucket>,
    pub safety_threshold: i64,
    pub safety_message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalConfig {
    pub screeners: HashMap<ScreenerType, ScreenerConfig>,
}

impl MentalConfig {
    pub fn screener(&self, screener: ScreenerType) -> Option<&ScreenerConfig> {
        self.screeners.get(&screener)
    }

    pub(crate) fn validate(&self) -> Result<(), RuleError> {
        for screener in [ScreenerType::Phq9, ScreenerType::Gad7] {
            match self.screener(screener) {
                None => {
                    return Err(RuleError::InvalidConfig(
                        MENTAL_FILE.into(),
                        format!("missing screener {screener}"),
                    ))
                }
                Some(config) if config.questions.is_empty() => {
                    return Err(RuleError::InvalidConfig(
                        MENTAL_FILE.into(),
                        format!("screener {screener} has no questions"),
                    ))
                }
                Some(_) => {}
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MentalOutcome {
    pub score: i64,
    pub severity: String,
    pub safety_message: Option<String>,
}

/// Score a PHQ-9 / GAD-7 style screener.
///
/// Rejects a submission whose answer count differs from the configured
/// question count, or with any answer outside `0..=3`. The total therefore
/// always lies within `0..=3 × questions`.
pub fn score_mental(
    config: &MentalConfig,
    screener: ScreenerType,
    answers: &[i64],
) -> Result<MentalOutcome, RuleError> {
    let screener_config = config.screener(screener).ok_or_else(|| {
        RuleError::InvalidConfig(MENTAL_FILE.into(), format!("missing screener {screener}"))
    })?;

    let expected = screener_config.questions.len();
    if answers.len() != expected {
        return Err(ValidationError::AnswerCount {
            screener,
            expected,
            actual: answers.len(),
        }
        .into());
    }

    if let Some((position, &value)) = answers
        .iter()
        .enumerate()
        .find(|(_, a)| !(0..=MAX_ANSWER).contains(*a))
    {
        return Err(ValidationError::AnswerOutOfRange {
            screener,
            position: position + 1,
            value,
            max: MAX_ANSWER,
        }
        .into());
    }

    // Bounded by 3 × questions once every answer is in range.
    let score: i64 = answers.iter().sum();

    let severity = first_bucket(&screener_config.severity_buckets, score)
        .unwrap_or(UNKNOWN_SEVERITY)
        .to_string();
    let safety_message = (score >= screener_config.safety_threshold)
        .then(|| screener_config.safety_message.clone());

    tracing::debug!(
        %screener,
        score,
        %severity,
        safety = safety_message.is_some(),
        "screener scored"
    );
    Ok(MentalOutcome {
        score,
        severity,
        safety_message,
    })
}
