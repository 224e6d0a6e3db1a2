use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{first_bucket, ScoreBucket};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerOption {
    pub value: i64,
    pub points: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleQuestion {
    pub id: String,
    pub options: Vec<AnswerOption>,
}

impl LifestyleQuestion {
    fn max_points(&self) -> i64 {
        self.options.iter().map(|o| o.points).max().unwrap_or(0)
    }

    fn points_for(&self, value: i64) -> Option<i64> {
        self.options.iter().find(|o| o.value == value).map(|o| o.points)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleConfig {
    pub questions: Vec<LifestyleQuestion>,
    pub categories: Vec<ScoreBucket>,
    /// Used when no category contains the score.
    pub fallback_category: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleOutcome {
    pub score: i64,
    pub category: String,
}

/// Score answers on a 0–100 scale relative to the best possible answers.
///
/// Unknown question ids and unmatched option values contribute nothing.
pub fn score_lifestyle(config: &LifestyleConfig, answers: &BTreeMap<String, i64>) -> LifestyleOutcome {
    let max_points: i64 = config.questions.iter().map(LifestyleQuestion::max_points).sum();

    let total: i64 = answers
        .iter()
        .filter_map(|(id, value)| {
            config
                .questions
                .iter()
                .find(|q| &q.id == id)
                .and_then(|q| q.points_for(*value))
        })
        .sum();

    let score = if max_points == 0 {
        0
    } else {
        (100.0 * total as f64 / max_points as f64).round() as i64
    };

    let category = first_bucket(&config.categories, score)
        .unwrap_or(&config.fallback_category)
        .to_string();

    tracing::debug!(answered = answers.len(), score, %category, "lifestyle scored");
    LifestyleOutcome { score, category }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::RuleSet;

    fn synthetic() -> LifestyleConfig {
        let options = |points: &[i64]| {
            points
                .iter()
                .enumerate()
                .map(|(i, p)| AnswerOption { value: i as i64, points: *p })
                .collect::<Vec<_>>()
        };
        LifestyleConfig {
            questions: vec![
                LifestyleQuestion { id: "sleep".into(), options: options(&[0, 1, 2]) },
                LifestyleQuestion { id: "water".into(), options: options(&[0, 1]) },
            ],
            categories: vec![
                ScoreBucket { label: "Great".into(), min: 67, max: 100 },
                ScoreBucket { label: "Fair".into(), min: 34, max: 66 },
                ScoreBucket { label: "Poor".into(), min: 1, max: 33 },
            ],
            fallback_category: "Unrated".into(),
        }
    }

    fn answers(pairs: &[(&str, i64)]) -> BTreeMap<String, i64> {
        pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
    }

    #[test]
    fn score_is_share_of_max_points() {
        // 2 of 3 possible points
        let out = score_lifestyle(&synthetic(), &answers(&[("sleep", 1), ("water", 1)]));
        assert_eq!(out.score, 67);
        assert_eq!(out.category, "Great");
    }

    #[test]
    fn unknown_ids_and_values_are_ignored() {
        let out = score_lifestyle(
            &synthetic(),
            &answers(&[("sleep", 2), ("water", 7), ("mood", 3)]),
        );
        assert_eq!(out.score, 67);
    }

    #[test]
    fn nothing_answered_uses_fallback_when_no_bucket_holds_zero() {
        let out = score_lifestyle(&synthetic(), &answers(&[("unknown", 1)]));
        assert_eq!(out.score, 0);
        assert_eq!(out.category, "Unrated");
    }

    #[test]
    fn empty_config_scores_zero() {
        let config = LifestyleConfig {
            questions: vec![],
            categories: vec![],
            fallback_category: "Lazy".into(),
        };
        let out = score_lifestyle(&config, &answers(&[("sleep", 1)]));
        assert_eq!(out, LifestyleOutcome { score: 0, category: "Lazy".into() });
    }

    #[test]
    fn bundled_extremes() {
        let rules = RuleSet::bundled().unwrap();
        let all_best: BTreeMap<String, i64> = rules
            .lifestyle
            .questions
            .iter()
            .map(|q| {
                let best = q.options.iter().max_by_key(|o| o.points).unwrap();
                (q.id.clone(), best.value)
            })
            .collect();
        let best = score_lifestyle(&rules.lifestyle, &all_best);
        assert_eq!(best.score, 100);
        assert_eq!(best.category, "Very Active");

        let none = score_lifestyle(&rules.lifestyle, &answers(&[("not_a_question", 3)]));
        assert_eq!(none.score, 0);
        assert_eq!(none.category, "Lazy");
    }

    #[test]
    fn bundled_midpoint() {
        let rules = RuleSet::bundled().unwrap();
        // six questions at full marks, the rest at zero: 18 of 36 points
        let half: BTreeMap<String, i64> = rules
            .lifestyle
            .questions
            .iter()
            .filter(|q| q.id != "sleep_hours")
            .take(6)
            .map(|q| (q.id.clone(), 3))
            .collect();
        let out = score_lifestyle(&rules.lifestyle, &half);
        assert_eq!(out.score, 50);
        assert_eq!(out.category, "Somewhat Active");

        // seven to eight hours of sleep is the best sleep answer
        let sleep = score_lifestyle(&rules.lifestyle, &answers(&[("sleep_hours", 2)]));
        let oversleep = score_lifestyle(&rules.lifestyle, &answers(&[("sleep_hours", 3)]));
        assert!(sleep.score > oversleep.score);
    }
}
