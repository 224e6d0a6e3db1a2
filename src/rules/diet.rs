//! Seven-day meal plans adapted to diet type and goal.
//!
//! The base template is rewritten through a declarative substitution table.
//! Each meal string is scanned once, left to right; at every position the
//! first matching entry wins (diet-type entries before goal entries) and the
//! scan resumes after the replaced span, so replacement text is never
//! rewritten again.

use std::collections::{BTreeMap, HashMap};

use serde::{Deserialize, Serialize};

use crate::models::enums::{DietGoal, DietType};
use crate::models::{DietPlan, DietPreferences, FoodAdvice};

use super::{RuleError, DIET_FILE};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Substitution {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietConfig {
    /// `day_N` -> meal slot -> meal text.
    pub template: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    pub diet_substitutions: HashMap<DietType, Vec<Substitution>>,
    #[serde(default)]
    pub goal_substitutions: HashMap<DietGoal, Vec<Substitution>>,
    /// Keyed by deficiency label.
    #[serde(default)]
    pub deficiency_foods: BTreeMap<String, FoodAdvice>,
}

impl DietConfig {
    pub(crate) fn validate(&self) -> Result<(), RuleError> {
        let blank = self
            .diet_substitutions
            .values()
            .chain(self.goal_substitutions.values())
            .flatten()
            .any(|s| s.from.is_empty());
        if blank {
            return Err(RuleError::InvalidConfig(
                DIET_FILE.into(),
                "substitution with empty source token".into(),
            ));
        }
        Ok(())
    }

    /// Diet-type entries followed by goal entries, in configured order.
    fn substitutions(&self, diet_type: DietType, goal: DietGoal) -> Vec<&Substitution> {
        self.diet_substitutions
            .get(&diet_type)
            .into_iter()
            .chain(self.goal_substitutions.get(&goal))
            .flatten()
            .collect()
    }
}

fn starts_with_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    haystack
        .as_bytes()
        .get(..needle.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(needle.as_bytes()))
}

/// One left-to-right pass of `table` over `text`.
pub fn substitute(text: &str, table: &[&Substitution]) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    'scan: while let Some(ch) = rest.chars().next() {
        for sub in table {
            if !sub.from.is_empty() && starts_with_ignore_ascii_case(rest, &sub.from) {
                out.push_str(&sub.to);
                rest = &rest[sub.from.len()..];
                continue 'scan;
            }
        }
        out.push(ch);
        rest = &rest[ch.len_utf8()..];
    }
    out
}

/// Build a plan for the given preferences and the patient's deficiency labels.
pub fn generate_diet_plan(
    config: &DietConfig,
    preferences: &DietPreferences,
    deficiencies: &[String],
) -> DietPlan {
    let table = config.substitutions(preferences.diet_type, preferences.goal);

    let meal_plan: BTreeMap<String, BTreeMap<String, String>> = config
        .template
        .iter()
        .map(|(day, meals)| {
            let meals = meals
                .iter()
                .map(|(slot, text)| (slot.clone(), substitute(text, &table)))
                .collect();
            (day.clone(), meals)
        })
        .collect();

    let deficiency_recommendations = deficiencies
        .iter()
        .filter_map(|label| {
            config
                .deficiency_foods
                .get(label)
                .map(|advice| (label.clone(), advice.clone()))
        })
        .collect();

    let allergy_warnings = allergy_warnings(&meal_plan, &preferences.allergies);

    tracing::debug!(
        diet_type = %preferences.diet_type,
        goal = %preferences.goal,
        deficiencies = deficiencies.len(),
        warnings = allergy_warnings.len(),
        "diet plan generated"
    );

    DietPlan {
        meal_plan,
        deficiency_recommendations,
        allergy_warnings,
    }
}

fn allergy_warnings(
    meal_plan: &BTreeMap<String, BTreeMap<String, String>>,
    allergies: &[String],
) -> Vec<String> {
    let allergens: Vec<String> = allergies
        .iter()
        .map(|a| a.trim().to_lowercase())
        .filter(|a| !a.is_empty())
        .collect();

    let mut warnings = Vec::new();
    for (day, meals) in meal_plan {
        for (slot, text) in meals {
            let lowered = text.to_lowercase();
            for allergen in allergens.iter().filter(|a| lowered.contains(a.as_str())) {
                warnings.push(format!("{day} {slot}: contains {allergen}"));
            }
        }
    }
    warnings
}
