use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::{DietGoal, DietType, ScreenerType, TriageLevel};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifestyleRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub score: i64,
    pub category: String,
    pub answers: BTreeMap<String, i64>,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymptomCheckRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub score: i64,
    pub triage_level: TriageLevel,
    pub guidance: String,
    pub symptoms: Vec<String>,
    pub severity: u8,
    pub duration: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MentalAssessmentRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub screener: ScreenerType,
    pub score: i64,
    pub severity: String,
    pub safety_message: Option<String>,
    pub answers: Vec<i64>,
    pub created_at: NaiveDateTime,
}

/// Blood-pressure log entry for the chronic tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChronicLogRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub systolic: i64,
    pub diastolic: i64,
    pub flagged: bool,
    pub flag_label: String,
    pub guidance: String,
    pub created_at: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPreferences {
    pub diet_type: DietType,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default = "default_goal")]
    pub goal: DietGoal,
}

fn default_goal() -> DietGoal {
    DietGoal::Balanced
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodAdvice {
    pub eat: Vec<String>,
    pub avoid: Vec<String>,
}

/// Generated 7-day plan. Days and meals are keyed by their config names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DietPlan {
    pub meal_plan: BTreeMap<String, BTreeMap<String, String>>,
    pub deficiency_recommendations: BTreeMap<String, FoodAdvice>,
    pub allergy_warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DietPlanRecord {
    pub id: Uuid,
    pub patient_id: String,
    pub preferences: DietPreferences,
    pub plan: DietPlan,
    pub created_at: NaiveDateTime,
}

/// One row of the clinician dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientOverview {
    pub patient_id: String,
    pub last_triage: Option<TriageLevel>,
    pub last_phq9_severity: Option<String>,
    pub last_lab_flags: usize,
    pub last_bp_flag: Option<String>,
}
