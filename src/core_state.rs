//! Process-wide state: the read-only configuration set plus the record store.
//!
//! Configuration is loaded once and shared behind `Arc`; engines only ever
//! read it. The SQLite connection sits behind a `Mutex`, so `CoreState` can
//! be shared across worker threads.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, Utc};
use rusqlite::Connection;
use thiserror::Error;
use uuid::Uuid;

use crate::config;
use crate::db::{self, DatabaseError};
use crate::models::enums::{ReportStatus, ScreenerType, TriageLevel};
use crate::models::*;
use crate::pipeline::extraction::{
    self, CanonicalExtractor, ExtractionError, LinePatternExtractor, ReportTextSource,
};
use crate::pipeline::ReportProcessor;
use crate::reference::{AliasResolver, ReferenceError, ReferenceTable};
use crate::rules::{self, RuleError, RuleSet};

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Reference data error: {0}")]
    Reference(#[from] ReferenceError),

    #[error("Rule error: {0}")]
    Rules(#[from] RuleError),

    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("The document has no readable content")]
    NoReadableContent,

    #[error("No lab values could be recognised in the document")]
    NothingRecognized,

    #[error("Internal lock error")]
    LockPoisoned,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Load the reference table and rule set from `dir`, or the bundled copies.
pub fn load_configuration(dir: Option<&Path>) -> Result<(ReferenceTable, RuleSet), CoreError> {
    match dir {
        Some(dir) => Ok((ReferenceTable::load(dir)?, RuleSet::load(dir)?)),
        None => Ok((ReferenceTable::bundled()?, RuleSet::bundled()?)),
    }
}

// ═══════════════════════════════════════════════════════════
// CoreState
// ═══════════════════════════════════════════════════════════

pub struct CoreState {
    reference: Arc<ReferenceTable>,
    resolver: Arc<AliasResolver>,
    rules: Arc<RuleSet>,
    db: Mutex<Connection>,
}

impl CoreState {
    pub fn new(reference: ReferenceTable, rules: RuleSet, conn: Connection) -> Self {
        let resolver = AliasResolver::with_default_synonyms(&reference);
        tracing::info!(
            tests = reference.len(),
            aliases = resolver.len(),
            "core state ready"
        );
        Self {
            reference: Arc::new(reference),
            resolver: Arc::new(resolver),
            rules: Arc::new(rules),
            db: Mutex::new(conn),
        }
    }

    /// Configs from `config_dir` (or bundled) and a file-backed record store.
    pub fn open(db_path: &Path, config_dir: Option<&Path>) -> Result<Self, CoreError> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let (reference, rules) = load_configuration(config_dir)?;
        let conn = db::open_database(db_path)?;
        Ok(Self::new(reference, rules, conn))
    }

    /// Locations from the environment: `LABWISE_DB_PATH` (default
    /// `~/Labwise/labwise.db`) and `LABWISE_CONFIG_DIR` (default bundled).
    pub fn open_default() -> Result<Self, CoreError> {
        let config_dir = config::config_dir();
        Self::open(&config::database_path(), config_dir.as_deref())
    }

    /// Bundled configs and an in-memory record store.
    pub fn in_memory() -> Result<Self, CoreError> {
        let (reference, rules) = load_configuration(None)?;
        Ok(Self::new(reference, rules, db::open_memory_database()?))
    }

    pub fn reference(&self) -> &ReferenceTable {
        &self.reference
    }

    pub fn resolver(&self) -> &AliasResolver {
        &self.resolver
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    fn conn(&self) -> Result<MutexGuard<'_, Connection>, CoreError> {
        self.db.lock().map_err(|_| CoreError::LockPoisoned)
    }

    fn processor(&self) -> ReportProcessor<'_> {
        ReportProcessor::new(&self.reference, &self.resolver)
    }

    // ─── Lab extraction ────────────────────────────────────

    pub fn extract_lab_results(&self, text: &str) -> Vec<ExtractedLabResult> {
        LinePatternExtractor::with_resolver(&self.resolver).extract(text)
    }

    pub fn extract_canonical_results(&self, text: &str) -> Vec<CanonicalReading> {
        CanonicalExtractor::new(&self.resolver, &self.reference).extract(text)
    }

    pub fn classify(&self, canonical_id: &str, value: f64, unit: Option<&str>) -> LabClassification {
        extraction::classify(&self.reference, canonical_id, value, unit)
    }

    pub fn analyze_report(&self, text: &str) -> ReportAnalysis {
        self.processor().analyze_text(text)
    }

    pub fn analyze_document(
        &self,
        source: &dyn ReportTextSource,
        document: &[u8],
    ) -> Result<ReportAnalysis, CoreError> {
        Ok(self.processor().analyze_document(source, document)?)
    }

    // ─── Lab reports ───────────────────────────────────────

    /// Alias-driven extraction of an uploaded report's text, stored on success.
    pub fn upload_lab_report(
        &self,
        patient_id: &str,
        report_date: NaiveDate,
        text: &str,
    ) -> Result<LabReport, CoreError> {
        if text.trim().is_empty() {
            return Err(CoreError::NoReadableContent);
        }
        let report = self.processor().build_report(patient_id, report_date, text);
        if report.results.is_empty() {
            return Err(CoreError::NothingRecognized);
        }
        db::insert_lab_report(&*self.conn()?, &report)?;
        tracing::info!(
            report_id = %report.id,
            results = report.results.len(),
            abnormal = report.abnormal_count(),
            "lab report stored"
        );
        Ok(report)
    }

    pub fn add_manual_lab_report(
        &self,
        patient_id: &str,
        report_date: NaiveDate,
        entries: &[ManualLabEntry],
    ) -> Result<LabReport, CoreError> {
        if entries.is_empty() {
            return Err(CoreError::NothingRecognized);
        }
        let report = self
            .processor()
            .build_manual_report(patient_id, report_date, entries);
        db::insert_lab_report(&*self.conn()?, &report)?;
        tracing::info!(report_id = %report.id, results = report.results.len(), "manual lab report stored");
        Ok(report)
    }

    pub fn lab_reports(&self, patient_id: &str) -> Result<Vec<LabReport>, CoreError> {
        Ok(db::list_lab_reports(&*self.conn()?, patient_id)?)
    }

    pub fn lab_report(&self, id: &Uuid) -> Result<Option<LabReport>, CoreError> {
        Ok(db::get_lab_report(&*self.conn()?, id)?)
    }

    pub fn delete_lab_report(&self, id: &Uuid) -> Result<(), CoreError> {
        Ok(db::delete_lab_report(&*self.conn()?, id)?)
    }

    // ─── Questionnaires ────────────────────────────────────

    pub fn score_lifestyle(&self, answers: &BTreeMap<String, i64>) -> rules::LifestyleOutcome {
        rules::score_lifestyle(&self.rules.lifestyle, answers)
    }

    pub fn submit_lifestyle(
        &self,
        patient_id: &str,
        answers: BTreeMap<String, i64>,
    ) -> Result<LifestyleRecord, CoreError> {
        let outcome = self.score_lifestyle(&answers);
        let record = LifestyleRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            score: outcome.score,
            category: outcome.category,
            answers,
            created_at: Utc::now().naive_utc(),
        };
        db::insert_lifestyle(&*self.conn()?, &record)?;
        Ok(record)
    }

    pub fn lifestyle_history(&self, patient_id: &str) -> Result<Vec<LifestyleRecord>, CoreError> {
        Ok(db::list_lifestyle(&*self.conn()?, patient_id)?)
    }

    pub fn score_triage(&self, symptoms: &[String], severity: u8, duration: &str) -> rules::TriageOutcome {
        rules::score_triage(&self.rules.triage, symptoms, severity, duration)
    }

    pub fn triage_guidance(&self, level: TriageLevel) -> &str {
        self.rules.triage.guidance(level)
    }

    pub fn submit_symptom_check(
        &self,
        patient_id: &str,
        symptoms: Vec<String>,
        severity: u8,
        duration: &str,
    ) -> Result<SymptomCheckRecord, CoreError> {
        let outcome = self.score_triage(&symptoms, severity, duration);
        let record = SymptomCheckRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            score: outcome.score,
            triage_level: outcome.level,
            guidance: self.triage_guidance(outcome.level).to_string(),
            symptoms,
            severity,
            duration: duration.to_string(),
            created_at: Utc::now().naive_utc(),
        };
        db::insert_symptom_check(&*self.conn()?, &record)?;
        Ok(record)
    }

    pub fn symptom_history(&self, patient_id: &str) -> Result<Vec<SymptomCheckRecord>, CoreError> {
        Ok(db::list_symptom_checks(&*self.conn()?, patient_id)?)
    }

    pub fn score_mental(
        &self,
        screener: ScreenerType,
        answers: &[i64],
    ) -> Result<rules::MentalOutcome, CoreError> {
        Ok(rules::score_mental(&self.rules.mental, screener, answers)?)
    }

    /// Rejected submissions are never stored.
    pub fn submit_mental_assessment(
        &self,
        patient_id: &str,
        screener: ScreenerType,
        answers: Vec<i64>,
    ) -> Result<MentalAssessmentRecord, CoreError> {
        let outcome = self.score_mental(screener, &answers)?;
        let record = MentalAssessmentRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            screener,
            score: outcome.score,
            severity: outcome.severity,
            safety_message: outcome.safety_message,
            answers,
            created_at: Utc::now().naive_utc(),
        };
        db::insert_mental_assessment(&*self.conn()?, &record)?;
        Ok(record)
    }

    pub fn mental_history(&self, patient_id: &str) -> Result<Vec<MentalAssessmentRecord>, CoreError> {
        Ok(db::list_mental_assessments(&*self.conn()?, patient_id)?)
    }

    pub fn classify_blood_pressure(&self, systolic: i64, diastolic: i64) -> rules::BpClassification {
        rules::classify_blood_pressure(&self.rules.blood_pressure, systolic, diastolic)
    }

    pub fn log_blood_pressure(
        &self,
        patient_id: &str,
        systolic: i64,
        diastolic: i64,
    ) -> Result<ChronicLogRecord, CoreError> {
        rules::validate_reading(systolic, diastolic).map_err(RuleError::from)?;
        let bp = self.classify_blood_pressure(systolic, diastolic);
        let record = ChronicLogRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            systolic,
            diastolic,
            flagged: bp.flagged,
            flag_label: bp.label,
            guidance: bp.guidance,
            created_at: Utc::now().naive_utc(),
        };
        db::insert_chronic_log(&*self.conn()?, &record)?;
        Ok(record)
    }

    pub fn blood_pressure_history(&self, patient_id: &str) -> Result<Vec<ChronicLogRecord>, CoreError> {
        Ok(db::list_chronic_logs(&*self.conn()?, patient_id)?)
    }

    // ─── Diet plans ────────────────────────────────────────

    /// Plan for the patient, using deficiencies from their latest lab report.
    pub fn generate_diet_plan(
        &self,
        patient_id: &str,
        preferences: DietPreferences,
    ) -> Result<DietPlanRecord, CoreError> {
        let conn = self.conn()?;
        let deficiencies = db::latest_lab_report(&conn, patient_id)?
            .map(|r| r.deficiency_summary)
            .unwrap_or_default();
        let plan = rules::generate_diet_plan(&self.rules.diet, &preferences, &deficiencies);
        let record = DietPlanRecord {
            id: Uuid::new_v4(),
            patient_id: patient_id.to_string(),
            preferences,
            plan,
            created_at: Utc::now().naive_utc(),
        };
        db::insert_diet_plan(&conn, &record)?;
        Ok(record)
    }

    pub fn latest_diet_plan(&self, patient_id: &str) -> Result<Option<DietPlanRecord>, CoreError> {
        Ok(db::latest_diet_plan(&*self.conn()?, patient_id)?)
    }

    // ─── Doctor dashboard ──────────────────────────────────

    pub fn patient_overview(&self, patient_id: &str) -> Result<PatientOverview, CoreError> {
        Ok(db::patient_overview(&*self.conn()?, patient_id)?)
    }

    pub fn all_patient_overviews(&self) -> Result<Vec<PatientOverview>, CoreError> {
        let conn = self.conn()?;
        db::list_patient_ids(&conn)?
            .iter()
            .map(|id| db::patient_overview(&conn, id).map_err(CoreError::from))
            .collect()
    }
}

impl ReportAnalysis {
    /// Map the two empty outcomes onto their error conditions.
    pub fn into_result(self) -> Result<ReportAnalysis, CoreError> {
        match self.status {
            ReportStatus::NoReadableContent => Err(CoreError::NoReadableContent),
            ReportStatus::NothingRecognized => Err(CoreError::NothingRecognized),
            ReportStatus::Analyzed => Ok(self),
        }
    }
}
