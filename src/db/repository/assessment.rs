use std::str::FromStr;

use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

use super::{format_timestamp, parse_id, parse_timestamp};

// ═══════════════════════════════════════════
// Lifestyle
// ═══════════════════════════════════════════

pub fn insert_lifestyle(conn: &Connection, record: &LifestyleRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO lifestyle_assessments (id, patient_id, score, category, answers, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            record.id.to_string(),
            record.patient_id,
            record.score,
            record.category,
            serde_json::to_string(&record.answers)?,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(())
}

const LIFESTYLE_COLUMNS: &str = "id, patient_id, score, category, answers, created_at";

pub fn list_lifestyle(conn: &Connection, patient_id: &str) -> Result<Vec<LifestyleRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {LIFESTYLE_COLUMNS} FROM lifestyle_assessments
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| Ok(lifestyle_from_rusqlite(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row??);
    }
    Ok(records)
}

pub fn latest_lifestyle(conn: &Connection, patient_id: &str) -> Result<Option<LifestyleRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {LIFESTYLE_COLUMNS} FROM lifestyle_assessments
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id], |row| Ok(lifestyle_from_rusqlite(row)))
        .optional()?
        .transpose()
}

fn lifestyle_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<LifestyleRecord, DatabaseError> {
    Ok(LifestyleRecord {
        id: parse_id(&row.get::<_, String>(0)?)?,
        patient_id: row.get(1)?,
        score: row.get(2)?,
        category: row.get(3)?,
        answers: serde_json::from_str(&row.get::<_, String>(4)?)?,
        created_at: parse_timestamp(&row.get::<_, String>(5)?)?,
    })
}

// ═══════════════════════════════════════════
// Symptom checks
// ═══════════════════════════════════════════

pub fn insert_symptom_check(conn: &Connection, record: &SymptomCheckRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO symptom_checks (id, patient_id, score, triage_level, guidance, symptoms,
         severity, duration, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            record.id.to_string(),
            record.patient_id,
            record.score,
            record.triage_level.as_str(),
            record.guidance,
            serde_json::to_string(&record.symptoms)?,
            record.severity,
            record.duration,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(())
}

const SYMPTOM_COLUMNS: &str =
    "id, patient_id, score, triage_level, guidance, symptoms, severity, duration, created_at";

pub fn list_symptom_checks(conn: &Connection, patient_id: &str) -> Result<Vec<SymptomCheckRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptom_checks
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| Ok(symptom_from_rusqlite(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row??);
    }
    Ok(records)
}

pub fn latest_symptom_check(
    conn: &Connection,
    patient_id: &str,
) -> Result<Option<SymptomCheckRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {SYMPTOM_COLUMNS} FROM symptom_checks
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id], |row| Ok(symptom_from_rusqlite(row)))
        .optional()?
        .transpose()
}

fn symptom_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<SymptomCheckRecord, DatabaseError> {
    Ok(SymptomCheckRecord {
        id: parse_id(&row.get::<_, String>(0)?)?,
        patient_id: row.get(1)?,
        score: row.get(2)?,
        triage_level: TriageLevel::from_str(&row.get::<_, String>(3)?)?,
        guidance: row.get(4)?,
        symptoms: serde_json::from_str(&row.get::<_, String>(5)?)?,
        severity: row.get(6)?,
        duration: row.get(7)?,
        created_at: parse_timestamp(&row.get::<_, String>(8)?)?,
    })
}

// ═══════════════════════════════════════════
// Mental screeners
// ═══════════════════════════════════════════

pub fn insert_mental_assessment(
    conn: &Connection,
    record: &MentalAssessmentRecord,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO mental_assessments (id, patient_id, screener, score, severity,
         safety_message, answers, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id.to_string(),
            record.patient_id,
            record.screener.as_str(),
            record.score,
            record.severity,
            record.safety_message,
            serde_json::to_string(&record.answers)?,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(())
}

const MENTAL_COLUMNS: &str =
    "id, patient_id, screener, score, severity, safety_message, answers, created_at";

/// All screener submissions of a patient, newest first.
pub fn list_mental_assessments(
    conn: &Connection,
    patient_id: &str,
) -> Result<Vec<MentalAssessmentRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {MENTAL_COLUMNS} FROM mental_assessments
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| Ok(mental_from_rusqlite(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row??);
    }
    Ok(records)
}

pub fn latest_mental_assessment(
    conn: &Connection,
    patient_id: &str,
    screener: ScreenerType,
) -> Result<Option<MentalAssessmentRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {MENTAL_COLUMNS} FROM mental_assessments
         WHERE patient_id = ?1 AND screener = ?2
         ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id, screener.as_str()], |row| {
        Ok(mental_from_rusqlite(row))
    })
    .optional()?
    .transpose()
}

fn mental_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<MentalAssessmentRecord, DatabaseError> {
    Ok(MentalAssessmentRecord {
        id: parse_id(&row.get::<_, String>(0)?)?,
        patient_id: row.get(1)?,
        screener: ScreenerType::from_str(&row.get::<_, String>(2)?)?,
        score: row.get(3)?,
        severity: row.get(4)?,
        safety_message: row.get(5)?,
        answers: serde_json::from_str(&row.get::<_, String>(6)?)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?)?,
    })
}

// ═══════════════════════════════════════════
// Chronic blood-pressure log
// ═══════════════════════════════════════════

pub fn insert_chronic_log(conn: &Connection, record: &ChronicLogRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO chronic_logs (id, patient_id, systolic, diastolic, flagged, flag_label,
         guidance, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            record.id.to_string(),
            record.patient_id,
            record.systolic,
            record.diastolic,
            record.flagged,
            record.flag_label,
            record.guidance,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(())
}

const CHRONIC_COLUMNS: &str =
    "id, patient_id, systolic, diastolic, flagged, flag_label, guidance, created_at";

pub fn list_chronic_logs(conn: &Connection, patient_id: &str) -> Result<Vec<ChronicLogRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {CHRONIC_COLUMNS} FROM chronic_logs
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![patient_id], |row| Ok(chronic_from_rusqlite(row)))?;

    let mut records = Vec::new();
    for row in rows {
        records.push(row??);
    }
    Ok(records)
}

pub fn latest_chronic_log(conn: &Connection, patient_id: &str) -> Result<Option<ChronicLogRecord>, DatabaseError> {
    let sql = format!(
        "SELECT {CHRONIC_COLUMNS} FROM chronic_logs
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1"
    );
    conn.query_row(&sql, params![patient_id], |row| Ok(chronic_from_rusqlite(row)))
        .optional()?
        .transpose()
}

fn chronic_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ChronicLogRecord, DatabaseError> {
    Ok(ChronicLogRecord {
        id: parse_id(&row.get::<_, String>(0)?)?,
        patient_id: row.get(1)?,
        systolic: row.get(2)?,
        diastolic: row.get(3)?,
        flagged: row.get(4)?,
        flag_label: row.get(5)?,
        guidance: row.get(6)?,
        created_at: parse_timestamp(&row.get::<_, String>(7)?)?,
    })
}
