use rusqlite::{params, Connection};

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

use super::{latest_chronic_log, latest_lab_report, latest_mental_assessment, latest_symptom_check};

/// Doctor-dashboard snapshot of one patient's most recent records.
pub fn patient_overview(conn: &Connection, patient_id: &str) -> Result<PatientOverview, DatabaseError> {
    Ok(PatientOverview {
        patient_id: patient_id.to_string(),
        last_triage: latest_symptom_check(conn, patient_id)?.map(|r| r.triage_level),
        last_phq9_severity: latest_mental_assessment(conn, patient_id, ScreenerType::Phq9)?
            .map(|r| r.severity),
        last_lab_flags: latest_lab_report(conn, patient_id)?
            .map(|r| r.abnormal_count())
            .unwrap_or(0),
        last_bp_flag: latest_chronic_log(conn, patient_id)?.map(|r| r.flag_label),
    })
}

/// Every patient id with at least one stored record, sorted.
pub fn list_patient_ids(conn: &Connection) -> Result<Vec<String>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT patient_id FROM lab_reports
         UNION SELECT patient_id FROM lifestyle_assessments
         UNION SELECT patient_id FROM symptom_checks
         UNION SELECT patient_id FROM mental_assessments
         UNION SELECT patient_id FROM chronic_logs
         UNION SELECT patient_id FROM diet_plans
         ORDER BY 1",
    )?;
    let ids = stmt
        .query_map(params![], |row| row.get::<_, String>(0))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ids)
}
