use std::str::FromStr;

use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::enums::*;
use crate::models::*;

use super::{format_timestamp, parse_id, parse_timestamp};

/// Insert a report header and its rows in one transaction.
pub fn insert_lab_report(conn: &Connection, report: &LabReport) -> Result<(), DatabaseError> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO lab_reports (id, patient_id, report_date, created_at, source, deficiency_summary)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            report.id.to_string(),
            report.patient_id,
            report.report_date.to_string(),
            format_timestamp(&report.created_at),
            report.source.as_str(),
            serde_json::to_string(&report.deficiency_summary)?,
        ],
    )?;

    for (position, row) in report.results.iter().enumerate() {
        tx.execute(
            "INSERT INTO lab_results (id, report_id, position, test_name, value, unit, status,
             ref_range_low, ref_range_high, deficiency_name, explanation)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            params![
                row.id.to_string(),
                report.id.to_string(),
                position as i64,
                row.test_name,
                row.value,
                row.unit,
                row.status.as_str(),
                row.ref_range_low,
                row.ref_range_high,
                row.deficiency_name,
                row.explanation,
            ],
        )?;
    }
    tx.commit()?;
    Ok(())
}

pub fn get_lab_report(conn: &Connection, id: &Uuid) -> Result<Option<LabReport>, DatabaseError> {
    let header = conn
        .query_row(
            "SELECT id, patient_id, report_date, created_at, source, deficiency_summary
             FROM lab_reports WHERE id = ?1",
            params![id.to_string()],
            header_row_from_rusqlite,
        )
        .optional()?;

    match header {
        Some(header) => Ok(Some(report_from_header(conn, header)?)),
        None => Ok(None),
    }
}

/// Reports of one patient, newest first.
pub fn list_lab_reports(conn: &Connection, patient_id: &str) -> Result<Vec<LabReport>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, report_date, created_at, source, deficiency_summary
         FROM lab_reports WHERE patient_id = ?1
         ORDER BY created_at DESC, rowid DESC",
    )?;
    let headers = stmt
        .query_map(params![patient_id], header_row_from_rusqlite)?
        .collect::<Result<Vec<_>, _>>()?;

    headers
        .into_iter()
        .map(|header| report_from_header(conn, header))
        .collect()
}

pub fn latest_lab_report(conn: &Connection, patient_id: &str) -> Result<Option<LabReport>, DatabaseError> {
    let header = conn
        .query_row(
            "SELECT id, patient_id, report_date, created_at, source, deficiency_summary
             FROM lab_reports WHERE patient_id = ?1
             ORDER BY created_at DESC, rowid DESC LIMIT 1",
            params![patient_id],
            header_row_from_rusqlite,
        )
        .optional()?;

    match header {
        Some(header) => Ok(Some(report_from_header(conn, header)?)),
        None => Ok(None),
    }
}

/// Delete a report; its rows go with it.
pub fn delete_lab_report(conn: &Connection, id: &Uuid) -> Result<(), DatabaseError> {
    let deleted = conn.execute("DELETE FROM lab_reports WHERE id = ?1", params![id.to_string()])?;
    if deleted == 0 {
        return Err(DatabaseError::NotFound {
            entity_type: "LabReport".into(),
            id: id.to_string(),
        });
    }
    Ok(())
}

fn get_lab_results(conn: &Connection, report_id: &Uuid) -> Result<Vec<LabResultRow>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, report_id, test_name, value, unit, status,
         ref_range_low, ref_range_high, deficiency_name, explanation
         FROM lab_results WHERE report_id = ?1 ORDER BY position",
    )?;

    let rows = stmt.query_map(params![report_id.to_string()], |row| Ok(result_row_from_rusqlite(row)))?;

    let mut results = Vec::new();
    for row in rows {
        results.push(result_from_row(row??)?);
    }
    Ok(results)
}

// Internal row types for mapping
struct HeaderRow {
    id: String,
    patient_id: String,
    report_date: String,
    created_at: String,
    source: String,
    deficiency_summary: String,
}

fn header_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<HeaderRow, rusqlite::Error> {
    Ok(HeaderRow {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        report_date: row.get(2)?,
        created_at: row.get(3)?,
        source: row.get(4)?,
        deficiency_summary: row.get(5)?,
    })
}

fn report_from_header(conn: &Connection, header: HeaderRow) -> Result<LabReport, DatabaseError> {
    let id = parse_id(&header.id)?;
    Ok(LabReport {
        results: get_lab_results(conn, &id)?,
        id,
        patient_id: header.patient_id,
        report_date: NaiveDate::parse_from_str(&header.report_date, "%Y-%m-%d")
            .map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))?,
        created_at: parse_timestamp(&header.created_at)?,
        source: LabSource::from_str(&header.source)?,
        deficiency_summary: serde_json::from_str(&header.deficiency_summary)?,
    })
}

struct ResultRow {
    id: String,
    report_id: String,
    test_name: String,
    value: f64,
    unit: Option<String>,
    status: String,
    ref_range_low: Option<f64>,
    ref_range_high: Option<f64>,
    deficiency_name: Option<String>,
    explanation: Option<String>,
}

fn result_row_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<ResultRow, rusqlite::Error> {
    Ok(ResultRow {
        id: row.get(0)?,
        report_id: row.get(1)?,
        test_name: row.get(2)?,
        value: row.get(3)?,
        unit: row.get(4)?,
        status: row.get(5)?,
        ref_range_low: row.get(6)?,
        ref_range_high: row.get(7)?,
        deficiency_name: row.get(8)?,
        explanation: row.get(9)?,
    })
}

fn result_from_row(row: ResultRow) -> Result<LabResultRow, DatabaseError> {
    Ok(LabResultRow {
        id: parse_id(&row.id)?,
        report_id: parse_id(&row.report_id)?,
        test_name: row.test_name,
        value: row.value,
        unit: row.unit,
        status: Interpretation::from_str(&row.status)?,
        ref_range_low: row.ref_range_low,
        ref_range_high: row.ref_range_high,
        deficiency_name: row.deficiency_name,
        explanation: row.explanation,
    })
}
