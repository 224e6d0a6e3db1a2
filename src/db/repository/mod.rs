//! Repository layer: patient-scoped record operations.
//!
//! One sub-module per record family; everything is re-exported here.

mod assessment;
mod diet_plan;
mod lab_report;
mod overview;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::DatabaseError;

pub use assessment::*;
pub use diet_plan::*;
pub use lab_report::*;
pub use overview::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(raw: &str) -> Result<NaiveDateTime, DatabaseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT)
        .map_err(|e| DatabaseError::ConstraintViolation(format!("bad timestamp {raw}: {e}")))
}

pub(crate) fn parse_id(raw: &str) -> Result<Uuid, DatabaseError> {
    Uuid::parse_str(raw).map_err(|e| DatabaseError::ConstraintViolation(e.to_string()))
}
