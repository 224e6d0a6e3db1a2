use rusqlite::{params, Connection, OptionalExtension};

use crate::db::DatabaseError;
use crate::models::*;

use super::{format_timestamp, parse_id, parse_timestamp};

pub fn insert_diet_plan(conn: &Connection, record: &DietPlanRecord) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO diet_plans (id, patient_id, preferences, plan, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            record.id.to_string(),
            record.patient_id,
            serde_json::to_string(&record.preferences)?,
            serde_json::to_string(&record.plan)?,
            format_timestamp(&record.created_at),
        ],
    )?;
    Ok(())
}

pub fn latest_diet_plan(conn: &Connection, patient_id: &str) -> Result<Option<DietPlanRecord>, DatabaseError> {
    conn.query_row(
        "SELECT id, patient_id, preferences, plan, created_at FROM diet_plans
         WHERE patient_id = ?1 ORDER BY created_at DESC, rowid DESC LIMIT 1",
        params![patient_id],
        |row| Ok(diet_plan_from_rusqlite(row)),
    )
    .optional()?
    .transpose()
}

fn diet_plan_from_rusqlite(row: &rusqlite::Row<'_>) -> Result<DietPlanRecord, DatabaseError> {
    Ok(DietPlanRecord {
        id: parse_id(&row.get::<_, String>(0)?)?,
        patient_id: row.get(1)?,
        preferences: serde_json::from_str(&row.get::<_, String>(2)?)?,
        plan: serde_json::from_str(&row.get::<_, String>(3)?)?,
        created_at: parse_timestamp(&row.get::<_, String>(4)?)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use crate::models::enums::{DietGoal, DietType};
    use chrono::{Duration, NaiveDate};
    use std::collections::BTreeMap;
    use uuid::Uuid;

    fn record(diet_type: DietType, minutes: i64) -> DietPlanRecord {
        let day: BTreeMap<String, String> =
            [("breakfast".to_string(), "Idli with sambar".to_string())].into_iter().collect();
        DietPlanRecord {
            id: Uuid::new_v4(),
            patient_id: "p1".into(),
            preferences: DietPreferences {
                diet_type,
                allergies: vec!["peanut".into()],
                goal: DietGoal::MuscleGain,
            },
            plan: DietPlan {
                meal_plan: [("day_1".to_string(), day)].into_iter().collect(),
                deficiency_recommendations: BTreeMap::new(),
                allergy_warnings: vec![],
            },
            created_at: NaiveDate::from_ymd_opt(2024, 6, 1)
                .unwrap()
                .and_hms_opt(9, 0, 0)
                .unwrap()
                + Duration::minutes(minutes),
        }
    }

    #[test]
    fn latest_plan_round_trips() {
        let conn = open_memory_database().unwrap();
        insert_diet_plan(&conn, &record(DietType::Veg, 0)).unwrap();
        let newer = record(DietType::Vegan, 5);
        insert_diet_plan(&conn, &newer).unwrap();

        let loaded = latest_diet_plan(&conn, "p1").unwrap().unwrap();
        assert_eq!(loaded.id, newer.id);
        assert_eq!(loaded.preferences.diet_type, DietType::Vegan);
        assert_eq!(loaded.preferences.goal, DietGoal::MuscleGain);
        assert_eq!(loaded.plan, newer.plan);
    }

    #[test]
    fn no_plan_yet() {
        let conn = open_memory_database().unwrap();
        assert!(latest_diet_plan(&conn, "p1").unwrap().is_none());
    }
}
