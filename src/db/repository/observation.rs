use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Observation;

use super::{parse_opt_ts, parse_uuid};

pub fn insert_observation(conn: &Connection, obs: &Observation) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO observations (id, person_id, code, display, value_num, unit, effective_at,
         ref_low, ref_high, source_doc_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            obs.id.to_string(),
            obs.person_id.to_string(),
            obs.code,
            obs.display,
            obs.value_num,
            obs.unit,
            obs.effective_at.map(|t| t.to_rfc3339()),
            obs.ref_low,
            obs.ref_high,
            obs.source_doc_id.map(|id| id.to_string()),
        ],
    )?;
    Ok(())
}

pub fn get_observation(conn: &Connection, id: &Uuid) -> Result<Option<Observation>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, person_id, code, display, value_num, unit, effective_at, ref_low, ref_high, source_doc_id
         FROM observations WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], observation_from_row);

    match result {
        Ok(row) => Ok(Some(observation_from_parts(row)?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

type ObservationRow = (
    String,
    String,
    String,
    String,
    Option<f64>,
    Option<String>,
    Option<String>,
    Option<f64>,
    Option<f64>,
    Option<String>,
);

fn observation_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ObservationRow> {
    Ok((
        row.get(0)?,
        row.get(1)?,
        row.get(2)?,
        row.get(3)?,
        row.get(4)?,
        row.get(5)?,
        row.get(6)?,
        row.get(7)?,
        row.get(8)?,
        row.get(9)?,
    ))
}

fn observation_from_parts(row: ObservationRow) -> Result<Observation, DatabaseError> {
    let (id, person_id, code, display, value_num, unit, effective_at, ref_low, ref_high, source_doc_id) =
        row;
    Ok(Observation {
        id: parse_uuid("observations.id", &id)?,
        person_id: parse_uuid("observations.person_id", &person_id)?,
        code,
        display,
        value_num,
        unit,
        effective_at: parse_opt_ts("observations.effective_at", effective_at)?,
        ref_low,
        ref_high,
        source_doc_id: source_doc_id
            .as_deref()
            .map(|s| parse_uuid("observations.source_doc_id", s))
            .transpose()?,
    })
}
