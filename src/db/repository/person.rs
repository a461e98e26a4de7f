use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::Person;

use super::{parse_ts, parse_uuid};

pub fn insert_person(conn: &Connection, person: &Person) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO persons (id, owner_id, full_name, date_of_birth, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            person.id.to_string(),
            person.owner_id,
            person.full_name,
            person.date_of_birth.map(|d| d.to_string()),
            person.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_person(conn: &Connection, id: &Uuid) -> Result<Option<Person>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, owner_id, full_name, date_of_birth, created_at FROM persons WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, Option<String>>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, String>(4)?,
        ))
    });

    match result {
        Ok((id, owner_id, full_name, dob, created_at)) => Ok(Some(Person {
            id: parse_uuid("persons.id", &id)?,
            owner_id,
            full_name,
            date_of_birth: dob
                .map(|d| {
                    d.parse().map_err(|_| DatabaseError::InvalidValue {
                        field: "persons.date_of_birth".into(),
                        value: d.clone(),
                    })
                })
                .transpose()?,
            created_at: parse_ts("persons.created_at", &created_at)?,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;
    use chrono::Utc;

    #[test]
    fn insert_and_get_person() {
        let conn = open_memory_database().unwrap();
        let person = Person {
            id: Uuid::new_v4(),
            owner_id: "user-a".into(),
            full_name: Some("Jordan Doe".into()),
            date_of_birth: None,
            created_at: Utc::now(),
        };
        insert_person(&conn, &person).unwrap();

        let fetched = get_person(&conn, &person.id).unwrap().unwrap();
        assert_eq!(fetched.owner_id, "user-a");
        assert_eq!(fetched.full_name.as_deref(), Some("Jordan Doe"));
    }

    #[test]
    fn unknown_person_is_none() {
        let conn = open_memory_database().unwrap();
        assert!(get_person(&conn, &Uuid::new_v4()).unwrap().is_none());
    }
}
