use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{PackItemRef, ShareEvent, ShareEventKind, SharePack, SharePackItem};

use super::{parse_opt_ts, parse_ts, parse_uuid};

pub fn insert_share_pack(conn: &Connection, pack: &SharePack) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO share_packs (id, person_id, title, audience, passcode_hash, expires_at,
         revoked_at, views_count, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            pack.id.to_string(),
            pack.person_id.to_string(),
            pack.title,
            pack.audience,
            pack.passcode_hash,
            pack.expires_at.to_rfc3339(),
            pack.revoked_at.map(|t| t.to_rfc3339()),
            pack.views_count,
            pack.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn insert_share_pack_item(conn: &Connection, item: &SharePackItem) -> Result<(), DatabaseError> {
    let (document_id, observation_id) = match &item.item {
        PackItemRef::Document(id) => (Some(id.to_string()), None),
        PackItemRef::Observation(id) => (None, Some(id.to_string())),
    };
    conn.execute(
        "INSERT INTO share_pack_items (id, pack_id, position, document_id, observation_id)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            item.id.to_string(),
            item.pack_id.to_string(),
            item.position,
            document_id,
            observation_id,
        ],
    )?;
    Ok(())
}

pub fn get_share_pack(conn: &Connection, id: &Uuid) -> Result<Option<SharePack>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, person_id, title, audience, passcode_hash, expires_at, revoked_at, views_count, created_at
         FROM share_packs WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, Option<String>>(6)?,
            row.get::<_, i64>(7)?,
            row.get::<_, String>(8)?,
        ))
    });

    match result {
        Ok((id, person_id, title, audience, passcode_hash, expires_at, revoked_at, views_count, created_at)) => {
            Ok(Some(SharePack {
                id: parse_uuid("share_packs.id", &id)?,
                person_id: parse_uuid("share_packs.person_id", &person_id)?,
                title,
                audience,
                passcode_hash,
                expires_at: parse_ts("share_packs.expires_at", &expires_at)?,
                revoked_at: parse_opt_ts("share_packs.revoked_at", revoked_at)?,
                views_count,
                created_at: parse_ts("share_packs.created_at", &created_at)?,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Ordered items for a pack.
pub fn items_for_pack(conn: &Connection, pack_id: &Uuid) -> Result<Vec<SharePackItem>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, pack_id, position, document_id, observation_id
         FROM share_pack_items WHERE pack_id = ?1 ORDER BY position ASC",
    )?;

    let rows = stmt.query_map(params![pack_id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, i64>(2)?,
            row.get::<_, Option<String>>(3)?,
            row.get::<_, Option<String>>(4)?,
        ))
    })?;

    let mut items = Vec::new();
    for row in rows {
        let (id, pack_id, position, document_id, observation_id) = row?;
        let item = match (document_id, observation_id) {
            (Some(doc), None) => PackItemRef::Document(parse_uuid("share_pack_items.document_id", &doc)?),
            (None, Some(obs)) => {
                PackItemRef::Observation(parse_uuid("share_pack_items.observation_id", &obs)?)
            }
            _ => {
                return Err(DatabaseError::InvalidValue {
                    field: "share_pack_items".into(),
                    value: id,
                })
            }
        };
        items.push(SharePackItem {
            id: parse_uuid("share_pack_items.id", &id)?,
            pack_id: parse_uuid("share_pack_items.pack_id", &pack_id)?,
            position,
            item,
        });
    }
    Ok(items)
}

/// Mark a pack revoked. A second call overwrites the timestamp but the
/// observable state stays terminal, so the operation is idempotent.
pub fn revoke_share_pack(
    conn: &Connection,
    pack_id: &Uuid,
    at: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE share_packs SET revoked_at = ?1 WHERE id = ?2",
        params![at.to_rfc3339(), pack_id.to_string()],
    )?;
    Ok(())
}

pub fn increment_views(conn: &Connection, pack_id: &Uuid) -> Result<(), DatabaseError> {
    conn.execute(
        "UPDATE share_packs SET views_count = views_count + 1 WHERE id = ?1",
        params![pack_id.to_string()],
    )?;
    Ok(())
}

/// Append an audit event. Events are never updated or deleted.
pub fn insert_share_event(conn: &Connection, event: &ShareEvent) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO share_events (id, pack_id, kind, ip_hash, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            event.id.to_string(),
            event.pack_id.to_string(),
            event.kind.as_str(),
            event.ip_hash,
            event.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn count_share_events(
    conn: &Connection,
    pack_id: &Uuid,
    kind: ShareEventKind,
) -> Result<i64, DatabaseError> {
    let count = conn.query_row(
        "SELECT COUNT(*) FROM share_events WHERE pack_id = ?1 AND kind = ?2",
        params![pack_id.to_string(), kind.as_str()],
        |row| row.get(0),
    )?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_person;
    use crate::db::sqlite::open_memory_database;
    use crate::models::{PackStatus, Person};
    use chrono::Duration;

    fn seed_pack(conn: &Connection) -> SharePack {
        let person = Person {
            id: Uuid::new_v4(),
            owner_id: "user-a".into(),
            full_name: None,
            date_of_birth: None,
            created_at: Utc::now(),
        };
        insert_person(conn, &person).unwrap();

        let pack = SharePack {
            id: Uuid::new_v4(),
            person_id: person.id,
            title: "Visit".into(),
            audience: "clinician".into(),
            passcode_hash: "deadbeef".into(),
            expires_at: Utc::now() + Duration::days(7),
            revoked_at: None,
            views_count: 0,
            created_at: Utc::now(),
        };
        insert_share_pack(conn, &pack).unwrap();
        pack
    }

    #[test]
    fn pack_round_trips() {
        let conn = open_memory_database().unwrap();
        let pack = seed_pack(&conn);
        let fetched = get_share_pack(&conn, &pack.id).unwrap().unwrap();
        assert_eq!(fetched.title, "Visit");
        assert_eq!(fetched.status(Utc::now()), PackStatus::Active);
    }

    #[test]
    fn revoke_is_idempotent_with_one_event_per_call() {
        let conn = open_memory_database().unwrap();
        let pack = seed_pack(&conn);

        for _ in 0..2 {
            revoke_share_pack(&conn, &pack.id, Utc::now()).unwrap();
            insert_share_event(
                &conn,
                &ShareEvent {
                    id: Uuid::new_v4(),
                    pack_id: pack.id,
                    kind: ShareEventKind::Revoke,
                    ip_hash: None,
                    created_at: Utc::now(),
                },
            )
            .unwrap();
        }

        let fetched = get_share_pack(&conn, &pack.id).unwrap().unwrap();
        assert_eq!(fetched.status(Utc::now()), PackStatus::Revoked);
        assert_eq!(
            count_share_events(&conn, &pack.id, ShareEventKind::Revoke).unwrap(),
            2
        );
    }

    #[test]
    fn items_preserve_order_and_kind() {
        let conn = open_memory_database().unwrap();
        let pack = seed_pack(&conn);
        let doc_ref = Uuid::new_v4();
        let obs_ref = Uuid::new_v4();

        // Items reference entities in other tables; FK enforcement is on the
        // referenced ids, so insert stub rows first.
        conn.execute(
            "INSERT INTO documents (id, person_id, kind, filename, storage_path, sha256, uploaded_at)
             VALUES (?1, ?2, 'pdf', 'f.pdf', 'documents/f.pdf', 'x', ?3)",
            params![doc_ref.to_string(), pack.person_id.to_string(), Utc::now().to_rfc3339()],
        )
        .unwrap();
        conn.execute(
            "INSERT INTO observations (id, person_id, code, display) VALUES (?1, ?2, '718-7', 'Hemoglobin')",
            params![obs_ref.to_string(), pack.person_id.to_string()],
        )
        .unwrap();

        for (position, item) in [
            (0, PackItemRef::Document(doc_ref)),
            (1, PackItemRef::Observation(obs_ref)),
        ] {
            insert_share_pack_item(
                &conn,
                &SharePackItem {
                    id: Uuid::new_v4(),
                    pack_id: pack.id,
                    position,
                    item,
                },
            )
            .unwrap();
        }

        let items = items_for_pack(&conn, &pack.id).unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].item, PackItemRef::Document(doc_ref));
        assert_eq!(items[1].item, PackItemRef::Observation(obs_ref));
    }

    #[test]
    fn views_counter_increments() {
        let conn = open_memory_database().unwrap();
        let pack = seed_pack(&conn);
        increment_views(&conn, &pack.id).unwrap();
        increment_views(&conn, &pack.id).unwrap();
        let fetched = get_share_pack(&conn, &pack.id).unwrap().unwrap();
        assert_eq!(fetched.views_count, 2);
    }
}
