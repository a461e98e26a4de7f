use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::db::DatabaseError;
use crate::models::{DocChunk, Document, DocumentKind};

use super::{parse_ts, parse_uuid};

pub fn insert_document(conn: &Connection, doc: &Document) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO documents (id, person_id, kind, filename, storage_path, sha256, uploaded_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            doc.id.to_string(),
            doc.person_id.to_string(),
            doc.kind.as_str(),
            doc.filename,
            doc.storage_path,
            doc.sha256,
            doc.uploaded_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

pub fn get_document(conn: &Connection, id: &Uuid) -> Result<Option<Document>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, person_id, kind, filename, storage_path, sha256, uploaded_at
         FROM documents WHERE id = ?1",
    )?;

    let result = stmt.query_row(params![id.to_string()], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, String>(3)?,
            row.get::<_, String>(4)?,
            row.get::<_, String>(5)?,
            row.get::<_, String>(6)?,
        ))
    });

    match result {
        Ok((id, person_id, kind, filename, storage_path, sha256, uploaded_at)) => {
            Ok(Some(Document {
                id: parse_uuid("documents.id", &id)?,
                person_id: parse_uuid("documents.person_id", &person_id)?,
                kind: DocumentKind::from_str(&kind).ok_or_else(|| {
                    DatabaseError::InvalidValue {
                        field: "documents.kind".into(),
                        value: kind.clone(),
                    }
                })?,
                filename,
                storage_path,
                sha256,
                uploaded_at: parse_ts("documents.uploaded_at", &uploaded_at)?,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn insert_chunk(conn: &Connection, chunk: &DocChunk) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO doc_chunks (id, document_id, chunk_index, text, source_anchor, embedding, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        params![
            chunk.id.to_string(),
            chunk.document_id.to_string(),
            chunk.chunk_index,
            chunk.text,
            chunk.source_anchor,
            chunk.embedding.as_deref().map(embedding_to_blob),
            chunk.created_at.to_rfc3339(),
        ],
    )?;
    Ok(())
}

/// All chunks belonging to a person's documents, newest first.
///
/// Newest-first is the retrieval fallback order; the semantic ranking in
/// `rag::retrieval` reorders these by embedding distance when a query
/// embedding is available.
pub fn chunks_for_person(conn: &Connection, person_id: &Uuid) -> Result<Vec<DocChunk>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT dc.id, dc.document_id, dc.chunk_index, dc.text, dc.source_anchor, dc.embedding, dc.created_at
         FROM doc_chunks dc
         JOIN documents d ON d.id = dc.document_id
         WHERE d.person_id = ?1
         ORDER BY dc.created_at DESC, dc.chunk_index DESC",
    )?;

    let rows = stmt.query_map(params![person_id.to_string()], chunk_from_row)?;
    collect_chunks(rows)
}

/// Chunks whose originating document carries an observation with the given
/// clinical code, newest first. No semantic ranking.
pub fn chunks_for_person_with_code(
    conn: &Connection,
    person_id: &Uuid,
    code: &str,
    limit: usize,
) -> Result<Vec<DocChunk>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT DISTINCT dc.id, dc.document_id, dc.chunk_index, dc.text, dc.source_anchor, dc.embedding, dc.created_at
         FROM doc_chunks dc
         JOIN documents d ON d.id = dc.document_id
         JOIN observations o ON o.source_doc_id = d.id
         WHERE d.person_id = ?1 AND o.code = ?2
         ORDER BY dc.created_at DESC, dc.chunk_index DESC
         LIMIT ?3",
    )?;

    let rows = stmt.query_map(params![person_id.to_string(), code, limit as i64], chunk_from_row)?;
    collect_chunks(rows)
}

type ChunkRow = (String, String, i64, String, Option<String>, Option<Vec<u8>>, String);

fn chunk_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<ChunkRow> {
    Ok((
        row.get::<_, String>(0)?,
        row.get::<_, String>(1)?,
        row.get::<_, i64>(2)?,
        row.get::<_, String>(3)?,
        row.get::<_, Option<String>>(4)?,
        row.get::<_, Option<Vec<u8>>>(5)?,
        row.get::<_, String>(6)?,
    ))
}

fn collect_chunks(
    rows: impl Iterator<Item = rusqlite::Result<ChunkRow>>,
) -> Result<Vec<DocChunk>, DatabaseError> {
    let mut chunks = Vec::new();
    for row in rows {
        let (id, document_id, chunk_index, text, source_anchor, embedding, created_at) = row?;
        chunks.push(DocChunk {
            id: parse_uuid("doc_chunks.id", &id)?,
            document_id: parse_uuid("doc_chunks.document_id", &document_id)?,
            chunk_index,
            text,
            source_anchor,
            embedding: embedding.as_deref().map(blob_to_embedding),
            created_at: parse_ts("doc_chunks.created_at", &created_at)?,
        });
    }
    Ok(chunks)
}

/// Encode an embedding as a little-endian f32 blob.
pub fn embedding_to_blob(embedding: &[f32]) -> Vec<u8> {
    let mut blob = Vec::with_capacity(embedding.len() * 4);
    for value in embedding {
        blob.extend_from_slice(&value.to_le_bytes());
    }
    blob
}

/// Decode a little-endian f32 blob. Trailing bytes that do not form a
/// whole f32 are ignored.
pub fn blob_to_embedding(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::insert_person;
    use crate::db::sqlite::open_memory_database;
    use crate::models::Person;
    use chrono::{Duration, Utc};

    fn seed_person(conn: &Connection, owner: &str) -> Uuid {
        let person = Person {
            id: Uuid::new_v4(),
            owner_id: owner.into(),
            full_name: None,
            date_of_birth: None,
            created_at: Utc::now(),
        };
        insert_person(conn, &person).unwrap();
        person.id
    }

    fn seed_document(conn: &Connection, person_id: Uuid) -> Uuid {
        let doc = Document {
            id: Uuid::new_v4(),
            person_id,
            kind: DocumentKind::Pdf,
            filename: "labs.pdf".into(),
            storage_path: "documents/labs.pdf".into(),
            sha256: "abc123".into(),
            uploaded_at: Utc::now(),
        };
        insert_document(conn, &doc).unwrap();
        doc.id
    }

    #[test]
    fn embedding_blob_round_trips() {
        let embedding = vec![0.25_f32, -1.5, 3.125];
        let blob = embedding_to_blob(&embedding);
        assert_eq!(blob.len(), 12);
        assert_eq!(blob_to_embedding(&blob), embedding);
    }

    #[test]
    fn chunks_scoped_to_person() {
        let conn = open_memory_database().unwrap();
        let person_a = seed_person(&conn, "user-a");
        let person_b = seed_person(&conn, "user-b");
        let doc_a = seed_document(&conn, person_a);
        let doc_b = seed_document(&conn, person_b);

        for (doc, text) in [(doc_a, "Hemoglobin 12.9 g/dL"), (doc_b, "Cholesterol 210 mg/dL")] {
            insert_chunk(
                &conn,
                &DocChunk {
                    id: Uuid::new_v4(),
                    document_id: doc,
                    chunk_index: 0,
                    text: text.into(),
                    source_anchor: Some("p1.l1".into()),
                    embedding: None,
                    created_at: Utc::now(),
                },
            )
            .unwrap();
        }

        let chunks = chunks_for_person(&conn, &person_a).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Hemoglobin 12.9 g/dL");
        assert_eq!(chunks[0].document_id, doc_a);
    }

    #[test]
    fn chunks_newest_first() {
        let conn = open_memory_database().unwrap();
        let person = seed_person(&conn, "user-a");
        let doc = seed_document(&conn, person);
        let base = Utc::now();

        for (i, offset) in [(0, 0), (1, 60), (2, 120)] {
            insert_chunk(
                &conn,
                &DocChunk {
                    id: Uuid::new_v4(),
                    document_id: doc,
                    chunk_index: i,
                    text: format!("chunk {i}"),
                    source_anchor: None,
                    embedding: None,
                    created_at: base + Duration::seconds(offset),
                },
            )
            .unwrap();
        }

        let chunks = chunks_for_person(&conn, &person).unwrap();
        assert_eq!(chunks[0].text, "chunk 2");
        assert_eq!(chunks[2].text, "chunk 0");
    }

    #[test]
    fn chunk_embedding_survives_storage() {
        let conn = open_memory_database().unwrap();
        let person = seed_person(&conn, "user-a");
        let doc = seed_document(&conn, person);

        insert_chunk(
            &conn,
            &DocChunk {
                id: Uuid::new_v4(),
                document_id: doc,
                chunk_index: 0,
                text: "First chunk about labs".into(),
                source_anchor: None,
                embedding: Some(vec![0.2, 0.1, 0.0]),
                created_at: Utc::now(),
            },
        )
        .unwrap();

        let chunks = chunks_for_person(&conn, &person).unwrap();
        assert_eq!(chunks[0].embedding.as_deref(), Some(&[0.2, 0.1, 0.0][..]));
    }
}
