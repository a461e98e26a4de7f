//! Chunk retrieval: semantic ranking with a recency fallback.

use rusqlite::Connection;
use uuid::Uuid;

use crate::db::repository::{chunks_for_person, chunks_for_person_with_code};
use crate::models::DocChunk;

use super::embedding::Embedder;
use super::types::RetrievedChunk;
use super::RagError;

/// Default number of chunks handed to the composer's candidate pool.
pub const DEFAULT_RETRIEVE_LIMIT: usize = 6;

/// Embed a question, absorbing provider failures.
///
/// `None` means retrieval degrades to recency order; callers never see the
/// provider error. Awaited before any database connection is opened, since
/// ranking itself is synchronous.
pub async fn embed_query(embedder: &dyn Embedder, question: &str) -> Option<Vec<f32>> {
    match embedder.embed(question).await {
        Ok(query) => Some(query),
        Err(err) => {
            tracing::warn!(error = %err, "query embedding unavailable, falling back to recency order");
            None
        }
    }
}

/// Retrieve the most relevant chunks for a question, scoped to one person.
///
/// With a query embedding, chunks are ranked by vector distance; without
/// one, the stored newest-first order stands. Either way the caller gets at
/// most `limit` chunks and never anything belonging to another person.
pub fn retrieve(
    conn: &Connection,
    person_id: &Uuid,
    query: Option<&[f32]>,
    limit: usize,
) -> Result<Vec<RetrievedChunk>, RagError> {
    let mut chunks = chunks_for_person(conn, person_id)?;

    if let Some(query) = query {
        rank_by_distance(&mut chunks, query);
    }

    chunks.truncate(limit);
    Ok(chunks.into_iter().map(into_retrieved).collect())
}

/// Retrieve chunks tied to a specific clinical code, newest first. Used by
/// structured lookups where the code is already known and semantic ranking
/// would add nothing.
pub fn retrieve_by_code(
    conn: &Connection,
    person_id: &Uuid,
    code: &str,
    limit: usize,
) -> Result<Vec<RetrievedChunk>, RagError> {
    let chunks = chunks_for_person_with_code(conn, person_id, code, limit)?;
    Ok(chunks.into_iter().map(into_retrieved).collect())
}

fn into_retrieved(chunk: DocChunk) -> RetrievedChunk {
    RetrievedChunk {
        document_id: chunk.document_id,
        source_anchor: chunk.source_anchor,
        text: chunk.text,
    }
}

/// Stable sort by squared L2 distance to the query. Chunks without a stored
/// embedding, or with a vector of mismatched length, sort after every scored
/// chunk while keeping their relative (newest-first) order.
fn rank_by_distance(chunks: &mut [DocChunk], query: &[f32]) {
    chunks.sort_by(|a, b| {
        let da = distance(a, query);
        let db = distance(b, query);
        da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
    });
}

fn distance(chunk: &DocChunk, query: &[f32]) -> f32 {
    match chunk.embedding.as_deref() {
        Some(v) if v.len() == query.len() => v
            .iter()
            .zip(query)
            .map(|(a, b)| (a - b) * (a - b))
            .sum(),
        _ => f32::INFINITY,
    }
}
