use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::enums::DocumentKind;

/// An uploaded artifact. The file body lives in object storage at
/// `storage_path`; only metadata is kept here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub person_id: Uuid,
    pub kind: DocumentKind,
    pub filename: String,
    pub storage_path: String,
    pub sha256: String,
    pub uploaded_at: DateTime<Utc>,
}

/// A segment of extracted text from a document.
///
/// Created during ingestion post-processing and immutable afterwards.
/// `embedding` is None when the embedding provider was unavailable at
/// ingestion time; such chunks still participate in retrieval, ranked last.
#[derive(Debug, Clone)]
pub struct DocChunk {
    pub id: Uuid,
    pub document_id: Uuid,
    pub chunk_index: i64,
    pub text: String,
    pub source_anchor: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub created_at: DateTime<Utc>,
}
