use serde::Serialize;
use uuid::Uuid;

/// A text fragment returned by retrieval, with provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct RetrievedChunk {
    pub document_id: Uuid,
    pub source_anchor: Option<String>,
    pub text: String,
}

/// A citation pairing a cited fragment with its owning document and the
/// anchor locating it within the original file.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Citation {
    pub document_id: Uuid,
    pub source_anchor: Option<String>,
}

/// Safety outcome attached to every chat response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SafetyTag {
    Ok,
    Refusal,
    Escalation,
}

/// A complete composed answer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatAnswer {
    pub answer: String,
    pub citations: Vec<Citation>,
    pub safety_tag: SafetyTag,
}
