//! Question answering over a person's records.
//!
//! Control flow: safety gate first, retrieval second, composition last.
//! Banned and escalation questions never touch the database.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::rag::composer;
use crate::rag::retrieval::{embed_query, retrieve, DEFAULT_RETRIEVE_LIMIT};
use crate::rag::types::ChatAnswer;
use crate::safety::Classification;

use super::super::error::ApiError;
use super::super::types::ApiContext;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub person_id: String,
}

pub async fn chat(
    State(ctx): State<ApiContext>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatAnswer>, ApiError> {
    if req.question.trim().is_empty() {
        return Err(ApiError::BadRequest("question is required".into()));
    }
    if req.person_id.trim().is_empty() {
        return Err(ApiError::BadRequest("personId is required".into()));
    }
    let person_id = Uuid::parse_str(req.person_id.trim())
        .map_err(|_| ApiError::BadRequest("personId is not a valid id".into()))?;

    match ctx.classifier.classify(&req.question) {
        Classification::Banned => return Ok(Json(composer::refusal_banned())),
        Classification::Escalation => return Ok(Json(composer::escalation())),
        Classification::Answerable => {}
    }

    // Embed before opening the connection: rusqlite's `Connection` is not
    // `Sync`, so no borrow of it may be held across an await point.
    let query = embed_query(ctx.embedder.as_ref(), &req.question).await;

    let conn = ctx.db.open()?;
    let chunks = retrieve(&conn, &person_id, query.as_deref(), DEFAULT_RETRIEVE_LIMIT)?;

    Ok(Json(composer::compose(&chunks)))
}
