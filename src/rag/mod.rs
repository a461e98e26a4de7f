//! Retrieval-augmented answering over a person's document chunks.
//!
//! The pipeline is deliberately small and deterministic: embed the query,
//! rank stored chunks by vector distance (recency fallback when the
//! provider is unavailable), then template the top chunks into an answer
//! with citations. No generative synthesis happens here.

pub mod composer;
pub mod embedding;
pub mod retrieval;
pub mod types;

use thiserror::Error;

use crate::db::DatabaseError;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),
}
