//! Query embedding via an OpenAI-compatible `/embeddings` endpoint.
//!
//! A single attempt with a client-level timeout; callers treat any error as
//! "provider unavailable" and degrade to recency ordering. No retry or
//! backoff here: the fallback is always a valid answer path.

use std::time::Duration;

use futures_util::future::BoxFuture;
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EmbeddingError {
    #[error("Embedding provider not configured")]
    NotConfigured,

    #[error("Embedding request failed: {0}")]
    Request(String),

    #[error("Embedding provider returned {status}: {body}")]
    Provider { status: u16, body: String },

    #[error("Embedding response carried no vector")]
    MissingVector,
}

/// Object-safe provider seam. The HTTP client is the production
/// implementation; tests substitute fixed or failing providers.
pub trait Embedder: Send + Sync {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>>;
}

/// OpenAI-compatible embeddings client.
pub struct HttpEmbedder {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    model: String,
}

impl HttpEmbedder {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Request(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()),
            model: model.into(),
        })
    }
}

#[derive(Deserialize)]
struct EmbeddingsResponse {
    data: Vec<EmbeddingEntry>,
}

#[derive(Deserialize)]
struct EmbeddingEntry {
    embedding: Vec<f32>,
}

impl Embedder for HttpEmbedder {
    fn embed<'a>(&'a self, text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>> {
        Box::pin(async move {
            let key = self.api_key.as_deref().ok_or(EmbeddingError::NotConfigured)?;

            let response = self
                .client
                .post(format!("{}/embeddings", self.base_url))
                .bearer_auth(key)
                .json(&serde_json::json!({
                    "model": self.model,
                    "input": text,
                }))
                .send()
                .await
                .map_err(|e| EmbeddingError::Request(e.to_string()))?;

            let status = response.status();
            if !status.is_success() {
                let body = response.text().await.unwrap_or_default();
                return Err(EmbeddingError::Provider {
                    status: status.as_u16(),
                    body,
                });
            }

            let parsed: EmbeddingsResponse = response
                .json()
                .await
                .map_err(|e| EmbeddingError::Request(e.to_string()))?;

            parsed
                .data
                .into_iter()
                .next()
                .map(|entry| entry.embedding)
                .filter(|v| !v.is_empty())
                .ok_or(EmbeddingError::MissingVector)
        })
    }
}

/// Fixed-vector provider for tests.
pub struct StaticEmbedder(pub Vec<f32>);

impl Embedder for StaticEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>> {
        Box::pin(async move { Ok(self.0.clone()) })
    }
}

/// Always-unavailable provider for exercising the recency fallback.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embed<'a>(&'a self, _text: &'a str) -> BoxFuture<'a, Result<Vec<f32>, EmbeddingError>> {
        Box::pin(async move {
            Err(EmbeddingError::Request("provider unreachable".to_string()))
        })
    }
}
