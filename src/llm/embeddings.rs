//! Embedding model client
//!
//! OpenAI-compatible embeddings client behind the `EmbeddingModel` trait.
//! The relevance filter embeds one text per call so a single chunk failure
//! stays local to that chunk.

use crate::config::OpenAiConfig;
use crate::error::AppError;
use async_trait::async_trait;
use serde::Deserialize;

/// Embedding response payload
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

/// One embedding vector within the response
#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Text-to-vector collaborator
#[async_trait]
pub trait EmbeddingModel: Send + Sync {
    /// Compute the embedding vector for one text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError>;
}

/// Embeddings client for OpenAI-compatible APIs
pub struct OpenAiEmbeddings {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiEmbeddings {
    /// Build a client from configuration, reusing the shared HTTP client
    pub fn new(client: reqwest::Client, config: &OpenAiConfig) -> Self {
        Self {
            client,
            api_key: config.api_key.clone(),
            model: config.embedding_model.clone(),
            base_url: config.base_url.clone(),
        }
    }
}

#[async_trait]
impl EmbeddingModel for OpenAiEmbeddings {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, AppError> {
        if self.api_key.is_empty() {
            return Err(AppError::Embedding(
                "OPENAI_API_KEY is not set or is empty".to_string(),
            ));
        }

        let url = format!("{}/embeddings", self.base_url);
        let body = serde_json::json!({
            "model": self.model,
            "input": text,
        });

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::Embedding(format!("embedding request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let err_body = response.text().await.unwrap_or_default();
            return Err(AppError::Embedding(format!(
                "embedding API returned HTTP {}: {}",
                status.as_u16(),
                err_body
            )));
        }

        let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
            AppError::Embedding(format!("failed to parse embedding response: {}", e))
        })?;

        parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| AppError::Embedding("embedding response is empty".to_string()))
    }
}
