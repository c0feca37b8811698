//! Embedding client backing the in-memory semantic engine.

use async_trait::async_trait;
use curation::retrieval::TextEmbedder;
use curation::CurationError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// OpenAI-compatible embeddings client.
#[derive(Clone)]
pub struct EmbeddingClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl EmbeddingClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

#[derive(Serialize)]
struct EmbeddingRequest {
    input: String,
    model: String,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl TextEmbedder for EmbeddingClient {
    async fn embed(&self, text: &str) -> curation::Result<Vec<f32>> {
        let request = EmbeddingRequest {
            input: text.to_string(),
            model: self.model.clone(),
        };

        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| CurationError::SemanticSearch(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CurationError::SemanticSearch(
                format!("embedding API error {status}: {error_text}").into(),
            ));
        }

        let embedding_response: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| CurationError::SemanticSearch(Box::new(e)))?;

        embedding_response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| CurationError::SemanticSearch("no embedding returned".into()))
    }
}
