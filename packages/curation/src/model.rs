//! Chat-completions implementation of the [`GenerativeModel`] trait.
//!
//! Talks to an OpenAI-compatible endpoint with the `json_schema`
//! response format so replies are constrained to the caller's schema.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CurationError, Result};
use crate::traits::{GenerativeModel, ModelRequest};

/// Structured-output chat client.
#[derive(Clone)]
pub struct ChatModel {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    temperature: f32,
}

impl ChatModel {
    /// Create a client for the given model identifier.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
            temperature: 0.2,
        }
    }

    /// Create from the `OPENAI_API_KEY` environment variable.
    pub fn from_env(model: impl Into<String>) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| CurationError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key, model))
    }

    /// Set a custom base URL (proxies, compatible providers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set the sampling temperature (default 0.2).
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Model identifier this client is bound to.
    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl GenerativeModel for ChatModel {
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value> {
        let body = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: request.system,
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: request.user,
                },
            ],
            temperature: self.temperature,
            response_format: ResponseFormat {
                format_type: "json_schema".to_string(),
                json_schema: JsonSchemaFormat {
                    name: request.schema_name.clone(),
                    strict: true,
                    schema: request.schema,
                },
            },
        };

        debug!(model = %self.model, schema = %request.schema_name, "invoking chat model");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| CurationError::Model(Box::new(e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(CurationError::Model(
                format!("chat API error {status}: {error_text}").into(),
            ));
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .map_err(|e| CurationError::Model(Box::new(e)))?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| CurationError::Model("empty response from chat API".into()))?;

        serde_json::from_str(&content).map_err(|e| CurationError::SchemaValidation {
            schema: request.schema_name,
            reason: format!("response is not valid JSON: {e}"),
        })
    }
}

// Request/Response types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
    json_schema: JsonSchemaFormat,
}

#[derive(Serialize)]
struct JsonSchemaFormat {
    name: String,
    strict: bool,
    schema: serde_json::Value,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_model_builder() {
        let model = ChatModel::new("sk-test", "gpt-4o-mini")
            .with_base_url("https://custom.api.com")
            .with_temperature(0.0);

        assert_eq!(model.model(), "gpt-4o-mini");
        assert_eq!(model.base_url, "https://custom.api.com");
        assert_eq!(model.temperature, 0.0);
    }
}
