//! Server configuration from environment variables.

use anyhow::{Context, Result};

/// Runtime configuration for the relay.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen port.
    pub port: u16,

    /// API key for the model provider.
    pub openai_api_key: String,

    /// Chat model used for analysis and curation.
    pub chat_model: String,

    /// Embedding model used to index the recipe corpus.
    pub embedding_model: String,

    /// Path to the recipe corpus JSON file.
    pub recipes_path: String,

    /// Directory holding sample images.
    pub samples_dir: String,

    /// Sample image name used for previews.
    pub sample_image: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a number")?;

        let openai_api_key =
            std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY must be set")?;

        Ok(Self {
            port,
            openai_api_key,
            chat_model: std::env::var("CURATION_CHAT_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            embedding_model: std::env::var("CURATION_EMBEDDING_MODEL")
                .unwrap_or_else(|_| "text-embedding-3-small".to_string()),
            recipes_path: std::env::var("CURATION_RECIPES_PATH")
                .unwrap_or_else(|_| "data/recipes.json".to_string()),
            samples_dir: std::env::var("CURATION_SAMPLES_DIR")
                .unwrap_or_else(|_| "assets".to_string()),
            sample_image: std::env::var("CURATION_SAMPLE_IMAGE")
                .unwrap_or_else(|_| "sample.jpg".to_string()),
        })
    }
}
