//! Typed errors for the curation library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Each pipeline stage maps
//! to a variant so the orchestrator can attach the right user-facing
//! message while the underlying cause stays in operator logs.

use thiserror::Error;

/// Errors that can occur during curation operations.
#[derive(Debug, Error)]
pub enum CurationError {
    /// Generative model unavailable or failed
    #[error("model error: {0}")]
    Model(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Model output did not conform to the required schema
    #[error("schema validation failed for {schema}: {reason}")]
    SchemaValidation { schema: String, reason: String },

    /// Semantic search engine failed
    #[error("semantic search error: {0}")]
    SemanticSearch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Lexical search engine failed
    #[error("lexical search error: {0}")]
    LexicalSearch(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Retrieval produced no usable context
    #[error("no documents retrieved for query")]
    EmptyRetrieval,

    /// Image decode, transform, or encode failed
    #[error("render error: {0}")]
    Render(String),

    /// Sample image could not be loaded
    #[error("sample image not found: {name}")]
    SampleImageNotFound { name: String },

    /// Configuration error
    #[error("config error: {0}")]
    Config(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),
}

impl CurationError {
    /// Short classification label used in operator logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Model(_) => "model",
            Self::SchemaValidation { .. } => "schema_validation",
            Self::SemanticSearch(_) => "semantic_search",
            Self::LexicalSearch(_) => "lexical_search",
            Self::EmptyRetrieval => "empty_retrieval",
            Self::Render(_) => "render",
            Self::SampleImageNotFound { .. } => "sample_image",
            Self::Config(_) => "config",
            Self::JsonParse(_) => "json_parse",
        }
    }
}

/// Result type alias for curation operations.
pub type Result<T> = std::result::Result<T, CurationError>;
