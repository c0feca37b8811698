//! Generative model trait with a structured-output contract.

use async_trait::async_trait;

use crate::error::Result;

/// One structured-output call: prompt inputs plus the schema the reply
/// must conform to.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    /// System prompt establishing the task.
    pub system: String,

    /// User content for this call.
    pub user: String,

    /// Name reported to the model API for the schema.
    pub schema_name: String,

    /// JSON Schema the response must validate against.
    pub schema: serde_json::Value,
}

impl ModelRequest {
    pub fn new(
        system: impl Into<String>,
        user: impl Into<String>,
        schema_name: impl Into<String>,
        schema: serde_json::Value,
    ) -> Self {
        Self {
            system: system.into(),
            user: user.into(),
            schema_name: schema_name.into(),
            schema,
        }
    }
}

/// A generative model constrained to structured output.
///
/// Implementations wrap a specific provider. The returned value is the
/// model's JSON reply; callers deserialize it into their contract type
/// and treat deserialization failure as a schema-validation failure.
///
/// Handles must be stateless with respect to conversation content —
/// every per-request datum travels in the [`ModelRequest`] — so one
/// handle is safe to share across concurrent requests.
#[async_trait]
pub trait GenerativeModel: Send + Sync {
    /// Invoke the model once. No retries at this layer.
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value>;
}
