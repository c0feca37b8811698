//! Testing utilities including mock implementations.
//!
//! Deterministic, scriptable stand-ins for every collaborator trait,
//! so pipeline behavior is testable without a model API, a vector
//! index, or image assets on disk.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{CurationError, Result};
use crate::retrieval::TextEmbedder;
use crate::traits::{
    GenerativeModel, LexicalSearch, ModelRequest, PreviewRenderer, PreviewSet,
    SampleImageProvider, SemanticSearch,
};
use crate::types::{RecipeSettings, RetrievedDocument, SearchFilter};

/// A mock generative model with scripted structured responses.
///
/// Responses are keyed by the request's schema name, matching how the
/// pipeline distinguishes its two calls. Unscripted schemas fail, as
/// do schemas explicitly marked failing.
#[derive(Default)]
pub struct MockModel {
    responses: RwLock<HashMap<String, serde_json::Value>>,
    failures: RwLock<HashMap<String, String>>,
    calls: Arc<RwLock<Vec<MockModelCall>>>,
}

/// Record of a call made to the mock model.
#[derive(Debug, Clone)]
pub struct MockModelCall {
    pub schema_name: String,
    pub system_len: usize,
    pub user: String,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the response for a schema.
    pub fn with_response(self, schema_name: impl Into<String>, value: serde_json::Value) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(schema_name.into(), value);
        self
    }

    /// Make calls for a schema fail with the given cause.
    pub fn failing_on(self, schema_name: impl Into<String>, cause: impl Into<String>) -> Self {
        self.failures
            .write()
            .unwrap()
            .insert(schema_name.into(), cause.into());
        self
    }

    /// All calls made to this mock.
    pub fn calls(&self) -> Vec<MockModelCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl GenerativeModel for MockModel {
    async fn invoke(&self, request: ModelRequest) -> Result<serde_json::Value> {
        self.calls.write().unwrap().push(MockModelCall {
            schema_name: request.schema_name.clone(),
            system_len: request.system.len(),
            user: request.user.clone(),
        });

        if let Some(cause) = self.failures.read().unwrap().get(&request.schema_name) {
            return Err(CurationError::Model(cause.clone().into()));
        }

        self.responses
            .read()
            .unwrap()
            .get(&request.schema_name)
            .cloned()
            .ok_or_else(|| {
                CurationError::Model(
                    format!("no scripted response for schema {}", request.schema_name).into(),
                )
            })
    }
}

/// Semantic engine returning its fixed corpus, filtered and truncated.
///
/// Documents keep their preset scores; order follows score descending
/// so tests control the ranking exactly.
pub struct StaticSemanticEngine {
    documents: Vec<RetrievedDocument>,
}

impl StaticSemanticEngine {
    pub fn new(documents: Vec<RetrievedDocument>) -> Self {
        Self { documents }
    }
}

#[async_trait]
impl SemanticSearch for StaticSemanticEngine {
    async fn search(
        &self,
        _text: &str,
        k: usize,
        filter: &SearchFilter,
        _diversify: bool,
    ) -> Result<Vec<RetrievedDocument>> {
        let mut results: Vec<_> = self
            .documents
            .iter()
            .filter(|d| filter.matches(d))
            .cloned()
            .collect();
        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(k);
        Ok(results)
    }
}

/// Semantic engine that always fails, for fatal-stage tests.
pub struct FailingSemanticEngine {
    cause: String,
}

impl FailingSemanticEngine {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

#[async_trait]
impl SemanticSearch for FailingSemanticEngine {
    async fn search(
        &self,
        _text: &str,
        _k: usize,
        _filter: &SearchFilter,
        _diversify: bool,
    ) -> Result<Vec<RetrievedDocument>> {
        Err(CurationError::SemanticSearch(self.cause.clone().into()))
    }
}

/// Lexical engine that always fails.
pub struct FailingLexicalEngine {
    cause: String,
}

impl FailingLexicalEngine {
    pub fn new(cause: impl Into<String>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

#[async_trait]
impl LexicalSearch for FailingLexicalEngine {
    async fn search(
        &self,
        _text: &str,
        _k: usize,
        _corpus: &[RetrievedDocument],
    ) -> Result<Vec<RetrievedDocument>> {
        Err(CurationError::LexicalSearch(self.cause.clone().into()))
    }
}

/// In-memory sample image provider: one named byte blob.
pub struct MemorySampleProvider {
    name: String,
    bytes: Vec<u8>,
}

impl MemorySampleProvider {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }
}

#[async_trait]
impl SampleImageProvider for MemorySampleProvider {
    async fn fetch(&self, name: &str) -> Result<Vec<u8>> {
        if name == self.name {
            Ok(self.bytes.clone())
        } else {
            Err(CurationError::SampleImageNotFound {
                name: name.to_string(),
            })
        }
    }
}

/// Scripted preview renderer.
///
/// Defaults to producing both previews; `failing_retouched` and
/// `failing_all` simulate the degradation paths.
#[derive(Default)]
pub struct MockRenderer {
    fail_source: bool,
    fail_retouched: bool,
    calls: Arc<RwLock<Vec<MockRenderCall>>>,
}

/// Record of a render call.
#[derive(Debug, Clone)]
pub struct MockRenderCall {
    pub with_settings: bool,
    pub monochrome: bool,
}

impl MockRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Produce the source preview but fail the retouched one.
    pub fn failing_retouched() -> Self {
        Self {
            fail_retouched: true,
            ..Self::default()
        }
    }

    /// Fail both previews.
    pub fn failing_all() -> Self {
        Self {
            fail_source: true,
            fail_retouched: true,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<MockRenderCall> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl PreviewRenderer for MockRenderer {
    async fn render(&self, settings: Option<&RecipeSettings>, monochrome: bool) -> PreviewSet {
        self.calls.write().unwrap().push(MockRenderCall {
            with_settings: settings.is_some(),
            monochrome,
        });

        PreviewSet {
            source: (!self.fail_source).then(|| "data:image/jpeg;base64,c291cmNl".to_string()),
            retouched: (settings.is_some() && !self.fail_retouched)
                .then(|| "data:image/jpeg;base64,cmV0b3VjaGVk".to_string()),
        }
    }
}

/// Deterministic embedder: hashes text into a fixed-dimension vector.
///
/// Same input always embeds identically, different inputs diverge, and
/// no network is involved.
pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self { dimension: 64 }
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

#[async_trait]
impl TextEmbedder for HashEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        Ok((0..self.dimension)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                (byte / 127.5) - 1.0
            })
            .collect())
    }
}

/// Fixture: a question-analysis reply.
pub fn analysis_response(is_recipe_question: bool) -> serde_json::Value {
    if is_recipe_question {
        serde_json::json!({
            "isRecipeQuestion": true,
            "enhancedQuestion": "muted winter tones recipe",
            "colorOrMono": "Color"
        })
    } else {
        serde_json::json!({
            "isRecipeQuestion": false,
            "rejectionReason": "이 서비스는 필름 레시피를 추천해 드려요. 원하는 분위기를 물어봐 주세요."
        })
    }
}

/// Fixture: a curated-pair reply with one grounded and one authored
/// recipe.
pub fn pair_response() -> serde_json::Value {
    serde_json::json!({
        "retrieved": {
            "title": "Winter Mist",
            "baseFilmSimulation": "Classic Neg",
            "reason": "muted, cold rendition from the library",
            "url": "https://recipes.example/winter",
            "settings": {
                "filmSimulation": "Classic Neg",
                "wbShiftRed": -2,
                "wbShiftBlue": 3,
                "highlight": -1,
                "shadow": 1,
                "color": -2,
                "sharpness": -1,
                "noiseReduction": 0,
                "grain": "Weak",
                "dynamicRange": "DR200",
                "iso": "Auto up to 3200",
                "exposureCompensation": "+1/3"
            }
        },
        "generated": {
            "title": "AI Original: Frost Light",
            "baseFilmSimulation": "Eterna",
            "reason": "soft, flat winter light",
            "settings": {
                "filmSimulation": "Eterna",
                "wbShiftBlue": 4,
                "shadow": -1,
                "clarity": -2,
                "color": -1
            }
        }
    })
}
