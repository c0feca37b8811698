//! Recipe Curation Pipeline
//!
//! Recommends film-simulation recipes for a natural-language request
//! by combining a stored recipe corpus with a generative model, then
//! renders deterministic before/after previews from the generated
//! numeric settings.
//!
//! # Pipeline
//!
//! One request walks a fixed stage sequence:
//!
//! 1. **analyzing** — resolve sensor compatibility for the camera,
//!    classify and enrich the question (out-of-domain questions end
//!    the run here, successfully).
//! 2. **searching** — hybrid retrieval: diversified semantic top-K,
//!    lexical re-ranking over that pool, weighted score fusion.
//! 3. **generating** — one structured model call producing exactly two
//!    recipes: retrieved-grounded and model-authored.
//! 4. **processing** — two concurrent preview renders; failures here
//!    degrade the result instead of failing it.
//! 5. **completed** — images attached, timings summed, result emitted.
//!
//! # Usage
//!
//! ```rust,ignore
//! use curation::{CurationPipeline, CurationRequest};
//! use futures::StreamExt;
//!
//! let pipeline = CurationPipeline::new(model, semantic, lexical, renderer);
//! let mut events = pipeline.run(CurationRequest::new("겨울 느낌의 레시피", "X-T5"));
//! while let Some(event) = events.next().await {
//!     write_frame(event.to_frame()).await?;
//! }
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Collaborator seams (model, search engines, images)
//! - [`types`] - Data contracts shared across stages
//! - [`pipeline`] - The orchestrator state machine and event stream
//! - [`retrieval`] - Hybrid retrieval and rank fusion
//! - [`render`] - The numeric-to-visual transform engine
//! - [`testing`] - Deterministic mocks for all collaborator traits

pub mod analyzer;
pub mod catalog;
pub mod clients;
pub mod curator;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod prompts;
pub mod render;
pub mod retrieval;
pub mod sensors;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{CurationError, Result};
pub use traits::{
    DirectorySampleProvider, GenerativeModel, LexicalSearch, ModelRequest, PreviewRenderer,
    PreviewSet, SampleImageProvider, SemanticSearch,
};
pub use types::{
    ColorMode, CompletedMeta, CuratedRecipePair, CurationRequest, FilmSimulation, FusedResult,
    FusionWeights, QuestionAnalysis, Recipe, RecipeSettings, RetrievedDocument, SearchFilter,
    SensorCatalogEntry, Stage, StageTimings,
};

// Re-export the pipeline entry points
pub use pipeline::{CurationPipeline, PipelineConfig, StageEvent};

// Re-export components for direct use
pub use analyzer::QuestionAnalyzer;
pub use catalog::sensor_catalog;
pub use clients::ClientCache;
pub use curator::RecipeCurator;
pub use model::ChatModel;
pub use render::{render_preview, RenderOptions, TransformRenderer};
pub use retrieval::{fuse, HybridRetriever, MemorySemanticEngine, RetrievalConfig, TermFrequencyEngine};
pub use sensors::resolve_sensors;
