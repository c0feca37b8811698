//! The request state machine.
//!
//! One pipeline run walks `analyzing → searching → generating →
//! processing → completed`, with `error` terminal from the first three
//! stages and `completed` reachable directly from `analyzing` when the
//! question is out of domain. Stage failures carry generic user-facing
//! messages; causes go to operator logs only. Rendering failures
//! degrade the completion instead of escalating.

use std::pin::Pin;
use std::sync::Arc;
use std::time::Instant;

use async_stream::stream;
use futures::Stream;
use tracing::{error, info};

use crate::analyzer::QuestionAnalyzer;
use crate::curator::RecipeCurator;
use crate::pipeline::events::StageEvent;
use crate::prompts::build_context;
use crate::retrieval::{HybridRetriever, RetrievalConfig};
use crate::sensors::resolve_sensors;
use crate::traits::{GenerativeModel, LexicalSearch, PreviewRenderer, SemanticSearch};
use crate::types::{
    CompletedMeta, CurationRequest, SearchFilter, SensorCatalogEntry, Stage, StageTimings,
};

/// User-facing stage-failure messages. Deliberately generic: internal
/// causes never reach the client payload.
pub const ANALYSIS_FAILURE_MESSAGE: &str =
    "We couldn't understand your question right now. Please try again.";
pub const SEARCH_FAILURE_MESSAGE: &str =
    "We couldn't search the recipe library right now. Please try again.";
pub const GENERATION_FAILURE_MESSAGE: &str =
    "We couldn't put together recipes for that request. Please try again.";
pub const DEFAULT_REJECTION_MESSAGE: &str =
    "This service recommends film-simulation recipes. Try asking about a look or mood.";

/// Knobs for one pipeline instance.
#[derive(Debug, Clone, Default)]
pub struct PipelineConfig {
    pub retrieval: RetrievalConfig,
}

/// The pipeline orchestrator. One instance serves many requests; each
/// `run` owns its per-request state exclusively.
pub struct CurationPipeline {
    analyzer: QuestionAnalyzer,
    retriever: HybridRetriever,
    curator: RecipeCurator,
    renderer: Arc<dyn PreviewRenderer>,
    catalog: Vec<SensorCatalogEntry>,
}

impl CurationPipeline {
    pub fn new(
        model: Arc<dyn GenerativeModel>,
        semantic: Arc<dyn SemanticSearch>,
        lexical: Arc<dyn LexicalSearch>,
        renderer: Arc<dyn PreviewRenderer>,
    ) -> Self {
        Self::with_config(model, semantic, lexical, renderer, PipelineConfig::default())
    }

    pub fn with_config(
        model: Arc<dyn GenerativeModel>,
        semantic: Arc<dyn SemanticSearch>,
        lexical: Arc<dyn LexicalSearch>,
        renderer: Arc<dyn PreviewRenderer>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            analyzer: QuestionAnalyzer::new(Arc::clone(&model)),
            retriever: HybridRetriever::new(semantic, lexical).with_config(config.retrieval),
            curator: RecipeCurator::new(model),
            renderer,
            catalog: crate::catalog::sensor_catalog().to_vec(),
        }
    }

    /// Replace the built-in sensor catalog.
    pub fn with_catalog(mut self, catalog: Vec<SensorCatalogEntry>) -> Self {
        self.catalog = catalog;
        self
    }

    /// Run the pipeline for one request, yielding stage events until a
    /// terminal frame.
    pub fn run(
        &self,
        request: CurationRequest,
    ) -> Pin<Box<dyn Stream<Item = StageEvent> + Send + '_>> {
        Box::pin(stream! {
            let mut timings = StageTimings::new();

            // ── analyzing ──
            yield StageEvent::progress(Stage::Analyzing);
            let stage_start = Instant::now();

            let sensors = resolve_sensors(&request.camera_model, &self.catalog);
            info!(
                camera_model = %request.camera_model,
                sensors = sensors.len(),
                "pipeline started"
            );

            let analysis = match self.analyzer.analyze(&request.question, &sensors).await {
                Ok(analysis) => analysis,
                Err(e) => {
                    error!(stage = "analyzing", kind = e.kind(), error = %e, "stage failed");
                    yield StageEvent::error(ANALYSIS_FAILURE_MESSAGE);
                    return;
                }
            };
            timings.record(Stage::Analyzing, stage_start.elapsed().as_millis() as u64);

            if !analysis.is_recipe_question {
                let message = analysis
                    .rejection_reason
                    .clone()
                    .unwrap_or_else(|| DEFAULT_REJECTION_MESSAGE.to_string());
                info!("question classified out of domain");
                yield StageEvent::rejection(message);
                return;
            }

            // ── searching ──
            yield StageEvent::progress(Stage::Searching);
            let stage_start = Instant::now();

            let query = analysis.query_text(&request.question).to_string();
            let filter = SearchFilter {
                sensors: analysis.detected_sensors.clone(),
                color_or_mono: analysis.color_or_mono,
            };

            let documents = match self.retriever.retrieve(&query, &filter).await {
                Ok(documents) if !documents.is_empty() => documents,
                Ok(_) => {
                    error!(stage = "searching", kind = "empty_retrieval", "stage failed");
                    yield StageEvent::error(SEARCH_FAILURE_MESSAGE);
                    return;
                }
                Err(e) => {
                    error!(stage = "searching", kind = e.kind(), error = %e, "stage failed");
                    yield StageEvent::error(SEARCH_FAILURE_MESSAGE);
                    return;
                }
            };
            timings.record(Stage::Searching, stage_start.elapsed().as_millis() as u64);

            // ── generating ──
            yield StageEvent::progress(Stage::Generating);
            let stage_start = Instant::now();

            let context = build_context(&documents);
            let mut recipes = match self
                .curator
                .curate(&context, &request.question, documents.first())
                .await
            {
                Ok(recipes) => recipes,
                Err(e) => {
                    error!(stage = "generating", kind = e.kind(), error = %e, "stage failed");
                    yield StageEvent::error(GENERATION_FAILURE_MESSAGE);
                    return;
                }
            };
            timings.record(Stage::Generating, stage_start.elapsed().as_millis() as u64);

            // ── processing ──
            // Always proceeds to completion: preview failures degrade
            // the result, they never fail the request.
            yield StageEvent::progress(Stage::Processing);
            let stage_start = Instant::now();

            let previews = self
                .renderer
                .render(Some(&recipes.generated.settings), analysis.wants_monochrome())
                .await;
            timings.record(Stage::Processing, stage_start.elapsed().as_millis() as u64);

            // ── completed ──
            let finalize_start = Instant::now();
            recipes.generated.source_image = previews.source;
            recipes.generated.retouched_image = previews.retouched;

            timings.record_total(finalize_start.elapsed().as_millis() as u64);
            let total = timings.get("total").unwrap_or(0);
            info!(total_ms = total, "pipeline completed");

            yield StageEvent::completed(
                recipes,
                CompletedMeta {
                    timing: timings,
                    has_error: false,
                    error: None,
                },
            );
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    use crate::pipeline::events::EventData;
    use crate::retrieval::TermFrequencyEngine;
    use crate::testing::{
        analysis_response, pair_response, MockModel, MockRenderer, StaticSemanticEngine,
    };
    use crate::types::RetrievedDocument;

    fn corpus() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("winter", "muted winter tones recipe")
                .with_source_url("https://recipes.example/winter")
                .with_score(0.9),
            RetrievedDocument::new("autumn", "warm autumn recipe").with_score(0.6),
        ]
    }

    fn pipeline_with(model: MockModel) -> CurationPipeline {
        CurationPipeline::new(
            Arc::new(model),
            Arc::new(StaticSemanticEngine::new(corpus())),
            Arc::new(TermFrequencyEngine::new()),
            Arc::new(MockRenderer::new()),
        )
    }

    async fn collect(pipeline: &CurationPipeline, request: CurationRequest) -> Vec<StageEvent> {
        pipeline.run(request).collect().await
    }

    #[tokio::test]
    async fn test_stage_order_on_success() {
        let model = MockModel::new()
            .with_response("question_analysis", analysis_response(true))
            .with_response("curated_recipe_pair", pair_response());
        let pipeline = pipeline_with(model);

        let events = collect(&pipeline, CurationRequest::new("winter recipe", "X-T5")).await;
        let stages: Vec<Stage> = events.iter().map(|e| e.stage).collect();

        assert_eq!(
            stages,
            vec![
                Stage::Analyzing,
                Stage::Searching,
                Stage::Generating,
                Stage::Processing,
                Stage::Completed,
            ]
        );
        assert!(events.last().unwrap().is_terminal());
    }

    #[tokio::test]
    async fn test_timing_covers_every_stage_plus_total() {
        let model = MockModel::new()
            .with_response("question_analysis", analysis_response(true))
            .with_response("curated_recipe_pair", pair_response());
        let pipeline = pipeline_with(model);

        let events = collect(&pipeline, CurationRequest::new("winter recipe", "X-T5")).await;

        let EventData::Completed { meta, .. } = &events.last().unwrap().data else {
            panic!("expected completed event");
        };
        for name in ["analyzing", "searching", "generating", "processing", "total"] {
            assert!(meta.timing.get(name).is_some(), "missing timing for {name}");
        }
        assert!(!meta.has_error);
    }

    #[tokio::test]
    async fn test_analyzer_failure_maps_to_generic_message() {
        let model = MockModel::new().failing_on("question_analysis", "upstream 500");
        let pipeline = pipeline_with(model);

        let events = collect(&pipeline, CurationRequest::new("q", "X-T5")).await;
        let last = events.last().unwrap();

        assert_eq!(last.stage, Stage::Error);
        let EventData::Error { error } = &last.data else {
            panic!("expected error data");
        };
        assert_eq!(error, ANALYSIS_FAILURE_MESSAGE);
        assert!(!error.contains("upstream"));
    }

    #[tokio::test]
    async fn test_unknown_camera_still_completes() {
        let model = MockModel::new()
            .with_response("question_analysis", analysis_response(true))
            .with_response("curated_recipe_pair", pair_response());
        let pipeline = pipeline_with(model);

        let events = collect(
            &pipeline,
            CurationRequest::new("winter recipe", "not-a-camera"),
        )
        .await;

        assert_eq!(events.last().unwrap().stage, Stage::Completed);
    }
}
