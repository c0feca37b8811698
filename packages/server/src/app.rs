//! Router and request handlers.
//!
//! One route drives a pipeline run per request and relays its stage
//! frames as SSE; the core decides the event names and payloads.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use curation::{
    ChatModel, ClientCache, CurationPipeline, CurationRequest, PreviewRenderer, SemanticSearch,
    TermFrequencyEngine,
};

use crate::config::Config;

/// Process-wide state shared across requests.
///
/// The client cache is the only mutable piece; engines and renderer
/// are read-only handles. Each request gets its own pipeline instance
/// over these shared parts.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub clients: Arc<ClientCache<ChatModel>>,
    pub semantic: Arc<dyn SemanticSearch>,
    pub renderer: Arc<dyn PreviewRenderer>,
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/curation", post(curate))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn curate(
    State(state): State<AppState>,
    Json(request): Json<CurationRequest>,
) -> Sse<impl futures::Stream<Item = Result<Event, Infallible>>> {
    let model = state.clients.get_or_insert(&state.config.chat_model, || {
        ChatModel::new(
            state.config.openai_api_key.clone(),
            state.config.chat_model.clone(),
        )
    });

    let pipeline = CurationPipeline::new(
        model,
        Arc::clone(&state.semantic),
        Arc::new(TermFrequencyEngine::new()),
        Arc::clone(&state.renderer),
    );

    // The run borrows the pipeline, so drive it on its own task and
    // relay frames through a channel. A client hanging up closes the
    // receiver; the send error then ends the task.
    let (tx, rx) = mpsc::channel(16);
    tokio::spawn(async move {
        let mut events = pipeline.run(request);
        while let Some(event) = events.next().await {
            if tx.send(event).await.is_err() {
                break;
            }
        }
    });

    let frames = ReceiverStream::new(rx).filter_map(|event| async move {
        Event::default()
            .event(event.stage.as_str())
            .json_data(&event.data)
            .ok()
            .map(Ok)
    });

    Sse::new(frames).keep_alive(KeepAlive::default())
}
