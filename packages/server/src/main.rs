// Main entry point for the curation relay server

mod app;
mod config;
mod embeddings;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use curation::{
    ClientCache, DirectorySampleProvider, MemorySemanticEngine, RetrievedDocument,
    TransformRenderer,
};

use app::{build_app, AppState};
use config::Config;
use embeddings::EmbeddingClient;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,curation=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!("Configuration loaded");

    // Index the recipe corpus
    let corpus = load_corpus(&config.recipes_path)?;
    tracing::info!(documents = corpus.len(), "Recipe corpus loaded");

    let embedder = EmbeddingClient::new(&config.openai_api_key, &config.embedding_model);
    let mut semantic = MemorySemanticEngine::new(embedder);
    for document in corpus {
        semantic
            .index(document)
            .await
            .context("Failed to embed recipe document")?;
    }
    tracing::info!(indexed = semantic.len(), "Semantic index ready");

    // Shared process-wide state
    let renderer = TransformRenderer::new(
        Arc::new(DirectorySampleProvider::new(&config.samples_dir)),
        &config.sample_image,
    );
    let state = AppState {
        config: config.clone(),
        clients: Arc::new(ClientCache::default()),
        semantic: Arc::new(semantic),
        renderer: Arc::new(renderer),
    };

    let app = build_app(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {addr}");
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}

/// Load the recipe corpus from a JSON array of documents.
fn load_corpus(path: &str) -> Result<Vec<RetrievedDocument>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read recipe corpus at {path}"))?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid recipe corpus JSON at {path}"))
}
