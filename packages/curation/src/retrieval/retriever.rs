//! Hybrid retrieval orchestration.
//!
//! One semantic query narrows the corpus to a diversified top-K pool;
//! the lexical engine then re-ranks only that pool, and the two
//! rankings fuse into the final list. Lexical recall is therefore
//! bounded by semantic recall — deliberate: the per-request lexical
//! index stays tiny and fusion favors documents both engines agree on.

use std::sync::Arc;

use tracing::{debug, info};

use crate::error::Result;
use crate::retrieval::fuse;
use crate::traits::{LexicalSearch, SemanticSearch};
use crate::types::{FusedResult, FusionWeights, SearchFilter};

/// Tuning knobs for hybrid retrieval.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Result count for both engines and the fused list.
    pub k: usize,

    /// Score weights for fusion.
    pub weights: FusionWeights,

    /// Use diversified (MMR) selection in the semantic engine.
    pub diversify: bool,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            k: 3,
            weights: FusionWeights::default(),
            diversify: true,
        }
    }
}

/// Two-engine retriever with weighted rank fusion.
pub struct HybridRetriever {
    semantic: Arc<dyn SemanticSearch>,
    lexical: Arc<dyn LexicalSearch>,
    config: RetrievalConfig,
}

impl HybridRetriever {
    pub fn new(semantic: Arc<dyn SemanticSearch>, lexical: Arc<dyn LexicalSearch>) -> Self {
        Self {
            semantic,
            lexical,
            config: RetrievalConfig::default(),
        }
    }

    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Retrieve, fuse, and rank documents for a query.
    ///
    /// Either engine failing fails the whole call; partial results are
    /// never returned.
    pub async fn retrieve(&self, query: &str, filter: &SearchFilter) -> Result<Vec<FusedResult>> {
        let semantic_results = self
            .semantic
            .search(query, self.config.k, filter, self.config.diversify)
            .await?;
        debug!(hits = semantic_results.len(), "semantic engine returned");

        let lexical_results = self
            .lexical
            .search(query, self.config.k, &semantic_results)
            .await?;
        debug!(hits = lexical_results.len(), "lexical engine returned");

        let mut fused = fuse(&semantic_results, &lexical_results, self.config.weights);
        fused.truncate(self.config.k);

        info!(
            query_len = query.len(),
            sensors = filter.sensors.len(),
            fused = fused.len(),
            "hybrid retrieval complete"
        );

        Ok(fused)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::TermFrequencyEngine;
    use crate::testing::{FailingSemanticEngine, StaticSemanticEngine};
    use crate::types::RetrievedDocument;

    fn corpus() -> Vec<RetrievedDocument> {
        vec![
            RetrievedDocument::new("winter", "muted winter tones with lifted shadows")
                .with_score(0.9),
            RetrievedDocument::new("autumn", "warm autumn light and deep reds").with_score(0.7),
            RetrievedDocument::new("night", "neon night street photography").with_score(0.5),
        ]
    }

    #[tokio::test]
    async fn test_retrieve_fuses_and_bounds_length() {
        let retriever = HybridRetriever::new(
            Arc::new(StaticSemanticEngine::new(corpus())),
            Arc::new(TermFrequencyEngine::new()),
        );

        let fused = retriever
            .retrieve("winter tones", &SearchFilter::default())
            .await
            .unwrap();

        assert!(fused.len() <= 3);
        assert_eq!(fused[0].document.id, "winter");
        for pair in fused.windows(2) {
            assert!(pair[0].fused_score >= pair[1].fused_score);
        }
    }

    #[tokio::test]
    async fn test_lexical_only_sees_semantic_pool() {
        // "night" matches the query lexically but the semantic engine
        // is limited to k=2, so it never reaches the lexical pass.
        let config = RetrievalConfig {
            k: 2,
            ..Default::default()
        };
        let retriever = HybridRetriever::new(
            Arc::new(StaticSemanticEngine::new(corpus())),
            Arc::new(TermFrequencyEngine::new()),
        )
        .with_config(config);

        let fused = retriever
            .retrieve("neon night street", &SearchFilter::default())
            .await
            .unwrap();

        assert!(fused.iter().all(|r| r.document.id != "night"));
    }

    #[tokio::test]
    async fn test_engine_failure_is_fatal() {
        let retriever = HybridRetriever::new(
            Arc::new(FailingSemanticEngine::new("index timeout")),
            Arc::new(TermFrequencyEngine::new()),
        );

        let result = retriever.retrieve("q", &SearchFilter::default()).await;
        assert!(result.is_err());
    }
}
