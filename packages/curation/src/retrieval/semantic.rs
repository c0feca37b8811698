//! In-memory semantic engine with diversified top-K selection.
//!
//! Holds documents with precomputed embeddings and ranks by cosine
//! similarity. Diversified selection is maximal-marginal-relevance:
//! fetch a pool larger than K, then greedily take the candidate whose
//! relevance, minus a redundancy penalty against what is already
//! selected, is highest. Production deployments may implement
//! [`SemanticSearch`] against an external vector index instead.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::traits::SemanticSearch;
use crate::types::{RetrievedDocument, SearchFilter};

/// Pool size multiplier for diversified selection.
const MMR_POOL_FACTOR: usize = 4;

/// Relevance weight in the MMR objective; the remainder weights the
/// redundancy penalty.
const MMR_LAMBDA: f32 = 0.5;

/// Maps text to an embedding vector.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;
}

/// Cosine similarity between two vectors. Zero for mismatched or
/// zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let mag_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let mag_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

struct IndexedDocument {
    document: RetrievedDocument,
    embedding: Vec<f32>,
}

/// Semantic engine over an in-memory embedded corpus.
pub struct MemorySemanticEngine<E: TextEmbedder> {
    embedder: E,
    documents: Vec<IndexedDocument>,
}

impl<E: TextEmbedder> MemorySemanticEngine<E> {
    pub fn new(embedder: E) -> Self {
        Self {
            embedder,
            documents: Vec::new(),
        }
    }

    /// Add a document, embedding its text now.
    pub async fn index(&mut self, document: RetrievedDocument) -> Result<()> {
        let embedding = self.embedder.embed(&document.text).await?;
        self.documents.push(IndexedDocument {
            document,
            embedding,
        });
        Ok(())
    }

    /// Add a document with a precomputed embedding.
    pub fn index_embedded(&mut self, document: RetrievedDocument, embedding: Vec<f32>) {
        self.documents.push(IndexedDocument {
            document,
            embedding,
        });
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Greedy MMR selection over a scored candidate pool.
    fn diversified_top_k(
        pool: Vec<(f32, &IndexedDocument)>,
        k: usize,
    ) -> Vec<(f32, &IndexedDocument)> {
        let mut remaining = pool;
        let mut selected: Vec<(f32, &IndexedDocument)> = Vec::with_capacity(k);

        while selected.len() < k {
            let best = remaining
                .iter()
                .enumerate()
                .map(|(i, (relevance, candidate))| {
                    let redundancy = selected
                        .iter()
                        .map(|(_, s)| cosine_similarity(&candidate.embedding, &s.embedding))
                        .fold(0.0f32, f32::max);
                    (i, MMR_LAMBDA * relevance - (1.0 - MMR_LAMBDA) * redundancy)
                })
                .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            match best {
                Some((best_idx, _)) => selected.push(remaining.remove(best_idx)),
                None => break,
            }
        }

        selected
    }
}

#[async_trait]
impl<E: TextEmbedder> SemanticSearch for MemorySemanticEngine<E> {
    async fn search(
        &self,
        text: &str,
        k: usize,
        filter: &SearchFilter,
        diversify: bool,
    ) -> Result<Vec<RetrievedDocument>> {
        let query = self.embedder.embed(text).await?;

        let mut scored: Vec<(f32, &IndexedDocument)> = self
            .documents
            .iter()
            .filter(|d| filter.matches(&d.document))
            .map(|d| (cosine_similarity(&query, &d.embedding), d))
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let selected = if diversify {
            scored.truncate(k * MMR_POOL_FACTOR);
            Self::diversified_top_k(scored, k)
        } else {
            scored.truncate(k);
            scored
        };

        debug!(
            corpus = self.documents.len(),
            hits = selected.len(),
            diversify,
            "semantic search complete"
        );

        Ok(selected
            .into_iter()
            .map(|(score, d)| d.document.clone().with_score(score))
            .collect())
    }
}
