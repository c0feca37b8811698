//! Retrieval engine traits.

use async_trait::async_trait;

use crate::error::Result;
use crate::types::{RetrievedDocument, SearchFilter};

/// Embedding-based search over the recipe corpus.
#[async_trait]
pub trait SemanticSearch: Send + Sync {
    /// Return the top-`k` most similar documents.
    ///
    /// With `diversify`, selection balances relevance against mutual
    /// redundancy (maximal-marginal-relevance): the engine fetches a
    /// candidate pool larger than `k` and greedily picks results that
    /// add information, not repeats.
    async fn search(
        &self,
        text: &str,
        k: usize,
        filter: &SearchFilter,
        diversify: bool,
    ) -> Result<Vec<RetrievedDocument>>;
}

/// Term-frequency search restricted to a caller-supplied corpus.
///
/// The corpus is the semantic engine's already-narrowed result pool,
/// so the index is cheap to build per request. Scores are normalized
/// to [0, 1] within the call.
#[async_trait]
pub trait LexicalSearch: Send + Sync {
    async fn search(
        &self,
        text: &str,
        k: usize,
        corpus: &[RetrievedDocument],
    ) -> Result<Vec<RetrievedDocument>>;
}
