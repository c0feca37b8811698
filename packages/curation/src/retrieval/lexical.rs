//! Term-frequency lexical engine.
//!
//! Indexes only the corpus handed to each call — in the pipeline that
//! is the semantic engine's top-K pool, so the index costs a few
//! string scans per request instead of a standing inverted index.

use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::traits::LexicalSearch;
use crate::types::RetrievedDocument;

/// Per-request term-frequency ranking over a supplied corpus.
#[derive(Debug, Default, Clone)]
pub struct TermFrequencyEngine;

impl TermFrequencyEngine {
    pub fn new() -> Self {
        Self
    }
}

/// Lowercased alphanumeric terms, short tokens dropped.
fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| t.len() > 1)
        .map(|t| t.to_string())
        .collect()
}

/// Raw term-frequency score of a document against query terms:
/// occurrences of query terms normalized by document length.
fn tf_score(query_terms: &[String], doc_tokens: &[String]) -> f32 {
    if query_terms.is_empty() || doc_tokens.is_empty() {
        return 0.0;
    }

    let matches = doc_tokens
        .iter()
        .filter(|token| query_terms.contains(token))
        .count();

    matches as f32 / doc_tokens.len() as f32
}

#[async_trait]
impl LexicalSearch for TermFrequencyEngine {
    async fn search(
        &self,
        text: &str,
        k: usize,
        corpus: &[RetrievedDocument],
    ) -> Result<Vec<RetrievedDocument>> {
        let query_terms = tokenize(text);

        let mut scored: Vec<(f32, &RetrievedDocument)> = corpus
            .iter()
            .map(|doc| (tf_score(&query_terms, &tokenize(&doc.text)), doc))
            .filter(|(score, _)| *score > 0.0)
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        // Normalize into [0, 1] so lexical scores are comparable with
        // cosine similarities during fusion.
        let max = scored.first().map(|(s, _)| *s).unwrap_or(0.0);
        let results = scored
            .into_iter()
            .map(|(score, doc)| {
                let normalized = if max > 0.0 { score / max } else { 0.0 };
                doc.clone().with_score(normalized)
            })
            .collect::<Vec<_>>();

        debug!(
            query_terms = query_terms.len(),
            corpus = corpus.len(),
            hits = results.len(),
            "lexical search complete"
        );

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> RetrievedDocument {
        RetrievedDocument::new(id, text)
    }

    #[tokio::test]
    async fn test_ranks_by_term_frequency() {
        let corpus = vec![
            doc("dense", "winter winter winter recipe"),
            doc("sparse", "winter recipe with many other unrelated words in it"),
            doc("miss", "summer beach settings"),
        ];

        let engine = TermFrequencyEngine::new();
        let results = engine.search("winter recipe", 3, &corpus).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].id, "dense");
        assert!((results[0].score - 1.0).abs() < 1e-6);
        assert!(results[1].score < 1.0);
    }

    #[tokio::test]
    async fn test_only_searches_supplied_corpus() {
        let engine = TermFrequencyEngine::new();
        let results = engine.search("winter", 3, &[]).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_truncates_to_k() {
        let corpus: Vec<_> = (0..5)
            .map(|i| doc(&format!("d{i}"), "winter recipe"))
            .collect();

        let engine = TermFrequencyEngine::new();
        let results = engine.search("winter", 2, &corpus).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn test_tokenize_drops_short_and_punctuation() {
        let tokens = tokenize("A winter-recipe, at ISO 6400!");
        assert_eq!(tokens, vec!["winter", "recipe", "at", "iso", "6400"]);
    }
}
