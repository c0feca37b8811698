//! Weighted score fusion across the two retrieval engines.
//!
//! A pure function over fixture-testable inputs: no engine clients,
//! no async. Documents are joined by id; a document missing from one
//! engine's list contributes 0 from that engine.

use std::collections::HashMap;

use crate::types::{FusedResult, FusionWeights, RetrievedDocument};

struct Entry {
    document: RetrievedDocument,
    semantic_score: f32,
    lexical_score: f32,
    semantic_rank: Option<usize>,
    lexical_rank: Option<usize>,
}

/// Fuse two ranked lists into one, sorted descending by fused score.
///
/// `fused_score = w_semantic * score_semantic + w_lexical * score_lexical`.
/// Ties break by engine priority: a document the semantic engine
/// returned sorts before one it did not, and earlier semantic rank
/// wins among those.
pub fn fuse(
    semantic: &[RetrievedDocument],
    lexical: &[RetrievedDocument],
    weights: FusionWeights,
) -> Vec<FusedResult> {
    let mut entries: HashMap<String, Entry> = HashMap::new();

    for (rank, doc) in semantic.iter().enumerate() {
        entries.insert(
            doc.id.clone(),
            Entry {
                document: doc.clone(),
                semantic_score: doc.score,
                lexical_score: 0.0,
                semantic_rank: Some(rank),
                lexical_rank: None,
            },
        );
    }

    for (rank, doc) in lexical.iter().enumerate() {
        entries
            .entry(doc.id.clone())
            .and_modify(|e| {
                e.lexical_score = doc.score;
                e.lexical_rank = Some(rank);
            })
            .or_insert_with(|| Entry {
                document: doc.clone(),
                semantic_score: 0.0,
                lexical_score: doc.score,
                semantic_rank: None,
                lexical_rank: Some(rank),
            });
    }

    let mut fused: Vec<FusedResult> = entries
        .into_values()
        .map(|e| FusedResult {
            fused_score: weights.semantic * e.semantic_score + weights.lexical * e.lexical_score,
            document: e.document,
            semantic_rank: e.semantic_rank,
            lexical_rank: e.lexical_rank,
        })
        .collect();

    fused.sort_by(|a, b| {
        b.fused_score
            .partial_cmp(&a.fused_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| rank_key(a).cmp(&rank_key(b)))
    });

    fused
}

// Semantic-first tie order: documents with a semantic rank precede
// lexical-only ones; within each group earlier ranks precede later.
fn rank_key(result: &FusedResult) -> (u8, usize) {
    match (result.semantic_rank, result.lexical_rank) {
        (Some(rank), _) => (0, rank),
        (None, Some(rank)) => (1, rank),
        (None, None) => (2, 0),
    }
}
