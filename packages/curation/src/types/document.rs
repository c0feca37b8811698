//! Retrieval document types and rank-fusion contracts.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::analysis::ColorMode;

/// A document returned by a retrieval engine.
///
/// Both engines produce this shape; `score` is local to the engine
/// that ranked it (cosine similarity or normalized term frequency).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedDocument {
    /// Stable identifier within the corpus.
    pub id: String,

    /// Recipe text as indexed.
    pub text: String,

    /// Where the recipe was published.
    #[serde(default)]
    pub source_url: String,

    /// Scalar metadata (sensor, film simulation, color mode, ...).
    #[serde(default)]
    pub metadata: HashMap<String, String>,

    /// Engine-local relevance score. Not part of stored corpus files;
    /// engines fill it per query.
    #[serde(default)]
    pub score: f32,
}

impl RetrievedDocument {
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            source_url: String::new(),
            metadata: HashMap::new(),
            score: 0.0,
        }
    }

    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = url.into();
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn with_score(mut self, score: f32) -> Self {
        self.score = score;
        self
    }
}

/// Metadata filter applied by the semantic engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchFilter {
    /// Restrict to documents tagged with any of these sensors.
    /// Empty means no sensor restriction.
    #[serde(default)]
    pub sensors: Vec<String>,

    /// Restrict to color or black-and-white recipes.
    pub color_or_mono: Option<ColorMode>,
}

impl SearchFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sensors(mut self, sensors: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.sensors = sensors.into_iter().map(|s| s.into()).collect();
        self
    }

    pub fn with_color_mode(mut self, mode: ColorMode) -> Self {
        self.color_or_mono = Some(mode);
        self
    }

    /// Whether a document's metadata passes this filter.
    ///
    /// Documents without the relevant metadata key are not excluded;
    /// the filter only discriminates where the corpus is tagged.
    pub fn matches(&self, doc: &RetrievedDocument) -> bool {
        if !self.sensors.is_empty() {
            if let Some(sensor) = doc.metadata.get("sensor") {
                let hit = self
                    .sensors
                    .iter()
                    .any(|s| s.eq_ignore_ascii_case(sensor));
                if !hit {
                    return false;
                }
            }
        }

        if let Some(mode) = self.color_or_mono {
            if let Some(tag) = doc.metadata.get("color_mode") {
                let wanted = match mode {
                    ColorMode::Color => "color",
                    ColorMode::Bw => "bw",
                };
                if !tag.eq_ignore_ascii_case(wanted) {
                    return false;
                }
            }
        }

        true
    }
}

/// Weights for combining the two engines' scores. Must sum to 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionWeights {
    pub semantic: f32,
    pub lexical: f32,
}

impl Default for FusionWeights {
    fn default() -> Self {
        Self {
            semantic: 0.6,
            lexical: 0.4,
        }
    }
}

impl FusionWeights {
    /// Construct weights from the semantic share; the lexical share is
    /// the remainder.
    pub fn from_semantic(semantic: f32) -> Self {
        let semantic = semantic.clamp(0.0, 1.0);
        Self {
            semantic,
            lexical: 1.0 - semantic,
        }
    }
}

/// A retrieved document with its combined score.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedResult {
    pub document: RetrievedDocument,

    /// `w_semantic * score_semantic + w_lexical * score_lexical`.
    pub fused_score: f32,

    /// Rank in the semantic list, when the semantic engine returned it.
    /// Used for the semantic-first tie-break.
    pub semantic_rank: Option<usize>,

    /// Rank in the lexical list, when the lexical engine returned it.
    pub lexical_rank: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches_sensor() {
        let doc = RetrievedDocument::new("d1", "text").with_metadata("sensor", "X-Trans V");

        let filter = SearchFilter::new().with_sensors(["X-Trans V", "X-Trans IV"]);
        assert!(filter.matches(&doc));

        let filter = SearchFilter::new().with_sensors(["X-Trans II"]);
        assert!(!filter.matches(&doc));
    }

    #[test]
    fn test_filter_passes_untagged_documents() {
        let doc = RetrievedDocument::new("d1", "text");
        let filter = SearchFilter::new()
            .with_sensors(["X-Trans V"])
            .with_color_mode(ColorMode::Bw);
        assert!(filter.matches(&doc));
    }

    #[test]
    fn test_filter_matches_color_mode() {
        let doc = RetrievedDocument::new("d1", "text").with_metadata("color_mode", "bw");

        assert!(SearchFilter::new()
            .with_color_mode(ColorMode::Bw)
            .matches(&doc));
        assert!(!SearchFilter::new()
            .with_color_mode(ColorMode::Color)
            .matches(&doc));
    }

    #[test]
    fn test_fusion_weights_sum_to_one() {
        let w = FusionWeights::from_semantic(0.7);
        assert!((w.semantic + w.lexical - 1.0).abs() < f32::EPSILON);
    }
}
