//! Question analysis types produced by the analyzer stage.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Whether the request asks for a color or black-and-white rendition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ColorMode {
    Color,
    Bw,
}

/// Film simulation bases supported by the recipe catalog.
///
/// Serialized by display name so model output and stored recipes use
/// the same spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FilmSimulation {
    #[serde(rename = "Provia")]
    Provia,
    #[serde(rename = "Velvia")]
    Velvia,
    #[serde(rename = "Astia")]
    Astia,
    #[serde(rename = "Classic Chrome")]
    ClassicChrome,
    #[serde(rename = "Classic Neg")]
    ClassicNeg,
    #[serde(rename = "Pro Neg Hi")]
    ProNegHi,
    #[serde(rename = "Pro Neg Std")]
    ProNegStd,
    #[serde(rename = "Eterna")]
    Eterna,
    #[serde(rename = "Eterna Bleach Bypass")]
    EternaBleachBypass,
    #[serde(rename = "Nostalgic Neg")]
    NostalgicNeg,
    #[serde(rename = "Reala Ace")]
    RealaAce,
    #[serde(rename = "Acros")]
    Acros,
    #[serde(rename = "Monochrome")]
    Monochrome,
    #[serde(rename = "Sepia")]
    Sepia,
}

impl FilmSimulation {
    /// Simulations that render black-and-white output.
    pub fn is_monochrome(&self) -> bool {
        matches!(self, Self::Acros | Self::Monochrome | Self::Sepia)
    }
}

/// Result of classifying and enriching the user's question.
///
/// Created once per request by the analyzer stage; immutable afterward.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionAnalysis {
    /// Whether the question is about camera recipes at all.
    pub is_recipe_question: bool,

    /// User-visible explanation when the question is out of domain.
    pub rejection_reason: Option<String>,

    /// Search-optimized rephrasing of the question.
    pub enhanced_question: Option<String>,

    /// Color vs black-and-white intent, when detectable.
    pub color_or_mono: Option<ColorMode>,

    /// Film simulation the question implies, when detectable.
    pub film_simulation: Option<FilmSimulation>,

    /// Sensor names resolved from the camera model, passed through so
    /// retrieval can filter on them.
    #[serde(default)]
    pub detected_sensors: Vec<String>,
}

impl QuestionAnalysis {
    /// An out-of-domain classification with a user-facing reason.
    pub fn rejection(reason: impl Into<String>) -> Self {
        Self {
            is_recipe_question: false,
            rejection_reason: Some(reason.into()),
            enhanced_question: None,
            color_or_mono: None,
            film_simulation: None,
            detected_sensors: vec![],
        }
    }

    /// The query text retrieval should use: the enhanced question when
    /// the analyzer produced one, the raw question otherwise.
    pub fn query_text<'a>(&'a self, raw_question: &'a str) -> &'a str {
        self.enhanced_question
            .as_deref()
            .filter(|q| !q.trim().is_empty())
            .unwrap_or(raw_question)
    }

    /// Whether previews should be rendered in monochrome.
    pub fn wants_monochrome(&self) -> bool {
        matches!(self.color_or_mono, Some(ColorMode::Bw))
            || self
                .film_simulation
                .map(|f| f.is_monochrome())
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_text_prefers_enhanced() {
        let analysis = QuestionAnalysis {
            is_recipe_question: true,
            rejection_reason: None,
            enhanced_question: Some("wintry muted tones".to_string()),
            color_or_mono: None,
            film_simulation: None,
            detected_sensors: vec![],
        };
        assert_eq!(analysis.query_text("winter recipe"), "wintry muted tones");
    }

    #[test]
    fn test_query_text_falls_back_to_raw() {
        let analysis = QuestionAnalysis {
            is_recipe_question: true,
            rejection_reason: None,
            enhanced_question: Some("   ".to_string()),
            color_or_mono: None,
            film_simulation: None,
            detected_sensors: vec![],
        };
        assert_eq!(analysis.query_text("winter recipe"), "winter recipe");
    }

    #[test]
    fn test_wants_monochrome() {
        let mut analysis = QuestionAnalysis::rejection("n/a");
        assert!(!analysis.wants_monochrome());

        analysis.color_or_mono = Some(ColorMode::Bw);
        assert!(analysis.wants_monochrome());

        analysis.color_or_mono = None;
        analysis.film_simulation = Some(FilmSimulation::Acros);
        assert!(analysis.wants_monochrome());
    }

    #[test]
    fn test_film_simulation_serde_display_names() {
        let json = serde_json::to_string(&FilmSimulation::ClassicChrome).unwrap();
        assert_eq!(json, "\"Classic Chrome\"");

        let parsed: FilmSimulation = serde_json::from_str("\"Eterna Bleach Bypass\"").unwrap();
        assert_eq!(parsed, FilmSimulation::EternaBleachBypass);
    }
}
