//! Question analysis stage.
//!
//! One structured model call classifies the question, enriches it for
//! retrieval, and extracts filter hints. Out-of-domain questions are a
//! normal outcome here, not an error; anything else that goes wrong is
//! a fatal stage failure.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CurationError, Result};
use crate::prompts::{format_analyze_prompt, ANALYZE_SYSTEM_PROMPT};
use crate::traits::{GenerativeModel, ModelRequest};
use crate::types::{ColorMode, FilmSimulation, QuestionAnalysis};

/// Output contract for the analysis call.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct QuestionAnalysisResponse {
    is_recipe_question: bool,
    #[serde(default)]
    rejection_reason: Option<String>,
    #[serde(default)]
    enhanced_question: Option<String>,
    #[serde(default)]
    color_or_mono: Option<ColorMode>,
    #[serde(default)]
    film_simulation: Option<FilmSimulation>,
    #[serde(default)]
    detected_sensors: Option<Vec<String>>,
}

/// Classifies and enriches the user's question.
pub struct QuestionAnalyzer {
    model: Arc<dyn GenerativeModel>,
}

impl QuestionAnalyzer {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Run the analysis call once.
    ///
    /// `detected_sensors` comes from the sensor resolver and is passed
    /// through into the result so retrieval can filter on it.
    pub async fn analyze(
        &self,
        question: &str,
        detected_sensors: &[String],
    ) -> Result<QuestionAnalysis> {
        let schema = serde_json::to_value(schemars::schema_for!(QuestionAnalysisResponse))?;
        let request = ModelRequest::new(
            ANALYZE_SYSTEM_PROMPT,
            format_analyze_prompt(question, detected_sensors),
            "question_analysis",
            schema,
        );

        let value = self.model.invoke(request).await?;
        let response: QuestionAnalysisResponse =
            serde_json::from_value(value).map_err(|e| CurationError::SchemaValidation {
                schema: "question_analysis".to_string(),
                reason: e.to_string(),
            })?;

        debug!(
            is_recipe_question = response.is_recipe_question,
            enhanced = response.enhanced_question.as_deref().unwrap_or(""),
            echoed_sensors = response.detected_sensors.as_ref().map_or(0, |s| s.len()),
            "question analyzed"
        );

        Ok(QuestionAnalysis {
            is_recipe_question: response.is_recipe_question,
            rejection_reason: response.rejection_reason,
            enhanced_question: response.enhanced_question,
            color_or_mono: response.color_or_mono,
            film_simulation: response.film_simulation,
            // The model echoes the list; trust the resolver, not the echo.
            detected_sensors: detected_sensors.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;

    #[tokio::test]
    async fn test_analyze_recipe_question() {
        let model = Arc::new(MockModel::new().with_response(
            "question_analysis",
            serde_json::json!({
                "isRecipeQuestion": true,
                "enhancedQuestion": "cold winter muted tones",
                "colorOrMono": "Color"
            }),
        ));
        let analyzer = QuestionAnalyzer::new(model);

        let analysis = analyzer
            .analyze("겨울 느낌의 레시피", &["X-Trans V".to_string()])
            .await
            .unwrap();

        assert!(analysis.is_recipe_question);
        assert_eq!(
            analysis.enhanced_question.as_deref(),
            Some("cold winter muted tones")
        );
        assert_eq!(analysis.detected_sensors, vec!["X-Trans V"]);
    }

    #[tokio::test]
    async fn test_analyze_rejection_is_not_an_error() {
        let model = Arc::new(MockModel::new().with_response(
            "question_analysis",
            serde_json::json!({
                "isRecipeQuestion": false,
                "rejectionReason": "필름 레시피에 대해 물어봐 주세요."
            }),
        ));
        let analyzer = QuestionAnalyzer::new(model);

        let analysis = analyzer.analyze("오늘 저녁 메뉴 추천해줘", &[]).await.unwrap();

        assert!(!analysis.is_recipe_question);
        assert!(analysis.rejection_reason.is_some());
    }

    #[tokio::test]
    async fn test_analyze_schema_violation_fails() {
        let model = Arc::new(MockModel::new().with_response(
            "question_analysis",
            serde_json::json!({ "unexpected": "shape" }),
        ));
        let analyzer = QuestionAnalyzer::new(model);

        let err = analyzer.analyze("any", &[]).await.unwrap_err();
        assert!(matches!(err, CurationError::SchemaValidation { .. }));
    }
}
