//! Recipe generation stage.
//!
//! One structured model call turns retrieved context into exactly two
//! recipes: one grounded in the top fused document, one authored by
//! the model. The contract enforces structure only; numeric settings
//! are clamped during conversion, and a reply missing either recipe is
//! a fatal stage failure.

use std::sync::Arc;

use schemars::JsonSchema;
use serde::Deserialize;
use tracing::debug;

use crate::error::{CurationError, Result};
use crate::prompts::{format_curate_prompt, CURATE_SYSTEM_PROMPT};
use crate::traits::{GenerativeModel, ModelRequest};
use crate::types::{
    CuratedRecipePair, DynamicRange, FilmSimulation, FusedResult, GrainEffect, Recipe,
    RecipeSettings,
};

/// Output contract for the curation call: exactly two recipes.
#[derive(Debug, Deserialize, JsonSchema)]
struct CuratedPairResponse {
    retrieved: RecipeDraft,
    generated: RecipeDraft,
}

#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct RecipeDraft {
    title: String,
    base_film_simulation: FilmSimulation,
    reason: String,
    #[serde(default)]
    url: Option<String>,
    settings: SettingsDraft,
}

/// Settings as the model writes them; numeric fields unclamped here.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
struct SettingsDraft {
    film_simulation: FilmSimulation,
    #[serde(default)]
    wb_shift_red: i32,
    #[serde(default)]
    wb_shift_blue: i32,
    #[serde(default)]
    highlight: i32,
    #[serde(default)]
    shadow: i32,
    #[serde(default)]
    color: i32,
    #[serde(default)]
    clarity: i32,
    #[serde(default)]
    sharpness: i32,
    #[serde(default)]
    noise_reduction: i32,
    #[serde(default)]
    grain: GrainEffect,
    #[serde(default)]
    dynamic_range: DynamicRange,
    #[serde(default)]
    iso: String,
    #[serde(default)]
    exposure_compensation: String,
}

impl RecipeDraft {
    fn into_recipe(self) -> Recipe {
        let settings = RecipeSettings {
            film_simulation: self.settings.film_simulation,
            wb_shift_red: self.settings.wb_shift_red,
            wb_shift_blue: self.settings.wb_shift_blue,
            highlight: self.settings.highlight,
            shadow: self.settings.shadow,
            color: self.settings.color,
            clarity: self.settings.clarity,
            sharpness: self.settings.sharpness,
            noise_reduction: self.settings.noise_reduction,
            grain: self.settings.grain,
            dynamic_range: self.settings.dynamic_range,
            iso: self.settings.iso,
            exposure_compensation: self.settings.exposure_compensation,
        }
        .normalized();

        Recipe {
            title: self.title,
            base_film_simulation: self.base_film_simulation,
            reason: self.reason,
            settings,
            url: self.url.filter(|u| !u.trim().is_empty()),
            source_image: None,
            retouched_image: None,
        }
    }
}

/// Produces the curated recipe pair from retrieved context.
pub struct RecipeCurator {
    model: Arc<dyn GenerativeModel>,
}

impl RecipeCurator {
    pub fn new(model: Arc<dyn GenerativeModel>) -> Self {
        Self { model }
    }

    /// Run the curation call once.
    ///
    /// `top_result` is the most relevant fused document; its URL is
    /// attached to the retrieved recipe when the model leaves it out.
    pub async fn curate(
        &self,
        context: &str,
        question: &str,
        top_result: Option<&FusedResult>,
    ) -> Result<CuratedRecipePair> {
        let schema = serde_json::to_value(schemars::schema_for!(CuratedPairResponse))?;
        let request = ModelRequest::new(
            CURATE_SYSTEM_PROMPT,
            format_curate_prompt(context, question),
            "curated_recipe_pair",
            schema,
        );

        let value = self.model.invoke(request).await?;
        let response: CuratedPairResponse =
            serde_json::from_value(value).map_err(|e| CurationError::SchemaValidation {
                schema: "curated_recipe_pair".to_string(),
                reason: e.to_string(),
            })?;

        let mut retrieved = response.retrieved.into_recipe();
        let generated = response.generated.into_recipe();

        if retrieved.url.is_none() {
            retrieved.url = top_result
                .map(|r| r.document.source_url.clone())
                .filter(|u| !u.is_empty());
        }

        debug!(
            retrieved_title = %retrieved.title,
            generated_title = %generated.title,
            "recipes curated"
        );

        Ok(CuratedRecipePair {
            retrieved,
            generated,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockModel;
    use crate::types::RetrievedDocument;

    fn pair_response(with_url: bool) -> serde_json::Value {
        let url = if with_url {
            serde_json::json!("https://recipes.example/winter")
        } else {
            serde_json::Value::Null
        };
        serde_json::json!({
            "retrieved": {
                "title": "Winter Mist",
                "baseFilmSimulation": "Classic Neg",
                "reason": "muted and cold",
                "url": url,
                "settings": {
                    "filmSimulation": "Classic Neg",
                    "wbShiftRed": -2,
                    "wbShiftBlue": 12,
                    "highlight": -1,
                    "shadow": 1,
                    "color": -2,
                    "sharpness": -1
                }
            },
            "generated": {
                "title": "AI Original: Frost Light",
                "baseFilmSimulation": "Eterna",
                "reason": "soft flat winter light",
                "settings": {
                    "filmSimulation": "Eterna",
                    "wbShiftBlue": 3,
                    "shadow": -1,
                    "clarity": -2
                }
            }
        })
    }

    fn top_result() -> FusedResult {
        FusedResult {
            document: RetrievedDocument::new("d1", "winter recipe")
                .with_source_url("https://recipes.example/fused-top"),
            fused_score: 0.8,
            semantic_rank: Some(0),
            lexical_rank: Some(0),
        }
    }

    #[tokio::test]
    async fn test_curate_returns_exactly_two_recipes() {
        let model = Arc::new(
            MockModel::new().with_response("curated_recipe_pair", pair_response(true)),
        );
        let curator = RecipeCurator::new(model);

        let pair = curator
            .curate("[1] context", "winter recipe", Some(&top_result()))
            .await
            .unwrap();

        assert_eq!(pair.retrieved.title, "Winter Mist");
        assert!(pair.generated.title.starts_with("AI Original"));
        assert_eq!(
            pair.retrieved.url.as_deref(),
            Some("https://recipes.example/winter")
        );
        assert!(pair.generated.url.is_none());
    }

    #[tokio::test]
    async fn test_curate_clamps_model_settings() {
        let model = Arc::new(
            MockModel::new().with_response("curated_recipe_pair", pair_response(true)),
        );
        let curator = RecipeCurator::new(model);

        let pair = curator.curate("ctx", "q", None).await.unwrap();

        // The draft carried wbShiftBlue = 12; valid range tops at 9.
        assert_eq!(pair.retrieved.settings.wb_shift_blue, 9);
    }

    #[tokio::test]
    async fn test_curate_falls_back_to_top_result_url() {
        let model = Arc::new(
            MockModel::new().with_response("curated_recipe_pair", pair_response(false)),
        );
        let curator = RecipeCurator::new(model);

        let pair = curator
            .curate("ctx", "q", Some(&top_result()))
            .await
            .unwrap();

        assert_eq!(
            pair.retrieved.url.as_deref(),
            Some("https://recipes.example/fused-top")
        );
    }

    #[tokio::test]
    async fn test_missing_recipe_is_schema_failure() {
        let model = Arc::new(MockModel::new().with_response(
            "curated_recipe_pair",
            serde_json::json!({ "retrieved": null, "generated": null }),
        ));
        let curator = RecipeCurator::new(model);

        let err = curator.curate("ctx", "q", None).await.unwrap_err();
        assert!(matches!(err, CurationError::SchemaValidation { .. }));
    }
}
