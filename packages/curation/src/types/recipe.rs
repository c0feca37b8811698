//! Recipe types: the numeric camera settings and the curated pair.
//!
//! All numeric settings carry fixed valid ranges. Values arriving from
//! the model are clamped on normalization, never rejected — a recipe
//! with an out-of-range shadow value is still a recipe.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::analysis::FilmSimulation;

/// White-balance shift range on both axes.
pub const WB_SHIFT_RANGE: (i32, i32) = (-9, 9);
/// Highlight and shadow tone range.
pub const TONE_RANGE: (i32, i32) = (-2, 4);
/// Color, clarity, sharpness, and noise-reduction range.
pub const EFFECT_RANGE: (i32, i32) = (-4, 4);

/// Grain effect strength.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum GrainEffect {
    #[default]
    Off,
    Weak,
    Strong,
}

/// Dynamic range setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Default)]
pub enum DynamicRange {
    #[serde(rename = "DR-Auto")]
    #[default]
    Auto,
    #[serde(rename = "DR100")]
    Dr100,
    #[serde(rename = "DR200")]
    Dr200,
    #[serde(rename = "DR400")]
    Dr400,
}

/// Numeric and enum camera parameters of one recipe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSettings {
    /// Film simulation base the settings are tuned for.
    pub film_simulation: FilmSimulation,

    /// White-balance shift, red axis. Range [-9, 9].
    pub wb_shift_red: i32,

    /// White-balance shift, blue axis. Range [-9, 9].
    pub wb_shift_blue: i32,

    /// Highlight tone. Range [-2, 4].
    pub highlight: i32,

    /// Shadow tone. Range [-2, 4].
    pub shadow: i32,

    /// Color density. Range [-4, 4].
    pub color: i32,

    /// Clarity. Range [-4, 4].
    pub clarity: i32,

    /// Sharpness. Range [-4, 4].
    pub sharpness: i32,

    /// High-ISO noise reduction. Range [-4, 4].
    pub noise_reduction: i32,

    /// Grain effect strength.
    #[serde(default)]
    pub grain: GrainEffect,

    /// Dynamic range setting.
    #[serde(default)]
    pub dynamic_range: DynamicRange,

    /// ISO guidance as written in recipes (e.g. "Auto up to 6400").
    #[serde(default)]
    pub iso: String,

    /// Exposure compensation guidance (e.g. "+1/3 to +2/3").
    #[serde(default)]
    pub exposure_compensation: String,
}

impl Default for RecipeSettings {
    fn default() -> Self {
        Self {
            film_simulation: FilmSimulation::Provia,
            wb_shift_red: 0,
            wb_shift_blue: 0,
            highlight: 0,
            shadow: 0,
            color: 0,
            clarity: 0,
            sharpness: 0,
            noise_reduction: 0,
            grain: GrainEffect::Off,
            dynamic_range: DynamicRange::Auto,
            iso: String::new(),
            exposure_compensation: String::new(),
        }
    }
}

fn clamp_to(value: i32, range: (i32, i32)) -> i32 {
    value.clamp(range.0, range.1)
}

impl RecipeSettings {
    /// Clamp every numeric field into its valid range.
    ///
    /// Model output occasionally drifts out of bounds; recipes are
    /// normalized here once so downstream transforms can assume valid
    /// input.
    pub fn normalized(mut self) -> Self {
        self.wb_shift_red = clamp_to(self.wb_shift_red, WB_SHIFT_RANGE);
        self.wb_shift_blue = clamp_to(self.wb_shift_blue, WB_SHIFT_RANGE);
        self.highlight = clamp_to(self.highlight, TONE_RANGE);
        self.shadow = clamp_to(self.shadow, TONE_RANGE);
        self.color = clamp_to(self.color, EFFECT_RANGE);
        self.clarity = clamp_to(self.clarity, EFFECT_RANGE);
        self.sharpness = clamp_to(self.sharpness, EFFECT_RANGE);
        self.noise_reduction = clamp_to(self.noise_reduction, EFFECT_RANGE);
        self
    }
}

/// One curated recipe: title, base simulation, rationale, settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub title: String,

    pub base_film_simulation: FilmSimulation,

    /// Why these settings fit the request.
    pub reason: String,

    pub settings: RecipeSettings,

    /// Source URL, present when the recipe is grounded in a retrieved
    /// document.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,

    /// Unmodified preview, as a data URL. Attached after rendering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_image: Option<String>,

    /// Preview with the settings applied, as a data URL.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub retouched_image: Option<String>,
}

/// Exactly two recipes: one grounded in retrieval, one model-authored.
///
/// The pair is all-or-nothing — generation either produces both or the
/// stage fails.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CuratedRecipePair {
    pub retrieved: Recipe,
    pub generated: Recipe,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_clamps_extremes() {
        let settings = RecipeSettings {
            wb_shift_red: 14,
            wb_shift_blue: -20,
            highlight: 9,
            shadow: -5,
            color: 6,
            clarity: -9,
            sharpness: 5,
            noise_reduction: -6,
            ..Default::default()
        }
        .normalized();

        assert_eq!(settings.wb_shift_red, 9);
        assert_eq!(settings.wb_shift_blue, -9);
        assert_eq!(settings.highlight, 4);
        assert_eq!(settings.shadow, -2);
        assert_eq!(settings.color, 4);
        assert_eq!(settings.clarity, -4);
        assert_eq!(settings.sharpness, 4);
        assert_eq!(settings.noise_reduction, -4);
    }

    #[test]
    fn test_normalized_keeps_in_range_values() {
        let settings = RecipeSettings {
            wb_shift_red: 3,
            highlight: -1,
            shadow: 2,
            ..Default::default()
        };
        let normalized = settings.clone().normalized();
        assert_eq!(settings, normalized);
    }

    #[test]
    fn test_recipe_serializes_camel_case() {
        let recipe = Recipe {
            title: "Test".to_string(),
            base_film_simulation: FilmSimulation::ClassicChrome,
            reason: "because".to_string(),
            settings: RecipeSettings::default(),
            url: None,
            source_image: None,
            retouched_image: None,
        };

        let json = serde_json::to_value(&recipe).unwrap();
        assert_eq!(json["baseFilmSimulation"], "Classic Chrome");
        assert!(json.get("sourceImage").is_none());
    }
}
