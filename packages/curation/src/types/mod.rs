//! Domain types shared across the curation pipeline.

pub mod analysis;
pub mod catalog;
pub mod document;
pub mod recipe;
pub mod state;

pub use analysis::{ColorMode, FilmSimulation, QuestionAnalysis};
pub use catalog::SensorCatalogEntry;
pub use document::{FusedResult, FusionWeights, RetrievedDocument, SearchFilter};
pub use recipe::{
    CuratedRecipePair, DynamicRange, GrainEffect, Recipe, RecipeSettings,
};
pub use state::{CompletedMeta, CurationRequest, Stage, StageTimings};
