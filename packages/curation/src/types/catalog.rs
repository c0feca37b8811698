//! Sensor catalog types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One sensor generation and the camera bodies built around it.
///
/// Within a series, generations are totally ordered by
/// `generation_level`; a camera model belongs to exactly one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensorCatalogEntry {
    /// Canonical sensor name (e.g. "X-Trans V").
    pub sensor_name: String,

    /// Camera models carrying this sensor.
    pub compatible_camera_models: BTreeSet<String>,

    /// Sensor lineage the generation belongs to (e.g. "x-trans").
    pub series_id: String,

    /// Position within the series, ascending with release order.
    pub generation_level: u32,
}

impl SensorCatalogEntry {
    pub fn new(
        sensor_name: impl Into<String>,
        series_id: impl Into<String>,
        generation_level: u32,
        models: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            sensor_name: sensor_name.into(),
            compatible_camera_models: models.into_iter().map(|m| m.into()).collect(),
            series_id: series_id.into(),
            generation_level,
        }
    }

    /// Case-insensitive membership test for a camera model.
    pub fn contains_model(&self, camera_model: &str) -> bool {
        let needle = camera_model.trim().to_ascii_lowercase();
        self.compatible_camera_models
            .iter()
            .any(|m| m.to_ascii_lowercase() == needle)
    }
}
