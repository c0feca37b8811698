//! Sensor compatibility resolution.
//!
//! A camera can use recipes written for its own sensor generation and
//! for earlier generations in the same series, never newer ones.

use tracing::debug;

use crate::types::SensorCatalogEntry;

/// Resolve the sensor names whose recipes a camera model can use.
///
/// Matching is a case-insensitive exact comparison against the catalog.
/// An unknown model returns an empty vec — a non-fatal detection
/// failure; downstream search simply omits the sensor filter.
pub fn resolve_sensors(camera_model: &str, catalog: &[SensorCatalogEntry]) -> Vec<String> {
    let Some(own) = catalog.iter().find(|e| e.contains_model(camera_model)) else {
        debug!(camera_model, "camera model not in sensor catalog");
        return vec![];
    };

    let mut sensors: Vec<&SensorCatalogEntry> = catalog
        .iter()
        .filter(|e| e.series_id == own.series_id && e.generation_level <= own.generation_level)
        .collect();
    sensors.sort_by_key(|e| std::cmp::Reverse(e.generation_level));

    sensors.into_iter().map(|e| e.sensor_name.clone()).collect()
}
