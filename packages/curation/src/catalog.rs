//! Built-in sensor catalog.
//!
//! Static data covering the supported camera bodies, grouped by sensor
//! generation. The resolver in [`crate::sensors`] walks this catalog;
//! deployments with a different body list can pass their own slice.

use std::sync::OnceLock;

use crate::types::SensorCatalogEntry;

/// The built-in catalog, constructed once per process.
pub fn sensor_catalog() -> &'static [SensorCatalogEntry] {
    static CATALOG: OnceLock<Vec<SensorCatalogEntry>> = OnceLock::new();
    CATALOG.get_or_init(build_catalog)
}

fn build_catalog() -> Vec<SensorCatalogEntry> {
    vec![
        SensorCatalogEntry::new(
            "X-Trans I",
            "x-trans",
            1,
            ["X-Pro1", "X-E1", "X-M1"],
        ),
        SensorCatalogEntry::new(
            "X-Trans II",
            "x-trans",
            2,
            ["X-T1", "X-E2", "X-E2S", "X100T", "X70"],
        ),
        SensorCatalogEntry::new(
            "X-Trans III",
            "x-trans",
            3,
            ["X-Pro2", "X-T2", "X-T20", "X-E3", "X100F", "X-H1"],
        ),
        SensorCatalogEntry::new(
            "X-Trans IV",
            "x-trans",
            4,
            [
                "X-T3", "X-T4", "X-T30", "X-T30 II", "X-Pro3", "X100V", "X-S10", "X-E4",
            ],
        ),
        SensorCatalogEntry::new(
            "X-Trans V",
            "x-trans",
            5,
            ["X-T5", "X-H2", "X-H2S", "X-S20", "X100VI"],
        ),
        SensorCatalogEntry::new(
            "GFX 50",
            "gfx",
            1,
            ["GFX 50S", "GFX 50R", "GFX 50S II"],
        ),
        SensorCatalogEntry::new(
            "GFX 100",
            "gfx",
            2,
            ["GFX 100", "GFX 100S", "GFX 100 II"],
        ),
    ]
}
