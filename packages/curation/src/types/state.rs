//! Request lifecycle types: stages, timing, and the completed payload.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// The inbound request handled by one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurationRequest {
    pub question: String,
    pub camera_model: String,
}

impl CurationRequest {
    pub fn new(question: impl Into<String>, camera_model: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            camera_model: camera_model.into(),
        }
    }
}

/// Lifecycle stage of a pipeline run.
///
/// `Completed` and `Error` are terminal; `Completed` is also reachable
/// directly from `Analyzing` when the question is out of domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Analyzing,
    Searching,
    Generating,
    Processing,
    Completed,
    Error,
}

impl Stage {
    /// Wire name used in the event stream.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Analyzing => "analyzing",
            Self::Searching => "searching",
            Self::Generating => "generating",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Wall-clock duration per stage, in insertion order, milliseconds.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageTimings(IndexMap<String, u64>);

impl StageTimings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a stage's duration.
    pub fn record(&mut self, stage: Stage, millis: u64) {
        self.0.insert(stage.as_str().to_string(), millis);
    }

    /// Record the total: the sum of stage durations plus finalization.
    pub fn record_total(&mut self, finalize_millis: u64) {
        let total: u64 = self.0.values().sum();
        self.0.insert("total".to_string(), total + finalize_millis);
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        self.0.get(name).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Metadata attached to the terminal `completed` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedMeta {
    pub timing: StageTimings,

    pub has_error: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_wire_names() {
        assert_eq!(Stage::Analyzing.as_str(), "analyzing");
        assert_eq!(Stage::Error.as_str(), "error");
        assert_eq!(
            serde_json::to_string(&Stage::Searching).unwrap(),
            "\"searching\""
        );
    }

    #[test]
    fn test_timings_total_sums_stages() {
        let mut timings = StageTimings::new();
        timings.record(Stage::Analyzing, 120);
        timings.record(Stage::Searching, 80);
        timings.record_total(5);

        assert_eq!(timings.get("total"), Some(205));
    }

    #[test]
    fn test_timings_preserve_stage_order() {
        let mut timings = StageTimings::new();
        timings.record(Stage::Analyzing, 1);
        timings.record(Stage::Searching, 2);
        timings.record(Stage::Generating, 3);

        let json = serde_json::to_string(&timings).unwrap();
        let analyzing = json.find("analyzing").unwrap();
        let searching = json.find("searching").unwrap();
        let generating = json.find("generating").unwrap();
        assert!(analyzing < searching && searching < generating);
    }
}
