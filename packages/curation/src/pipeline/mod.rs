//! Pipeline orchestration: the request state machine and its event
//! stream.

pub mod events;
pub mod orchestrator;

pub use events::{EventData, StageEvent};
pub use orchestrator::{CurationPipeline, PipelineConfig};
