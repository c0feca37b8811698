//! Stage event frames emitted over the outbound stream.
//!
//! Wire format per frame:
//!
//! ```text
//! event: <stageName>
//! data: <json-payload>
//!
//! ```
//!
//! Intermediate stages carry `{ "step": <stageName> }` as a progress
//! signal. The terminal `completed` frame carries either a plain
//! string (out-of-domain rejection) or the full result object; the
//! terminal `error` frame carries `{ "error": <message> }`.

use serde::Serialize;

use crate::types::{CompletedMeta, CuratedRecipePair, Stage};

/// Payload of one stage event.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum EventData {
    /// Progress signal for an intermediate stage.
    Progress { step: Stage },

    /// Out-of-domain rejection message (terminal, non-error).
    Rejection(String),

    /// Full pipeline result (terminal).
    Completed {
        recipes: CuratedRecipePair,
        meta: CompletedMeta,
    },

    /// User-facing failure (terminal).
    Error { error: String },
}

/// One frame of the outbound stream.
#[derive(Debug, Clone, Serialize)]
pub struct StageEvent {
    pub stage: Stage,
    pub data: EventData,
}

impl StageEvent {
    /// Progress frame announcing entry into a stage.
    pub fn progress(stage: Stage) -> Self {
        Self {
            stage,
            data: EventData::Progress { step: stage },
        }
    }

    /// Terminal completion carrying a rejection message.
    pub fn rejection(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Completed,
            data: EventData::Rejection(message.into()),
        }
    }

    /// Terminal completion carrying the curated result.
    pub fn completed(recipes: CuratedRecipePair, meta: CompletedMeta) -> Self {
        Self {
            stage: Stage::Completed,
            data: EventData::Completed { recipes, meta },
        }
    }

    /// Terminal failure with a user-facing message.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            stage: Stage::Error,
            data: EventData::Error {
                error: message.into(),
            },
        }
    }

    /// Whether this frame ends the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self.data,
            EventData::Rejection(_) | EventData::Completed { .. } | EventData::Error { .. }
        )
    }

    /// Serialize to the wire frame, blank line included.
    pub fn to_frame(&self) -> String {
        let payload = serde_json::to_string(&self.data)
            .unwrap_or_else(|_| "{\"error\":\"serialization failure\"}".to_string());
        format!("event: {}\ndata: {}\n\n", self.stage, payload)
    }
}
