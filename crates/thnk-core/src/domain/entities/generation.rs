//! Generation requests and what comes back from a backend.

use serde::Serialize;
use serde_json::Value;

use crate::domain::value_objects::{OutputMode, Schema};

/// Everything a backend needs to produce one target. Built per dispatch and
/// discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub target: String,
    pub mode: OutputMode,
    pub model: String,
    pub temperature: f32,
    /// Preamble, target name and inlined input files.
    pub system: String,
    pub prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<Schema>,
}

/// The outcome of dispatching one rule.
#[derive(Debug, Clone, PartialEq)]
pub enum Generation {
    /// Content known without asking the backend.
    Content(String),
    Request(GenerationRequest),
    /// No-op rule; nothing to write.
    Skip,
}

/// Terminal result of a backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutput {
    Text(String),
    Object(Value),
}

impl GenerationOutput {
    pub fn mode(&self) -> OutputMode {
        match self {
            Self::Text(_) => OutputMode::Text,
            Self::Object(_) => OutputMode::Object,
        }
    }
}

/// Progress emitted while a backend call is in flight.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationEvent {
    Started { model: String, mode: OutputMode },
    TextDelta(String),
    Completed,
}
