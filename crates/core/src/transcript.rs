//! Transcript events delivered by the speech recognizer

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opaque key/value bag carried from the recognizer into the trace
pub type Metadata = HashMap<String, serde_json::Value>;

/// One partial or final recognition result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEvent {
    /// Recognized text, empty when the recognizer produced nothing
    #[serde(default)]
    pub text: String,

    /// Recognizer confidence, nominally 0.0 - 1.0 but not validated
    #[serde(default)]
    pub confidence: f32,

    /// Is this a final result?
    #[serde(default = "default_true")]
    pub is_final: bool,

    /// Passed through unmodified to the trace record
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_true() -> bool {
    true
}

impl TranscriptEvent {
    /// Create a final transcript event
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            is_final: true,
            metadata: Metadata::new(),
        }
    }

    /// Create a partial (non-final) transcript event
    pub fn partial(text: impl Into<String>, confidence: f32) -> Self {
        Self::new(text, confidence).with_final(false)
    }

    /// Absent text is treated as empty
    pub fn from_optional(text: Option<&str>, confidence: f32) -> Self {
        Self::new(text.unwrap_or_default(), confidence)
    }

    pub fn with_final(mut self, is_final: bool) -> Self {
        self.is_final = is_final;
        self
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Add a single metadata entry
    pub fn with_meta(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Check if transcript is blank
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

impl Default for TranscriptEvent {
    fn default() -> Self {
        Self::new(String::new(), 0.0)
    }
}
