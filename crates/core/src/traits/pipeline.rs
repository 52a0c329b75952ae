//! Pipeline processing traits

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::{Decision, Result, TranscriptEvent};

/// Frame types that flow through the pipeline
#[derive(Debug, Clone)]
pub enum Frame {
    /// Recognizer output, partial or final
    Transcript(TranscriptEvent),

    /// Playback started
    AgentSpeaking,

    /// Playback stopped
    AgentSilent,

    /// Classification result for a transcript
    Decision {
        event: TranscriptEvent,
        decision: Decision,
    },

    /// End of stream marker
    EndOfStream,

    /// Error occurred in pipeline
    Error {
        stage: String,
        message: String,
        recoverable: bool,
    },

    /// Control frame for pipeline management
    Control(ControlFrame),
}

/// Control frames for pipeline management
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ControlFrame {
    /// Swap the ignored filler lexicon
    ReplaceIgnoredWords(Vec<String>),
    /// Swap the stop/command lexicon
    ReplaceStopWords(Vec<String>),
    /// Reset processor state
    Reset,
}

impl Frame {
    /// Check if this is an end-of-stream frame
    pub fn is_end_of_stream(&self) -> bool {
        matches!(self, Frame::EndOfStream)
    }

    /// Check if this is an error frame
    pub fn is_error(&self) -> bool {
        matches!(self, Frame::Error { .. })
    }

    /// Check if this is a control frame
    pub fn is_control(&self) -> bool {
        matches!(self, Frame::Control(_))
    }

    /// Get the stage name for this frame type
    pub fn stage_name(&self) -> &'static str {
        match self {
            Frame::Transcript(_) => "transcript",
            Frame::AgentSpeaking => "agent_speaking",
            Frame::AgentSilent => "agent_silent",
            Frame::Decision { .. } => "decision",
            Frame::EndOfStream => "end_of_stream",
            Frame::Error { .. } => "error",
            Frame::Control(_) => "control",
        }
    }
}

/// Context passed to frame processors
#[derive(Debug, Clone, Default)]
pub struct ProcessorContext {
    /// Session ID
    pub session_id: String,
    /// Custom metadata, merged into transcript metadata by the gate
    pub metadata: HashMap<String, serde_json::Value>,
}

impl ProcessorContext {
    /// Create a new context for a session
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            ..Default::default()
        }
    }

    /// Add metadata
    pub fn add_metadata(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.metadata.insert(key.into(), value.into());
    }
}

/// Frame processor for pipeline stages
///
/// Each processor receives frames, processes them, and emits output frames.
/// A chain runs every stage for one frame before it takes the next.
#[async_trait]
pub trait FrameProcessor: Send + Sync + 'static {
    /// Process a frame and emit zero or more output frames
    async fn process(&self, frame: Frame, context: &mut ProcessorContext) -> Result<Vec<Frame>>;

    /// Get processor name for tracing
    fn name(&self) -> &'static str;

    /// Get processor description
    fn description(&self) -> &str {
        ""
    }

    /// Called when pipeline starts
    async fn on_start(&self, _context: &mut ProcessorContext) -> Result<()> {
        Ok(())
    }

    /// Called when pipeline stops
    async fn on_stop(&self, _context: &mut ProcessorContext) -> Result<()> {
        Ok(())
    }
}
