//! Barge-in gate
//!
//! Sits between the recognizer and the dialogue layer. Playback frames toggle
//! the shared speaking flag; transcript frames are replaced by decision frames.

use async_trait::async_trait;
use std::sync::Arc;
use voice_interrupt_config::InterruptConfig;
use voice_interrupt_core::{ControlFrame, Frame, FrameProcessor, ProcessorContext, Result, TranscriptEvent};

use crate::InterruptClassifier;

/// Frame processor wrapping an [`InterruptClassifier`]
///
/// Unlike a direct `classify_event` call, which records recognizer metadata
/// untouched, the gate adds `session_id` and the context's metadata to each
/// transcript before classifying it. Added keys never replace keys the
/// recognizer already set, so trace records carry both.
pub struct InterruptGate {
    classifier: Arc<InterruptClassifier>,
}

impl InterruptGate {
    pub fn new(classifier: Arc<InterruptClassifier>) -> Self {
        Self { classifier }
    }

    pub fn from_config(config: &InterruptConfig) -> Self {
        Self::new(Arc::new(InterruptClassifier::new(config)))
    }

    /// Classifier handle, for trace inspection and lexicon updates
    pub fn classifier(&self) -> Arc<InterruptClassifier> {
        Arc::clone(&self.classifier)
    }

    /// Fill `session_id` and context keys the recognizer left unset
    fn enrich(mut event: TranscriptEvent, context: &ProcessorContext) -> TranscriptEvent {
        if !context.session_id.is_empty() {
            event
                .metadata
                .entry("session_id".to_string())
                .or_insert_with(|| context.session_id.clone().into());
        }
        for (key, value) in &context.metadata {
            event
                .metadata
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
        event
    }
}

impl Default for InterruptGate {
    fn default() -> Self {
        Self::new(Arc::new(InterruptClassifier::default()))
    }
}

#[async_trait]
impl FrameProcessor for InterruptGate {
    async fn process(&self, frame: Frame, context: &mut ProcessorContext) -> Result<Vec<Frame>> {
        match frame {
            Frame::Transcript(event) => {
                let event = Self::enrich(event, context);
                let decision = self.classifier.classify_event(&event);
                Ok(vec![Frame::Decision { event, decision }])
            }

            Frame::AgentSpeaking => {
                self.classifier.set_speaking(true);
                Ok(vec![frame])
            }

            Frame::AgentSilent => {
                self.classifier.set_speaking(false);
                Ok(vec![frame])
            }

            Frame::Control(ControlFrame::ReplaceIgnoredWords(words)) => {
                self.classifier.replace_ignored_words(&words);
                Ok(vec![])
            }

            Frame::Control(ControlFrame::ReplaceStopWords(words)) => {
                self.classifier.replace_stop_words(&words);
                Ok(vec![])
            }

            Frame::Control(ControlFrame::Reset) => {
                self.classifier.set_speaking(false);
                Ok(vec![frame])
            }

            // Pass through all other frames
            _ => Ok(vec![frame]),
        }
    }

    fn name(&self) -> &'static str {
        "interrupt_gate"
    }

    fn description(&self) -> &str {
        "Classifies transcripts as ignored, interrupt or forwarded"
    }

    async fn on_stop(&self, context: &mut ProcessorContext) -> Result<()> {
        tracing::debug!(
            session_id = %context.session_id,
            decisions = self.classifier.trace_len(),
            "Interrupt gate stopped"
        );
        Ok(())
    }
}
