//! Interrupt classifier
//!
//! Decides, for each recognizer transcript, whether the agent should ignore
//! it, stop talking, or hand it to the dialogue layer. Decisions depend on the
//! shared speaking flag, the current lexicons and the configured thresholds.

use metrics::counter;
use std::sync::Arc;
use voice_interrupt_config::InterruptConfig;
use voice_interrupt_core::{Decision, TraceRecord, TranscriptEvent};

use crate::lexicon::{LexiconSet, LexiconSnapshot};
use crate::normalizer::normalize;
use crate::rules::{RuleCascade, RuleContext, Verdict};
use crate::state::AgentSpeakingState;
use crate::tokenizer::significant_tokens;
use crate::trace::TraceLog;

/// Transcript interrupt classifier
///
/// `Send + Sync`; `classify` takes `&self` and may be called from many
/// threads. Every call appends exactly one trace record.
#[derive(Debug)]
pub struct InterruptClassifier {
    state: Arc<AgentSpeakingState>,
    ignored_words: LexiconSet,
    stop_words: LexiconSet,
    confidence_threshold: f32,
    low_confidence_threshold: f32,
    cascade: RuleCascade,
    trace: TraceLog,
}

impl InterruptClassifier {
    /// Create a classifier with its own speaking flag, initially silent
    pub fn new(config: &InterruptConfig) -> Self {
        Self::with_state(config, Arc::new(AgentSpeakingState::default()))
    }

    /// Create a classifier sharing a speaking flag with the playback side
    pub fn with_state(config: &InterruptConfig, state: Arc<AgentSpeakingState>) -> Self {
        config.warn_out_of_range();

        Self {
            state,
            ignored_words: LexiconSet::new("ignored_words", &config.ignored_words),
            stop_words: LexiconSet::new("stop_words", &config.stop_words),
            confidence_threshold: config.confidence_threshold,
            low_confidence_threshold: config.low_confidence_threshold,
            cascade: RuleCascade::default(),
            trace: TraceLog::new(),
        }
    }

    /// Classify a final transcript with no metadata
    pub fn classify(&self, text: &str, confidence: f32) -> Decision {
        self.classify_event(&TranscriptEvent::new(text, confidence))
    }

    /// Classify a transcript event and record the decision
    pub fn classify_event(&self, event: &TranscriptEvent) -> Decision {
        let speaking = self.state.is_speaking();
        let text = normalize(&event.text);
        let ignored_words = self.ignored_words.snapshot();
        let stop_words = self.stop_words.snapshot();

        let mut ctx = RuleContext {
            text: &text,
            tokens: significant_tokens(&text),
            confidence: event.confidence,
            speaking,
            ignored_words: &ignored_words,
            stop_words: &stop_words,
            confidence_threshold: self.confidence_threshold,
            low_confidence_threshold: self.low_confidence_threshold,
        };

        let (Verdict { reason, extra }, rule) = self.cascade.evaluate(&mut ctx);
        let decision = reason.decision();

        tracing::debug!(
            tag = reason.as_str(),
            rule,
            decision = %decision,
            text = %text,
            confidence = event.confidence,
            is_final = event.is_final,
            speaking,
            extra = ?extra,
            "Transcript classified"
        );
        counter!("interrupt_decisions_total", "reason" => reason.as_str()).increment(1);

        self.trace.append(TraceRecord::new(
            reason,
            text,
            event.confidence,
            event.is_final,
            event.metadata.clone(),
            extra,
        ));

        decision
    }

    pub fn set_speaking(&self, speaking: bool) {
        self.state.set_speaking(speaking);
    }

    pub fn is_speaking(&self) -> bool {
        self.state.is_speaking()
    }

    /// Shared speaking flag, for the playback side
    pub fn speaking_state(&self) -> Arc<AgentSpeakingState> {
        Arc::clone(&self.state)
    }

    /// Swap the ignored filler set; applies to later decisions only
    pub fn replace_ignored_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.ignored_words.replace(words);
    }

    /// Swap the stop phrase set; applies to later decisions only
    pub fn replace_stop_words<I, S>(&self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.stop_words.replace(words);
    }

    pub fn ignored_words(&self) -> LexiconSnapshot {
        self.ignored_words.snapshot()
    }

    pub fn stop_words(&self) -> LexiconSnapshot {
        self.stop_words.snapshot()
    }

    /// Copy of every trace record so far, oldest first
    pub fn trace(&self) -> Vec<TraceRecord> {
        self.trace.snapshot()
    }

    pub fn trace_len(&self) -> usize {
        self.trace.len()
    }
}

impl Default for InterruptClassifier {
    fn default() -> Self {
        Self::new(&InterruptConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use voice_interrupt_core::ReasonCode;

    fn speaking() -> InterruptClassifier {
        let classifier = InterruptClassifier::default();
        classifier.set_speaking(true);
        classifier
    }

    fn last_tag(classifier: &InterruptClassifier) -> ReasonCode {
        classifier.trace().last().map(|r| r.tag).unwrap()
    }

    #[test]
    fn test_starts_silent() {
        let classifier = InterruptClassifier::default();
        assert!(!classifier.is_speaking());
        assert_eq!(classifier.trace_len(), 0);
    }

    #[test]
    fn test_core_properties() {
        let classifier = speaking();
        assert_eq!(classifier.classify("umm", 0.88), Decision::Ignored);
        assert_eq!(classifier.classify("umm okay stop", 0.95), Decision::Interrupt);
        assert_eq!(classifier.classify("okay", 0.9), Decision::Ignored);
        assert_eq!(classifier.classify("okay stop", 0.9), Decision::Interrupt);
        assert_eq!(classifier.classify("okayyy", 0.9), Decision::Ignored);
        assert_eq!(last_tag(&classifier), ReasonCode::IgnoredAck);

        classifier.set_speaking(false);
        assert_eq!(classifier.classify("stop", 0.8), Decision::Forwarded);
    }

    #[test]
    fn test_murmur_gate_beats_stop_words() {
        let classifier = speaking();
        assert_eq!(classifier.classify("stop", 0.3), Decision::Ignored);
        assert_eq!(last_tag(&classifier), ReasonCode::IgnoredLowConf);

        assert_eq!(classifier.classify("stop", 0.36), Decision::Interrupt);
        assert_eq!(last_tag(&classifier), ReasonCode::InterruptStopWord);
    }

    #[test]
    fn test_silent_always_forwards() {
        let classifier = InterruptClassifier::default();
        for (text, confidence) in [("stop", 0.9), ("uh", 0.1), ("", 0.0), ("tell me more", 1.5), ("hmm", -1.0)] {
            assert_eq!(classifier.classify(text, confidence), Decision::Forwarded);
        }
    }

    #[test]
    fn test_forward_low_conf_tag() {
        let classifier = InterruptClassifier::default();
        classifier.classify("uh", 0.1);
        assert_eq!(last_tag(&classifier), ReasonCode::ForwardedLowConf);
        classifier.classify("hmm", 0.3);
        assert_eq!(last_tag(&classifier), ReasonCode::Forwarded);
    }

    #[test]
    fn test_trace_record_contents() {
        let classifier = speaking();
        let event = TranscriptEvent::partial("Umm OKAY hold on", 0.9).with_meta("stream", "mic-1");
        assert_eq!(classifier.classify_event(&event), Decision::Interrupt);

        let trace = classifier.trace();
        assert_eq!(trace.len(), 1);
        let record = &trace[0];
        assert_eq!(record.tag, ReasonCode::InterruptStopWord);
        assert_eq!(record.decision, Decision::Interrupt);
        assert_eq!(record.text, "umm ok hold on");
        assert!(!record.is_final);
        assert_eq!(record.metadata["stream"], serde_json::json!("mic-1"));
        assert_eq!(record.extra["matched"], serde_json::json!("hold on"));
    }

    #[test]
    fn test_meaningful_tokens_in_trace() {
        let classifier = speaking();
        assert_eq!(classifier.classify("umm no no go back", 0.9), Decision::Interrupt);
        let record = classifier.trace().pop().unwrap();
        assert_eq!(record.tag, ReasonCode::InterruptMeaningful);
        assert_eq!(record.extra["tokens"], serde_json::json!(["no", "no", "go", "back"]));
    }

    #[test]
    fn test_is_final_does_not_branch() {
        let classifier = speaking();
        let final_decision = classifier.classify_event(&TranscriptEvent::new("uh okay", 0.9));
        let partial_decision = classifier.classify_event(&TranscriptEvent::partial("uh okay", 0.9));
        assert_eq!(final_decision, partial_decision);
    }

    #[test]
    fn test_replace_ignored_words() {
        let classifier = speaking();
        assert_eq!(classifier.classify("matlab", 0.9), Decision::Interrupt);

        classifier.replace_ignored_words(["uh", "umm", "haan", "acha", "arre", "matlab"]);
        assert!(classifier.ignored_words().contains("matlab"));
        assert!(!classifier.ignored_words().contains("hmm"));

        assert_eq!(classifier.classify("matlab", 0.9), Decision::Ignored);
        assert_eq!(classifier.trace()[0].tag, ReasonCode::InterruptMeaningful);
    }

    #[test]
    fn test_replace_stop_words() {
        let classifier = speaking();
        assert_eq!(classifier.classify("ruko", 0.9), Decision::Interrupt);
        assert_eq!(last_tag(&classifier), ReasonCode::InterruptMeaningful);

        classifier.replace_stop_words([" Ruko ", "bas"]);
        assert_eq!(classifier.classify("ruko", 0.9), Decision::Interrupt);
        assert_eq!(last_tag(&classifier), ReasonCode::InterruptStopWord);

        // Old stop words no longer match
        assert_eq!(classifier.classify("hmm stop", 0.9), Decision::Interrupt);
        assert_eq!(last_tag(&classifier), ReasonCode::InterruptMeaningful);
    }

    #[test]
    fn test_shared_state() {
        let state = Arc::new(AgentSpeakingState::default());
        let classifier = InterruptClassifier::with_state(&InterruptConfig::default(), Arc::clone(&state));

        state.set_speaking(true);
        assert!(classifier.is_speaking());
        assert_eq!(classifier.classify("uh", 0.9), Decision::Ignored);

        classifier.speaking_state().set_speaking(false);
        assert!(!state.is_speaking());
    }

    #[test]
    fn test_custom_thresholds() {
        let config = InterruptConfig::default().with_thresholds(0.8, 0.6);
        let classifier = InterruptClassifier::new(&config);
        classifier.set_speaking(true);
        assert_eq!(classifier.classify("stop", 0.6), Decision::Ignored);

        classifier.set_speaking(false);
        classifier.classify("tell me", 0.39);
        assert_eq!(last_tag(&classifier), ReasonCode::ForwardedLowConf);
    }
}
