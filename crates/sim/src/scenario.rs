//! Scenario files and replay through a processor chain

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use voice_interrupt_core::{
    ControlFrame, Decision, Frame, Metadata, ProcessorContext, ReasonCode, TranscriptEvent,
};
use voice_interrupt_pipeline::{InterruptClassifier, ProcessorChain};

/// One transcript to replay, with the playback state it arrives under
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub text: String,
    pub confidence: f32,
    #[serde(default)]
    pub speaking: bool,
    #[serde(default = "default_true")]
    pub is_final: bool,
    /// Ignored-word lexicon to install before this transcript
    #[serde(default)]
    pub ignored_words: Option<Vec<String>>,
    #[serde(default)]
    pub expect: Option<Decision>,
    /// Recognizer metadata carried on the transcript
    #[serde(default)]
    pub metadata: Metadata,
}

fn default_true() -> bool {
    true
}

impl Scenario {
    pub fn new(text: &str, confidence: f32, speaking: bool, expect: Decision) -> Self {
        Self {
            text: text.to_string(),
            confidence,
            speaking,
            is_final: true,
            ignored_words: None,
            expect: Some(expect),
            metadata: Metadata::new(),
        }
    }

    fn with_ignored_words(mut self, words: &[&str]) -> Self {
        self.ignored_words = Some(words.iter().map(|w| w.to_string()).collect());
        self
    }
}

/// Result of replaying one scenario
#[derive(Debug, Clone)]
pub struct Outcome {
    pub scenario: Scenario,
    pub decision: Decision,
    pub reason: ReasonCode,
}

impl Outcome {
    /// `None` when the scenario carries no expectation
    pub fn passed(&self) -> Option<bool> {
        self.scenario.expect.map(|expected| expected == self.decision)
    }
}

/// Read a YAML list of scenarios
pub fn load_scenarios(path: impl AsRef<Path>) -> anyhow::Result<Vec<Scenario>> {
    let path = path.as_ref();
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("reading scenarios from {}", path.display()))?;
    let scenarios: Vec<Scenario> = serde_yaml::from_str(&contents)
        .with_context(|| format!("parsing scenarios in {}", path.display()))?;
    Ok(scenarios)
}

/// Demo set covering Hinglish fillers, commands and a lexicon update
pub fn builtin_scenarios() -> Vec<Scenario> {
    use Decision::*;

    vec![
        Scenario::new("umm", 0.88, true, Ignored),
        Scenario::new("acha hmm okay", 0.9, true, Ignored),
        Scenario::new("arre arre hmm", 0.88, true, Ignored),
        Scenario::new("okay", 0.9, true, Ignored),
        Scenario::new("wa", 0.4, true, Ignored),
        Scenario::new("stop", 0.3, true, Ignored),
        Scenario::new("umm okay stop", 0.95, true, Interrupt),
        Scenario::new("haanji wait", 0.9, true, Interrupt),
        Scenario::new("no no go back", 0.9, true, Interrupt),
        Scenario::new("music playing", 0.4, true, Interrupt),
        Scenario::new("stop", 0.8, false, Forwarded),
        Scenario::new("uh", 0.1, false, Forwarded),
        Scenario::new("matlab", 0.9, true, Ignored)
            .with_ignored_words(&["uh", "umm", "haan", "acha", "arre", "matlab"]),
        Scenario::new("matlab hmm okay", 0.92, true, Interrupt),
    ]
}

/// Stream `scenarios` through `chain` and pair each with its decision
///
/// `classifier` must be the one behind the chain's gate; reasons are read
/// from the trace records tagged with `session_id`.
pub async fn replay(
    chain: &ProcessorChain,
    classifier: &InterruptClassifier,
    scenarios: Vec<Scenario>,
    session_id: &str,
) -> anyhow::Result<Vec<Outcome>> {
    let (tx, mut rx) = chain
        .open_session(ProcessorContext::new(session_id))
        .with_context(|| format!("opening replay session {session_id}"))?
        .split();

    let frames = scenarios_to_frames(&scenarios);
    let producer = tokio::spawn(async move {
        for frame in frames {
            if tx.send(frame).await.is_err() {
                break;
            }
        }
    });

    let mut decisions = Vec::with_capacity(scenarios.len());
    while let Some(frame) = rx.recv().await {
        match frame {
            Frame::Decision { decision, .. } => decisions.push(decision),
            Frame::Error { stage, message, .. } => {
                tracing::warn!(stage = %stage, message = %message, "Error frame during replay");
            }
            _ => {}
        }
    }
    producer.await.context("scenario producer task failed")?;

    let records: Vec<_> = classifier
        .trace()
        .into_iter()
        .filter(|r| r.metadata.get("session_id").and_then(|v| v.as_str()) == Some(session_id))
        .collect();
    anyhow::ensure!(
        decisions.len() == scenarios.len() && records.len() == scenarios.len(),
        "expected {} decisions, got {} frames and {} trace records",
        scenarios.len(),
        decisions.len(),
        records.len()
    );

    Ok(scenarios
        .into_iter()
        .zip(decisions)
        .zip(records)
        .map(|((scenario, decision), record)| Outcome {
            scenario,
            decision,
            reason: record.tag,
        })
        .collect())
}

/// Playback frames only when the speaking state changes
fn scenarios_to_frames(scenarios: &[Scenario]) -> Vec<Frame> {
    let mut frames = Vec::new();
    let mut speaking = None;

    for scenario in scenarios {
        if speaking != Some(scenario.speaking) {
            frames.push(if scenario.speaking {
                Frame::AgentSpeaking
            } else {
                Frame::AgentSilent
            });
            speaking = Some(scenario.speaking);
        }

        if let Some(words) = &scenario.ignored_words {
            frames.push(Frame::Control(ControlFrame::ReplaceIgnoredWords(words.clone())));
        }

        let event = TranscriptEvent::new(scenario.text.clone(), scenario.confidence)
            .with_final(scenario.is_final)
            .with_metadata(scenario.metadata.clone());
        frames.push(Frame::Transcript(event));
    }

    frames.push(Frame::EndOfStream);
    frames
}
