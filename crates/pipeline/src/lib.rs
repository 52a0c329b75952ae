//! Transcript interrupt classification pipeline
//!
//! This crate decides what a voice agent should do with each recognizer
//! transcript while it may be talking:
//! - Multilingual filler normalization and tokenization
//! - Runtime-replaceable filler and stop-word lexicons
//! - Ordered rule cascade producing ignore / interrupt / forward decisions
//! - Shared agent speaking flag and per-decision trace log
//! - Frame processors (InterruptGate) and session-keyed processor chains

pub mod classifier;
pub mod lexicon;
pub mod normalizer;
pub mod processors;
pub mod rules;
pub mod state;
pub mod tokenizer;
pub mod trace;

pub use classifier::InterruptClassifier;
pub use lexicon::{LexiconSet, LexiconSnapshot};
pub use normalizer::normalize;
pub use rules::{Rule, RuleCascade, RuleContext, Verdict};
pub use state::AgentSpeakingState;
pub use tokenizer::{significant_tokens, tokenize};
pub use trace::TraceLog;

// Processor exports
pub use processors::{InterruptGate, ProcessorChain, ProcessorChainBuilder, SessionStream};

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone)]
pub enum PipelineError {
    #[error("Channel closed")]
    ChannelClosed,

    #[error("Processor error: {0}")]
    Processor(String),

    #[error("Session already active: {0}")]
    SessionActive(String),
}

impl From<PipelineError> for voice_interrupt_core::Error {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::ChannelClosed => voice_interrupt_core::Error::ChannelClosed,
            PipelineError::Processor(msg) => voice_interrupt_core::Error::Pipeline(msg),
            err @ PipelineError::SessionActive(_) => voice_interrupt_core::Error::Pipeline(err.to_string()),
        }
    }
}
