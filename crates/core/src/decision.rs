//! Classification outcomes and the reason codes that explain them

use serde::{Deserialize, Serialize};
use std::fmt;

/// What the agent should do with a transcript event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// Filler, acknowledgment or background noise while the agent speaks
    Ignored,
    /// Stop the agent, the user said something meaningful
    Interrupt,
    /// Agent is silent, pass the utterance through as normal input
    Forwarded,
}

impl Decision {
    pub fn as_str(&self) -> &'static str {
        match self {
            Decision::Ignored => "ignored",
            Decision::Interrupt => "interrupt",
            Decision::Forwarded => "forwarded",
        }
    }

    /// Whether playback must stop
    pub fn is_interrupt(&self) -> bool {
        matches!(self, Decision::Interrupt)
    }
}

impl fmt::Display for Decision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Tag recorded with every decision, naming the rule that produced it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReasonCode {
    /// Confidence at or below the murmur gate while speaking
    IgnoredLowConf,
    /// A stop/command phrase appeared in the text
    InterruptStopWord,
    /// Whole utterance was a soft acknowledgment
    IgnoredAck,
    /// Only short fragments at moderate confidence
    IgnoredPartialTokens,
    /// Nothing left after removing fillers and discourse markers
    IgnoredFillerOrDiscourse,
    /// Meaningful speech while the agent talks
    InterruptMeaningful,
    /// Agent silent, confidence below half the forwarding threshold
    ForwardedLowConf,
    /// Agent silent
    Forwarded,
}

impl ReasonCode {
    /// Decision implied by this reason
    pub fn decision(&self) -> Decision {
        match self {
            ReasonCode::IgnoredLowConf
            | ReasonCode::IgnoredAck
            | ReasonCode::IgnoredPartialTokens
            | ReasonCode::IgnoredFillerOrDiscourse => Decision::Ignored,
            ReasonCode::InterruptStopWord | ReasonCode::InterruptMeaningful => {
                Decision::Interrupt
            }
            ReasonCode::ForwardedLowConf | ReasonCode::Forwarded => Decision::Forwarded,
        }
    }

    /// Trace tag, e.g. `IGNORED_LOW_CONF`
    pub fn as_str(&self) -> &'static str {
        match self {
            ReasonCode::IgnoredLowConf => "IGNORED_LOW_CONF",
            ReasonCode::InterruptStopWord => "INTERRUPT_STOP_WORD",
            ReasonCode::IgnoredAck => "IGNORED_ACK",
            ReasonCode::IgnoredPartialTokens => "IGNORED_PARTIAL_TOKENS",
            ReasonCode::IgnoredFillerOrDiscourse => "IGNORED_FILLER_OR_DISCOURSE",
            ReasonCode::InterruptMeaningful => "INTERRUPT_MEANINGFUL",
            ReasonCode::ForwardedLowConf => "FORWARDED_LOW_CONF",
            ReasonCode::Forwarded => "FORWARDED",
        }
    }
}

impl fmt::Display for ReasonCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}
