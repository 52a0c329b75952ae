//! Interrupt classifier configuration

use serde::{Deserialize, Serialize};

use crate::constants::{lexicon, thresholds};

/// Lexicons and thresholds consumed by the classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterruptConfig {
    /// Filler words ignored while the agent speaks
    #[serde(default = "default_ignored_words")]
    pub ignored_words: Vec<String>,

    /// Command phrases that interrupt the agent, may be multi-word
    #[serde(default = "default_stop_words")]
    pub stop_words: Vec<String>,

    /// Governs the low-confidence tag for forwarded transcripts
    #[serde(default = "default_confidence_threshold")]
    pub confidence_threshold: f32,

    /// Murmur gate while the agent speaks
    #[serde(default = "default_low_confidence_threshold")]
    pub low_confidence_threshold: f32,
}

fn default_ignored_words() -> Vec<String> {
    lexicon::IGNORED_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_stop_words() -> Vec<String> {
    lexicon::STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_confidence_threshold() -> f32 {
    thresholds::CONFIDENCE
}

fn default_low_confidence_threshold() -> f32 {
    thresholds::LOW_CONFIDENCE
}

impl Default for InterruptConfig {
    fn default() -> Self {
        Self {
            ignored_words: default_ignored_words(),
            stop_words: default_stop_words(),
            confidence_threshold: default_confidence_threshold(),
            low_confidence_threshold: default_low_confidence_threshold(),
        }
    }
}

impl InterruptConfig {
    pub fn with_ignored_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ignored_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_thresholds(mut self, confidence: f32, low_confidence: f32) -> Self {
        self.confidence_threshold = confidence;
        self.low_confidence_threshold = low_confidence;
        self
    }

    /// Thresholds outside [0, 1] are accepted; report them so operators notice.
    pub fn warn_out_of_range(&self) {
        for (field, value) in [
            ("interrupt.confidence_threshold", self.confidence_threshold),
            ("interrupt.low_confidence_threshold", self.low_confidence_threshold),
        ] {
            if !(0.0..=1.0).contains(&value) {
                tracing::warn!(field, value, "Threshold outside [0, 1], comparisons still apply");
            }
        }
    }
}
