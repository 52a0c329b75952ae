//! Centralized defaults for the interrupt classifier
//!
//! Single source of truth for lexicons and thresholds. Settings files and
//! environment variables override these.

/// Default lexicons (English + romanized Hindi)
pub mod lexicon {
    /// Fillers and backchannels that never interrupt on their own
    pub const IGNORED_WORDS: &[&str] = &[
        "uh", "um", "umm", "hmm", "haan", "acha", "em", "arre", "chalo", "theek", "theek hai",
    ];

    /// Commands that interrupt immediately, even amid fillers
    pub const STOP_WORDS: &[&str] = &["stop", "wait", "hold on", "pause", "no not that one"];
}

/// Confidence thresholds
pub mod thresholds {
    /// Silent agent: below half of this the trace is tagged low-confidence
    pub const CONFIDENCE: f32 = 0.5;

    /// Speaking agent: at or below this the transcript is background murmur
    pub const LOW_CONFIDENCE: f32 = 0.35;
}

/// Environment
pub mod env {
    /// Prefix for environment overrides, e.g. `VOICE_INTERRUPT__INTERRUPT__LOW_CONFIDENCE_THRESHOLD`
    pub const PREFIX: &str = "VOICE_INTERRUPT";

    /// Selects `config/{env}` on top of `config/default`
    pub const ENV_SELECTOR: &str = "VOICE_INTERRUPT_ENV";
}
