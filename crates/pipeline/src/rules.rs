//! Ordered rule cascade behind the interrupt classifier
//!
//! Rules run in declaration order and the first verdict wins. A rule may also
//! rewrite the context for the rules after it (the discourse strip does this).
//! When nothing matches, the cascade forwards the transcript, so evaluation
//! always yields a verdict.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use voice_interrupt_core::ReasonCode;

use crate::lexicon::{find_stop_word, is_filler};

/// Connectives stripped before looking for meaning
pub const DISCOURSE_MARKERS: &[&str] = &["so", "anyway", "yeah", "well", "right", "like", "sure", "ok"];

/// Short fragments below this confidence are treated as partial ASR output
pub const PARTIAL_TOKEN_CONFIDENCE: f32 = 0.7;

/// Longest token still considered a fragment
pub const PARTIAL_TOKEN_MAX_CHARS: usize = 3;

/// Forwarded transcripts below this fraction of the confidence threshold are tagged low-confidence
pub const FORWARD_LOW_CONF_RATIO: f32 = 0.5;

static SOFT_ACK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:ok(?:ay)?|haan|hmm|yeah)[.! ]*$").unwrap());

/// Everything a rule may look at for one transcript
#[derive(Debug)]
pub struct RuleContext<'a> {
    /// Normalized text
    pub text: &'a str,
    /// Significant tokens; narrowed as rules strip markers and fillers
    pub tokens: Vec<String>,
    pub confidence: f32,
    pub speaking: bool,
    pub ignored_words: &'a BTreeSet<String>,
    pub stop_words: &'a BTreeSet<String>,
    pub confidence_threshold: f32,
    pub low_confidence_threshold: f32,
}

/// Outcome of a matching rule
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub reason: ReasonCode,
    pub extra: HashMap<String, serde_json::Value>,
}

impl Verdict {
    pub fn new(reason: ReasonCode) -> Self {
        Self {
            reason,
            extra: HashMap::new(),
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// A named step of the cascade
#[derive(Clone, Copy)]
pub struct Rule {
    pub name: &'static str,
    pub apply: fn(&mut RuleContext<'_>) -> Option<Verdict>,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

/// Default rule order
pub const RULES: &[Rule] = &[
    Rule { name: "murmur_gate", apply: murmur_gate },
    Rule { name: "stop_word", apply: stop_word },
    Rule { name: "soft_ack", apply: soft_ack },
    Rule { name: "discourse_strip", apply: discourse_strip },
    Rule { name: "partial_tokens", apply: partial_tokens },
    Rule { name: "filler_only", apply: filler_only },
    Rule { name: "stop_word_recheck", apply: stop_word },
    Rule { name: "meaningful", apply: meaningful },
];

/// Speaking and confidence at or below the low threshold
pub fn murmur_gate(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    (ctx.speaking && ctx.confidence <= ctx.low_confidence_threshold)
        .then(|| Verdict::new(ReasonCode::IgnoredLowConf))
}

/// Any stop phrase contained in the text, before filler stripping
pub fn stop_word(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    if !ctx.speaking {
        return None;
    }

    find_stop_word(ctx.text, ctx.stop_words)
        .map(|sw| Verdict::new(ReasonCode::InterruptStopWord).with_extra("matched", sw))
}

/// Whole utterance is a bare acknowledgment such as "okay" or "haan."
pub fn soft_ack(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    if !ctx.speaking {
        return None;
    }

    SOFT_ACK
        .is_match(ctx.text.trim())
        .then(|| Verdict::new(ReasonCode::IgnoredAck))
}

/// Drops discourse markers from the tokens; never decides
pub fn discourse_strip(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    if ctx.speaking {
        ctx.tokens.retain(|t| !DISCOURSE_MARKERS.contains(&t.as_str()));
    }
    None
}

/// Only short fragments left and the recognizer is unsure
///
/// Holds vacuously when no tokens remain.
pub fn partial_tokens(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    if !ctx.speaking || ctx.confidence >= PARTIAL_TOKEN_CONFIDENCE {
        return None;
    }

    ctx.tokens
        .iter()
        .all(|t| t.chars().count() <= PARTIAL_TOKEN_MAX_CHARS)
        .then(|| Verdict::new(ReasonCode::IgnoredPartialTokens).with_extra("tokens", ctx.tokens.clone()))
}

/// Every remaining token is an ignored word. Narrows the tokens to the
/// meaningful ones otherwise.
pub fn filler_only(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    if !ctx.speaking {
        return None;
    }

    let ignored = ctx.ignored_words;
    ctx.tokens.retain(|t| !is_filler(t, ignored));

    ctx.tokens
        .is_empty()
        .then(|| Verdict::new(ReasonCode::IgnoredFillerOrDiscourse))
}

/// Anything left while speaking interrupts
pub fn meaningful(ctx: &mut RuleContext<'_>) -> Option<Verdict> {
    ctx.speaking
        .then(|| Verdict::new(ReasonCode::InterruptMeaningful).with_extra("tokens", ctx.tokens.clone()))
}

/// Terminal fallback: the agent is silent, hand the transcript on
pub fn forward(ctx: &RuleContext<'_>) -> Verdict {
    if ctx.confidence < ctx.confidence_threshold * FORWARD_LOW_CONF_RATIO {
        Verdict::new(ReasonCode::ForwardedLowConf)
    } else {
        Verdict::new(ReasonCode::Forwarded)
    }
}

/// Ordered list of rules with forwarding as the fallback
#[derive(Debug, Clone, Copy)]
pub struct RuleCascade {
    rules: &'static [Rule],
}

impl Default for RuleCascade {
    fn default() -> Self {
        Self { rules: RULES }
    }
}

impl RuleCascade {
    pub fn new(rules: &'static [Rule]) -> Self {
        Self { rules }
    }

    /// Rule names in evaluation order
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name).collect()
    }

    /// Run the rules against `ctx`. Returns the verdict and the name of the
    /// rule that produced it.
    pub fn evaluate(&self, ctx: &mut RuleContext<'_>) -> (Verdict, &'static str) {
        for rule in self.rules {
            if let Some(verdict) = (rule.apply)(ctx) {
                return (verdict, rule.name);
            }
        }

        (forward(ctx), "forward")
    }
}
