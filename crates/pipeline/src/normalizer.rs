//! Multilingual filler normalization
//!
//! ASR spells elongated fillers and Hinglish backchannels many ways
//! ("achha", "haaan", "ummmm", "okay", "thek hai"). Each rule rewrites the
//! whole string, in declaration order, so a later rule sees the output of
//! earlier ones. Reordering the table changes behavior.

use once_cell::sync::Lazy;
use regex::Regex;

/// Ordered (pattern, canonical form) table
const RULES: &[(&str, &str)] = &[
    (r"ach+a+", "acha"),
    (r"ha+n+", "haan"),
    (r"arre+", "arre"),
    (r"umm+", "umm"),
    (r"uh+", "uh"),
    (r"hmm+", "hmm"),
    (r"em+", "em"),
    (r"ok(?:a+y*)*", "ok"),
    (r"th(?:e)?ek\s*hai", "theek hai"),
    (r"cha?lo+", "chalo"),
];

static NORMALIZATION_RULES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    RULES
        .iter()
        .map(|(pattern, canonical)| (Regex::new(pattern).unwrap(), *canonical))
        .collect()
});

/// Lowercase, trim and canonicalize filler spellings
///
/// # Examples
/// ```
/// use voice_interrupt_pipeline::normalizer::normalize;
/// assert_eq!(normalize("  Ummmm OKAY stop "), "umm ok stop");
/// assert_eq!(normalize("achha thek hai"), "acha theek hai");
/// ```
pub fn normalize(raw: &str) -> String {
    let mut text = raw.to_lowercase().trim().to_string();

    for (pattern, canonical) in NORMALIZATION_RULES.iter() {
        text = pattern.replace_all(&text, *canonical).into_owned();
    }

    text
}
