//! Runtime-replaceable word sets
//!
//! Each set is an immutable snapshot behind a short-lived lock. Replacement
//! swaps the whole snapshot, so a reader sees either the old set or the new
//! one, never a mix. A decision that reads the set twice may see both.

use parking_lot::RwLock;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Immutable view of a word set
pub type LexiconSnapshot = Arc<BTreeSet<String>>;

/// Lowercase and trim every entry, dropping blanks
pub fn sanitize<I, S>(words: I) -> BTreeSet<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    words
        .into_iter()
        .map(|w| w.as_ref().trim().to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// A named, swappable word set
#[derive(Debug)]
pub struct LexiconSet {
    name: &'static str,
    words: RwLock<LexiconSnapshot>,
}

impl LexiconSet {
    pub fn new<I, S>(name: &'static str, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            name,
            words: RwLock::new(Arc::new(sanitize(words))),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Current snapshot
    pub fn snapshot(&self) -> LexiconSnapshot {
        Arc::clone(&self.words.read())
    }

    /// Swap in a new set. Returns the previous snapshot.
    pub fn replace<I, S>(&self, words: I) -> LexiconSnapshot
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = Arc::new(sanitize(words));
        let previous = std::mem::replace(&mut *self.words.write(), Arc::clone(&next));

        tracing::info!(
            lexicon = self.name,
            before = previous.len(),
            after = next.len(),
            "Lexicon replaced"
        );

        previous
    }
}

/// First stop phrase contained in `text` as a substring
pub fn find_stop_word<'a>(text: &str, stop_words: &'a BTreeSet<String>) -> Option<&'a str> {
    stop_words
        .iter()
        .map(String::as_str)
        .find(|sw| text.contains(sw))
}

/// `token` equals `word` with the final character of `word` repeated one or
/// more times: "uh", "uhh" and "uhhh" match "uh"; "uhuh" does not.
pub fn is_elongation_of(token: &str, word: &str) -> bool {
    let Some(last) = word.chars().last() else {
        return false;
    };

    match token.strip_prefix(word) {
        Some(rest) => rest.chars().all(|c| c == last),
        None => false,
    }
}

/// Token matches any ignored word, allowing elongation
pub fn is_filler(token: &str, ignored_words: &BTreeSet<String>) -> bool {
    ignored_words.iter().any(|w| is_elongation_of(token, w))
}
