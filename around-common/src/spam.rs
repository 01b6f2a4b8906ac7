//! Lexicon based spam classification.
//!
//! The same tokenizer is used when a post is written and when it is read back, so a
//! message only changes classification when the lexicon itself changes.

use std::{
    collections::HashSet,
    sync::{Arc, PoisonError, RwLock},
};

pub const BUILTIN_SPAM_WORDS: [&str; 3] = ["shit", "fuck", "bitch"];

/// A set of banned tokens. Matching is exact and case sensitive.
#[derive(Clone, Eq, PartialEq, Debug, Default)]
pub struct SpamLexicon {
    words: HashSet<String>,
    version: u64,
}

impl SpamLexicon {
    #[must_use]
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            words: words.into_iter().map(Into::into).collect(),
            version: 0,
        }
    }

    #[must_use]
    pub fn builtin() -> Self {
        Self::new(BUILTIN_SPAM_WORDS)
    }

    /// Parses a lexicon file: one token per line, blank lines and `#` comments ignored.
    #[must_use]
    pub fn from_lines(contents: &str) -> Self {
        Self::new(
            contents
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        )
    }

    /// Parses a comma separated list of tokens.
    #[must_use]
    pub fn from_list(list: &str) -> Self {
        Self::new(
            list.split(',')
                .map(str::trim)
                .filter(|word| !word.is_empty()),
        )
    }

    #[must_use]
    pub fn contains(&self, token: &str) -> bool {
        self.words.contains(token)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    #[must_use]
    pub fn version(&self) -> u64 {
        self.version
    }
}

/// Returns whether any whitespace separated token of `message` is in `lexicon`.
#[must_use]
pub fn is_spam(message: &str, lexicon: &SpamLexicon) -> bool {
    message
        .split_whitespace()
        .any(|token| lexicon.contains(token))
}

/// The process wide lexicon. Operations take one snapshot and use it throughout.
#[derive(Debug, Default)]
pub struct LexiconHandle {
    current: RwLock<Arc<SpamLexicon>>,
}

impl LexiconHandle {
    #[must_use]
    pub fn new(lexicon: SpamLexicon) -> Self {
        Self {
            current: RwLock::new(Arc::new(lexicon)),
        }
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<SpamLexicon> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Installs `lexicon` as the next version and returns that version.
    pub fn replace(&self, mut lexicon: SpamLexicon) -> u64 {
        let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
        lexicon.version = current.version + 1;
        let version = lexicon.version;
        *current = Arc::new(lexicon);

        version
    }
}
