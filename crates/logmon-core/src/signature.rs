//! Message signatures and session-scoped deduplication

use std::collections::HashSet;
use std::fmt;
use std::iter;

/// Normalized `(tag, message)` key.
///
/// Digits are removed and whitespace runs collapse to one space, so messages
/// that differ only in counters, ids or timestamps share a signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Signature(String);

impl Signature {
    pub fn new(tag: &str, message: &str) -> Self {
        let mut normalized = String::with_capacity(tag.len() + message.len() + 1);
        let mut pending_space = false;

        for c in tag.chars().chain(iter::once(':')).chain(message.chars()) {
            if c.is_ascii_digit() {
                continue;
            }
            if c.is_whitespace() {
                pending_space = !normalized.is_empty();
                continue;
            }
            if pending_space {
                normalized.push(' ');
                pending_space = false;
            }
            normalized.push(c);
        }

        Self(normalized)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Remembers every signature seen during one session.
///
/// Stateful and order dependent: the first submission of a signature is
/// novel, every later one is a duplicate.
#[derive(Debug, Default)]
pub struct Deduplicator {
    seen: HashSet<Signature>,
}

impl Deduplicator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` the first time a signature is observed
    pub fn should_emit(&mut self, tag: &str, message: &str) -> bool {
        self.seen.insert(Signature::new(tag, message))
    }

    /// Number of distinct signatures observed
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}
