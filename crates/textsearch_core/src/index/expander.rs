//! Expansion of normalized tokens into index keys.
//!
//! Every token is indexed under each of its prefixes from `minlength` up to
//! its full length. A search for any prefix is then one set lookup, at the
//! cost of O(len²) key bytes per token.

use std::collections::HashSet;

/// Replaces whitespace inside index keys.
pub const KEY_JOINER: char = '.';

/// Replaces every run of whitespace in `s` with a single [`KEY_JOINER`].
#[must_use]
pub fn join_whitespace(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_space = false;
    for c in s.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(KEY_JOINER);
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

/// Insertion-ordered set of index keys.
#[derive(Debug, Default)]
struct KeySet {
    keys: Vec<String>,
    seen: HashSet<String>,
}

impl KeySet {
    fn insert(&mut self, key: String) {
        if self.seen.insert(key.clone()) {
            self.keys.push(key);
        }
    }
}

/// Turns normalized tokens into the index keys asserting them.
#[derive(Debug, Clone, Copy)]
pub struct PrefixExpander<'a> {
    key: &'a str,
    minlength: usize,
    exact: bool,
    full: bool,
}

impl<'a> PrefixExpander<'a> {
    /// Creates an expander for the field whose key prefix is `key`.
    pub fn new(key: &'a str, minlength: usize, exact: bool, full: bool) -> Self {
        Self {
            key,
            minlength,
            exact,
            full,
        }
    }

    /// Returns the index key for one already-normalized substring.
    #[must_use]
    pub fn key_for(&self, substring: &str) -> String {
        format!("{}:{}", self.key, join_whitespace(substring))
    }

    /// Expands `tokens` into index keys, without duplicates, in first-seen order.
    pub fn expand<I>(&self, tokens: I) -> Vec<String>
    where
        I: IntoIterator<Item = String>,
    {
        let mut keys = KeySet::default();
        let mut seen_tokens = Vec::new();

        for token in tokens {
            if self.exact {
                keys.insert(self.key_for(&token));
            } else {
                self.push_prefixes(&token, &mut keys);
            }
            if self.full {
                seen_tokens.push(token);
            }
        }

        if self.full && !seen_tokens.is_empty() {
            let joined = seen_tokens.join(&KEY_JOINER.to_string());
            self.push_prefixes(&joined, &mut keys);
        }

        keys.keys
    }

    fn push_prefixes(&self, text: &str, keys: &mut KeySet) {
        if text.is_empty() {
            return;
        }
        let bounds: Vec<usize> = text
            .char_indices()
            .map(|(i, _)| i)
            .skip(1)
            .chain(std::iter::once(text.len()))
            .collect();

        // bounds[n - 1] is the byte length of the first n characters
        for len in self.minlength.max(1)..=bounds.len() {
            keys.insert(self.key_for(&text[..bounds[len - 1]]));
        }
    }
}
