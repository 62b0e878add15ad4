//! Tokenization and normalization of field values.
//!
//! Indexing and querying must agree byte for byte on normalization, or
//! legitimate matches are missed. Both paths go through [`normalize`].

use crate::config::SplitRule;
use crate::entity::FieldValue;
use std::collections::HashSet;
use std::str::SplitWhitespace;

/// Returns true for characters kept by normalization besides whitespace.
#[inline]
fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Normalizes one raw token.
///
/// Every character that is neither a word character nor whitespace is
/// dropped, the rest is lowercased, and surrounding whitespace is trimmed.
///
/// ```rust
/// use textsearch_core::normalize;
///
/// assert_eq!(normalize("*Nate's"), "nates");
/// assert_eq!(normalize("BLOG!!"), "blog");
/// ```
#[must_use]
pub fn normalize(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| is_word_char(*c) || c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect();
    cleaned.trim().to_string()
}

/// Splits and filters field values into normalized tokens.
#[derive(Debug, Clone, Copy)]
pub struct Tokenizer<'a> {
    split: &'a SplitRule,
    minlength: usize,
    exclude: &'a HashSet<String>,
}

impl<'a> Tokenizer<'a> {
    /// Creates a tokenizer. `exclude` must already be lowercased.
    pub fn new(split: &'a SplitRule, minlength: usize, exclude: &'a HashSet<String>) -> Self {
        Self {
            split,
            minlength,
            exclude,
        }
    }

    /// Returns the normalized tokens of `value`, in order.
    ///
    /// Phrase values are taken element by element; text values are split by
    /// the split rule. Tokens shorter than `minlength` characters after
    /// normalization, and excluded words, are dropped.
    pub fn tokens(&self, value: &'a FieldValue) -> Tokens<'a> {
        let pieces = match value {
            FieldValue::Phrases(phrases) => Pieces::Phrases(phrases.iter()),
            FieldValue::Text(text) => match self.split {
                SplitRule::Whitespace => Pieces::Whitespace(text.split_whitespace()),
                SplitRule::Pattern(re) => Pieces::Pattern(re.split(text)),
                SplitRule::Keep => Pieces::Single(Some(text.as_str())),
            },
        };

        Tokens {
            pieces,
            minlength: self.minlength,
            exclude: self.exclude,
        }
    }
}

enum Pieces<'a> {
    Whitespace(SplitWhitespace<'a>),
    Pattern(regex::Split<'a, 'a>),
    Single(Option<&'a str>),
    Phrases(std::slice::Iter<'a, String>),
}

impl<'a> Iterator for Pieces<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        match self {
            Self::Whitespace(it) => it.next(),
            Self::Pattern(it) => it.next(),
            Self::Single(it) => it.take(),
            Self::Phrases(it) => it.next().map(String::as_str),
        }
    }
}

/// Iterator over the normalized tokens of one field value.
///
/// Single pass; build a new one from the [`Tokenizer`] to iterate again.
pub struct Tokens<'a> {
    pieces: Pieces<'a>,
    minlength: usize,
    exclude: &'a HashSet<String>,
}

impl Iterator for Tokens<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        for piece in self.pieces.by_ref() {
            let token = normalize(piece);
            if token.chars().count() < self.minlength || self.exclude.contains(&token) {
                continue;
            }
            return Some(token);
        }
        None
    }
}
