//! Search configuration.
//!
//! A [`SearchConfig`] describes one entity type: which fields are indexed and
//! how, which words are never indexed, and the default page size. It is
//! built once, handed to [`crate::TextSearch::new`], and never mutated
//! afterwards.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Words that are never indexed unless the exclude list is replaced.
pub const DEFAULT_EXCLUDE_LIST: &[&str] = &[
    "a", "an", "and", "as", "at", "but", "by", "for", "in", "into", "of", "on", "onto", "to",
    "the",
];

/// Page size used when neither the search nor the config names one.
pub const DEFAULT_PER_PAGE: usize = 30;

/// Shortest token indexed when a definition does not say otherwise.
pub const DEFAULT_MIN_LENGTH: usize = 2;

/// How a text value is cut into tokens before normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "SplitRuleRepr", into = "SplitRuleRepr")]
pub enum SplitRule {
    /// Split on runs of whitespace.
    #[default]
    Whitespace,
    /// Split on every match of a regular expression.
    Pattern(Regex),
    /// Do not split; the whole value is one token.
    Keep,
}

impl SplitRule {
    /// Compiles a pattern split rule.
    ///
    /// # Errors
    ///
    /// Returns the regex error if `pattern` does not compile.
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Regex::new(pattern).map(Self::Pattern)
    }
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind", content = "pattern")]
enum SplitRuleRepr {
    Whitespace,
    Pattern(String),
    Keep,
}

impl TryFrom<SplitRuleRepr> for SplitRule {
    type Error = regex::Error;

    fn try_from(repr: SplitRuleRepr) -> Result<Self, Self::Error> {
        match repr {
            SplitRuleRepr::Whitespace => Ok(Self::Whitespace),
            SplitRuleRepr::Pattern(p) => Self::pattern(&p),
            SplitRuleRepr::Keep => Ok(Self::Keep),
        }
    }
}

impl From<SplitRule> for SplitRuleRepr {
    fn from(rule: SplitRule) -> Self {
        match rule {
            SplitRule::Whitespace => Self::Whitespace,
            SplitRule::Pattern(re) => Self::Pattern(re.as_str().to_string()),
            SplitRule::Keep => Self::Keep,
        }
    }
}

/// Declares that one field of an entity type is text indexed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexDefinition {
    /// Name of the indexed field.
    pub field: String,

    /// Shortest token (and shortest prefix) that is indexed. Must be at least 1.
    #[serde(default = "default_min_length")]
    pub minlength: usize,

    /// How text values are split into tokens.
    #[serde(default)]
    pub split: SplitRule,

    /// Index each whole token instead of all of its prefixes.
    #[serde(default)]
    pub exact: bool,

    /// Also index prefixes of all tokens joined together.
    #[serde(default)]
    pub full: bool,

    /// Extra words never indexed for this field, on top of the global list.
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_min_length() -> usize {
    DEFAULT_MIN_LENGTH
}

impl IndexDefinition {
    /// Creates a prefix index definition for `field` with default options.
    pub fn new(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            minlength: DEFAULT_MIN_LENGTH,
            split: SplitRule::default(),
            exact: false,
            full: false,
            exclude: Vec::new(),
        }
    }

    /// Sets the minimum indexed length.
    #[must_use]
    pub fn minlength(mut self, len: usize) -> Self {
        self.minlength = len;
        self
    }

    /// Sets the split rule.
    #[must_use]
    pub fn split(mut self, rule: SplitRule) -> Self {
        self.split = rule;
        self
    }

    /// Indexes whole tokens only.
    #[must_use]
    pub fn exact(mut self) -> Self {
        self.exact = true;
        self
    }

    /// Also indexes the joined phrase.
    #[must_use]
    pub fn full(mut self) -> Self {
        self.full = true;
        self
    }

    /// Adds field-specific excluded words.
    #[must_use]
    pub fn exclude<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude.extend(words.into_iter().map(Into::into));
        self
    }
}

/// Configuration for text search over one entity type.
///
/// # Example
///
/// ```rust
/// use textsearch_core::{IndexDefinition, SearchConfig};
///
/// let config = SearchConfig::new("BlogPost")
///     .index(IndexDefinition::new("title"))
///     .index(IndexDefinition::new("tags").exact())
///     .per_page(10);
///
/// assert_eq!(config.type_prefix(), "blog_post");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Name of the entity type, e.g. `Post` or `admin::BlogPost`.
    pub entity_type: String,

    /// Explicit key prefix; derived from `entity_type` when absent.
    #[serde(default)]
    pub prefix: Option<String>,

    /// Indexed fields.
    #[serde(default)]
    pub indexes: Vec<IndexDefinition>,

    /// Words never indexed in any field.
    #[serde(default = "default_exclude_list")]
    pub exclude_list: Vec<String>,

    /// Default page size for paginated searches.
    #[serde(default)]
    pub per_page: Option<usize>,
}

fn default_exclude_list() -> Vec<String> {
    DEFAULT_EXCLUDE_LIST.iter().map(|w| (*w).to_string()).collect()
}

impl SearchConfig {
    /// Creates a configuration with no indexes and the default exclude list.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            entity_type: entity_type.into(),
            prefix: None,
            indexes: Vec::new(),
            exclude_list: default_exclude_list(),
            per_page: None,
        }
    }

    /// Overrides the derived key prefix.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    /// Declares an indexed field.
    #[must_use]
    pub fn index(mut self, definition: IndexDefinition) -> Self {
        self.indexes.push(definition);
        self
    }

    /// Replaces the global exclude list.
    #[must_use]
    pub fn exclude_list<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclude_list = words.into_iter().map(Into::into).collect();
        self
    }

    /// Adds one word to the global exclude list.
    #[must_use]
    pub fn exclude(mut self, word: impl Into<String>) -> Self {
        self.exclude_list.push(word.into());
        self
    }

    /// Sets the default page size.
    #[must_use]
    pub fn per_page(mut self, per_page: usize) -> Self {
        self.per_page = Some(per_page);
        self
    }

    /// Returns the key prefix for this entity type.
    #[must_use]
    pub fn type_prefix(&self) -> String {
        match &self.prefix {
            Some(prefix) => prefix.clone(),
            None => derive_type_prefix(&self.entity_type),
        }
    }

    /// Returns the page size used when a search does not name one.
    #[must_use]
    pub fn default_per_page(&self) -> usize {
        self.per_page.filter(|n| *n > 0).unwrap_or(DEFAULT_PER_PAGE)
    }
}

/// Derives a key prefix from a type name.
///
/// Any module path is dropped and CamelCase becomes snake_case:
/// `admin::HTTPRequestLog` becomes `http_request_log`.
#[must_use]
pub fn derive_type_prefix(type_name: &str) -> String {
    let base = type_name.rsplit("::").next().unwrap_or(type_name);
    let chars: Vec<char> = base.chars().collect();
    let mut out = String::with_capacity(base.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev.is_lowercase()
                || prev.is_ascii_digit()
                || (prev.is_uppercase() && next_is_lower)
            {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
