//! Entity identifiers and indexed field values.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of an indexed entity.
///
/// Entity IDs are stored verbatim as posting-list members, so any string
/// form the host application uses (integer keys, UUIDs, slugs) works as long
/// as it is stable for the lifetime of the entity.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Creates a new random entity ID from a v4 UUID.
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Returns the ID as stored in the index.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the ID, returning the stored string.
    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for EntityId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<u64> for EntityId {
    fn from(n: u64) -> Self {
        Self(n.to_string())
    }
}

impl From<u32> for EntityId {
    fn from(n: u32) -> Self {
        Self(n.to_string())
    }
}

impl From<i64> for EntityId {
    fn from(n: i64) -> Self {
        Self(n.to_string())
    }
}

impl From<Uuid> for EntityId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid.to_string())
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// The current value of an indexed field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Free text, split into tokens by the field's split rule.
    Text(String),
    /// Already-split phrases; each element is one token.
    Phrases(Vec<String>),
}

impl FieldValue {
    /// Returns an empty text value.
    #[must_use]
    pub fn empty() -> Self {
        Self::Text(String::new())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(v: Vec<String>) -> Self {
        Self::Phrases(v)
    }
}

impl From<Vec<&str>> for FieldValue {
    fn from(v: Vec<&str>) -> Self {
        Self::Phrases(v.into_iter().map(str::to_string).collect())
    }
}

impl<const N: usize> From<[&str; N]> for FieldValue {
    fn from(v: [&str; N]) -> Self {
        Self::Phrases(v.iter().map(|s| (*s).to_string()).collect())
    }
}

/// An entity whose fields can be text indexed.
///
/// Implement this on domain records to use [`crate::TextSearch::update_entity`]
/// and [`crate::TextSearch::delete_entity`].
pub trait Searchable {
    /// Returns the ID under which the entity is indexed.
    fn search_id(&self) -> EntityId;

    /// Returns the current value of `field`, or `None` if it has no value.
    fn field_value(&self, field: &str) -> Option<FieldValue>;
}
