//! Pipelined mutation batches.

/// A single store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreOp {
    /// Add a member to a set.
    SetAdd {
        /// Set key.
        key: String,
        /// Member to add.
        member: String,
    },
    /// Remove a member from a set.
    SetRemove {
        /// Set key.
        key: String,
        /// Member to remove.
        member: String,
    },
    /// Overwrite a string value.
    SetString {
        /// String key.
        key: String,
        /// New value.
        value: String,
    },
    /// Delete a key of any type.
    Delete {
        /// Key to delete.
        key: String,
    },
}

impl StoreOp {
    /// Returns the key this operation touches.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::SetAdd { key, .. }
            | Self::SetRemove { key, .. }
            | Self::SetString { key, .. }
            | Self::Delete { key } => key,
        }
    }
}

/// An ordered sequence of mutations sent to the store as one round trip.
///
/// # Example
///
/// ```rust
/// use textsearch_store::Batch;
///
/// let mut batch = Batch::new();
/// batch.set_add("tags:rust", "7").set_string("7:tags_indexes", "tags:rust");
/// assert_eq!(batch.len(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Batch {
    ops: Vec<StoreOp>,
}

impl Batch {
    /// Creates an empty batch.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues adding `member` to the set at `key`.
    pub fn set_add(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetAdd {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    /// Queues removing `member` from the set at `key`.
    pub fn set_remove(&mut self, key: impl Into<String>, member: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetRemove {
            key: key.into(),
            member: member.into(),
        });
        self
    }

    /// Queues overwriting the string at `key`.
    pub fn set_string(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::SetString {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    /// Queues deleting `key`.
    pub fn delete(&mut self, key: impl Into<String>) -> &mut Self {
        self.ops.push(StoreOp::Delete { key: key.into() });
        self
    }

    /// Returns the number of queued operations.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// Returns true if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Returns the queued operations in order.
    #[must_use]
    pub fn ops(&self) -> &[StoreOp] {
        &self.ops
    }
}

impl IntoIterator for Batch {
    type Item = StoreOp;
    type IntoIter = std::vec::IntoIter<StoreOp>;

    fn into_iter(self) -> Self::IntoIter {
        self.ops.into_iter()
    }
}

impl Extend<StoreOp> for Batch {
    fn extend<I: IntoIterator<Item = StoreOp>>(&mut self, iter: I) {
        self.ops.extend(iter);
    }
}
