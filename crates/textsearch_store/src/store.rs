//! Index store trait definition.

use crate::batch::Batch;
use crate::error::StoreResult;
use std::collections::BTreeSet;

/// The members of one set key, in lexical order.
pub type MemberSet = BTreeSet<String>;

/// A key-value set store holding posting lists and reverse maps.
///
/// Stores are **opaque**. They provide set operations over string members
/// and plain string values. The search engine owns all key naming and value
/// interpretation - stores do not understand prefixes, tokens or entities.
///
/// # Invariants
///
/// - `set_members` of a key that was never written returns an empty set
/// - `execute` applies every operation of a batch in order, in one round trip
/// - Removing the last member of a set leaves the key absent, exactly like a
///   key that was never written
/// - Stores must be `Send + Sync` for concurrent access
///
/// # Implementors
///
/// - [`super::InMemoryStore`] - For testing
pub trait IndexStore: Send + Sync {
    /// Returns all members of the set stored at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key holds a string or the store fails.
    fn set_members(&self, key: &str) -> StoreResult<MemberSet>;

    /// Returns the members present in every one of the given sets.
    ///
    /// The default implementation computes the intersection client-side from
    /// [`IndexStore::set_members`], stopping as soon as it becomes empty.
    /// An empty key list yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns an error if any key holds a string or the store fails.
    fn set_intersect(&self, keys: &[String]) -> StoreResult<MemberSet> {
        let Some((first, rest)) = keys.split_first() else {
            return Ok(MemberSet::new());
        };

        let mut result = self.set_members(first)?;
        for key in rest {
            if result.is_empty() {
                break;
            }
            let members = self.set_members(key)?;
            result.retain(|m| members.contains(m));
        }
        Ok(result)
    }

    /// Returns the members present in at least one of the given sets.
    ///
    /// The default implementation computes the union client-side from
    /// [`IndexStore::set_members`].
    ///
    /// # Errors
    ///
    /// Returns an error if any key holds a string or the store fails.
    fn set_union(&self, keys: &[String]) -> StoreResult<MemberSet> {
        let mut result = MemberSet::new();
        for key in keys {
            result.extend(self.set_members(key)?);
        }
        Ok(result)
    }

    /// Reads the string stored at `key`, or `None` if it is absent.
    ///
    /// # Errors
    ///
    /// Returns an error if the key holds a set or the store fails.
    fn get_string(&self, key: &str) -> StoreResult<Option<String>>;

    /// Stores `value` at `key`, replacing whatever was there.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn set_string(&self, key: &str, value: &str) -> StoreResult<()>;

    /// Deletes `key` regardless of its type. Deleting an absent key is a no-op.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    fn delete(&self, key: &str) -> StoreResult<()>;

    /// Applies a batch of mutations in a single round trip.
    ///
    /// Operations are applied in order. The store makes no isolation
    /// guarantee with respect to concurrent batches.
    ///
    /// # Errors
    ///
    /// Returns an error if any operation fails. Operations before the failing
    /// one may already have been applied.
    fn execute(&self, batch: Batch) -> StoreResult<()>;

    /// Adds `member` to the set at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key holds a string or the store fails.
    fn set_add(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.set_add(key, member);
        self.execute(batch)
    }

    /// Removes `member` from the set at `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the key holds a string or the store fails.
    fn set_remove(&self, key: &str, member: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.set_remove(key, member);
        self.execute(batch)
    }
}

impl<S: IndexStore + ?Sized> IndexStore for std::sync::Arc<S> {
    fn set_members(&self, key: &str) -> StoreResult<MemberSet> {
        (**self).set_members(key)
    }

    fn set_intersect(&self, keys: &[String]) -> StoreResult<MemberSet> {
        (**self).set_intersect(keys)
    }

    fn set_union(&self, keys: &[String]) -> StoreResult<MemberSet> {
        (**self).set_union(keys)
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_string(key)
    }

    fn set_string(&self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_string(key, value)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        (**self).delete(key)
    }

    fn execute(&self, batch: Batch) -> StoreResult<()> {
        (**self).execute(batch)
    }
}
