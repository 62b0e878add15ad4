//! In-memory index store.

use crate::batch::{Batch, StoreOp};
use crate::error::{StoreError, StoreResult};
use crate::store::{IndexStore, MemberSet};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Clone)]
enum Value {
    Set(MemberSet),
    Str(String),
}

/// Snapshot of the counters kept by an [`InMemoryStore`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreStats {
    /// Calls that would have crossed the network (reads and batches).
    pub round_trips: u64,
    /// Set-add operations applied.
    pub set_adds: u64,
    /// Set-remove operations applied.
    pub set_removes: u64,
    /// String writes and key deletions applied.
    pub writes: u64,
    /// Read calls (members, intersect, union, get).
    pub reads: u64,
}

impl StoreStats {
    /// Number of posting-list mutations (adds plus removes).
    #[must_use]
    pub const fn set_mutations(&self) -> u64 {
        self.set_adds + self.set_removes
    }
}

#[derive(Debug, Default)]
struct Counters {
    round_trips: AtomicU64,
    set_adds: AtomicU64,
    set_removes: AtomicU64,
    writes: AtomicU64,
    reads: AtomicU64,
}

/// An in-memory key-value set store.
///
/// This store keeps everything in a single map guarded by a read-write lock
/// and follows Redis semantics where they matter to the engine:
/// - Reading an absent set yields an empty set
/// - Removing the last member of a set deletes the key
/// - Using a string key as a set (or the reverse) is a type error
///
/// It also counts round trips and mutations so callers can verify how much
/// traffic an operation would cause against a remote store.
///
/// # Example
///
/// ```rust
/// use textsearch_store::{IndexStore, InMemoryStore};
///
/// let store = InMemoryStore::new();
/// store.set_add("k", "1").unwrap();
/// store.set_remove("k", "1").unwrap();
/// assert!(!store.contains_key("k"));
/// assert_eq!(store.stats().round_trips, 2);
/// ```
#[derive(Debug, Default)]
pub struct InMemoryStore {
    data: RwLock<HashMap<String, Value>>,
    counters: Counters,
}

impl InMemoryStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of the traffic counters.
    #[must_use]
    pub fn stats(&self) -> StoreStats {
        let c = &self.counters;
        StoreStats {
            round_trips: c.round_trips.load(Ordering::Relaxed),
            set_adds: c.set_adds.load(Ordering::Relaxed),
            set_removes: c.set_removes.load(Ordering::Relaxed),
            writes: c.writes.load(Ordering::Relaxed),
            reads: c.reads.load(Ordering::Relaxed),
        }
    }

    /// Resets all traffic counters to zero.
    pub fn reset_stats(&self) {
        let c = &self.counters;
        for counter in [&c.round_trips, &c.set_adds, &c.set_removes, &c.writes, &c.reads] {
            counter.store(0, Ordering::Relaxed);
        }
    }

    /// Returns true if `key` holds a value. Not counted as traffic.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.read().contains_key(key)
    }

    /// Returns all keys starting with `prefix`, sorted. Not counted as traffic.
    #[must_use]
    pub fn keys_with_prefix(&self, prefix: &str) -> Vec<String> {
        let mut keys: Vec<String> = self
            .data
            .read()
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        keys.sort();
        keys
    }

    /// Returns the number of keys held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Returns true if the store holds no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    /// Removes every key. Counters are left untouched.
    pub fn clear(&self) {
        self.data.write().clear();
    }

    fn read_call(&self) {
        self.counters.round_trips.fetch_add(1, Ordering::Relaxed);
        self.counters.reads.fetch_add(1, Ordering::Relaxed);
    }

    fn members_of(data: &HashMap<String, Value>, key: &str) -> StoreResult<MemberSet> {
        match data.get(key) {
            None => Ok(MemberSet::new()),
            Some(Value::Set(members)) => Ok(members.clone()),
            Some(Value::Str(_)) => Err(StoreError::expected_set(key)),
        }
    }

    fn apply(&self, data: &mut HashMap<String, Value>, op: StoreOp) -> StoreResult<()> {
        match op {
            StoreOp::SetAdd { key, member } => {
                let entry = data
                    .entry(key.clone())
                    .or_insert_with(|| Value::Set(MemberSet::new()));
                let Value::Set(members) = entry else {
                    return Err(StoreError::expected_set(key));
                };
                members.insert(member);
                self.counters.set_adds.fetch_add(1, Ordering::Relaxed);
            }
            StoreOp::SetRemove { key, member } => {
                match data.get_mut(&key) {
                    None => {}
                    Some(Value::Set(members)) => {
                        members.remove(&member);
                        if members.is_empty() {
                            data.remove(&key);
                        }
                    }
                    Some(Value::Str(_)) => return Err(StoreError::expected_set(key)),
                }
                self.counters.set_removes.fetch_add(1, Ordering::Relaxed);
            }
            StoreOp::SetString { key, value } => {
                data.insert(key, Value::Str(value));
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
            }
            StoreOp::Delete { key } => {
                data.remove(&key);
                self.counters.writes.fetch_add(1, Ordering::Relaxed);
            }
        }
        Ok(())
    }
}

impl IndexStore for InMemoryStore {
    fn set_members(&self, key: &str) -> StoreResult<MemberSet> {
        self.read_call();
        Self::members_of(&self.data.read(), key)
    }

    fn set_intersect(&self, keys: &[String]) -> StoreResult<MemberSet> {
        self.read_call();
        let data = self.data.read();
        let Some((first, rest)) = keys.split_first() else {
            return Ok(MemberSet::new());
        };

        let mut result = Self::members_of(&data, first)?;
        for key in rest {
            let members = Self::members_of(&data, key)?;
            result.retain(|m| members.contains(m));
        }
        Ok(result)
    }

    fn set_union(&self, keys: &[String]) -> StoreResult<MemberSet> {
        self.read_call();
        let data = self.data.read();
        let mut result = MemberSet::new();
        for key in keys {
            result.extend(Self::members_of(&data, key)?);
        }
        Ok(result)
    }

    fn get_string(&self, key: &str) -> StoreResult<Option<String>> {
        self.read_call();
        match self.data.read().get(key) {
            None => Ok(None),
            Some(Value::Str(s)) => Ok(Some(s.clone())),
            Some(Value::Set(_)) => Err(StoreError::expected_string(key)),
        }
    }

    fn set_string(&self, key: &str, value: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.set_string(key, value);
        self.execute(batch)
    }

    fn delete(&self, key: &str) -> StoreResult<()> {
        let mut batch = Batch::new();
        batch.delete(key);
        self.execute(batch)
    }

    fn execute(&self, batch: Batch) -> StoreResult<()> {
        self.counters.round_trips.fetch_add(1, Ordering::Relaxed);
        let mut data = self.data.write();
        for op in batch {
            self.apply(&mut data, op)?;
        }
        Ok(())
    }
}
